//! Role editing session.
//!
//! Backs the role management form: every checkbox toggle goes through the
//! closure resolver so the role never holds a permission without its
//! prerequisites.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, warn};
use validator::Validate;
use wms_common::{Permission, PermissionSet, Role};

use super::catalog::{CatalogError, PermissionCatalog};
use super::closure::{close, toggle, PermissionChange};

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Permission '{0}' is not part of the catalog")]
    UnknownPermission(Permission),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// In-progress edit of a single role.
#[derive(Debug, Clone)]
pub struct RoleEditor {
    original: Role,
    role: Role,
    catalog: Arc<PermissionCatalog>,
}

impl RoleEditor {
    /// Start editing `role`.
    ///
    /// A stored permission set that is not closed over the current graph is
    /// normalised immediately, which leaves the editor dirty.
    pub fn new(role: Role, catalog: Arc<PermissionCatalog>) -> Self {
        let mut edited = role.clone();
        edited.permissions = close(&role.permissions, catalog.graph());

        if edited.permissions != role.permissions {
            let change = PermissionChange::between(&role.permissions, &edited.permissions);
            warn!(
                role_id = %role.id,
                added = ?change.added,
                "Role permissions were not closed, added missing prerequisites"
            );
        }

        Self {
            original: role,
            role: edited,
            catalog,
        }
    }

    #[must_use]
    pub const fn role(&self) -> &Role {
        &self.role
    }

    #[must_use]
    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.role.name = name.into();
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.role.description = description;
    }

    /// Check or uncheck a single permission.
    pub fn set_permission(
        &mut self,
        permission: &Permission,
        checked: bool,
    ) -> Result<PermissionChange, EditorError> {
        if !self.catalog.contains(permission.as_str()) {
            return Err(EditorError::UnknownPermission(permission.clone()));
        }

        let next = toggle(permission, checked, &self.role.permissions, self.catalog.graph());
        Ok(self.apply(next, permission.as_str(), checked))
    }

    /// Check or uncheck every permission in a group.
    pub fn set_group(&mut self, key: &str, checked: bool) -> Result<PermissionChange, EditorError> {
        let next = if checked {
            self.catalog.grant_group(key, &self.role.permissions)?
        } else {
            self.catalog.revoke_group(key, &self.role.permissions)?
        };
        Ok(self.apply(next, key, checked))
    }

    fn apply(
        &mut self,
        next: PermissionSet,
        subject: &str,
        checked: bool,
    ) -> PermissionChange {
        let change = PermissionChange::between(&self.role.permissions, &next);
        debug!(
            role_id = %self.role.id,
            subject,
            checked,
            added = change.added.len(),
            removed = change.removed.len(),
            "Role permission toggled"
        );
        self.role.permissions = next;
        change
    }

    /// Whether anything differs from the role as it was loaded.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.role.name != self.original.name
            || self.role.description != self.original.description
            || self.role.permissions != self.original.permissions
    }

    /// Net permission change since the role was loaded.
    #[must_use]
    pub fn changes(&self) -> PermissionChange {
        PermissionChange::between(&self.original.permissions, &self.role.permissions)
    }

    /// Discard every edit. The loaded permission set is closed again, as in
    /// [`RoleEditor::new`].
    pub fn reset(&mut self) {
        self.role = self.original.clone();
        self.role.permissions = close(&self.original.permissions, self.catalog.graph());
    }

    /// Validate and return the edited role ready to be saved.
    pub fn into_role(self) -> Result<Role, EditorError> {
        let mut role = self.role;
        role.validate()?;
        if role != self.original {
            role.updated_at = Utc::now();
        }
        Ok(role)
    }
}
