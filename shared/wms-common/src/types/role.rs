//! Role Types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::permission::PermissionSet;

/// Named bundle of permissions assignable to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Role {
    /// Role ID.
    pub id: Uuid,
    /// Display name.
    #[validate(length(min = 1, max = 64), custom(function = "validate_not_blank"))]
    pub name: String,
    /// Optional free-text description.
    #[validate(length(max = 256))]
    pub description: Option<String>,
    /// Permissions granted to holders of this role.
    #[serde(default)]
    pub permissions: PermissionSet,
    /// When the role was created.
    pub created_at: DateTime<Utc>,
    /// When the role was last saved.
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// Create an empty role with a fresh ID.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            description: None,
            permissions: PermissionSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn with_permissions(mut self, permissions: PermissionSet) -> Self {
        self.permissions = permissions;
        self
    }

    /// Check whether the role holds a permission.
    #[must_use]
    pub fn has(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}
