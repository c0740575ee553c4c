//! Permission catalog shown in the role editor.
//!
//! Groups the declared permissions by application area and carries the
//! dependency graph that keeps role permission sets closed.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wms_common::{Permission, PermissionSet};

use super::closure::{grant, revoke};
use super::graph::{GraphError, PermissionGraph};

/// Built-in catalog for the warehouse application.
const WAREHOUSE_CATALOG: &str = include_str!("warehouse_catalog.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Unknown permission group '{0}'")]
    UnknownGroup(String),

    #[error("Permission group '{0}' is declared more than once")]
    DuplicateGroup(String),

    #[error("Permission '{0}' is declared more than once")]
    DuplicatePermission(Permission),

    #[error("Dependency graph references undeclared permission '{0}'")]
    UndeclaredDependency(Permission),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Invalid catalog document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A single permission with its display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionEntry {
    pub permission: Permission,
    pub label: String,
}

/// Permissions belonging to one application area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGroup {
    pub key: String,
    pub label: String,
    pub permissions: Vec<PermissionEntry>,
}

impl PermissionGroup {
    pub fn members(&self) -> impl Iterator<Item = &Permission> {
        self.permissions.iter().map(|entry| &entry.permission)
    }
}

/// Tri-state of a group checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupState {
    All,
    Partial,
    None,
}

/// Ordered permission groups plus their dependency graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionCatalog {
    groups: Vec<PermissionGroup>,
    #[serde(default)]
    dependencies: PermissionGraph,
}

impl PermissionCatalog {
    #[must_use]
    pub fn new(groups: Vec<PermissionGroup>, dependencies: PermissionGraph) -> Self {
        Self {
            groups,
            dependencies,
        }
    }

    /// The catalog compiled into the binary.
    pub fn warehouse_default() -> Result<Self, CatalogError> {
        Self::from_json(WAREHOUSE_CATALOG)
    }

    pub fn from_json(document: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(document)?)
    }

    /// Replace the dependency graph, keeping the groups.
    #[must_use]
    pub fn with_graph(mut self, dependencies: PermissionGraph) -> Self {
        self.dependencies = dependencies;
        self
    }

    #[must_use]
    pub fn groups(&self) -> &[PermissionGroup] {
        &self.groups
    }

    #[must_use]
    pub fn group(&self, key: &str) -> Option<&PermissionGroup> {
        self.groups.iter().find(|group| group.key == key)
    }

    #[must_use]
    pub const fn graph(&self) -> &PermissionGraph {
        &self.dependencies
    }

    /// Every declared permission.
    #[must_use]
    pub fn permissions(&self) -> PermissionSet {
        self.groups
            .iter()
            .flat_map(PermissionGroup::members)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn contains(&self, permission: &str) -> bool {
        self.entry(permission).is_some()
    }

    /// Display label of a declared permission.
    #[must_use]
    pub fn label(&self, permission: &str) -> Option<&str> {
        self.entry(permission).map(|entry| entry.label.as_str())
    }

    fn entry(&self, permission: &str) -> Option<&PermissionEntry> {
        self.groups
            .iter()
            .flat_map(|group| group.permissions.iter())
            .find(|entry| entry.permission.as_str() == permission)
    }

    /// Members of `set` that the catalog does not declare.
    #[must_use]
    pub fn unknown_permissions(&self, set: &PermissionSet) -> PermissionSet {
        let declared = self.permissions();
        set.difference(&declared).cloned().collect()
    }

    /// Check group and permission uniqueness, that the graph only references
    /// declared permissions, and that the graph is acyclic.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut keys = BTreeSet::new();
        let mut declared = PermissionSet::new();

        for group in &self.groups {
            if !keys.insert(group.key.as_str()) {
                return Err(CatalogError::DuplicateGroup(group.key.clone()));
            }
            for permission in group.members() {
                if !declared.insert(permission.clone()) {
                    return Err(CatalogError::DuplicatePermission(permission.clone()));
                }
            }
        }

        self.validate_graph_against(&declared)?;
        self.dependencies.validate()?;
        Ok(())
    }

    /// Check that the dependency graph only references declared permissions.
    pub fn validate_graph(&self) -> Result<(), CatalogError> {
        self.validate_graph_against(&self.permissions())
    }

    fn validate_graph_against(&self, declared: &PermissionSet) -> Result<(), CatalogError> {
        match self
            .dependencies
            .permissions()
            .into_iter()
            .find(|permission| !declared.contains(permission))
        {
            Some(permission) => Err(CatalogError::UndeclaredDependency(permission)),
            None => Ok(()),
        }
    }

    /// Checkbox state of a group for the given set.
    pub fn group_state(&self, key: &str, set: &PermissionSet) -> Result<GroupState, CatalogError> {
        let group = self.require_group(key)?;
        let total = group.permissions.len();
        let held = group.members().filter(|p| set.contains(*p)).count();

        Ok(match held {
            0 => GroupState::None,
            n if n == total => GroupState::All,
            _ => GroupState::Partial,
        })
    }

    /// Grant every permission in a group, closing over the dependency graph.
    pub fn grant_group(
        &self,
        key: &str,
        current: &PermissionSet,
    ) -> Result<PermissionSet, CatalogError> {
        let group = self.require_group(key)?;
        Ok(group.members().fold(current.clone(), |set, permission| {
            grant(permission, &set, &self.dependencies)
        }))
    }

    /// Revoke every permission in a group along with their dependents.
    pub fn revoke_group(
        &self,
        key: &str,
        current: &PermissionSet,
    ) -> Result<PermissionSet, CatalogError> {
        let group = self.require_group(key)?;
        Ok(group.members().fold(current.clone(), |set, permission| {
            revoke(permission, &set, &self.dependencies)
        }))
    }

    fn require_group(&self, key: &str) -> Result<&PermissionGroup, CatalogError> {
        self.group(key)
            .ok_or_else(|| CatalogError::UnknownGroup(key.to_string()))
    }
}
