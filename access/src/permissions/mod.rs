//! Role permission management.
//!
//! - `graph`: static parent-to-children dependency map
//! - `closure`: grant/revoke keeping a role's set closed over the graph
//! - `catalog`: grouped permission declarations for the role editor
//! - `editor`: role editing session built on the resolver
//! - `loader`: catalog and graph loading from configuration

pub mod catalog;
pub mod closure;
pub mod editor;
pub mod graph;
pub mod loader;

pub use catalog::{CatalogError, GroupState, PermissionCatalog, PermissionEntry, PermissionGroup};
pub use closure::{close, diff, grant, is_closed, revoke, toggle, PermissionChange};
pub use editor::{EditorError, RoleEditor};
pub use graph::{CyclePath, GraphError, PermissionGraph};
pub use loader::{load_catalog, load_from_config, load_graph};
