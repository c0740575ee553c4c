//! WMS Access - Main Entry Point
//!
//! Loads and validates the permission catalog. When given the path of a role
//! JSON document, prints the role with its permission set closed over the
//! dependency graph.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use wms_access::permissions::{self, RoleEditor};
use wms_access::{config, observability};
use wms_common::Role;

fn main() -> Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env()?;

    observability::init(&config.observability)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        strict = config.strict_graph,
        "Starting WMS access check"
    );

    let catalog = Arc::new(permissions::load_from_config(&config)?);
    info!(
        groups = catalog.groups().len(),
        permissions = catalog.permissions().len(),
        dependencies = catalog.graph().edge_count(),
        "Permission catalog ready"
    );

    if let Some(path) = std::env::args_os().nth(1) {
        let document = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read role {}", path.to_string_lossy()))?;
        let role: Role = serde_json::from_str(&document).context("Invalid role document")?;

        let unknown = catalog.unknown_permissions(&role.permissions);
        if !unknown.is_empty() {
            warn!(role_id = %role.id, ?unknown, "Role holds undeclared permissions");
        }

        let editor = RoleEditor::new(role, Arc::clone(&catalog));
        let changes = editor.changes();
        info!(
            added = changes.added.len(),
            dirty = editor.is_dirty(),
            "Role normalised"
        );

        let role = editor.into_role()?;
        println!("{}", serde_json::to_string_pretty(&role)?);
    }

    Ok(())
}
