//! Catalog and dependency graph loading.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::catalog::PermissionCatalog;
use super::graph::PermissionGraph;
use crate::config::Config;

/// Read a dependency graph from a JSON document on disk.
#[tracing::instrument]
pub fn load_graph(path: &Path) -> Result<PermissionGraph> {
    let document = fs::read_to_string(path)
        .with_context(|| format!("Failed to read permission graph {}", path.display()))?;
    let graph: PermissionGraph = serde_json::from_str(&document)
        .with_context(|| format!("Invalid permission graph {}", path.display()))?;

    info!(
        permissions = graph.len(),
        dependencies = graph.edge_count(),
        "Permission graph loaded"
    );
    Ok(graph)
}

/// Read a catalog from disk, or fall back to the built-in warehouse catalog.
#[tracing::instrument]
pub fn load_catalog(path: Option<&Path>) -> Result<PermissionCatalog> {
    let catalog = match path {
        Some(path) => {
            let document = fs::read_to_string(path)
                .with_context(|| format!("Failed to read permission catalog {}", path.display()))?;
            PermissionCatalog::from_json(&document)
                .with_context(|| format!("Invalid permission catalog {}", path.display()))?
        }
        None => PermissionCatalog::warehouse_default()
            .context("Built-in permission catalog is invalid")?,
    };

    info!(
        groups = catalog.groups().len(),
        permissions = catalog.permissions().len(),
        "Permission catalog loaded"
    );
    Ok(catalog)
}

/// Load the catalog and graph named by `config` and validate them together.
///
/// In strict mode a validation failure is an error. Otherwise it is logged
/// and the catalog is returned as-is; graph traversals stay bounded even on
/// cyclic graphs.
#[tracing::instrument(skip(config))]
pub fn load_from_config(config: &Config) -> Result<PermissionCatalog> {
    let mut catalog = load_catalog(config.permission_catalog_path.as_deref())?;

    if let Some(path) = config.permission_graph_path.as_deref() {
        catalog = catalog.with_graph(load_graph(path)?);
    }

    match catalog.validate() {
        Ok(()) => {}
        Err(e) if config.strict_graph => {
            return Err(anyhow::Error::new(e).context("Permission catalog failed validation"));
        }
        Err(e) => {
            warn!(error = %e, "Permission catalog failed validation, continuing in lenient mode");
        }
    }

    Ok(catalog)
}
