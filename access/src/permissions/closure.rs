//! Permission closure resolution.
//!
//! Keeps a role's permission set consistent with the dependency graph when a
//! single permission is toggled. A set is *closed* when every member's
//! parents are also members. All functions here are pure: they take the
//! caller's set by reference and return a new one.

use serde::Serialize;
use wms_common::{Permission, PermissionSet};

use super::graph::PermissionGraph;

/// Grant `permission` together with every ancestor that it depends on.
///
/// Unknown permissions are treated as leaves with no ancestors.
///
/// # Examples
///
/// ```
/// use wms_access::permissions::{grant, PermissionGraph};
/// use wms_common::{Permission, PermissionSet};
///
/// let approve = Permission::parse("requests:status:approve").unwrap();
/// let edit = Permission::parse("requests:edit:approved").unwrap();
/// let graph = PermissionGraph::from_edges([(approve.clone(), [edit.clone()])]);
///
/// let granted = grant(&edit, &PermissionSet::new(), &graph);
/// assert!(granted.contains(&approve));
/// assert!(granted.contains(&edit));
/// ```
#[must_use]
pub fn grant(
    permission: &Permission,
    current: &PermissionSet,
    graph: &PermissionGraph,
) -> PermissionSet {
    let mut next = current.clone();
    next.insert(permission.clone());
    next.extend(graph.ancestors(permission.as_str()));
    next
}

/// Revoke `permission` together with every descendant that depends on it.
#[must_use]
pub fn revoke(
    permission: &Permission,
    current: &PermissionSet,
    graph: &PermissionGraph,
) -> PermissionSet {
    let removed = graph.descendants(permission.as_str());
    current
        .iter()
        .filter(|p| *p != permission && !removed.contains(*p))
        .cloned()
        .collect()
}

/// Checkbox handler: grant when `checked`, revoke otherwise.
#[must_use]
pub fn toggle(
    permission: &Permission,
    checked: bool,
    current: &PermissionSet,
    graph: &PermissionGraph,
) -> PermissionSet {
    if checked {
        grant(permission, current, graph)
    } else {
        revoke(permission, current, graph)
    }
}

/// Smallest closed superset of `current`.
///
/// Used to normalise sets that were saved before a dependency was added to
/// the graph.
#[must_use]
pub fn close(current: &PermissionSet, graph: &PermissionGraph) -> PermissionSet {
    let mut closed = current.clone();
    for permission in current {
        closed.extend(graph.ancestors(permission.as_str()));
    }
    closed
}

/// Whether every member's direct parents are also members.
#[must_use]
pub fn is_closed(current: &PermissionSet, graph: &PermissionGraph) -> bool {
    current.iter().all(|permission| {
        graph
            .parents(permission.as_str())
            .all(|parent| current.contains(parent))
    })
}

/// Added and removed permissions between two sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PermissionChange {
    pub added: PermissionSet,
    pub removed: PermissionSet,
}

impl PermissionChange {
    #[must_use]
    pub fn between(before: &PermissionSet, after: &PermissionSet) -> Self {
        Self {
            added: after.difference(before).cloned().collect(),
            removed: before.difference(after).cloned().collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Change summary from `before` to `after`.
#[must_use]
pub fn diff(before: &PermissionSet, after: &PermissionSet) -> PermissionChange {
    PermissionChange::between(before, after)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(id: &str) -> Permission {
        Permission::parse(id).unwrap()
    }

    fn set(ids: &[&str]) -> PermissionSet {
        ids.iter().map(|id| p(id)).collect()
    }

    /// The approval chain used by the purchase request screens.
    fn approval_graph() -> PermissionGraph {
        PermissionGraph::from_edges([
            (
                p("requests:view"),
                vec![p("requests:create"), p("requests:status:approve")],
            ),
            (
                p("requests:status:approve"),
                vec![p("requests:edit:approved"), p("requests:status:ordered")],
            ),
        ])
    }

    #[test]
    fn test_grant_root_adds_only_itself() {
        let graph = PermissionGraph::from_edges([(
            p("requests:status:approve"),
            vec![p("requests:edit:approved"), p("requests:status:ordered")],
        )]);

        let granted = grant(&p("requests:status:approve"), &PermissionSet::new(), &graph);
        assert_eq!(granted, set(&["requests:status:approve"]));
    }

    #[test]
    fn test_revoke_root_strips_children() {
        let graph = PermissionGraph::from_edges([(
            p("requests:status:approve"),
            vec![p("requests:edit:approved"), p("requests:status:ordered")],
        )]);
        let current = set(&[
            "requests:status:approve",
            "requests:edit:approved",
            "requests:status:ordered",
        ]);

        let revoked = revoke(&p("requests:status:approve"), &current, &graph);
        assert!(revoked.is_empty());
    }

    #[test]
    fn test_grant_leaf_pulls_in_ancestors() {
        let graph = approval_graph();
        let granted = grant(&p("requests:edit:approved"), &PermissionSet::new(), &graph);
        assert_eq!(
            granted,
            set(&[
                "requests:edit:approved",
                "requests:status:approve",
                "requests:view"
            ])
        );
        assert!(is_closed(&granted, &graph));
    }

    #[test]
    fn test_revoke_keeps_unrelated_permissions() {
        let graph = approval_graph();
        let current = set(&[
            "requests:view",
            "requests:create",
            "requests:status:approve",
            "requests:edit:approved",
            "reports:view",
        ]);

        let revoked = revoke(&p("requests:status:approve"), &current, &graph);
        assert_eq!(
            revoked,
            set(&["requests:view", "requests:create", "reports:view"])
        );
    }

    #[test]
    fn test_unknown_permission_is_leaf() {
        let graph = approval_graph();
        let current = set(&["requests:view"]);

        let granted = grant(&p("notifications:manage"), &current, &graph);
        assert_eq!(granted, set(&["requests:view", "notifications:manage"]));

        let revoked = revoke(&p("notifications:manage"), &granted, &graph);
        assert_eq!(revoked, current);
    }

    #[test]
    fn test_toggle_dispatches() {
        let graph = approval_graph();
        let on = toggle(&p("requests:create"), true, &PermissionSet::new(), &graph);
        assert_eq!(on, set(&["requests:create", "requests:view"]));

        let off = toggle(&p("requests:view"), false, &on, &graph);
        assert!(off.is_empty());
    }

    #[test]
    fn test_grant_is_idempotent() {
        let graph = approval_graph();
        let once = grant(&p("requests:status:ordered"), &set(&["reports:view"]), &graph);
        let twice = grant(&p("requests:status:ordered"), &once, &graph);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_revoke_after_grant_may_differ_from_original() {
        let graph = approval_graph();
        let original = set(&["requests:view", "requests:create"]);

        let granted = grant(&p("requests:view"), &original, &graph);
        let revoked = revoke(&p("requests:view"), &granted, &graph);

        assert_ne!(revoked, original);
        assert!(revoked.is_empty());
    }

    #[test]
    fn test_close_and_is_closed() {
        let graph = approval_graph();
        let loose = set(&["requests:status:ordered", "reports:view"]);
        assert!(!is_closed(&loose, &graph));

        let closed = close(&loose, &graph);
        assert!(is_closed(&closed, &graph));
        assert_eq!(
            closed,
            set(&[
                "requests:status:ordered",
                "requests:status:approve",
                "requests:view",
                "reports:view"
            ])
        );
        assert_eq!(close(&closed, &graph), closed);
    }

    #[test]
    fn test_diff() {
        let before = set(&["requests:view", "requests:create"]);
        let after = set(&["requests:view", "reports:view"]);

        let change = diff(&before, &after);
        assert_eq!(change.added, set(&["reports:view"]));
        assert_eq!(change.removed, set(&["requests:create"]));
        assert!(!change.is_empty());
        assert!(diff(&after, &after).is_empty());
    }
}
