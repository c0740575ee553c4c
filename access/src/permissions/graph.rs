//! Permission dependency graph.
//!
//! Maps each parent permission to the children it implies. A child is only
//! meaningful while its parent is held, so granting a child pulls in its
//! ancestors and revoking a parent strips its descendants.
//!
//! The graph is built once (from configuration or the built-in catalog) and
//! is immutable afterwards; callers pass it explicitly to the resolver.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use wms_common::{Permission, PermissionSet};

/// Adjacency in one direction (parent to children, or child to parents).
type Adjacency = BTreeMap<Permission, PermissionSet>;

/// Static parent-to-children implication map.
///
/// Serialized as a JSON object: `{ "parent": ["child", ...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionGraph {
    children: Adjacency,
    parents: Adjacency,
}

/// Structural problems found by [`PermissionGraph::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("Permission '{0}' lists itself as a dependency")]
    SelfReference(Permission),

    #[error("Dependency cycle detected: {0}")]
    Cycle(CyclePath),
}

/// Permissions along a dependency cycle; the first entry is repeated at the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CyclePath(pub Vec<Permission>);

impl fmt::Display for CyclePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, permission) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{permission}")?;
        }
        Ok(())
    }
}

impl PermissionGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from `(parent, children)` pairs.
    ///
    /// Repeated parents are merged. A parent with no children is still
    /// recorded as a node.
    pub fn from_edges<I, C>(edges: I) -> Self
    where
        I: IntoIterator<Item = (Permission, C)>,
        C: IntoIterator<Item = Permission>,
    {
        let mut graph = Self::default();
        for (parent, children) in edges {
            graph.children.entry(parent.clone()).or_default();
            for child in children {
                graph
                    .parents
                    .entry(child.clone())
                    .or_default()
                    .insert(parent.clone());
                graph
                    .children
                    .entry(parent.clone())
                    .or_default()
                    .insert(child);
            }
        }
        graph
    }

    /// Permissions directly implied by `permission`.
    pub fn children<'a>(&'a self, permission: &str) -> impl Iterator<Item = &'a Permission> {
        self.children.get(permission).into_iter().flatten()
    }

    /// Permissions that directly imply `permission`.
    pub fn parents<'a>(&'a self, permission: &str) -> impl Iterator<Item = &'a Permission> {
        self.parents.get(permission).into_iter().flatten()
    }

    /// All permissions whose dependency list transitively contains `permission`.
    ///
    /// Unknown permissions have no ancestors.
    #[must_use]
    pub fn ancestors(&self, permission: &str) -> PermissionSet {
        walk(permission, &self.parents)
    }

    /// All permissions transitively implied by `permission`.
    ///
    /// Unknown permissions have no descendants.
    #[must_use]
    pub fn descendants(&self, permission: &str) -> PermissionSet {
        walk(permission, &self.children)
    }

    /// Whether `permission` appears anywhere in the graph.
    #[must_use]
    pub fn contains(&self, permission: &str) -> bool {
        self.children.contains_key(permission) || self.parents.contains_key(permission)
    }

    /// Every permission mentioned by the graph.
    #[must_use]
    pub fn permissions(&self) -> PermissionSet {
        self.children
            .keys()
            .chain(self.parents.keys())
            .cloned()
            .collect()
    }

    /// Parent-to-children pairs in permission order.
    pub fn edges(&self) -> impl Iterator<Item = (&Permission, &PermissionSet)> {
        self.children.iter()
    }

    /// Number of distinct permissions in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.permissions().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of parent-to-child implications.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.children.values().map(BTreeSet::len).sum()
    }

    /// Check that the graph is acyclic.
    ///
    /// Traversals stay bounded on cyclic graphs, but a cycle makes every
    /// member both ancestor and descendant of the others, which is never what
    /// a configuration author intends.
    pub fn validate(&self) -> Result<(), GraphError> {
        for (parent, children) in &self.children {
            if children.contains(parent) {
                return Err(GraphError::SelfReference(parent.clone()));
            }
        }

        let mut finished: BTreeSet<&Permission> = BTreeSet::new();

        for start in self.children.keys() {
            if finished.contains(start) {
                continue;
            }

            let mut path: Vec<&Permission> = Vec::new();
            let mut on_path: BTreeSet<&Permission> = BTreeSet::new();
            let mut stack: Vec<(&Permission, bool)> = vec![(start, false)];

            while let Some((current, exiting)) = stack.pop() {
                if exiting {
                    path.pop();
                    on_path.remove(current);
                    finished.insert(current);
                    continue;
                }

                if on_path.contains(current) {
                    let from = path.iter().position(|p| *p == current).unwrap_or(0);
                    let mut cycle: Vec<Permission> =
                        path[from..].iter().map(|p| (*p).clone()).collect();
                    cycle.push(current.clone());
                    return Err(GraphError::Cycle(CyclePath(cycle)));
                }

                if finished.contains(current) {
                    continue;
                }

                path.push(current);
                on_path.insert(current);
                stack.push((current, true));
                stack.extend(self.children(current.as_str()).map(|child| (child, false)));
            }
        }

        Ok(())
    }
}

/// Iterative depth-first reachability; the visited set bounds it on cycles.
fn walk(start: &str, edges: &Adjacency) -> PermissionSet {
    let mut visited = PermissionSet::new();
    let mut stack: Vec<&Permission> = edges.get(start).into_iter().flatten().collect();

    while let Some(current) = stack.pop() {
        if visited.insert(current.clone()) {
            stack.extend(edges.get(current.as_str()).into_iter().flatten());
        }
    }

    visited
}

impl Serialize for PermissionGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.children.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PermissionGraph {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let document = BTreeMap::<Permission, Vec<Permission>>::deserialize(deserializer)?;
        Ok(Self::from_edges(document))
    }
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

    fn graph(edges: &[(&str, &str)]) -> PermissionGraph {
        PermissionGraph::from_edges(edges.iter().map(|(parent, child)| (p(parent), [p(child)])))
    }

    fn request_graph() -> PermissionGraph {
        graph(&[
            ("requests:view", "requests:create"),
            ("requests:view", "requests:status:approve"),
            ("requests:status:approve", "requests:edit:approved"),
            ("requests:status:approve", "requests:status:ordered"),
            ("requests:status:ordered", "requests:status:received"),
        ])
    }

    #[test]
    fn test_children_and_parents_are_direct() {
        let g = request_graph();

        let children: Vec<_> = g.children("requests:view").map(Permission::as_str).collect();
        assert_eq!(children, ["requests:create", "requests:status:approve"]);

        let parents: Vec<_> = g
            .parents("requests:status:ordered")
            .map(Permission::as_str)
            .collect();
        assert_eq!(parents, ["requests:status:approve"]);
    }

    #[test]
    fn test_ancestors_are_transitive() {
        let g = request_graph();
        assert_eq!(
            g.ancestors("requests:status:received"),
            set(&[
                "requests:status:ordered",
                "requests:status:approve",
                "requests:view"
            ])
        );
        assert!(g.ancestors("requests:view").is_empty());
    }

    #[test]
    fn test_descendants_are_transitive() {
        let g = request_graph();
        assert_eq!(
            g.descendants("requests:status:approve"),
            set(&[
                "requests:edit:approved",
                "requests:status:ordered",
                "requests:status:received"
            ])
        );
        assert!(g.descendants("requests:status:received").is_empty());
    }

    #[test]
    fn test_unknown_permission_is_a_leaf() {
        let g = request_graph();
        assert!(!g.contains("reports:view"));
        assert!(g.ancestors("reports:view").is_empty());
        assert!(g.descendants("reports:view").is_empty());
    }

    #[test]
    fn test_diamond_is_visited_once() {
        let g = graph(&[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")]);
        assert_eq!(g.ancestors("d"), set(&["a", "b", "c"]));
        assert_eq!(g.descendants("a"), set(&["b", "c", "d"]));
        assert!(g.validate().is_ok());
    }

    #[test]
    fn test_traversal_terminates_on_cycle() {
        let g = graph(&[("a", "b"), ("b", "c"), ("c", "a")]);
        assert_eq!(g.descendants("a"), set(&["a", "b", "c"]));
        assert_eq!(g.ancestors("b"), set(&["a", "b", "c"]));
    }

    #[test]
    fn test_validate_reports_cycle_path() {
        let g = graph(&[("a", "b"), ("b", "c"), ("c", "a")]);
        let err = g.validate().unwrap_err();
        match err {
            GraphError::Cycle(CyclePath(path)) => {
                assert_eq!(path.first(), path.last());
                assert_eq!(path.len(), 4);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_reports_self_reference() {
        let g = graph(&[("a", "a")]);
        assert_eq!(g.validate(), Err(GraphError::SelfReference(p("a"))));
    }

    #[test]
    fn test_counts() {
        let g = request_graph();
        assert_eq!(g.edge_count(), 5);
        assert_eq!(g.len(), 6);
        assert!(!g.is_empty());
        assert!(PermissionGraph::new().is_empty());
    }

    #[test]
    fn test_parent_without_children_is_a_node() {
        let g = PermissionGraph::from_edges([(p("settings:view"), Vec::new())]);
        assert!(g.contains("settings:view"));
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn test_json_document() {
        let g: PermissionGraph = serde_json::from_str(
            r#"{"requests:status:approve": ["requests:edit:approved", "requests:status:ordered"]}"#,
        )
        .unwrap();
        assert_eq!(
            g.descendants("requests:status:approve"),
            set(&["requests:edit:approved", "requests:status:ordered"])
        );

        let json = serde_json::to_value(&g).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "requests:status:approve": ["requests:edit:approved", "requests:status:ordered"]
            })
        );
    }

    #[test]
    fn test_json_document_rejects_bad_identifier() {
        let result = serde_json::from_str::<PermissionGraph>(r#"{"Bad Key": []}"#);
        assert!(result.is_err());
    }
}
