use crate::assembler::ElementSet;
use crate::types::MARKING_DEFINITION_TYPE;
use std::collections::HashSet;

/// Which objects may appear in the rendered graph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilityConfig {
    /// Allow-list; empty means every object is allowed
    pub highlighted: HashSet<String>,

    /// Deny-list; ignored when empty
    pub hidden: HashSet<String>,

    /// Keep `marking-definition` nodes
    pub show_markings: bool,
}

impl VisibilityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn highlight<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.highlighted.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn hide<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hidden.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn show_markings(mut self, show: bool) -> Self {
        self.show_markings = show;
        self
    }

    /// Passes the allow-list and deny-list
    pub fn allows(&self, id: &str) -> bool {
        (self.highlighted.is_empty() || self.highlighted.contains(id))
            && !self.hidden.contains(id)
    }

    /// Drop nodes and edges this configuration does not allow.
    ///
    /// Edges are only checked against the two id lists. An edge whose
    /// endpoint was removed for another reason (a suppressed marking, a
    /// missing object) stays in the set as a dangling edge.
    pub fn apply(&self, set: &mut ElementSet) {
        let before = (set.node_count(), set.edge_count());

        set.retain_nodes(|node| {
            self.allows(&node.id)
                && (self.show_markings || node.node_type != MARKING_DEFINITION_TYPE)
        });
        set.retain_edges(|edge| self.allows(&edge.source) && self.allows(&edge.target));

        log::debug!(
            "Visibility filter: nodes {} -> {}, edges {} -> {}",
            before.0,
            set.node_count(),
            before.1,
            set.edge_count()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EdgeKind, GraphEdge, GraphNode, NodeShape, NodeStyle, StixObject};

    fn set_with(nodes: &[(&str, &str)], edges: &[(&str, &str, &str)]) -> ElementSet {
        let mut set = ElementSet::new();
        for &(id, ty) in nodes {
            set.insert_node(GraphNode {
                id: id.to_string(),
                node_type: ty.to_string(),
                label: None,
                style: NodeStyle::new("#000", NodeShape::Ellipse),
                raw: StixObject::new(id, ty),
            });
        }
        for &(id, source, target) in edges {
            set.insert_edge(GraphEdge {
                id: id.to_string(),
                source: source.to_string(),
                target: target.to_string(),
                label: None,
                kind: EdgeKind::Relationship,
                raw: None,
            });
        }
        set
    }

    fn node_ids(set: &ElementSet) -> Vec<&str> {
        set.nodes().iter().map(|n| n.id.as_str()).collect()
    }

    fn edge_ids(set: &ElementSet) -> Vec<&str> {
        set.edges().iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn empty_config_keeps_everything_but_markings() {
        let mut set = set_with(
            &[("a", "malware"), ("m", "marking-definition")],
            &[("r", "a", "m")],
        );
        VisibilityConfig::new().apply(&mut set);
        assert_eq!(node_ids(&set), vec!["a"]);
        // marking edge is left dangling for the resolver
        assert_eq!(edge_ids(&set), vec!["r"]);
    }

    #[test]
    fn allow_list_drops_other_nodes_and_their_edges() {
        let mut set = set_with(
            &[("a", "malware"), ("b", "tool"), ("c", "tool")],
            &[("ab", "a", "b"), ("ac", "a", "c")],
        );
        VisibilityConfig::new().highlight(["a", "b"]).apply(&mut set);
        assert_eq!(node_ids(&set), vec!["a", "b"]);
        assert_eq!(edge_ids(&set), vec!["ab"]);
    }

    #[test]
    fn deny_list_checks_both_endpoints() {
        let mut set = set_with(
            &[("a", "malware"), ("b", "tool"), ("c", "tool")],
            &[("ab", "a", "b"), ("ca", "c", "a"), ("bc", "b", "c")],
        );
        VisibilityConfig::new().hide(["a"]).apply(&mut set);
        assert_eq!(node_ids(&set), vec!["b", "c"]);
        assert_eq!(edge_ids(&set), vec!["bc"]);
    }

    #[test]
    fn lists_combine() {
        let mut set = set_with(&[("a", "malware"), ("b", "tool"), ("c", "tool")], &[]);
        VisibilityConfig::new()
            .highlight(["a", "b"])
            .hide(["b"])
            .apply(&mut set);
        assert_eq!(node_ids(&set), vec!["a"]);
    }

    #[test]
    fn markings_shown_on_request() {
        let mut set = set_with(&[("m", "marking-definition")], &[]);
        VisibilityConfig::new().show_markings(true).apply(&mut set);
        assert_eq!(node_ids(&set), vec!["m"]);
    }
}
