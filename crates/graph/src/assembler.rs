use crate::types::{GraphEdge, GraphModel, GraphNode};
use std::collections::HashSet;

/// Working set of candidate nodes and edges.
///
/// Keeps insertion order and rejects a second element with an id already
/// present, so node ids and edge ids stay unique through every stage.
#[derive(Debug, Clone, Default)]
pub struct ElementSet {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    node_ids: HashSet<String>,
    edge_ids: HashSet<String>,
}

impl ElementSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node; returns `false` (and keeps the first one) on a duplicate id
    pub fn insert_node(&mut self, node: GraphNode) -> bool {
        if !self.node_ids.insert(node.id.clone()) {
            return false;
        }
        self.nodes.push(node);
        true
    }

    /// Add an edge; returns `false` (and keeps the first one) on a duplicate id
    pub fn insert_edge(&mut self, edge: GraphEdge) -> bool {
        if !self.edge_ids.insert(edge.id.clone()) {
            log::debug!("Skipping duplicate edge id {}", edge.id);
            return false;
        }
        self.edges.push(edge);
        true
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_ids.contains(id)
    }

    pub fn contains_edge(&self, id: &str) -> bool {
        self.edge_ids.contains(id)
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// True when both endpoints of `edge` are nodes of this set
    pub fn is_connected(&self, edge: &GraphEdge) -> bool {
        self.contains_node(&edge.source) && self.contains_node(&edge.target)
    }

    pub fn retain_nodes(&mut self, mut keep: impl FnMut(&GraphNode) -> bool) {
        let node_ids = &mut self.node_ids;
        self.nodes.retain(|node| {
            let kept = keep(node);
            if !kept {
                node_ids.remove(&node.id);
            }
            kept
        });
    }

    pub fn retain_edges(&mut self, mut keep: impl FnMut(&GraphEdge) -> bool) {
        let edge_ids = &mut self.edge_ids;
        self.edges.retain(|edge| {
            let kept = keep(edge);
            if !kept {
                edge_ids.remove(&edge.id);
            }
            kept
        });
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

/// Final merge of the resolved element set into a [`GraphModel`]
pub struct GraphAssembler;

impl GraphAssembler {
    /// Nodes first, then edges, both in insertion order
    pub fn assemble(set: ElementSet) -> GraphModel {
        let ElementSet { nodes, edges, .. } = set;
        log::debug!(
            "Assembled graph model: {} nodes, {} edges",
            nodes.len(),
            edges.len()
        );
        GraphModel { nodes, edges }
    }
}
