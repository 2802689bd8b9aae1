use crate::error::{GraphError, Result};
use crate::types::{GraphEdge, GraphModel, GraphNode};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Borrowed `petgraph` view over a [`GraphModel`]
pub struct ModelGraph<'a> {
    pub graph: DiGraph<&'a GraphNode, &'a GraphEdge>,
    index: HashMap<&'a str, NodeIndex>,
}

/// Objects directly connected to a node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Neighbourhood {
    /// Targets of outgoing edges
    pub outgoing: BTreeSet<String>,

    /// Sources of incoming edges
    pub incoming: BTreeSet<String>,
}

impl Neighbourhood {
    pub fn all(&self) -> BTreeSet<&str> {
        self.outgoing
            .iter()
            .chain(self.incoming.iter())
            .map(String::as_str)
            .collect()
    }
}

impl<'a> ModelGraph<'a> {
    /// Edges whose endpoints are not nodes of the model are left out
    pub fn new(model: &'a GraphModel) -> Self {
        let mut graph = DiGraph::with_capacity(model.node_count(), model.edge_count());
        let mut index = HashMap::with_capacity(model.node_count());

        for node in &model.nodes {
            let idx = graph.add_node(node);
            index.insert(node.id.as_str(), idx);
        }

        for edge in &model.edges {
            match (index.get(edge.source.as_str()), index.get(edge.target.as_str())) {
                (Some(&from), Some(&to)) => {
                    graph.add_edge(from, to, edge);
                }
                _ => log::debug!("Edge {} has no node at one end", edge.id),
            }
        }

        Self { graph, index }
    }

    pub fn find_node(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub fn neighbourhood(&self, id: &str) -> Result<Neighbourhood> {
        let idx = self
            .find_node(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;

        let collect = |direction: Direction| {
            self.graph
                .edges_directed(idx, direction)
                .map(|e| {
                    let other = match direction {
                        Direction::Outgoing => e.target(),
                        Direction::Incoming => e.source(),
                    };
                    self.graph[other].id.clone()
                })
                .collect::<BTreeSet<_>>()
        };

        Ok(Neighbourhood {
            outgoing: collect(Direction::Outgoing),
            incoming: collect(Direction::Incoming),
        })
    }

    /// Nodes with no edges at all
    pub fn isolated(&self) -> Vec<&'a str> {
        self.graph
            .node_indices()
            .filter(|&idx| self.graph.neighbors_undirected(idx).next().is_none())
            .map(|idx| {
                let node: &'a GraphNode = self.graph[idx];
                node.id.as_str()
            })
            .collect()
    }
}

impl GraphModel {
    pub fn as_petgraph(&self) -> ModelGraph<'_> {
        ModelGraph::new(self)
    }

    /// Ids directly connected to `id`, in either direction
    pub fn neighbourhood(&self, id: &str) -> Result<Neighbourhood> {
        self.as_petgraph().neighbourhood(id)
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::{BuildOptions, GraphBuilder};
    use serde_json::json;

    #[test]
    fn neighbourhood_splits_directions() {
        let model = GraphBuilder::default()
            .build_value(
                json!({"objects": [
                    {"id": "a", "type": "threat-actor"},
                    {"id": "b", "type": "malware"},
                    {"id": "c", "type": "tool"},
                    {"id": "d", "type": "identity"},
                    {"id": "r1", "type": "relationship", "source_ref": "a", "target_ref": "b"},
                    {"id": "r2", "type": "relationship", "source_ref": "c", "target_ref": "a"}
                ]}),
                &BuildOptions::default(),
            )
            .unwrap();

        let hood = model.neighbourhood("a").unwrap();
        assert_eq!(hood.outgoing.iter().collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(hood.incoming.iter().collect::<Vec<_>>(), vec!["c"]);
        assert_eq!(hood.all().into_iter().collect::<Vec<_>>(), vec!["b", "c"]);

        assert_eq!(model.as_petgraph().isolated(), vec!["d"]);
        assert!(model.neighbourhood("zzz").is_err());
    }
}
