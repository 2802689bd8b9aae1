use crate::assembler::ElementSet;
use crate::classifier::ObjectIndex;
use crate::refs::synthesized_edge_id;
use crate::style::StyleTable;
use crate::types::{EdgeKind, GraphEdge, GraphNode, StixObject, IDREF_TYPE, RELATIONSHIP_TYPE};
use std::collections::{HashMap, HashSet};

/// What to do with edges pointing at ids that have no node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdrefPolicy {
    /// Remove such edges
    #[default]
    Drop,

    /// Promote referenced relationships to nodes, add placeholders for the rest
    Resolve,
}

impl IdrefPolicy {
    pub fn from_show_idrefs(show_idrefs: bool) -> Self {
        if show_idrefs {
            Self::Resolve
        } else {
            Self::Drop
        }
    }
}

/// Changes computed by one resolution sweep, applied in a single step
#[derive(Debug, Default)]
struct ResolutionPlan {
    new_nodes: Vec<GraphNode>,
    new_edges: Vec<GraphEdge>,
    removed_edges: HashSet<String>,
    resolved: HashSet<String>,
}

/// Handles edges whose source or target is not a node of the set
pub struct DanglingResolver<'a> {
    styles: &'a StyleTable,

    /// Relationship objects of the bundle by id
    relationships: &'a ObjectIndex<'a>,
}

impl<'a> DanglingResolver<'a> {
    /// `relationships` indexes the relationship objects the set's
    /// relationship edges were made from.
    pub fn new(styles: &'a StyleTable, relationships: &'a ObjectIndex<'a>) -> Self {
        Self {
            styles,
            relationships,
        }
    }

    pub fn resolve(&self, set: &mut ElementSet, policy: IdrefPolicy) {
        let dangling: Vec<GraphEdge> = set
            .edges()
            .iter()
            .filter(|edge| !set.is_connected(edge))
            .cloned()
            .collect();
        if dangling.is_empty() {
            return;
        }

        match policy {
            IdrefPolicy::Drop => {
                let ids: HashSet<&str> = dangling.iter().map(|e| e.id.as_str()).collect();
                set.retain_edges(|edge| !ids.contains(edge.id.as_str()));
                log::debug!("Dropped {} dangling edges", ids.len());
            }
            IdrefPolicy::Resolve => {
                let plan = self.plan(set, &dangling);
                log::debug!(
                    "Resolved {} dangling edges: {} new nodes, {} promoted relationships",
                    dangling.len(),
                    plan.new_nodes.len(),
                    plan.removed_edges.len()
                );
                apply(set, plan);
            }
        }
    }

    /// Single pass over the dangling edges. Edges created here are not
    /// scanned again.
    ///
    /// A missing id is promoted when it names a relationship object whose
    /// edge is still in the set, whatever the id looks like.
    fn plan(&self, set: &ElementSet, dangling: &[GraphEdge]) -> ResolutionPlan {
        let promotable: HashMap<&str, &GraphEdge> = set
            .edges()
            .iter()
            .filter(|edge| {
                edge.kind == EdgeKind::Relationship
                    && self.relationships.contains_key(edge.id.as_str())
            })
            .map(|edge| (edge.id.as_str(), edge))
            .collect();

        let mut plan = ResolutionPlan::default();
        for edge in dangling {
            for endpoint in [&edge.source, &edge.target] {
                if set.contains_node(endpoint) || !plan.resolved.insert(endpoint.clone()) {
                    continue;
                }

                match promotable.get(endpoint.as_str()) {
                    Some(relationship) => {
                        let (node, edges) = self.promote(relationship);
                        plan.removed_edges.insert(relationship.id.clone());
                        plan.new_nodes.push(node);
                        plan.new_edges.extend(edges);
                    }
                    None => plan.new_nodes.push(self.placeholder(endpoint, edge)),
                }
            }
        }
        plan
    }

    /// Turn a relationship edge into a node plus the two edges around it
    pub fn promote(&self, relationship: &GraphEdge) -> (GraphNode, [GraphEdge; 2]) {
        let raw = relationship
            .raw
            .clone()
            .unwrap_or_else(|| StixObject::new(relationship.id.clone(), RELATIONSHIP_TYPE));
        let label = raw
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| relationship.id.clone());

        let node = GraphNode {
            id: relationship.id.clone(),
            node_type: RELATIONSHIP_TYPE.to_string(),
            label: Some(label),
            style: self.styles.style_for_type(RELATIONSHIP_TYPE),
            raw: raw.clone(),
        };

        let incoming = GraphEdge {
            id: synthesized_edge_id(&relationship.source, &node.id),
            source: relationship.source.clone(),
            target: node.id.clone(),
            label: relationship.label.clone(),
            kind: EdgeKind::Promoted,
            raw: Some(raw.clone()),
        };
        let outgoing = GraphEdge {
            id: synthesized_edge_id(&node.id, &relationship.target),
            source: node.id.clone(),
            target: relationship.target.clone(),
            label: relationship.label.clone(),
            kind: EdgeKind::Promoted,
            raw: Some(raw),
        };

        (node, [incoming, outgoing])
    }

    /// Node standing in for an object that is not in the graph
    pub fn placeholder(&self, missing_id: &str, referenced_by: &GraphEdge) -> GraphNode {
        let label = format!("IDREF {missing_id}");
        GraphNode {
            id: missing_id.to_string(),
            node_type: IDREF_TYPE.to_string(),
            label: Some(label.clone()),
            style: self.styles.style_for_type(IDREF_TYPE),
            raw: StixObject::new(missing_id, IDREF_TYPE)
                .with_field("name", label)
                .with_field("original_relationship", referenced_by.id.clone()),
        }
    }
}

fn apply(set: &mut ElementSet, plan: ResolutionPlan) {
    let ResolutionPlan {
        new_nodes,
        new_edges,
        removed_edges,
        ..
    } = plan;

    set.retain_edges(|edge| !removed_edges.contains(&edge.id));
    for node in new_nodes {
        set.insert_node(node);
    }
    for edge in new_edges {
        set.insert_edge(edge);
    }
}
