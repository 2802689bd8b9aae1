use crate::assembler::{ElementSet, GraphAssembler};
use crate::classifier::classify;
use crate::error::Result;
use crate::filter::VisibilityConfig;
use crate::refs::reference_edges;
use crate::resolver::{DanglingResolver, IdrefPolicy};
use crate::style::StyleTable;
use crate::types::*;
use serde_json::Value;

/// Per-build policy: visibility plus dangling-reference handling
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
    pub visibility: VisibilityConfig,
    pub idrefs: IdrefPolicy,
}

impl BuildOptions {
    pub fn new(visibility: VisibilityConfig, show_idrefs: bool) -> Self {
        Self {
            visibility,
            idrefs: IdrefPolicy::from_show_idrefs(show_idrefs),
        }
    }
}

/// Builds a [`GraphModel`] from a bundle
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    styles: StyleTable,
}

impl GraphBuilder {
    pub fn new(styles: StyleTable) -> Self {
        Self { styles }
    }

    pub fn styles(&self) -> &StyleTable {
        &self.styles
    }

    /// Validate a raw bundle document and build it
    pub fn build_value(&self, bundle: Value, options: &BuildOptions) -> Result<GraphModel> {
        let bundle = Bundle::from_value(bundle)?;
        Ok(self.build(&bundle, options))
    }

    /// Build the graph model for a bundle.
    ///
    /// Stages: classify, create nodes and relationship edges, derive
    /// reference edges, filter, resolve dangling edges, assemble.
    pub fn build(&self, bundle: &Bundle, options: &BuildOptions) -> GraphModel {
        let classified = classify(bundle);
        log::debug!(
            "Classified {} entities and {} relationships ({} duplicate ids)",
            classified.nodes_by_id.len(),
            classified.edges_by_id.len(),
            classified.duplicate_count()
        );
        let mut set = ElementSet::new();

        // Phase 1: one node per entity
        for entity in &classified.entities {
            if !set.insert_node(self.make_node(entity)) {
                log::warn!("Duplicate object id {} in bundle, keeping the first", entity.id);
            }
        }

        // Phase 2: one edge per relationship
        for relationship in &classified.relationships {
            match make_edge(relationship) {
                Some(edge) => {
                    if !set.insert_edge(edge) {
                        log::warn!(
                            "Duplicate relationship id {} in bundle, keeping the first",
                            relationship.id
                        );
                    }
                }
                None => log::warn!(
                    "Relationship {} lacks source_ref or target_ref, skipping",
                    relationship.id
                ),
            }
        }

        // Phase 3: edges for `_ref` / `_refs` fields of entities
        for entity in &classified.entities {
            for edge in reference_edges(entity) {
                set.insert_edge(edge);
            }
        }

        options.visibility.apply(&mut set);
        DanglingResolver::new(&self.styles, &classified.edges_by_id)
            .resolve(&mut set, options.idrefs);

        let model = GraphAssembler::assemble(set);
        log::info!(
            "Built STIX graph{}: {} nodes, {} edges",
            bundle
                .id
                .as_deref()
                .map(|id| format!(" for {id}"))
                .unwrap_or_default(),
            model.node_count(),
            model.edge_count()
        );
        model
    }

    /// Node for a non-relationship object
    pub fn make_node(&self, entity: &StixObject) -> GraphNode {
        GraphNode {
            id: entity.id.clone(),
            node_type: entity.object_type.clone(),
            label: entity.name().map(str::to_string),
            style: self.styles.style_for(entity),
            raw: entity.clone(),
        }
    }
}

/// Edge for a relationship object; `None` when an endpoint is missing
pub fn make_edge(relationship: &StixObject) -> Option<GraphEdge> {
    let source = relationship.str_field("source_ref")?;
    let target = relationship.str_field("target_ref")?;
    Some(GraphEdge {
        id: relationship.id.clone(),
        source: source.to_string(),
        target: target.to_string(),
        label: relationship
            .str_field("relationship_type")
            .map(str::to_string),
        kind: EdgeKind::Relationship,
        raw: Some(relationship.clone()),
    })
}
