//! Embedded references: fields named `*_ref` hold one object id, fields named
//! `*_refs` hold a list of them (`created_by_ref`, `object_marking_refs`,
//! `sighting_of_ref`, ...).

use crate::types::{EdgeKind, GraphEdge, StixObject};
use serde_json::Value;

/// True when a field name denotes an embedded reference
pub fn is_reference_field(name: &str) -> bool {
    name.ends_with("_ref") || name.ends_with("_refs")
}

/// Deterministic id of an edge synthesized between two object ids
pub fn synthesized_edge_id(source: &str, target: &str) -> String {
    format!("rel-{source}-{target}")
}

/// All `(field, referenced id)` pairs found in an object's own fields
pub fn references(object: &StixObject) -> Vec<(&str, &str)> {
    let mut refs = Vec::new();
    for (field, value) in &object.fields {
        if !is_reference_field(field) {
            continue;
        }
        match value {
            Value::String(id) => refs.push((field.as_str(), id.as_str())),
            Value::Array(items) => {
                refs.extend(items.iter().filter_map(Value::as_str).map(|id| (field.as_str(), id)))
            }
            _ => log::debug!("Ignoring non-id value in {}.{field}", object.id),
        }
    }
    refs
}

/// One edge per embedded reference of `entity`
pub fn reference_edges(entity: &StixObject) -> Vec<GraphEdge> {
    references(entity)
        .into_iter()
        .map(|(field, target)| GraphEdge {
            id: synthesized_edge_id(&entity.id, target),
            source: entity.id.clone(),
            target: target.to_string(),
            label: Some(field.to_string()),
            kind: EdgeKind::Reference,
            raw: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn suffix_predicate() {
        assert!(is_reference_field("created_by_ref"));
        assert!(is_reference_field("object_marking_refs"));
        assert!(!is_reference_field("reference"));
        assert!(!is_reference_field("refs_count"));
        assert!(!is_reference_field("name"));
    }

    #[test]
    fn single_and_list_references_become_edges() {
        let report = StixObject::new("report--1", "report")
            .with_field("created_by_ref", "identity--1")
            .with_field("object_refs", json!(["malware--1", "indicator--1", 7]))
            .with_field("name", "Quarterly");

        let mut edges = reference_edges(&report);
        edges.sort_by(|a, b| a.id.cmp(&b.id));

        let ids: Vec<_> = edges.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "rel-report--1-identity--1",
                "rel-report--1-indicator--1",
                "rel-report--1-malware--1"
            ]
        );
        let created_by = &edges[0];
        assert_eq!(created_by.source, "report--1");
        assert_eq!(created_by.target, "identity--1");
        assert_eq!(created_by.label.as_deref(), Some("created_by_ref"));
        assert_eq!(created_by.kind, EdgeKind::Reference);
    }

    #[test]
    fn object_without_references_yields_nothing() {
        let actor = StixObject::new("threat-actor--1", "threat-actor").with_field("name", "X");
        assert!(reference_edges(&actor).is_empty());
    }
}
