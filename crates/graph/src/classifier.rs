use crate::error::Result;
use crate::types::{Bundle, StixObject};
use serde_json::Value;
use std::collections::HashMap;

/// Objects by id
pub type ObjectIndex<'a> = HashMap<&'a str, &'a StixObject>;

/// Bundle objects split by role
#[derive(Debug, Default)]
pub struct Classified<'a> {
    /// Everything that is not a relationship object (SDOs, SCOs, markings, ...)
    pub entities: Vec<&'a StixObject>,

    /// Relationship objects, in bundle order
    pub relationships: Vec<&'a StixObject>,

    /// Entities by id (first occurrence wins)
    pub nodes_by_id: ObjectIndex<'a>,

    /// Relationship objects by id (first occurrence wins)
    pub edges_by_id: ObjectIndex<'a>,
}

impl Classified<'_> {
    pub fn len(&self) -> usize {
        self.entities.len() + self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Objects sharing an id with an earlier object of the same role
    pub fn duplicate_count(&self) -> usize {
        self.len() - self.nodes_by_id.len() - self.edges_by_id.len()
    }
}

/// Split a bundle's objects into entities and relationships, keeping order
pub fn classify(bundle: &Bundle) -> Classified<'_> {
    let (relationships, entities): (Vec<&StixObject>, Vec<&StixObject>) =
        bundle.objects.iter().partition(|obj| obj.is_relationship());
    let nodes_by_id = index_by_id(&entities);
    let edges_by_id = index_by_id(&relationships);
    Classified {
        entities,
        relationships,
        nodes_by_id,
        edges_by_id,
    }
}

fn index_by_id<'a>(objects: &[&'a StixObject]) -> ObjectIndex<'a> {
    let mut index = HashMap::with_capacity(objects.len());
    for &object in objects {
        index.entry(object.id.as_str()).or_insert(object);
    }
    index
}

/// Validate a raw bundle document; see [`Bundle::from_value`]
pub fn parse_bundle(value: Value) -> Result<Bundle> {
    Bundle::from_value(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;
    use serde_json::json;

    #[test]
    fn splits_relationships_from_entities() {
        let bundle = parse_bundle(json!({
            "objects": [
                {"id": "e1", "type": "threat-actor"},
                {"id": "r1", "type": "relationship", "source_ref": "e1", "target_ref": "e2"},
                {"id": "e2", "type": "malware"}
            ]
        }))
        .unwrap();

        let classified = classify(&bundle);
        let entities: Vec<_> = classified.entities.iter().map(|o| o.id.as_str()).collect();
        let relationships: Vec<_> = classified
            .relationships
            .iter()
            .map(|o| o.id.as_str())
            .collect();
        assert_eq!(entities, vec!["e1", "e2"]);
        assert_eq!(relationships, vec!["r1"]);
        assert_eq!(classified.len(), 3);
    }

    #[test]
    fn indexes_keep_first_object_per_id() {
        let bundle = parse_bundle(json!({
            "objects": [
                {"id": "e1", "type": "malware", "name": "first"},
                {"id": "e1", "type": "malware", "name": "second"},
                {"id": "r1", "type": "relationship", "source_ref": "e1", "target_ref": "e1"}
            ]
        }))
        .unwrap();

        let classified = classify(&bundle);
        assert_eq!(classified.nodes_by_id["e1"].name(), Some("first"));
        assert!(classified.edges_by_id.contains_key("r1"));
        assert!(!classified.nodes_by_id.contains_key("r1"));
        assert_eq!(classified.duplicate_count(), 1);
    }

    #[test]
    fn missing_objects_fails() {
        assert!(matches!(
            parse_bundle(json!({"type": "bundle"})),
            Err(GraphError::InvalidBundle(_))
        ));
    }

    #[test]
    fn empty_bundle_classifies_to_nothing() {
        let bundle = parse_bundle(json!({"objects": []})).unwrap();
        assert!(classify(&bundle).is_empty());
    }
}
