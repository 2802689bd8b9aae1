use crate::error::{GraphError, Result};
use crate::graph::Neighbourhood;
use crate::types::{GraphModel, StixObject};
use serde::Serialize;
use serde_json::Value;

/// What the viewer shows when a node is clicked
#[derive(Debug, Clone, Serialize)]
pub struct NodeDetails {
    pub id: String,
    #[serde(rename = "type")]
    pub object_type: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub labels: Vec<String>,
    pub external_references: Vec<String>,
    pub created: Option<String>,
    pub icon: Option<String>,
    pub neighbours: Neighbourhood,
    /// The object as indented JSON
    pub json: String,
}

impl NodeDetails {
    pub fn for_node(model: &GraphModel, id: &str) -> Result<Self> {
        let node = model
            .node(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;
        let object = &node.raw;

        Ok(Self {
            id: node.id.clone(),
            object_type: object.object_type.clone(),
            title: title(object),
            description: object.str_field("description").map(str::to_string),
            labels: string_list(object.get("labels")),
            external_references: object
                .get("external_references")
                .and_then(Value::as_array)
                .map(|refs| refs.iter().map(format_external_reference).collect())
                .unwrap_or_default(),
            created: object.str_field("created").map(str::to_string),
            icon: node.style.image.clone(),
            neighbours: model.neighbourhood(id)?,
            json: to_json_pretty(object)?,
        })
    }
}

/// `name`, or for markings without one, `tlp: <level>` / the definition type
fn title(object: &StixObject) -> Option<String> {
    if let Some(name) = object.name() {
        return Some(name.to_string());
    }
    match object.str_field("definition_type") {
        Some("tlp") => Some(format!("tlp: {}", object.tlp_level().unwrap_or_default())),
        Some(other) => Some(other.to_string()),
        None => None,
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// `"<description>: <url or source name>"`
fn format_external_reference(reference: &Value) -> String {
    let field = |name: &str| reference.get(name).and_then(Value::as_str);
    let target = field("url").or_else(|| field("source_name")).unwrap_or_default();
    match field("description") {
        Some(description) => format!("{description}: {target}"),
        None => target.to_string(),
    }
}

/// JSON with four-space indentation
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    // serde_json only writes valid UTF-8
    Ok(String::from_utf8_lossy(&out).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{BuildOptions, GraphBuilder};
    use crate::filter::VisibilityConfig;
    use serde_json::json;

    fn model() -> GraphModel {
        GraphBuilder::default()
            .build_value(
                json!({"objects": [
                    {"id": "malware--1", "type": "malware", "name": "Poison Ivy",
                     "description": "RAT", "labels": ["remote-access-trojan"],
                     "created": "2017-01-01T00:00:00Z",
                     "external_references": [
                        {"source_name": "capec", "description": "vendor", "url": "https://example.org"},
                        {"source_name": "mitre"}
                     ],
                     "object_marking_refs": ["marking-definition--1"]},
                    {"id": "marking-definition--1", "type": "marking-definition",
                     "definition_type": "tlp", "definition": {"tlp": "green"}}
                ]}),
                &BuildOptions::new(VisibilityConfig::new().show_markings(true), false),
            )
            .unwrap()
    }

    #[test]
    fn details_collect_sidebar_fields() {
        let details = NodeDetails::for_node(&model(), "malware--1").unwrap();
        assert_eq!(details.title.as_deref(), Some("Poison Ivy"));
        assert_eq!(details.description.as_deref(), Some("RAT"));
        assert_eq!(details.labels, vec!["remote-access-trojan"]);
        assert_eq!(
            details.external_references,
            vec!["vendor: https://example.org", "mitre"]
        );
        assert!(details.neighbours.outgoing.contains("marking-definition--1"));
        assert!(details.json.contains("\n    \"id\": \"malware--1\""));
    }

    #[test]
    fn tlp_marking_title() {
        let details = NodeDetails::for_node(&model(), "marking-definition--1").unwrap();
        assert_eq!(details.title.as_deref(), Some("tlp: green"));
        assert!(details.neighbours.incoming.contains("malware--1"));
    }

    #[test]
    fn unknown_node_is_an_error() {
        assert!(matches!(
            NodeDetails::for_node(&model(), "nope"),
            Err(GraphError::NodeNotFound(_))
        ));
    }
}
