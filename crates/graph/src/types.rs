use crate::error::{GraphError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Type name of STIX relationship objects
pub const RELATIONSHIP_TYPE: &str = "relationship";

/// Type name of marking definitions (TLP and statement markings)
pub const MARKING_DEFINITION_TYPE: &str = "marking-definition";

/// Type given to placeholder nodes standing in for missing objects
pub const IDREF_TYPE: &str = "idref";

/// A single STIX object: `id`, `type` and every other field as raw JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StixObject {
    pub id: String,

    #[serde(rename = "type")]
    pub object_type: String,

    /// Type-specific fields (everything except `id` and `type`)
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl StixObject {
    pub fn new(id: impl Into<String>, object_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            object_type: object_type.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style field setter
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Parse the object found at `index` of a bundle's `objects`
    pub fn from_value(index: usize, value: Value) -> Result<Self> {
        let Value::Object(mut fields) = value else {
            return Err(GraphError::InvalidObject {
                index,
                reason: "not a JSON object".to_string(),
            });
        };

        let id = take_string(&mut fields, "id").ok_or_else(|| GraphError::InvalidObject {
            index,
            reason: "missing string `id`".to_string(),
        })?;
        let object_type =
            take_string(&mut fields, "type").ok_or_else(|| GraphError::InvalidObject {
                index,
                reason: format!("object {id} has no string `type`"),
            })?;

        Ok(Self {
            id,
            object_type,
            fields,
        })
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    pub fn is_relationship(&self) -> bool {
        self.object_type == RELATIONSHIP_TYPE
    }

    pub fn is_marking_definition(&self) -> bool {
        self.object_type == MARKING_DEFINITION_TYPE
    }

    /// `definition.tlp` of a marking definition
    pub fn tlp_level(&self) -> Option<&str> {
        self.get("definition")
            .and_then(|definition| definition.get("tlp"))
            .and_then(Value::as_str)
    }
}

fn take_string(fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    match fields.remove(key) {
        Some(Value::String(s)) => Some(s),
        Some(other) => {
            fields.insert(key.to_string(), other);
            None
        }
        None => None,
    }
}

/// A STIX2 bundle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bundle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub objects: Vec<StixObject>,

    /// Remaining top-level fields (`type`, `spec_version`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Bundle {
    pub fn new(objects: Vec<StixObject>) -> Self {
        Self {
            id: None,
            objects,
            extra: Map::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Validate and parse a bundle document.
    ///
    /// Fails with [`GraphError::InvalidBundle`] when `objects` is missing or
    /// not a sequence; no partial bundle is produced.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut top) = value else {
            return Err(GraphError::invalid_bundle("bundle is not a JSON object"));
        };

        let objects = match top.remove("objects") {
            Some(Value::Array(items)) => items,
            Some(_) => return Err(GraphError::invalid_bundle("`objects` is not a sequence")),
            None => return Err(GraphError::invalid_bundle("missing `objects`")),
        };

        let objects = objects
            .into_iter()
            .enumerate()
            .map(|(index, value)| StixObject::from_value(index, value))
            .collect::<Result<Vec<_>>>()?;

        let id = take_string(&mut top, "id");

        Ok(Self {
            id,
            objects,
            extra: top,
        })
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_value(value)
    }
}

impl TryFrom<Value> for Bundle {
    type Error = GraphError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

/// Node shapes understood by the rendering layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeShape {
    Ellipse,
    Star,
    Diamond,
    Pentagon,
    Hexagon,
    Octagon,
    Tag,
    Rectangle,
    Triangle,
}

/// Visual style of a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStyle {
    pub color: String,

    pub shape: NodeShape,

    /// Icon as a data URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl NodeStyle {
    pub fn new(color: impl Into<String>, shape: NodeShape) -> Self {
        Self {
            color: color.into(),
            shape,
            image: None,
        }
    }
}

/// Node in the graph model
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub id: String,

    /// STIX type, or `relationship` / `idref` for synthesized nodes
    pub node_type: String,

    pub label: Option<String>,

    pub style: NodeStyle,

    /// Object the node was made from (synthesized for placeholders)
    pub raw: StixObject,
}

/// Where an edge came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// A relationship object
    Relationship,

    /// A `_ref` / `_refs` field of an entity
    Reference,

    /// One of the two edges around a promoted relationship
    Promoted,
}

/// Edge in the graph model
#[derive(Debug, Clone, PartialEq)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,

    /// Relationship type or reference field name
    pub label: Option<String>,

    pub kind: EdgeKind,

    /// Relationship object behind the edge, if any
    pub raw: Option<StixObject>,
}

/// Final graph: nodes unique by id, edges unique by id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphModel {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphModel {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&GraphEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Ordered element list: every node, then every edge
    pub fn elements(&self) -> Vec<Element> {
        self.nodes
            .iter()
            .map(Element::from_node)
            .chain(self.edges.iter().map(Element::from_edge))
            .collect()
    }
}

/// Element descriptor handed to the rendering layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "group", rename_all = "lowercase")]
pub enum Element {
    Node { data: NodeData, classes: Vec<String> },
    Edge { data: EdgeData, classes: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub node_type: String,
    pub color: String,
    pub shape: NodeShape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Element {
    pub fn from_node(node: &GraphNode) -> Self {
        Self::Node {
            data: NodeData {
                id: node.id.clone(),
                label: node.label.clone(),
                node_type: node.node_type.clone(),
                color: node.style.color.clone(),
                shape: node.style.shape,
                image: node.style.image.clone(),
            },
            classes: vec![node.node_type.clone(), format!("icon-{}", node.node_type)],
        }
    }

    pub fn from_edge(edge: &GraphEdge) -> Self {
        Self::Edge {
            data: EdgeData {
                id: edge.id.clone(),
                source: edge.source.clone(),
                target: edge.target.clone(),
                label: edge.label.clone(),
            },
            classes: vec!["autorotate".to_string()],
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Node { data, .. } => &data.id,
            Self::Edge { data, .. } => &data.id,
        }
    }
}
