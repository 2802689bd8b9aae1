//! # stixview graph
//!
//! Turns STIX2 bundles into a node/edge model ready for a graph renderer.
//!
//! ## Pipeline
//!
//! ```text
//! Bundle
//!     │
//!     ├──> Classifier
//!     │      └─ entities / relationship objects
//!     │
//!     ├──> Node/Edge factory (style table, TLP colors)
//!     │      ├─ entity       → node
//!     │      └─ relationship → edge
//!     │
//!     ├──> Reference deriver
//!     │      └─ `*_ref` / `*_refs` fields → extra edges
//!     │
//!     ├──> Visibility filter (allow-list, deny-list, markings)
//!     │
//!     ├──> Dangling reference resolver
//!     │      ├─ drop: remove edges with a missing end
//!     │      └─ resolve: promote relationships / add idref placeholders
//!     │
//!     └──> Assembler → GraphModel (nodes, then edges)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use stixview_graph::{BuildOptions, GraphBuilder};
//! use serde_json::json;
//!
//! let bundle = json!({"objects": [
//!     {"id": "e1", "type": "threat-actor", "name": "X"},
//!     {"id": "e2", "type": "malware", "name": "Y"},
//!     {"id": "r1", "type": "relationship", "source_ref": "e1",
//!      "target_ref": "e2", "relationship_type": "uses"}
//! ]});
//!
//! let model = GraphBuilder::default()
//!     .build_value(bundle, &BuildOptions::default())
//!     .unwrap();
//! assert_eq!(model.node_count(), 2);
//! assert_eq!(model.edge_count(), 1);
//! ```

mod assembler;
mod builder;
mod classifier;
mod config;
mod details;
mod error;
mod filter;
mod graph;
mod layout;
pub mod refs;
mod resolver;
mod style;
mod types;

pub use assembler::{ElementSet, GraphAssembler};
pub use builder::{make_edge, BuildOptions, GraphBuilder};
pub use classifier::{classify, parse_bundle, Classified, ObjectIndex};
pub use config::ViewerOptions;
pub use details::{to_json_pretty, NodeDetails};
pub use error::{GraphError, Result};
pub use filter::VisibilityConfig;
pub use graph::{ModelGraph, Neighbourhood};
pub use layout::{LayoutKind, LayoutSpec, NODE_HEIGHT, NODE_WIDTH};
pub use resolver::{DanglingResolver, IdrefPolicy};
pub use style::{
    encode_svg, unknown_type_style, StyleTable, TlpLevel, TLP_FALLBACK_COLOR, UNKNOWN_TYPE_COLOR,
};
pub use types::{
    Bundle, EdgeData, EdgeKind, Element, GraphEdge, GraphModel, GraphNode, NodeData, NodeShape,
    NodeStyle, StixObject, IDREF_TYPE, MARKING_DEFINITION_TYPE, RELATIONSHIP_TYPE,
};
