use crate::error::GraphError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

/// Node box size the renderer draws with; some layouts scale from it
pub const NODE_WIDTH: u32 = 30;
pub const NODE_HEIGHT: u32 = 30;

/// Layout algorithms the rendering layer knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutKind {
    #[default]
    Cola,
    Euler,
    CoseBilkent,
    Klay,
    Dagre,
}

impl LayoutKind {
    pub const ALL: [LayoutKind; 5] = [
        LayoutKind::Cola,
        LayoutKind::Euler,
        LayoutKind::CoseBilkent,
        LayoutKind::Klay,
        LayoutKind::Dagre,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cola => "cola",
            Self::Euler => "euler",
            Self::CoseBilkent => "cose-bilkent",
            Self::Klay => "klay",
            Self::Dagre => "dagre",
        }
    }

    /// Parameters passed along with the layout name
    pub fn params(self) -> Value {
        match self {
            // stop early, slightly lower quality
            Self::Cola => json!({
                "convergenceThreshold": 100,
                "animate": false,
            }),
            Self::Euler => json!({
                "pull": 0.006,
                "mass": 10,
                "animation": false,
                "dragCoeff": 0.3,
            }),
            Self::CoseBilkent => json!({
                "animate": "end",
                "animationEasing": "ease-out",
                "animationDuration": 300,
                "nodeRepulsion": 200,
                "idealEdgeLength": NODE_WIDTH * 3,
                "gravityRange": 50,
                "gravity": 8.2,
                "padding": 50,
            }),
            Self::Klay | Self::Dagre => json!({}),
        }
    }

    pub fn spec(self) -> LayoutSpec {
        LayoutSpec {
            name: self,
            params: self.params(),
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutKind {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                GraphError::invalid_config(format!(
                    "unknown layout {s:?} (expected one of: {})",
                    Self::ALL.map(LayoutKind::as_str).join(", ")
                ))
            })
    }
}

/// Layout name plus its parameters, as handed to the renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutSpec {
    pub name: LayoutKind,
    pub params: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for kind in LayoutKind::ALL {
            assert_eq!(kind.as_str().parse::<LayoutKind>().unwrap(), kind);
            assert_eq!(
                serde_json::to_value(kind).unwrap(),
                Value::String(kind.to_string())
            );
        }
        assert!("spring".parse::<LayoutKind>().is_err());
    }

    #[test]
    fn cose_bilkent_edge_length_scales_with_node_width() {
        let params = LayoutKind::CoseBilkent.params();
        assert_eq!(params["idealEdgeLength"], 90);
    }

    #[test]
    fn default_is_cola() {
        assert_eq!(LayoutKind::default().spec().params["convergenceThreshold"], 100);
    }
}
