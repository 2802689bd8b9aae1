use crate::builder::BuildOptions;
use crate::error::{GraphError, Result};
use crate::filter::VisibilityConfig;
use crate::layout::LayoutKind;
use crate::style::StyleTable;
use crate::types::NodeStyle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Viewer configuration surface.
///
/// Field names follow Rust conventions; the camelCase names used by the
/// embedding widget are accepted as aliases. Widget keys with no meaning
/// here (`caption`, `graphWidth`, ...) are kept in `ignored`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerOptions {
    /// Allow-list of object ids (empty = show everything)
    #[serde(alias = "highlightedObjects")]
    pub highlighted_objects: Vec<String>,

    /// Deny-list of object ids
    #[serde(alias = "hiddenObjects")]
    pub hidden_objects: Vec<String>,

    #[serde(alias = "showMarkings")]
    pub show_markings: bool,

    /// Resolve dangling references into placeholder/promoted nodes
    #[serde(alias = "showIdrefs")]
    pub show_idrefs: bool,

    pub layout: LayoutKind,

    /// Per-type style overrides
    pub styles: BTreeMap<String, NodeStyle>,

    #[serde(flatten, skip_serializing)]
    pub ignored: BTreeMap<String, serde_json::Value>,
}

impl ViewerOptions {
    /// Parse options from JSON, falling back to TOML
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let options: Self = match serde_json::from_slice(bytes) {
            Ok(options) => options,
            Err(json_err) => {
                let text = std::str::from_utf8(bytes)
                    .map_err(|err| GraphError::invalid_config(format!("{json_err}; {err}")))?;
                toml::from_str(text).map_err(|toml_err| {
                    GraphError::invalid_config(format!(
                        "options are not valid JSON ({json_err}) or TOML ({toml_err})"
                    ))
                })?
            }
        };
        for key in options.ignored.keys() {
            log::warn!("Ignoring unknown viewer option {key:?}");
        }
        options.validate()?;
        Ok(options)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|err| {
            GraphError::invalid_config(format!("cannot read {}: {err}", path.display()))
        })?;
        Self::from_slice(&bytes)
    }

    pub fn validate(&self) -> Result<()> {
        let mut ids = self.highlighted_objects.iter().chain(&self.hidden_objects);
        if let Some(id) = ids.find(|id| id.trim().is_empty()) {
            return Err(GraphError::invalid_config(format!(
                "object ids must not be blank (got {id:?})"
            )));
        }
        let mut styles = self.styles.iter();
        if let Some((ty, _)) = styles.find(|(_, style)| style.color.trim().is_empty()) {
            return Err(GraphError::invalid_config(format!(
                "style for {ty} has an empty color"
            )));
        }
        Ok(())
    }

    pub fn visibility(&self) -> VisibilityConfig {
        VisibilityConfig::new()
            .highlight(self.highlighted_objects.iter().cloned())
            .hide(self.hidden_objects.iter().cloned())
            .show_markings(self.show_markings)
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions::new(self.visibility(), self.show_idrefs)
    }

    /// Built-in style table with this configuration's overrides applied
    pub fn style_table(&self) -> StyleTable {
        StyleTable::default().with_overrides(
            self.styles
                .iter()
                .map(|(ty, style)| (ty.clone(), style.clone())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::IdrefPolicy;
    use crate::types::NodeShape;
    use std::io::Write;

    #[test]
    fn defaults_are_permissive_without_markings_or_idrefs() {
        let options = ViewerOptions::default();
        let build = options.build_options();
        assert!(build.visibility.highlighted.is_empty());
        assert!(!build.visibility.show_markings);
        assert_eq!(build.idrefs, IdrefPolicy::Drop);
        assert_eq!(options.layout, LayoutKind::Cola);
    }

    #[test]
    fn parses_widget_style_json() {
        let options = ViewerOptions::from_slice(
            br#"{"highlightedObjects": ["a"], "showMarkings": true, "showIdrefs": true, "layout": "cose-bilkent"}"#,
        )
        .unwrap();
        assert_eq!(options.highlighted_objects, vec!["a"]);
        assert!(options.show_markings);
        assert_eq!(options.build_options().idrefs, IdrefPolicy::Resolve);
        assert_eq!(options.layout, LayoutKind::CoseBilkent);
    }

    #[test]
    fn parses_toml_with_style_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r##"
hidden_objects = ["identity--1"]
layout = "dagre"

[styles.malware]
color = "#111111"
shape = "hexagon"
"##
        )
        .unwrap();

        let options = ViewerOptions::load(file.path()).unwrap();
        assert_eq!(options.hidden_objects, vec!["identity--1"]);
        let table = options.style_table();
        let style = table.style_for_type("malware");
        assert_eq!(style.color, "#111111");
        assert_eq!(style.shape, NodeShape::Hexagon);
    }

    #[test]
    fn rejects_blank_ids() {
        assert!(ViewerOptions::from_slice(br#"{"hidden_objects": [" "]}"#).is_err());
        assert!(ViewerOptions::from_slice(br#"{"caption": "x", "hiddenObjects": [""]}"#).is_err());
    }

    #[test]
    fn widget_only_keys_are_ignored() {
        let options = ViewerOptions::from_slice(
            br#"{"caption": "x", "showSidebar": true, "graphWidth": 800, "minZoom": 0.5, "showIdrefs": true}"#,
        )
        .unwrap();
        assert!(options.show_idrefs);
        assert_eq!(
            options.ignored.keys().collect::<Vec<_>>(),
            vec!["caption", "graphWidth", "minZoom", "showSidebar"]
        );
        assert_eq!(options.build_options().idrefs, IdrefPolicy::Resolve);

        let toml = ViewerOptions::from_slice(b"caption = \"x\"\nlayout = \"klay\"\n").unwrap();
        assert_eq!(toml.layout, LayoutKind::Klay);
        assert!(toml.ignored.contains_key("caption"));
    }
}
