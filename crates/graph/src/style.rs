use crate::types::{NodeShape, NodeStyle, StixObject, IDREF_TYPE};
use std::collections::HashMap;

/// Color of nodes whose type has no entry in the table
pub const UNKNOWN_TYPE_COLOR: &str = "#B99435";

/// Color of marking definitions whose TLP level is missing or unrecognized
pub const TLP_FALLBACK_COLOR: &str = "#72d1fb";

const BUILTIN_STYLES: &[(&str, &str, NodeShape)] = &[
    ("threat-actor", "#d32b49", NodeShape::Ellipse),
    ("tool", "#6661ab", NodeShape::Star),
    ("vulnerability", "#eaca6b", NodeShape::Diamond),
    ("malware", "#6661ab", NodeShape::Ellipse),
    ("intrusion-set", "#396eb6", NodeShape::Ellipse),
    ("indicator", "#e38850", NodeShape::Pentagon),
    ("attack-pattern", "#6661ab", NodeShape::Diamond),
    ("course-of-action", "#7fbe82", NodeShape::Ellipse),
    ("campaign", "#1d6775", NodeShape::Star),
    ("report", "#2d2b5f", NodeShape::Ellipse),
    ("identity", "#9c9d9d", NodeShape::Diamond),
    ("marking-definition", TLP_FALLBACK_COLOR, NodeShape::Tag),
    ("sighting", "#383839", NodeShape::Ellipse),
    ("observed-data", "#AB558C", NodeShape::Ellipse),
    ("relationship", "#31A9C1", NodeShape::Ellipse),
    // STIX 2.1
    ("opinion", "#881177", NodeShape::Ellipse),
    ("x-eclecticiq-hypothesis", "#009688", NodeShape::Ellipse),
    (IDREF_TYPE, "#ccc", NodeShape::Octagon),
];

/// Traffic Light Protocol level of a marking definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TlpLevel {
    Red,
    Amber,
    Green,
    White,
    None,
}

impl TlpLevel {
    pub fn parse(level: &str) -> Option<Self> {
        match level {
            "red" => Some(Self::Red),
            "amber" => Some(Self::Amber),
            "green" => Some(Self::Green),
            "white" => Some(Self::White),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::Red => "#ff0000",
            Self::Amber => "#ff8c00",
            Self::Green => "#7cfc00",
            Self::White => "#ccc",
            Self::None => "#008080",
        }
    }
}

/// Immutable type -> style table consulted by the node factory
#[derive(Debug, Clone, PartialEq)]
pub struct StyleTable {
    styles: HashMap<String, NodeStyle>,
}

impl StyleTable {
    /// Table with no entries; every type gets a generated style
    pub fn empty() -> Self {
        Self {
            styles: HashMap::new(),
        }
    }

    /// Copy of this table with `overrides` layered on top
    pub fn with_overrides<I>(&self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (String, NodeStyle)>,
    {
        let mut styles = self.styles.clone();
        styles.extend(overrides);
        Self { styles }
    }

    pub fn get(&self, object_type: &str) -> Option<&NodeStyle> {
        self.styles.get(object_type)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Style for a type, generating the letter-icon fallback for unknown types
    pub fn style_for_type(&self, object_type: &str) -> NodeStyle {
        self.get(object_type)
            .cloned()
            .unwrap_or_else(|| unknown_type_style(object_type))
    }

    /// Style for an object; marking definitions are colored by TLP level
    pub fn style_for(&self, object: &StixObject) -> NodeStyle {
        let mut style = self.style_for_type(&object.object_type);
        if object.is_marking_definition() {
            style.color = match object.tlp_level().and_then(TlpLevel::parse) {
                Some(level) => level.color().to_string(),
                None => {
                    log::warn!(
                        "Marking definition {} has no recognized TLP level ({:?}), using {}",
                        object.id,
                        object.tlp_level(),
                        TLP_FALLBACK_COLOR
                    );
                    TLP_FALLBACK_COLOR.to_string()
                }
            };
        }
        style
    }
}

impl Default for StyleTable {
    fn default() -> Self {
        let styles = BUILTIN_STYLES
            .iter()
            .map(|&(ty, color, shape)| (ty.to_string(), NodeStyle::new(color, shape)))
            .collect();
        Self { styles }
    }
}

/// Generated style for a type the table does not know: a colored circle
/// showing the type's first letter.
pub fn unknown_type_style(object_type: &str) -> NodeStyle {
    let letter = object_type
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect::<String>())
        .unwrap_or_default();
    NodeStyle {
        color: UNKNOWN_TYPE_COLOR.to_string(),
        shape: NodeShape::Ellipse,
        image: Some(encode_svg(&letter_icon_svg(&letter))),
    }
}

fn letter_icon_svg(letter: &str) -> String {
    let letter = quick_xml::escape::escape(letter);
    format!(
        r#"<svg width="200" height="200" viewBox="0 0 200 200" fill="none" xmlns="http://www.w3.org/2000/svg"><g id="event-icon"><circle id="e" cx="100" cy="100" r="100" fill="{UNKNOWN_TYPE_COLOR}"/><text x="50%" y="150" text-anchor="middle" style="font: bold 150px sans-serif" fill="white" stroke="white">{letter}</text></g></svg>"#
    )
}

/// Wrap SVG markup into a `data:` URI
pub fn encode_svg(svg: &str) -> String {
    format!(
        "data:image/svg+xml;charset=utf-8,{}",
        urlencoding::encode(svg)
    )
}
