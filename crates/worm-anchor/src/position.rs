//! Portable anchor descriptor
//!
//! Stored verbatim by persistence; field names follow the JSON wire shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Anchor descriptor, created once per interaction and never mutated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub dom: DomSelectors,
    #[serde(default)]
    pub text_quote: Option<TextQuote>,
    pub element: ElementFingerprint,
    #[serde(default)]
    pub fallback: Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomSelectors {
    /// Path to the most specific element
    pub selector_fine: String,
    /// Path to a stable ancestor; equals `selector_fine` when there is none
    pub selector_coarse: String,
}

/// Selected text plus surrounding context, all normalized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextQuote {
    pub exact: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub suffix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementFingerprint {
    pub tag: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    pub rel_box_pct: RelBoxPct,
}

/// Point inside the host box, as fractions in [0,1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelBoxPct {
    pub x: f64,
    pub y: f64,
}

impl RelBoxPct {
    pub const CENTER: RelBoxPct = RelBoxPct { x: 0.5, y: 0.5 };

    /// Clamped to the unit square
    pub fn new(x: f64, y: f64) -> Self {
        let clamp = |v: f64| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.5 };
        Self {
            x: clamp(x),
            y: clamp(y),
        }
    }
}

impl Default for RelBoxPct {
    fn default() -> Self {
        Self::CENTER
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fallback {
    /// Vertical scroll fraction at creation time
    pub scroll_pct: f64,
}

impl Position {
    /// Non-empty quote, if any
    pub fn quote(&self) -> Option<&TextQuote> {
        self.text_quote.as_ref().filter(|q| !q.exact.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Position {
        Position {
            dom: DomSelectors {
                selector_fine: "#a > p:nth-of-type(2)".into(),
                selector_coarse: "#a".into(),
            },
            text_quote: Some(TextQuote {
                exact: "quick brown".into(),
                prefix: "The".into(),
                suffix: "fox".into(),
            }),
            element: ElementFingerprint {
                tag: "p".into(),
                attrs: BTreeMap::from([("data-k".to_string(), "v".to_string())]),
                rel_box_pct: RelBoxPct::new(0.25, 0.75),
            },
            fallback: Fallback { scroll_pct: 0.1 },
        }
    }

    #[test]
    fn test_wire_field_names() {
        let json = serde_json::to_value(sample()).unwrap();

        assert_eq!(json["dom"]["selectorFine"], "#a > p:nth-of-type(2)");
        assert_eq!(json["dom"]["selectorCoarse"], "#a");
        assert_eq!(json["textQuote"]["exact"], "quick brown");
        assert_eq!(json["element"]["relBoxPct"]["x"], 0.25);
        assert_eq!(json["fallback"]["scrollPct"], 0.1);
    }

    #[test]
    fn test_null_quote_and_missing_fields() {
        let json = r#"{
            "dom": {"selectorFine": "p", "selectorCoarse": "p"},
            "textQuote": null,
            "element": {"tag": "p", "relBoxPct": {"x": 0.5, "y": 0.5}}
        }"#;
        let position: Position = serde_json::from_str(json).unwrap();

        assert_eq!(position.text_quote, None);
        assert!(position.element.attrs.is_empty());
        assert_eq!(position.fallback.scroll_pct, 0.0);
        assert_eq!(serde_json::to_value(&position).unwrap()["textQuote"], serde_json::Value::Null);
    }

    #[test]
    fn test_rel_box_clamped() {
        assert_eq!(RelBoxPct::new(-1.0, 2.0), RelBoxPct { x: 0.0, y: 1.0 });
        assert_eq!(RelBoxPct::new(f64::NAN, 0.3), RelBoxPct { x: 0.5, y: 0.3 });
    }
}
