use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Trace visibility, as serialized by the chart service.
///
/// Plotly encodes this as `true` (drawn), `"legendonly"` (hidden from the
/// plot area but still listed in the legend) or `false` (fully hidden).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Visible,
    LegendOnly,
    Hidden,
}

impl Visibility {
    /// A trace counts as shown unless it is legend-only or fully hidden.
    #[inline]
    pub fn is_shown(self) -> bool {
        self == Self::Visible
    }
}

impl Serialize for Visibility {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Visible => serializer.serialize_bool(true),
            Self::Hidden => serializer.serialize_bool(false),
            Self::LegendOnly => serializer.serialize_str("legendonly"),
        }
    }
}

impl<'de> Deserialize<'de> for Visibility {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct VisibilityVisitor;

        impl Visitor<'_> for VisibilityVisitor {
            type Value = Visibility;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a boolean or the string \"legendonly\"")
            }

            fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
                Ok(if value {
                    Visibility::Visible
                } else {
                    Visibility::Hidden
                })
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                if value == "legendonly" {
                    Ok(Visibility::LegendOnly)
                } else {
                    // Unknown markers are treated as drawn, same as an absent field
                    Ok(Visibility::Visible)
                }
            }
        }

        deserializer.deserialize_any(VisibilityVisitor)
    }
}

/// Structured trace metadata emitted by the chart service.
///
/// `component` is the group key used to cluster related traces under one
/// control; traces without it fall back to name-based classification.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TraceMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One renderable series of a figure.
///
/// Only the attributes the client acts on are typed; everything else
/// (mode, line styling, hover templates, ...) is kept as raw JSON so a
/// figure survives a round-trip untouched.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Trace {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub visible: Visibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<TraceMeta>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub x: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub y: Vec<Option<f64>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Trace {
    /// Group key declared by the service, if any.
    pub fn component(&self) -> Option<&str> {
        self.meta.as_ref().and_then(|meta| meta.component.as_deref())
    }

    /// Display label, falling back to the positional name used by the
    /// chart service for anonymous traces.
    pub fn label(&self, index: usize) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("trace {index}"))
    }
}

/// Figure layout. Shapes and annotations form the decorative overlay
/// (e.g. the max-profit window); they stay opaque JSON.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shapes: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Layout {
    pub fn has_overlay(&self) -> bool {
        !self.shapes.is_empty() || !self.annotations.is_empty()
    }
}

/// A parsed figure payload: `{data: [...], layout: {...}}`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Figure {
    #[serde(default)]
    pub data: Vec<Trace>,
    #[serde(default)]
    pub layout: Layout,
}

impl Figure {
    /// Traces currently drawn in the plot area, with their indices.
    pub fn shown_traces(&self) -> impl Iterator<Item = (usize, &Trace)> {
        self.data
            .iter()
            .enumerate()
            .filter(|(_, trace)| trace.visible.is_shown())
    }

    pub fn set_visibility(&mut self, index: usize, visibility: Visibility) {
        if let Some(trace) = self.data.get_mut(index) {
            trace.visible = visibility;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Figure, Visibility};

    fn sample_payload() -> serde_json::Value {
        serde_json::json!({
            "data": [
                {"name": "AAPL Close", "x": ["2026-01-02", "2026-01-03"], "y": [182.5, 184.1]},
                {"name": "AAPL SMA_20", "visible": "legendonly", "y": [null, 183.3]},
                {"visible": false, "meta": {"component": "segments"}, "y": [1.0]}
            ],
            "layout": {
                "shapes": [{"type": "rect", "x0": "2026-01-02"}],
                "annotations": [{"text": "Max Profit"}],
                "hovermode": "closest"
            }
        })
    }

    #[test]
    fn parses_visibility_markers() {
        let figure: Figure = serde_json::from_value(sample_payload()).expect("parse figure");
        assert_eq!(figure.data[0].visible, Visibility::Visible);
        assert_eq!(figure.data[1].visible, Visibility::LegendOnly);
        assert_eq!(figure.data[2].visible, Visibility::Hidden);
    }

    #[test]
    fn serializes_visibility_back_to_plotly_markers() {
        let figure: Figure = serde_json::from_value(sample_payload()).expect("parse figure");
        let value = serde_json::to_value(&figure).expect("serialize figure");
        assert_eq!(value["data"][1]["visible"], serde_json::json!("legendonly"));
        assert_eq!(value["data"][2]["visible"], serde_json::json!(false));
    }

    #[test]
    fn keeps_unknown_attributes() {
        let figure: Figure = serde_json::from_value(sample_payload()).expect("parse figure");
        assert_eq!(
            figure.layout.extra.get("hovermode"),
            Some(&serde_json::json!("closest"))
        );
    }

    #[test]
    fn component_and_label_fallbacks() {
        let figure: Figure = serde_json::from_value(sample_payload()).expect("parse figure");
        assert_eq!(figure.data[2].component(), Some("segments"));
        assert_eq!(figure.data[2].label(2), "trace 2");
        assert_eq!(figure.data[0].label(0), "AAPL Close");
    }

    #[test]
    fn shown_traces_skips_hidden_and_legendonly() {
        let figure: Figure = serde_json::from_value(sample_payload()).expect("parse figure");
        let shown: Vec<usize> = figure.shown_traces().map(|(i, _)| i).collect();
        assert_eq!(shown, vec![0]);
    }

    #[test]
    fn overlay_detection() {
        let mut figure: Figure = serde_json::from_value(sample_payload()).expect("parse figure");
        assert!(figure.layout.has_overlay());
        figure.layout.shapes.clear();
        figure.layout.annotations.clear();
        assert!(!figure.layout.has_overlay());
    }
}
