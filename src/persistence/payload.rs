//! Portable JSON form of an annotated image.

use crate::draw::Annotation;
use crate::draw::collection::parse_annotations;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The unit exchanged with the annotation store.
///
/// `{ "annotations": [...], "recommendations": "...", ...extra }`. Top-level
/// fields this crate does not understand are kept in `extra` and written back
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedAnnotationPayload {
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PersistedAnnotationPayload {
    /// Leniently reads a payload. Never fails.
    ///
    /// Bad annotation entries are dropped with a warning, a non-string
    /// `recommendations` is ignored and anything that is not an object yields
    /// an empty payload.
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };

        let mut extra = object.clone();
        let annotations = extra
            .remove("annotations")
            .map(|raw| parse_annotations(&raw))
            .unwrap_or_default();
        let recommendations = match extra.remove("recommendations") {
            Some(Value::String(text)) => Some(text),
            Some(Value::Null) | None => None,
            Some(other) => {
                log::warn!("Ignoring non-text recommendations: {other}");
                None
            }
        };

        Self {
            annotations,
            recommendations,
            extra,
        }
    }

    /// Parses JSON text leniently; only invalid JSON syntax is an error.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from_value(&value))
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Encodes PNG bytes as a `data:image/png;base64,...` URI.
pub fn to_data_uri(png: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    )
}
