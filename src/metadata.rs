//! Image Metadata - Read-Only Descriptor Input
//!
//! Produced by the host's media pipeline. The guard never trusts the
//! shape of this data: malformed dimensions read as absent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Open mapping of image descriptor keys (`width`, `height`, `file`, `sizes`, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageMetadata {
    fields: Map<String, Value>,
}

impl ImageMetadata {
    pub fn new(width: u64, height: u64) -> Self {
        Self::default()
            .with_field("width", Value::from(width))
            .with_field("height", Value::from(height))
    }

    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Width as a validated non-negative integer, if it parses
    pub fn width(&self) -> Option<u64> {
        self.get("width").and_then(lenient_u64)
    }

    /// Height as a validated non-negative integer, if it parses
    pub fn height(&self) -> Option<u64> {
        self.get("height").and_then(lenient_u64)
    }
}

/// Accepts JSON integers, integral floats (`640.0`) and integer strings
/// (`"640"`, `" +640 "`). Fractional values, booleans, negatives, empty
/// strings and zero-padded strings (`"0640"`) yield `None`.
pub(crate) fn lenient_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f < u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => {
            let trimmed = s.trim();
            let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            if digits.len() > 1 && digits.starts_with('0') {
                return None;
            }
            digits.parse().ok()
        }
        _ => None,
    }
}
