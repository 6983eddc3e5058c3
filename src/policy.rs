//! Policy System - Per Content Type Image Requirements
//!
//! A content type is forced exactly when it has an entry in the table.
//! Entries are validated on registration so evaluation never sees a
//! malformed dimension.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::metadata::lenient_u64;

pub type PostType = String;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Post type must not be empty")]
    EmptyPostType,

    #[error("Policy for '{post_type}' has invalid {field}: {value} (expected a non-negative integer)")]
    InvalidDimension {
        post_type: String,
        field: &'static str,
        value: Value,
    },

    #[error("Policy for '{0}' must be an object")]
    NotAnObject(String),

    #[error("Policy file must contain an object keyed by post type")]
    InvalidDocument,

    #[error("Failed to read policy file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse policy file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Metadata constraints for one content type.
///
/// `width` and `height` are minimums. Any other key is an exact-match
/// constraint against the image metadata (e.g. a `sizes` sub-structure).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SizePolicy {
    fields: Map<String, Value>,
}

impl SizePolicy {
    /// Image required, any size accepted
    pub fn any_size() -> Self {
        Self::default()
    }

    pub fn min_size(width: u64, height: u64) -> Self {
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

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Minimum width, 0 when unset
    pub fn min_width(&self) -> u64 {
        self.fields.get("width").and_then(lenient_u64).unwrap_or(0)
    }

    /// Minimum height, 0 when unset
    pub fn min_height(&self) -> u64 {
        self.fields.get("height").and_then(lenient_u64).unwrap_or(0)
    }

    fn validate(&self, post_type: &str) -> Result<(), PolicyError> {
        for field in ["width", "height"] {
            if let Some(value) = self.fields.get(field) {
                if lenient_u64(value).is_none() {
                    return Err(PolicyError::InvalidDimension {
                        post_type: post_type.to_string(),
                        field,
                        value: value.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Policy table - populated once at bootstrap, read-only afterwards
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    policies: BTreeMap<PostType, SizePolicy>,
}

impl PolicyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a policy. A second registration for the same post type
    /// replaces the first.
    pub fn register(
        &mut self,
        post_type: impl Into<PostType>,
        policy: SizePolicy,
    ) -> Result<(), PolicyError> {
        let post_type = post_type.into();
        if post_type.trim().is_empty() {
            return Err(PolicyError::EmptyPostType);
        }
        policy.validate(&post_type)?;

        tracing::debug!(%post_type, fields = policy.fields.len(), "registered featured image policy");
        if let Some(previous) = self.policies.insert(post_type.clone(), policy) {
            tracing::warn!(%post_type, ?previous, "featured image policy overwritten");
        }
        Ok(())
    }

    /// Parse a `{ "<post_type>": { ...policy... } }` document
    pub fn from_json_str(s: &str) -> Result<Self, PolicyError> {
        let document: Value = serde_json::from_str(s)?;
        let entries = match document {
            Value::Object(entries) => entries,
            _ => return Err(PolicyError::InvalidDocument),
        };

        let mut table = Self::new();
        for (post_type, policy) in entries {
            match policy {
                Value::Object(fields) => table.register(post_type, SizePolicy::from_fields(fields))?,
                _ => return Err(PolicyError::NotAnObject(post_type)),
            }
        }
        Ok(table)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, PolicyError> {
        let content = fs::read_to_string(path)?;
        let table = Self::from_json_str(&content)?;
        tracing::debug!(path = %path.display(), post_types = table.len(), "loaded policy file");
        Ok(table)
    }

    pub fn get(&self, post_type: &str) -> Option<&SizePolicy> {
        self.policies.get(post_type)
    }

    pub fn contains(&self, post_type: &str) -> bool {
        self.policies.contains_key(post_type)
    }

    /// Forced post types with their policies, ordered by post type
    pub fn list(&self) -> Vec<(&str, &SizePolicy)> {
        self.policies.iter().map(|(k, v)| (k.as_str(), v)).collect()
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_last_registration_wins() {
        let mut table = PolicyTable::new();
        table.register("post", SizePolicy::min_size(100, 100)).unwrap();
        table.register("post", SizePolicy::min_size(800, 600)).unwrap();

        assert_eq!(table.len(), 1);
        let policy = table.get("post").unwrap();
        assert_eq!(policy.min_width(), 800);
        assert_eq!(policy.min_height(), 600);
    }

    #[test]
    fn test_non_numeric_dimension_rejected_at_registration() {
        let mut table = PolicyTable::new();
        let policy = SizePolicy::any_size().with_field("width", json!("wide"));

        let err = table.register("page", policy).unwrap_err();
        assert!(matches!(err, PolicyError::InvalidDimension { field: "width", .. }));
        assert!(!table.contains("page"));
    }

    #[test]
    fn test_empty_post_type_rejected() {
        let mut table = PolicyTable::new();
        assert!(matches!(
            table.register("  ", SizePolicy::any_size()),
            Err(PolicyError::EmptyPostType)
        ));
    }

    #[test]
    fn test_defaults_for_missing_dimensions() {
        let policy = SizePolicy::any_size().with_field("height", json!("300"));
        assert_eq!(policy.min_width(), 0);
        assert_eq!(policy.min_height(), 300);
    }

    #[test]
    fn test_from_json_str() {
        let table = PolicyTable::from_json_str(
            r#"{ "post": { "width": 640, "height": 480 }, "product": {} }"#,
        )
        .unwrap();

        assert!(table.contains("post"));
        assert!(table.get("product").unwrap().is_empty());
        let names: Vec<_> = table.list().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["post", "product"]);
    }

    #[test]
    fn test_from_json_str_rejects_bad_shapes() {
        assert!(matches!(
            PolicyTable::from_json_str("[1, 2]"),
            Err(PolicyError::InvalidDocument)
        ));
        assert!(matches!(
            PolicyTable::from_json_str(r#"{ "post": 42 }"#),
            Err(PolicyError::NotAnObject(ref t)) if t == "post"
        ));
        assert!(matches!(
            PolicyTable::from_json_str("{ not json"),
            Err(PolicyError::Parse(_))
        ));
    }
}
