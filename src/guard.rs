//! Publication Guard - Policy Evaluation
//!
//! Given a post type and the metadata of its featured image, decide
//! whether the post may be published. A rejection is a normal outcome,
//! never an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::metadata::ImageMetadata;
use crate::policy::{PolicyTable, SizePolicy};

/// Why a publish transition was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectionReason {
    NoImage,
    WrongSize,
}

impl RejectionReason {
    /// Code carried through the host's redirect query string
    pub fn as_code(self) -> &'static str {
        match self {
            RejectionReason::NoImage => "no-image",
            RejectionReason::WrongSize => "wrong-size",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "no-image" => Some(RejectionReason::NoImage),
            "wrong-size" => Some(RejectionReason::WrongSize),
            _ => None,
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EvaluationResult {
    Allowed,
    RejectedNoImage,
    RejectedWrongSize { policy: SizePolicy },
}

impl EvaluationResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, EvaluationResult::Allowed)
    }

    pub fn rejection_reason(&self) -> Option<RejectionReason> {
        match self {
            EvaluationResult::Allowed => None,
            EvaluationResult::RejectedNoImage => Some(RejectionReason::NoImage),
            EvaluationResult::RejectedWrongSize { .. } => Some(RejectionReason::WrongSize),
        }
    }
}

/// Owns the policy table and answers publish questions against it.
pub struct PublicationGuard {
    policies: PolicyTable,
}

impl PublicationGuard {
    pub fn new(policies: PolicyTable) -> Self {
        Self { policies }
    }

    pub fn policies(&self) -> &PolicyTable {
        &self.policies
    }

    /// An empty table enforces nothing
    pub fn is_active(&self) -> bool {
        !self.policies.is_empty()
    }

    pub fn is_forced(&self, post_type: &str) -> bool {
        self.policies.contains(post_type)
    }

    pub fn evaluate(&self, post_type: &str, image: Option<&ImageMetadata>) -> EvaluationResult {
        let Some(policy) = self.policies.get(post_type) else {
            return EvaluationResult::Allowed;
        };

        let result = if image.is_none() {
            EvaluationResult::RejectedNoImage
        } else if !image_satisfies_policy(image, policy) {
            EvaluationResult::RejectedWrongSize { policy: policy.clone() }
        } else {
            EvaluationResult::Allowed
        };

        tracing::debug!(post_type, outcome = ?result.rejection_reason(), "evaluated featured image");
        result
    }
}

/// Exact-match first: if every policy field matches the image metadata
/// the image is accepted outright. Otherwise the image must be at least
/// the policy's width and height, with both dimensions positive.
///
/// NOTE: an exact match skips the dimension floor entirely. Kept as-is;
/// a policy meant purely as a floor should only carry width/height.
pub fn image_satisfies_policy(image: Option<&ImageMetadata>, policy: &SizePolicy) -> bool {
    let Some(image) = image else {
        return false;
    };

    let all_fields_match = policy
        .fields()
        .iter()
        .all(|(key, expected)| image.get(key).is_some_and(|actual| values_match(expected, actual)));
    if all_fields_match {
        return true;
    }

    let min_width = policy.min_width();
    let min_height = policy.min_height();
    let width_ok = image.width().is_some_and(|w| w > 0 && w >= min_width);
    let height_ok = image.height().is_some_and(|h| h > 0 && h >= min_height);

    width_ok && height_ok
}

/// Objects match as a recursive subset of the image side, arrays
/// element-wise, scalars by their textual form (`100` == `"100"`).
fn values_match(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Object(expected), Value::Object(actual)) => expected
            .iter()
            .all(|(key, value)| actual.get(key).is_some_and(|other| values_match(value, other))),
        (Value::Array(expected), Value::Array(actual)) => {
            expected.len() == actual.len()
                && expected.iter().zip(actual).all(|(a, b)| values_match(a, b))
        }
        (Value::Object(_) | Value::Array(_), _) | (_, Value::Object(_) | Value::Array(_)) => false,
        (a, b) => scalar_text(a) == scalar_text(b),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null | Value::Bool(false) => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Object(_) | Value::Array(_) => String::new(),
    }
}
