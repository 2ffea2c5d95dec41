//! Per-call error/warning collector.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{FieldPath, Record};

/// Category of a recorded outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// The record itself is empty or not an object.
    Structural,
    /// A required field is absent, `null`, or an empty string.
    MissingField,
    /// The value's type does not match the declared kind.
    TypeMismatch,
    /// A string fails a format pattern.
    PatternMismatch,
    /// A number or string length is outside `[min, max]`.
    Range,
    /// Two or more fields disagree with each other.
    Relationship,
    /// A value is not in an enumerated set.
    UnsupportedValue,
    /// Something unexpected happened while running the stages.
    Internal,
}

impl OutcomeKind {
    /// Stable string representation matching serde's `rename_all = "snake_case"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::MissingField => "missing_field",
            Self::TypeMismatch => "type_mismatch",
            Self::PatternMismatch => "pattern_mismatch",
            Self::Range => "range",
            Self::Relationship => "relationship",
            Self::UnsupportedValue => "unsupported_value",
            Self::Internal => "internal",
        }
    }
}

/// One error or warning attached to a field path.
///
/// `context` carries the raw data (offending value, limits, allowed set)
/// needed to rebuild a user-facing message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOutcome {
    pub kind: OutcomeKind,
    pub message: String,
    pub context: serde_json::Map<String, Value>,
}

/// Outcome maps keyed by field path, ordered for deterministic output.
pub type OutcomeMap = BTreeMap<FieldPath, FieldOutcome>;

/// State of a single `validate()` call. Never shared between calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationRun {
    pub errors: OutcomeMap,
    pub warnings: OutcomeMap,
    pub validated_data: Record,
}

impl ValidationRun {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a blocking outcome. A later call for the same field replaces it.
    pub fn add_error(
        &mut self,
        field: impl Into<FieldPath>,
        kind: OutcomeKind,
        message: impl Into<String>,
        context: Value,
    ) {
        self.errors.insert(field.into(), outcome(kind, message, context));
    }

    /// Record a non-blocking outcome. Same overwrite semantics as errors.
    pub fn add_warning(
        &mut self,
        field: impl Into<FieldPath>,
        kind: OutcomeKind,
        message: impl Into<String>,
        context: Value,
    ) {
        self.warnings
            .insert(field.into(), outcome(kind, message, context));
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Clear everything recorded so far.
    pub fn reset(&mut self) {
        self.errors.clear();
        self.warnings.clear();
        self.validated_data.clear();
    }
}

fn outcome(kind: OutcomeKind, message: impl Into<String>, context: Value) -> FieldOutcome {
    let context = match context {
        Value::Object(map) => map,
        Value::Null => serde_json::Map::new(),
        other => {
            let mut map = serde_json::Map::new();
            map.insert("value".to_string(), other);
            map
        }
    };
    FieldOutcome {
        kind,
        message: message.into(),
        context,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn second_error_on_same_field_wins() {
        let mut run = ValidationRun::new();
        run.add_error("sku", OutcomeKind::MissingField, "first", json!({"n": 1}));
        run.add_error("sku", OutcomeKind::PatternMismatch, "second", json!({"n": 2}));

        assert_eq!(run.errors.len(), 1);
        let kept = &run.errors["sku"];
        assert_eq!(kept.message, "second");
        assert_eq!(kept.kind, OutcomeKind::PatternMismatch);
        assert_eq!(kept.context["n"], json!(2));
    }

    #[test]
    fn warnings_are_kept_apart_from_errors() {
        let mut run = ValidationRun::new();
        run.add_warning("categories", OutcomeKind::Relationship, "empty", Value::Null);
        assert!(!run.has_errors());
        assert!(run.has_warnings());
        assert!(run.warnings["categories"].context.is_empty());
    }

    #[test]
    fn non_object_context_is_wrapped() {
        let mut run = ValidationRun::new();
        run.add_error("price", OutcomeKind::Range, "bad", json!(-1));
        assert_eq!(run.errors["price"].context["value"], json!(-1));
    }

    #[test]
    fn reset_clears_all_maps() {
        let mut run = ValidationRun::new();
        run.add_error("a", OutcomeKind::Structural, "x", Value::Null);
        run.add_warning("b", OutcomeKind::Relationship, "y", Value::Null);
        run.validated_data.insert("c".into(), json!(1));
        run.reset();
        assert_eq!(run, ValidationRun::default());
    }

    #[test]
    fn kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(OutcomeKind::UnsupportedValue).unwrap(),
            json!("unsupported_value")
        );
        assert_eq!(OutcomeKind::MissingField.as_str(), "missing_field");
    }
}
