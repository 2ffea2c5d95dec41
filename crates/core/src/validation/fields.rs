//! Single-value field validators.
//!
//! Each validator checks one value, records an outcome on failure, and
//! returns whether the value passed. None of them hold state.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{json, Value};
use validator::ValidateEmail;

use super::run::{OutcomeKind, ValidationRun};
use crate::types::{as_number, is_decimal_string, is_digit_string, observed_type, FieldKind};

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

/// Phone numbers: digits, `+`, `-`, spaces and parentheses, 6 to 20 chars.
pub const PHONE_PATTERN: &str = r"^[0-9+\-\s()]{6,20}$";

/// Minimum digit count for the strict phone check.
pub const STRICT_PHONE_MIN_DIGITS: usize = 9;

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PHONE_PATTERN).expect("valid regex"));

// ---------------------------------------------------------------------------
// Type
// ---------------------------------------------------------------------------

/// Whether `value` satisfies `kind`, including string-encoded equivalents.
///
/// - `int`: integer numbers or digit-only strings.
/// - `float`: any number or a plain decimal string.
/// - `bool`: booleans, `0`/`1`, or the strings `true`/`false`/`0`/`1`.
pub fn matches_kind(value: &Value, kind: FieldKind) -> bool {
    match kind {
        FieldKind::String => value.is_string(),
        FieldKind::Int => match value {
            Value::Number(n) => n.is_i64() || n.is_u64(),
            Value::String(s) => is_digit_string(s),
            _ => false,
        },
        FieldKind::Float => match value {
            Value::Number(_) => true,
            Value::String(s) => is_decimal_string(s),
            _ => false,
        },
        FieldKind::Bool => match value {
            Value::Bool(_) => true,
            Value::Number(n) => matches!(n.as_u64(), Some(0 | 1)),
            Value::String(s) => matches!(s.as_str(), "true" | "false" | "0" | "1"),
            _ => false,
        },
        FieldKind::Array => value.is_array(),
        FieldKind::Object => value.is_object(),
    }
}

/// Check `value` against a declared kind; records a type mismatch on failure.
pub fn validate_type(run: &mut ValidationRun, value: &Value, kind: FieldKind, field: &str) -> bool {
    if matches_kind(value, kind) {
        return true;
    }
    run.add_error(
        field,
        OutcomeKind::TypeMismatch,
        format!(
            "Field '{field}' must be of type {}, got {}",
            kind.as_str(),
            observed_type(value)
        ),
        json!({
            "value": value,
            "expected_type": kind.as_str(),
            "actual_type": observed_type(value),
        }),
    );
    false
}

// ---------------------------------------------------------------------------
// Range
// ---------------------------------------------------------------------------

/// Inclusive range check. Callers pass string lengths as numbers.
pub fn validate_range(run: &mut ValidationRun, value: f64, min: f64, max: f64, field: &str) -> bool {
    if (min..=max).contains(&value) {
        return true;
    }
    run.add_error(
        field,
        OutcomeKind::Range,
        format!("Field '{field}' must be between {min} and {max}, got {value}"),
        json!({ "value": value, "min": min, "max": max }),
    );
    false
}

/// Range check on the character length of a string.
pub fn validate_length(run: &mut ValidationRun, value: &str, min: usize, max: usize, field: &str) -> bool {
    let length = value.chars().count();
    if (min..=max).contains(&length) {
        return true;
    }
    run.add_error(
        field,
        OutcomeKind::Range,
        format!("Field '{field}' must be between {min} and {max} characters long, got {length}"),
        json!({ "value": value, "length": length, "min": min, "max": max }),
    );
    false
}

// ---------------------------------------------------------------------------
// Pattern
// ---------------------------------------------------------------------------

/// The value must be a string matching `pattern`. Non-strings fail.
pub fn validate_pattern(run: &mut ValidationRun, value: &Value, pattern: &Regex, field: &str) -> bool {
    if let Some(s) = value.as_str() {
        if pattern.is_match(s) {
            return true;
        }
    }
    run.add_error(
        field,
        OutcomeKind::PatternMismatch,
        format!("Field '{field}' has an invalid format"),
        json!({ "value": value, "pattern": pattern.as_str() }),
    );
    false
}

/// Membership in an enumerated set; records an unsupported-value outcome.
pub fn validate_one_of(run: &mut ValidationRun, value: &Value, allowed: &[&str], field: &str) -> bool {
    if value.as_str().is_some_and(|s| allowed.contains(&s)) {
        return true;
    }
    run.add_error(
        field,
        OutcomeKind::UnsupportedValue,
        format!(
            "Field '{field}' must be one of: {}",
            allowed.join(", ")
        ),
        json!({ "value": value, "allowed": allowed }),
    );
    false
}

// ---------------------------------------------------------------------------
// Email / phone
// ---------------------------------------------------------------------------

pub fn is_valid_email(s: &str) -> bool {
    s.validate_email()
}

/// Phone shape check. `strict` additionally demands enough digits.
pub fn is_valid_phone(s: &str, strict: bool) -> bool {
    if !PHONE_RE.is_match(s) {
        return false;
    }
    !strict || s.chars().filter(char::is_ascii_digit).count() >= STRICT_PHONE_MIN_DIGITS
}

pub fn validate_email(run: &mut ValidationRun, value: &Value, field: &str) -> bool {
    if value.as_str().is_some_and(is_valid_email) {
        return true;
    }
    run.add_error(
        field,
        OutcomeKind::PatternMismatch,
        format!("Field '{field}' must be a valid email address"),
        json!({ "value": value }),
    );
    false
}

pub fn validate_phone(run: &mut ValidationRun, value: &Value, field: &str, strict: bool) -> bool {
    if value.as_str().is_some_and(|s| is_valid_phone(s, strict)) {
        return true;
    }
    let mut context = json!({ "value": value, "pattern": PHONE_PATTERN });
    if strict {
        context["min_digits"] = json!(STRICT_PHONE_MIN_DIGITS);
    }
    run.add_error(
        field,
        OutcomeKind::PatternMismatch,
        format!("Field '{field}' must be a valid phone number"),
        context,
    );
    false
}

// ---------------------------------------------------------------------------
// Coercion
// ---------------------------------------------------------------------------

/// Convert a value that already passed [`matches_kind`] to its native form.
///
/// Strings are trimmed; string-encoded numbers and booleans are decoded.
/// Values that cannot be converted are returned unchanged.
pub fn coerce(value: &Value, kind: FieldKind) -> Value {
    match (kind, value) {
        (FieldKind::String, Value::String(s)) => Value::String(s.trim().to_string()),
        (FieldKind::Int, Value::String(s)) => s
            .parse::<u64>()
            .map(Value::from)
            .unwrap_or_else(|_| value.clone()),
        (FieldKind::Float, Value::String(_)) => as_number(value)
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| value.clone()),
        (FieldKind::Bool, Value::String(s)) => Value::Bool(matches!(s.as_str(), "true" | "1")),
        (FieldKind::Bool, Value::Number(n)) => Value::Bool(n.as_u64() == Some(1)),
        _ => value.clone(),
    }
}
