//! Helpers for required fields and nested address sections.
//!
//! An optional nested section (`billing`, `shipping`) that is absent is
//! never an error on its own; the helpers simply do nothing.

use serde_json::{json, Value};

use super::fields::{validate_email, validate_length, validate_phone};
use super::run::{OutcomeKind, ValidationRun};
use crate::types::{is_blank, lookup, Record};

// ---------------------------------------------------------------------------
// Address limits
// ---------------------------------------------------------------------------

/// Address sections that share the length table.
pub const ADDRESS_SECTIONS: &[&str] = &["billing", "shipping"];

/// A character-length limit for one address field.
pub struct LengthLimit {
    pub field: &'static str,
    pub min: usize,
    pub max: usize,
}

/// Length limits applied to every address section.
pub const ADDRESS_FIELD_LIMITS: &[LengthLimit] = &[
    LengthLimit { field: "first_name", min: 1, max: 50 },
    LengthLimit { field: "last_name", min: 1, max: 50 },
    LengthLimit { field: "address_1", min: 1, max: 100 },
    LengthLimit { field: "city", min: 1, max: 50 },
    LengthLimit { field: "state", min: 1, max: 50 },
    LengthLimit { field: "postcode", min: 1, max: 20 },
    LengthLimit { field: "country", min: 2, max: 2 },
];

// ---------------------------------------------------------------------------
// Required fields
// ---------------------------------------------------------------------------

fn prefixed(prefix: Option<&str>, field: &str) -> String {
    match prefix {
        Some(p) if !p.is_empty() => format!("{p}.{field}"),
        _ => field.to_string(),
    }
}

/// One missing-field outcome per field that is absent, `null`, or `""`.
///
/// Returns the number of fields reported.
pub fn validate_required_fields_list(
    run: &mut ValidationRun,
    record: &Record,
    fields: &[&str],
    prefix: Option<&str>,
) -> usize {
    let mut missing = 0;
    for field in fields {
        if is_blank(record.get(*field)) {
            let path = prefixed(prefix, field);
            run.add_error(
                path.clone(),
                OutcomeKind::MissingField,
                format!("Field '{path}' is required"),
                json!({ "field": path }),
            );
            missing += 1;
        }
    }
    missing
}

/// Required fields inside `record[section]`, keyed `section.field`.
///
/// No-op when the section is absent or is not an object.
pub fn validate_nested_required_fields(
    run: &mut ValidationRun,
    record: &Record,
    section: &str,
    fields: &[&str],
) -> usize {
    match record.get(section) {
        Some(Value::Object(nested)) => {
            validate_required_fields_list(run, nested, fields, Some(section))
        }
        _ => 0,
    }
}

// ---------------------------------------------------------------------------
// Nested formats
// ---------------------------------------------------------------------------

fn nested_value<'a>(record: &'a Record, path: &str) -> Option<&'a Value> {
    lookup(record, path).filter(|value| !is_blank(Some(value)))
}

/// Email format of `record[section][field]`; no-op when absent.
pub fn validate_nested_email(
    run: &mut ValidationRun,
    record: &Record,
    section: &str,
    field: &str,
) -> bool {
    let path = format!("{section}.{field}");
    match nested_value(record, &path) {
        Some(value) => validate_email(run, value, &path),
        None => true,
    }
}

/// Phone format of `record[section][field]`; no-op when absent.
pub fn validate_nested_phone(
    run: &mut ValidationRun,
    record: &Record,
    section: &str,
    field: &str,
) -> bool {
    let path = format!("{section}.{field}");
    match nested_value(record, &path) {
        Some(value) => validate_phone(run, value, &path, false),
        None => true,
    }
}

/// Apply [`ADDRESS_FIELD_LIMITS`] to `billing.*` and `shipping.*`.
///
/// Only present, non-empty strings are measured.
pub fn validate_address_fields_limits(run: &mut ValidationRun, record: &Record) {
    for section in ADDRESS_SECTIONS {
        let Some(Value::Object(address)) = record.get(*section) else {
            continue;
        };
        for limit in ADDRESS_FIELD_LIMITS {
            if let Some(Value::String(s)) = address.get(limit.field) {
                if !s.is_empty() {
                    let path = format!("{section}.{}", limit.field);
                    validate_length(run, s, limit.min, limit.max, &path);
                }
            }
        }
    }
}
