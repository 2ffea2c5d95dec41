//! Order sync payload rules, including total reconciliation.

use serde_json::{json, Value};

use crate::types::{as_number, is_blank, FieldKind, Record};
use crate::validation::engine::{number_field, RuleSet, TypeMap};
use crate::validation::fields::{validate_one_of, validate_range};
use crate::validation::nested::{
    validate_address_fields_limits, validate_nested_email, validate_nested_phone,
    validate_nested_required_fields, validate_required_fields_list,
};
use crate::validation::run::{OutcomeKind, ValidationRun};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const REQUIRED_FIELDS: &[&str] = &["customer_id", "status", "billing", "shipping", "line_items"];

/// Address fields required in both sections.
pub const ADDRESS_REQUIRED_FIELDS: &[&str] = &[
    "first_name", "last_name", "address_1", "city", "state", "postcode", "country",
];

/// Billing also needs contact details.
pub const BILLING_REQUIRED_FIELDS: &[&str] = &[
    "first_name", "last_name", "address_1", "city", "state", "postcode", "country", "email", "phone",
];

pub const FIELD_TYPES: TypeMap = &[
    ("customer_id", FieldKind::Int),
    ("status", FieldKind::String),
    ("billing", FieldKind::Object),
    ("shipping", FieldKind::Object),
    ("line_items", FieldKind::Array),
    ("total", FieldKind::Float),
    ("shipping_total", FieldKind::Float),
    ("payment_method", FieldKind::String),
    ("currency", FieldKind::String),
    ("customer_note", FieldKind::String),
];

pub const VALID_STATUSES: &[&str] = &[
    "pending", "processing", "on-hold", "completed", "cancelled", "refunded", "failed",
];

/// Allowed gap between computed and declared order totals.
pub const DEFAULT_TOTAL_TOLERANCE: f64 = 0.01;

pub const AMOUNT_RANGE: (f64, f64) = (0.0, 999_999.99);

// ---------------------------------------------------------------------------
// Rule set
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct OrderRules {
    tolerance: f64,
}

impl Default for OrderRules {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOTAL_TOLERANCE,
        }
    }
}

impl OrderRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(tolerance: f64) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

/// Absorbs binary float error so a gap of exactly the tolerance passes.
const TOTAL_EPSILON: f64 = 1e-9;

fn round2(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

fn line_items(record: &Record) -> Option<&Vec<Value>> {
    record.get("line_items").and_then(Value::as_array)
}

fn validate_line_item(run: &mut ValidationRun, index: usize, item: &Value) {
    let path = format!("line_items.{index}");
    let Some(fields) = item.as_object() else {
        run.add_error(
            path,
            OutcomeKind::TypeMismatch,
            format!("Line item {index} must be an object"),
            json!({ "index": index, "value": item }),
        );
        return;
    };

    if is_blank(fields.get("product_id")) {
        let field = format!("{path}.product_id");
        run.add_error(
            field.clone(),
            OutcomeKind::MissingField,
            format!("Field '{field}' is required"),
            json!({ "field": field }),
        );
    }

    let quantity = fields.get("quantity");
    if !quantity.and_then(as_number).is_some_and(|q| q > 0.0) {
        run.add_error(
            format!("{path}.quantity"),
            OutcomeKind::Range,
            format!("Line item {index} must have a quantity greater than zero"),
            json!({ "index": index, "value": quantity, "min_exclusive": 0 }),
        );
    }
}

impl RuleSet for OrderRules {
    fn entity(&self) -> &'static str {
        "order"
    }

    fn field_types(&self) -> TypeMap {
        FIELD_TYPES
    }

    fn validate_required_fields(&self, record: &Record, run: &mut ValidationRun) {
        validate_required_fields_list(run, record, REQUIRED_FIELDS, None);
        validate_nested_required_fields(run, record, "billing", BILLING_REQUIRED_FIELDS);
        validate_nested_required_fields(run, record, "shipping", ADDRESS_REQUIRED_FIELDS);
    }

    fn validate_specific_rules(&self, record: &Record, run: &mut ValidationRun) {
        if let Some(status) = record.get("status").filter(|v| !is_blank(Some(*v))) {
            validate_one_of(run, status, VALID_STATUSES, "status");
        }
        validate_nested_email(run, record, "billing", "email");
        validate_nested_phone(run, record, "billing", "phone");

        if let Some(items) = line_items(record) {
            for (index, item) in items.iter().enumerate() {
                validate_line_item(run, index, item);
            }
        }
    }

    fn validate_relationships(&self, record: &Record, run: &mut ValidationRun) {
        let Some(items) = line_items(record) else {
            return;
        };
        if items.is_empty() {
            run.add_error(
                "line_items",
                OutcomeKind::Relationship,
                "Order must contain at least one line item",
                json!({ "count": 0 }),
            );
            return;
        }

        let Some(provided) = number_field(record, "total") else {
            return;
        };
        let items_total: f64 = items
            .iter()
            .filter_map(|item| item.get("total").and_then(as_number))
            .sum();
        let shipping_total = number_field(record, "shipping_total").unwrap_or(0.0);
        let calculated = items_total + shipping_total;

        if (calculated - provided).abs() > self.tolerance + TOTAL_EPSILON {
            run.add_error(
                "total",
                OutcomeKind::Relationship,
                format!(
                    "Order total {:.2} does not match the calculated total {:.2}",
                    provided, calculated
                ),
                json!({
                    "calculated_total": round2(calculated),
                    "provided_total": round2(provided),
                    "items_total": round2(items_total),
                    "shipping_total": round2(shipping_total),
                    "tolerance": self.tolerance,
                }),
            );
        }
    }

    fn validate_limits(&self, record: &Record, run: &mut ValidationRun) {
        validate_address_fields_limits(run, record);
        for field in ["total", "shipping_total"] {
            if let Some(amount) = number_field(record, field) {
                validate_range(run, amount, AMOUNT_RANGE.0, AMOUNT_RANGE.1, field);
            }
        }
    }
}
