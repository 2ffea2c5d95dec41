//! Customer sync payload rules.
//!
//! Billing e-mail drift from the account e-mail is an error; billing name
//! drift is only a warning.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{json, Value};

use crate::types::{FieldKind, Record};
use crate::validation::engine::{str_field, RuleSet, TypeMap};
use crate::validation::fields::{validate_email, validate_length, validate_pattern};
use crate::validation::nested::{
    validate_nested_email, validate_nested_phone, validate_nested_required_fields,
    validate_required_fields_list,
};
use crate::validation::run::{OutcomeKind, ValidationRun};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const REQUIRED_FIELDS: &[&str] = &["email", "first_name", "last_name"];

pub const BILLING_REQUIRED_FIELDS: &[&str] = &[
    "first_name", "last_name", "address_1", "city", "state", "postcode", "country", "email", "phone",
];

pub const SHIPPING_REQUIRED_FIELDS: &[&str] = &[
    "first_name", "last_name", "address_1", "city", "state", "postcode", "country",
];

pub const FIELD_TYPES: TypeMap = &[
    ("email", FieldKind::String),
    ("first_name", FieldKind::String),
    ("last_name", FieldKind::String),
    ("username", FieldKind::String),
    ("password", FieldKind::String),
    ("billing", FieldKind::Object),
    ("shipping", FieldKind::Object),
];

pub const USERNAME_PATTERN: &str = r"^[a-zA-Z0-9._\-]+$";

pub const NAME_LENGTH: (usize, usize) = (2, 50);
pub const USERNAME_LENGTH: (usize, usize) = (3, 60);
pub const PASSWORD_LENGTH: (usize, usize) = (8, 100);

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(USERNAME_PATTERN).expect("valid regex"));

// ---------------------------------------------------------------------------
// Rule set
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct CustomerRules;

impl CustomerRules {
    pub fn new() -> Self {
        Self
    }
}

/// Missing character classes of a password: upper, lower, digit.
pub fn password_weaknesses(password: &str) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if !password.chars().any(|c| c.is_uppercase()) {
        missing.push("uppercase");
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        missing.push("lowercase");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        missing.push("digit");
    }
    missing
}

fn billing_str<'a>(record: &'a Record, field: &str) -> Option<&'a str> {
    record
        .get("billing")
        .and_then(Value::as_object)
        .and_then(|billing| str_field(billing, field))
}

impl RuleSet for CustomerRules {
    fn entity(&self) -> &'static str {
        "customer"
    }

    fn field_types(&self) -> TypeMap {
        FIELD_TYPES
    }

    fn validate_required_fields(&self, record: &Record, run: &mut ValidationRun) {
        validate_required_fields_list(run, record, REQUIRED_FIELDS, None);
        validate_nested_required_fields(run, record, "billing", BILLING_REQUIRED_FIELDS);
        validate_nested_required_fields(run, record, "shipping", SHIPPING_REQUIRED_FIELDS);
    }

    fn validate_specific_rules(&self, record: &Record, run: &mut ValidationRun) {
        if let Some(email) = record.get("email").filter(|v| v.as_str().is_some_and(|s| !s.is_empty())) {
            validate_email(run, email, "email");
        }
        if let Some(username) = record.get("username").filter(|v| v.as_str().is_some_and(|s| !s.is_empty())) {
            validate_pattern(run, username, &USERNAME_RE, "username");
        }
        if let Some(password) = str_field(record, "password") {
            let missing = password_weaknesses(password);
            if !missing.is_empty() {
                run.add_error(
                    "password",
                    OutcomeKind::PatternMismatch,
                    "Password must contain at least one uppercase letter, one lowercase letter and one digit",
                    json!({ "missing": missing }),
                );
            }
        }
        validate_nested_email(run, record, "billing", "email");
        validate_nested_phone(run, record, "billing", "phone");
    }

    fn validate_relationships(&self, record: &Record, run: &mut ValidationRun) {
        if let (Some(primary), Some(billing)) = (str_field(record, "email"), billing_str(record, "email")) {
            if !primary.trim().eq_ignore_ascii_case(billing.trim()) {
                run.add_error(
                    "billing.email",
                    OutcomeKind::Relationship,
                    "Billing email must match the customer email",
                    json!({ "email": primary, "billing_email": billing }),
                );
            }
        }

        for field in ["first_name", "last_name"] {
            if let (Some(primary), Some(billing)) = (str_field(record, field), billing_str(record, field)) {
                if primary.trim() != billing.trim() {
                    run.add_warning(
                        format!("billing.{field}"),
                        OutcomeKind::Relationship,
                        format!("Billing {} differs from the customer's", field.replace('_', " ")),
                        json!({ "field": field, "value": primary, "billing_value": billing }),
                    );
                }
            }
        }
    }

    fn validate_limits(&self, record: &Record, run: &mut ValidationRun) {
        for (field, (min, max)) in [
            ("first_name", NAME_LENGTH),
            ("last_name", NAME_LENGTH),
            ("username", USERNAME_LENGTH),
            ("password", PASSWORD_LENGTH),
        ] {
            if let Some(value) = str_field(record, field) {
                validate_length(run, value, min, max, field);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::engine::Validator;
    use crate::validation::logging::NullLogger;
    use std::sync::Arc;

    fn validator() -> Validator<CustomerRules> {
        Validator::with_logger(CustomerRules::new(), Arc::new(NullLogger))
    }

    fn customer() -> Value {
        json!({
            "email": "a@x.com",
            "first_name": "Ana",
            "last_name": "García",
            "username": "ana.garcia",
            "password": "Secreto123",
            "billing": {
                "first_name": "Ana",
                "last_name": "García",
                "address_1": "Gran Vía 10",
                "city": "Madrid",
                "state": "M",
                "postcode": "28013",
                "country": "ES",
                "email": "a@x.com",
                "phone": "+34 600 123 456"
            }
        })
    }

    #[test]
    fn valid_customer_passes() {
        let report = validator().check(&customer());
        assert!(report.valid, "{:?}", report.errors);
        assert!(report.warnings.is_empty());
        assert!(!report.validated_data.contains_key("unknown"));
    }

    #[test]
    fn billing_email_mismatch_is_the_only_error() {
        let mut c = customer();
        c["billing"]["email"] = json!("b@x.com");
        let failure = validator().validate(&c).unwrap_err();
        assert_eq!(failure.errors.len(), 1);
        assert_eq!(failure.errors["billing.email"].kind, OutcomeKind::Relationship);
    }

    #[test]
    fn billing_email_comparison_ignores_case() {
        let mut c = customer();
        c["billing"]["email"] = json!("A@X.com");
        assert!(validator().is_valid(&c));
    }

    #[test]
    fn billing_name_mismatch_only_warns() {
        let mut c = customer();
        c["billing"]["first_name"] = json!("Anabel");
        let report = validator().check(&c);
        assert!(report.valid);
        assert_eq!(report.warnings["billing.first_name"].kind, OutcomeKind::Relationship);
    }

    #[test]
    fn password_strength() {
        assert!(password_weaknesses("Secreto123").is_empty());
        assert_eq!(password_weaknesses("secreto123"), vec!["uppercase"]);
        assert_eq!(password_weaknesses("SECRETO"), vec!["lowercase", "digit"]);

        let mut c = customer();
        c["password"] = json!("alllowercase1");
        let failure = validator().validate(&c).unwrap_err();
        assert_eq!(failure.errors["password"].context["missing"], json!(["uppercase"]));
    }

    #[test]
    fn username_pattern_and_limits() {
        let mut c = customer();
        c["username"] = json!("ana garcia");
        let failure = validator().validate(&c).unwrap_err();
        assert_eq!(failure.errors["username"].kind, OutcomeKind::PatternMismatch);

        c["username"] = json!("an");
        let failure = validator().validate(&c).unwrap_err();
        assert_eq!(failure.errors["username"].kind, OutcomeKind::Range);
    }

    #[test]
    fn name_and_password_lengths() {
        let mut c = customer();
        c["first_name"] = json!("A");
        c["password"] = json!("Ab1");
        c["billing"]["first_name"] = json!("A");
        let failure = validator().validate(&c).unwrap_err();
        assert_eq!(failure.errors["first_name"].kind, OutcomeKind::Range);
        assert_eq!(failure.errors["password"].kind, OutcomeKind::Range);
    }

    #[test]
    fn invalid_primary_email() {
        let mut c = customer();
        c["email"] = json!("not-an-email");
        let failure = validator().validate(&c).unwrap_err();
        assert_eq!(failure.errors["email"].kind, OutcomeKind::PatternMismatch);
        assert_eq!(failure.errors["billing.email"].kind, OutcomeKind::Relationship);
    }

    #[test]
    fn incomplete_shipping_is_reported() {
        let mut c = customer();
        c["shipping"] = json!({"first_name": "Ana"});
        let failure = validator().validate(&c).unwrap_err();
        assert_eq!(failure.errors.len(), SHIPPING_REQUIRED_FIELDS.len() - 1);
        assert!(failure.errors.contains_key("shipping.country"));
    }
}
