//! Product sync payload rules.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::{json, Value};

use crate::types::{FieldKind, Record};
use crate::validation::engine::{number_field, str_field, RuleSet, TypeMap};
use crate::validation::fields::{validate_length, validate_one_of, validate_pattern, validate_range};
use crate::validation::nested::validate_required_fields_list;
use crate::validation::pricing::{PriceContext, PricingRules, StandardPricingRules};
use crate::validation::run::{OutcomeKind, ValidationRun};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const REQUIRED_FIELDS: &[&str] = &["sku", "name", "price", "stock"];

pub const FIELD_TYPES: TypeMap = &[
    ("sku", FieldKind::String),
    ("name", FieldKind::String),
    ("description", FieldKind::String),
    ("price", FieldKind::Float),
    ("stock", FieldKind::Int),
    ("categories", FieldKind::Array),
    ("images", FieldKind::Array),
    ("attributes", FieldKind::Array),
    ("status", FieldKind::String),
    ("type", FieldKind::String),
];

/// Upper-case letters, digits, `-` and `_`.
pub const SKU_PATTERN: &str = r"^[A-Z0-9\-_]+$";

pub const VALID_STATUSES: &[&str] = &["publish", "draft", "private"];

pub const NAME_LENGTH: (usize, usize) = (3, 255);
pub const DESCRIPTION_LENGTH: (usize, usize) = (0, 10_000);
pub const PRICE_RANGE: (f64, f64) = (0.0, 999_999.99);
pub const STOCK_RANGE: (f64, f64) = (0.0, 999_999.0);

/// Product type assumed when the payload does not say.
pub const DEFAULT_PRODUCT_TYPE: &str = "simple";

static SKU_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(SKU_PATTERN).expect("valid regex"));

// ---------------------------------------------------------------------------
// Rule set
// ---------------------------------------------------------------------------

/// Rules for product payloads. Prices are also checked by a [`PricingRules`]
/// collaborator.
#[derive(Clone)]
pub struct ProductRules {
    pricing: Arc<dyn PricingRules>,
}

impl Default for ProductRules {
    fn default() -> Self {
        Self {
            pricing: Arc::new(StandardPricingRules),
        }
    }
}

impl ProductRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pricing(pricing: Arc<dyn PricingRules>) -> Self {
        Self { pricing }
    }
}

/// Every element of `record[field]` must be an object carrying `key`.
fn validate_members_have(run: &mut ValidationRun, record: &Record, field: &str, key: &str) {
    let Some(Value::Array(items)) = record.get(field) else {
        return;
    };
    for (index, item) in items.iter().enumerate() {
        let has_key = item
            .as_object()
            .and_then(|obj| obj.get(key))
            .is_some_and(|v| !v.is_null());
        if !has_key {
            run.add_error(
                format!("{field}.{index}"),
                OutcomeKind::MissingField,
                format!("Each entry in '{field}' must be an object with '{key}'"),
                json!({ "index": index, "value": item, "required_key": key }),
            );
        }
    }
}

fn is_empty_list(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Array(items)) => items.is_empty(),
        _ => false,
    }
}

impl RuleSet for ProductRules {
    fn entity(&self) -> &'static str {
        "product"
    }

    fn field_types(&self) -> TypeMap {
        FIELD_TYPES
    }

    fn validate_required_fields(&self, record: &Record, run: &mut ValidationRun) {
        validate_required_fields_list(run, record, REQUIRED_FIELDS, None);
    }

    fn validate_specific_rules(&self, record: &Record, run: &mut ValidationRun) {
        if let Some(sku) = record.get("sku").filter(|v| v.as_str().is_some_and(|s| !s.is_empty())) {
            validate_pattern(run, sku, &SKU_RE, "sku");
        }
        if let Some(status) = record.get("status").filter(|v| !v.is_null()) {
            validate_one_of(run, status, VALID_STATUSES, "status");
        }
        validate_members_have(run, record, "categories", "id");
        validate_members_have(run, record, "images", "src");
    }

    fn validate_relationships(&self, record: &Record, run: &mut ValidationRun) {
        for (field, message) in [
            ("categories", "Product has no categories assigned"),
            ("images", "Product has no images"),
        ] {
            if is_empty_list(record.get(field)) {
                run.add_warning(field, OutcomeKind::Relationship, message, json!({ "field": field }));
            }
        }

        let Some(price) = number_field(record, "price") else {
            return;
        };
        let context = PriceContext {
            status: str_field(record, "status").unwrap_or("publish").to_string(),
            product_type: str_field(record, "type")
                .unwrap_or(DEFAULT_PRODUCT_TYPE)
                .to_string(),
        };
        let violations = self.pricing.validate_price(price, &context);
        if !violations.is_empty() {
            run.add_error(
                "price",
                OutcomeKind::Relationship,
                violations.join("; "),
                json!({ "value": price, "violations": violations, "context": context }),
            );
        }
    }

    fn validate_limits(&self, record: &Record, run: &mut ValidationRun) {
        if let Some(name) = str_field(record, "name") {
            validate_length(run, name, NAME_LENGTH.0, NAME_LENGTH.1, "name");
        }
        if let Some(Value::String(description)) = record.get("description") {
            validate_length(run, description, DESCRIPTION_LENGTH.0, DESCRIPTION_LENGTH.1, "description");
        }
        if let Some(price) = number_field(record, "price") {
            validate_range(run, price, PRICE_RANGE.0, PRICE_RANGE.1, "price");
        }
        if let Some(stock) = number_field(record, "stock") {
            validate_range(run, stock, STOCK_RANGE.0, STOCK_RANGE.1, "stock");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::engine::Validator;
    use crate::validation::logging::NullLogger;

    fn validator() -> Validator<ProductRules> {
        Validator::with_logger(ProductRules::new(), Arc::new(NullLogger))
    }

    fn valid_product() -> Value {
        json!({
            "sku": "ABC-123_1",
            "name": "Mesa de roble",
            "description": "Mesa maciza",
            "price": "149.90",
            "stock": 12,
            "status": "publish",
            "categories": [{"id": 7}],
            "images": [{"src": "https://cdn.example.com/mesa.jpg"}]
        })
    }

    fn with(mut base: Value, key: &str, value: Value) -> Value {
        base[key] = value;
        base
    }

    // -- happy path ---------------------------------------------------------

    #[test]
    fn valid_product_passes_and_is_sanitized() {
        let data = validator().validate(&valid_product()).unwrap();
        assert_eq!(data["price"], json!(149.9));
        assert_eq!(data["stock"], json!(12));
    }

    // -- specific rules -----------------------------------------------------

    #[test]
    fn sku_pattern() {
        let v = validator();
        assert!(v.is_valid(&with(valid_product(), "sku", json!("ABC-123_1"))));
        let failure = v
            .validate(&with(valid_product(), "sku", json!("abc 123")))
            .unwrap_err();
        assert_eq!(failure.errors["sku"].kind, OutcomeKind::PatternMismatch);
        assert_eq!(failure.errors.len(), 1);
    }

    #[test]
    fn numeric_sku_is_a_type_error_only() {
        let failure = validator()
            .validate(&with(valid_product(), "sku", json!(12345)))
            .unwrap_err();
        assert_eq!(failure.errors["sku"].kind, OutcomeKind::TypeMismatch);
    }

    #[test]
    fn unknown_status_is_unsupported() {
        let failure = validator()
            .validate(&with(valid_product(), "status", json!("trash")))
            .unwrap_err();
        assert_eq!(failure.errors["status"].kind, OutcomeKind::UnsupportedValue);
    }

    #[test]
    fn categories_and_images_need_keys() {
        let product = with(
            with(valid_product(), "categories", json!([{"id": 1}, {"name": "x"}, 3])),
            "images",
            json!([{"alt": "no src"}]),
        );
        let failure = validator().validate(&product).unwrap_err();
        assert!(failure.errors.contains_key("categories.1"));
        assert!(failure.errors.contains_key("categories.2"));
        assert!(failure.errors.contains_key("images.0"));
        assert!(!failure.errors.contains_key("categories.0"));
    }

    // -- relationships ------------------------------------------------------

    #[test]
    fn empty_collections_only_warn() {
        let product = with(with(valid_product(), "categories", json!([])), "images", json!([]));
        let report = validator().check(&product);
        assert!(report.valid);
        assert!(report.warnings.contains_key("categories"));
        assert!(report.warnings.contains_key("images"));
    }

    struct RejectAll;

    impl PricingRules for RejectAll {
        fn validate_price(&self, _price: f64, context: &PriceContext) -> Vec<String> {
            vec![
                format!("no sales for {}", context.product_type),
                "frozen catalog".to_string(),
            ]
        }
    }

    #[test]
    fn pricing_violations_fold_into_price_error() {
        let v = Validator::with_logger(
            ProductRules::with_pricing(Arc::new(RejectAll)),
            Arc::new(NullLogger),
        );
        let failure = v
            .validate(&with(valid_product(), "type", json!("variable")))
            .unwrap_err();
        let price = &failure.errors["price"];
        assert_eq!(price.message, "no sales for variable; frozen catalog");
        assert_eq!(price.context["violations"].as_array().map(Vec::len), Some(2));
        assert_eq!(price.context["context"]["status"], json!("publish"));
    }

    #[test]
    fn free_published_product_is_rejected_by_default_pricing() {
        let failure = validator()
            .validate(&with(valid_product(), "price", json!(0)))
            .unwrap_err();
        assert_eq!(failure.errors["price"].kind, OutcomeKind::Relationship);
    }

    // -- limits -------------------------------------------------------------

    #[test]
    fn limits_are_enforced() {
        let product = with(
            with(with(valid_product(), "name", json!("Ab")), "stock", json!(1_000_000)),
            "price",
            json!(1_000_000),
        );
        let failure = validator().validate(&product).unwrap_err();
        assert_eq!(failure.errors["name"].kind, OutcomeKind::Range);
        assert_eq!(failure.errors["stock"].kind, OutcomeKind::Range);
        assert_eq!(failure.errors["price"].kind, OutcomeKind::Range);
    }

    #[test]
    fn missing_fields_are_reported_together() {
        let failure = validator()
            .validate(&json!({"description": "only this"}))
            .unwrap_err();
        for field in REQUIRED_FIELDS {
            assert_eq!(failure.errors[*field].kind, OutcomeKind::MissingField);
        }
        assert_eq!(failure.errors.len(), REQUIRED_FIELDS.len());
    }
}
