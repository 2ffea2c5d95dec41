//! Pricing-rule port consulted by the product rule set.

use serde::Serialize;

/// Product attributes that pricing rules may depend on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceContext {
    pub status: String,
    pub product_type: String,
}

/// Business pricing rules. Returns one human-readable message per violation.
pub trait PricingRules: Send + Sync {
    fn validate_price(&self, price: f64, context: &PriceContext) -> Vec<String>;
}

// ---------------------------------------------------------------------------
// Default rules
// ---------------------------------------------------------------------------

/// Product types whose price comes from somewhere else.
pub const PRICE_EXEMPT_TYPES: &[&str] = &["external", "grouped"];

/// Maximum number of decimal places in a price.
pub const MAX_PRICE_DECIMALS: u32 = 2;

/// Default rules:
/// - published, sellable products must cost more than zero;
/// - prices carry at most [`MAX_PRICE_DECIMALS`] decimals.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardPricingRules;

impl PricingRules for StandardPricingRules {
    fn validate_price(&self, price: f64, context: &PriceContext) -> Vec<String> {
        let mut violations = Vec::new();

        let sellable = !PRICE_EXEMPT_TYPES.contains(&context.product_type.as_str());
        if context.status == "publish" && sellable && price <= 0.0 {
            violations.push(format!(
                "Published {} products must have a price greater than zero",
                context.product_type
            ));
        }

        if !has_at_most_decimals(price, MAX_PRICE_DECIMALS) {
            violations.push(format!(
                "Price must have at most {MAX_PRICE_DECIMALS} decimal places, got {price}"
            ));
        }

        violations
    }
}

fn has_at_most_decimals(value: f64, decimals: u32) -> bool {
    let scale = 10f64.powi(decimals as i32);
    let scaled = value * scale;
    (scaled - scaled.round()).abs() < 1e-6
}
