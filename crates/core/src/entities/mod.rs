//! Entity rule sets and kind-based dispatch.

pub mod customer;
pub mod order;
pub mod product;
pub mod sync;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationFailure;
use crate::types::Record;
use crate::validation::engine::{ValidationReport, Validator};
use crate::validation::logging::{TracingLogger, ValidationLogger};

pub use customer::CustomerRules;
pub use order::OrderRules;
pub use product::ProductRules;
pub use sync::SyncDescriptorRules;

/// Kind of payload being synchronized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Product,
    Order,
    Customer,
    SyncDescriptor,
}

/// All kinds, in dispatch order.
pub const ALL_KINDS: &[EntityKind] = &[
    EntityKind::Product,
    EntityKind::Order,
    EntityKind::Customer,
    EntityKind::SyncDescriptor,
];

impl EntityKind {
    /// Parse a kind name; plural forms and `client(s)` are accepted.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "product" | "products" => Ok(Self::Product),
            "order" | "orders" => Ok(Self::Order),
            "customer" | "customers" | "client" | "clients" => Ok(Self::Customer),
            "sync" | "sync_descriptor" => Ok(Self::SyncDescriptor),
            other => Err(format!(
                "Unknown entity kind '{other}'. Must be one of: {}",
                ALL_KINDS
                    .iter()
                    .map(EntityKind::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Order => "order",
            Self::Customer => "customer",
            Self::SyncDescriptor => "sync_descriptor",
        }
    }
}

/// One long-lived validator per entity kind, sharing a logger.
pub struct EntityValidators {
    product: Validator<ProductRules>,
    order: Validator<OrderRules>,
    customer: Validator<CustomerRules>,
    sync: Validator<SyncDescriptorRules>,
}

impl Default for EntityValidators {
    fn default() -> Self {
        Self::with_logger(Arc::new(TracingLogger))
    }
}

impl EntityValidators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_logger(logger: Arc<dyn ValidationLogger>) -> Self {
        Self {
            product: Validator::with_logger(ProductRules::new(), logger.clone()),
            order: Validator::with_logger(OrderRules::new(), logger.clone()),
            customer: Validator::with_logger(CustomerRules::new(), logger.clone()),
            sync: Validator::with_logger(SyncDescriptorRules, logger),
        }
    }

    /// Replace the product validator, e.g. to inject pricing rules.
    pub fn with_product_rules(mut self, rules: ProductRules, logger: Arc<dyn ValidationLogger>) -> Self {
        self.product = Validator::with_logger(rules, logger);
        self
    }

    pub fn check(&self, kind: EntityKind, input: &Value) -> ValidationReport {
        match kind {
            EntityKind::Product => self.product.check(input),
            EntityKind::Order => self.order.check(input),
            EntityKind::Customer => self.customer.check(input),
            EntityKind::SyncDescriptor => self.sync.check(input),
        }
    }

    pub fn validate(&self, kind: EntityKind, input: &Value) -> Result<Record, ValidationFailure> {
        self.check(kind, input).into_result()
    }
}
