//! `verisync-core`: validation of sync payloads exchanged between the
//! storefront and the ERP.
//!
//! A payload (product, order, customer, or a sync descriptor) is checked by
//! the matching rule set in [`entities`], run through the staged engine in
//! [`validation::engine`].

pub mod entities;
pub mod error;
pub mod types;
pub mod validation;

pub use entities::{EntityKind, EntityValidators};
pub use error::ValidationFailure;
pub use types::{FieldKind, Record};
pub use validation::engine::{RuleSet, ValidationReport, Validator};
