//! Sync descriptor rules: which entity moves in which direction.
//!
//! The descriptor is `{entity, direction}`. Some entities only ever flow
//! from the ERP into the store.

use serde_json::json;

use crate::types::{FieldKind, Record};
use crate::validation::engine::{str_field, RuleSet, TypeMap, Validator};
use crate::validation::fields::{validate_length, validate_one_of};
use crate::validation::nested::validate_required_fields_list;
use crate::validation::run::{OutcomeKind, ValidationRun};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const ENTITY_PRODUCTS: &str = "products";
pub const ENTITY_CLIENTS: &str = "clients";
pub const ENTITY_ORDERS: &str = "orders";
pub const ENTITY_CATEGORIES: &str = "categories";
pub const ENTITY_GEO: &str = "geo";
pub const ENTITY_CONFIG: &str = "config";
pub const ENTITY_MEDIA: &str = "media";

pub const SUPPORTED_ENTITIES: &[&str] = &[
    ENTITY_PRODUCTS,
    ENTITY_CLIENTS,
    ENTITY_ORDERS,
    ENTITY_CATEGORIES,
    ENTITY_GEO,
    ENTITY_CONFIG,
    ENTITY_MEDIA,
];

/// ERP to storefront.
pub const DIRECTION_VERIAL_TO_WC: &str = "verial_to_wc";
/// Storefront to ERP.
pub const DIRECTION_WC_TO_VERIAL: &str = "wc_to_verial";

pub const SUPPORTED_DIRECTIONS: &[&str] = &[DIRECTION_VERIAL_TO_WC, DIRECTION_WC_TO_VERIAL];

/// Entities that only import from the ERP.
const IMPORT_ONLY: &[&str] = &[DIRECTION_VERIAL_TO_WC];

pub const REQUIRED_FIELDS: &[&str] = &["entity", "direction"];

pub const FIELD_TYPES: TypeMap = &[("entity", FieldKind::String), ("direction", FieldKind::String)];

/// Upper bound on identifier length, generous for both fields.
pub const MAX_IDENTIFIER_LENGTH: usize = 50;

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

pub fn supported_entities() -> &'static [&'static str] {
    SUPPORTED_ENTITIES
}

pub fn supported_directions() -> &'static [&'static str] {
    SUPPORTED_DIRECTIONS
}

/// Directions allowed for `entity`, or `None` for an unknown entity.
pub fn allowed_directions(entity: &str) -> Option<&'static [&'static str]> {
    match entity {
        ENTITY_GEO | ENTITY_CONFIG => Some(IMPORT_ONLY),
        e if SUPPORTED_ENTITIES.contains(&e) => Some(SUPPORTED_DIRECTIONS),
        _ => None,
    }
}

/// One-shot check; the aggregate failure is logged and reduced to `false`.
pub fn validate_entity_and_direction(entity: &str, direction: &str) -> bool {
    Validator::new(SyncDescriptorRules)
        .is_valid(&json!({ "entity": entity, "direction": direction }))
}

// ---------------------------------------------------------------------------
// Rule set
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncDescriptorRules;

impl RuleSet for SyncDescriptorRules {
    fn entity(&self) -> &'static str {
        "sync_descriptor"
    }

    fn field_types(&self) -> TypeMap {
        FIELD_TYPES
    }

    fn validate_required_fields(&self, record: &Record, run: &mut ValidationRun) {
        validate_required_fields_list(run, record, REQUIRED_FIELDS, None);
    }

    fn validate_specific_rules(&self, record: &Record, run: &mut ValidationRun) {
        if let Some(entity) = record.get("entity").filter(|v| v.is_string()) {
            validate_one_of(run, entity, SUPPORTED_ENTITIES, "entity");
        }
        if let Some(direction) = record.get("direction").filter(|v| v.is_string()) {
            validate_one_of(run, direction, SUPPORTED_DIRECTIONS, "direction");
        }
    }

    fn validate_relationships(&self, record: &Record, run: &mut ValidationRun) {
        let (Some(entity), Some(direction)) = (str_field(record, "entity"), str_field(record, "direction"))
        else {
            return;
        };
        if !SUPPORTED_DIRECTIONS.contains(&direction) {
            return;
        }
        let Some(allowed) = allowed_directions(entity) else {
            return;
        };
        if !allowed.contains(&direction) {
            run.add_error(
                "direction",
                OutcomeKind::Relationship,
                format!("Entity '{entity}' cannot be synchronized in direction '{direction}'"),
                json!({
                    "entity": entity,
                    "direction": direction,
                    "allowed_directions": allowed,
                }),
            );
        }
    }

    fn validate_limits(&self, record: &Record, run: &mut ValidationRun) {
        for field in REQUIRED_FIELDS {
            if let Some(value) = str_field(record, field) {
                validate_length(run, value, 1, MAX_IDENTIFIER_LENGTH, field);
            }
        }
    }
}
