use serde::Serialize;

use crate::validation::run::OutcomeMap;

/// Status for an ordinary validation failure.
pub const STATUS_INVALID: u16 = 400;

/// Status for an unexpected failure while running the stages.
pub const STATUS_INTERNAL: u16 = 500;

/// Message attached to the internal failure path.
pub const INTERNAL_FAILURE_MESSAGE: &str = "unexpected error during validation";

/// Aggregate failure returned once per `validate()` call.
///
/// Bundles every field-level error and warning recorded across all stages,
/// so a caller can surface all defects of a record at once.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct ValidationFailure {
    pub message: String,
    pub status: u16,
    pub entity: &'static str,
    pub errors: OutcomeMap,
    pub warnings: OutcomeMap,
}

impl ValidationFailure {
    /// Failure built from the errors a run recorded.
    pub fn invalid(entity: &'static str, errors: OutcomeMap, warnings: OutcomeMap) -> Self {
        Self {
            message: format!("{entity} validation failed with {} error(s)", errors.len()),
            status: STATUS_INVALID,
            entity,
            errors,
            warnings,
        }
    }

    /// Failure for the internal error path.
    pub fn internal(entity: &'static str, errors: OutcomeMap, warnings: OutcomeMap) -> Self {
        Self {
            message: INTERNAL_FAILURE_MESSAGE.to_string(),
            status: STATUS_INTERNAL,
            entity,
            errors,
            warnings,
        }
    }

    pub fn is_internal(&self) -> bool {
        self.status == STATUS_INTERNAL
    }
}
