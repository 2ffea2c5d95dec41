//! Validation engine: a fixed sequence of stages over a swappable rule set.
//!
//! Every rule set implements [`RuleSet`]; [`Validator`] owns one and runs
//! the stages in order for each call:
//!
//! 1. structure
//! 2. required fields
//! 3. data types
//! 4. entity-specific rules
//! 5. cross-field relationships
//! 6. limits
//! 7. warning processing
//!
//! Stages record outcomes and never stop the sequence, so one call reports
//! every defect of a record. The single exception is a record that is empty
//! or not an object: there are no fields to look at, so the engine reports
//! the structural error alone.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use super::fields::{coerce, validate_type};
use super::logging::{guarded, TracingLogger, ValidationLogger};
use super::run::{OutcomeKind, OutcomeMap, ValidationRun};
use crate::error::{ValidationFailure, INTERNAL_FAILURE_MESSAGE, STATUS_INTERNAL, STATUS_INVALID};
use crate::types::{as_number, is_blank, observed_type, FieldKind, Record};

/// Field path used for record-level outcomes.
pub const RECORD_FIELD: &str = "data";

/// Field path used for the internal failure outcome.
pub const INTERNAL_FIELD: &str = "internal";

/// Declared type map of a rule set.
pub type TypeMap = &'static [(&'static str, FieldKind)];

// ---------------------------------------------------------------------------
// Rule set contract
// ---------------------------------------------------------------------------

/// The stages one entity kind plugs into the engine.
///
/// Rule sets hold only immutable configuration and may be shared freely.
pub trait RuleSet: Send + Sync {
    /// Entity name used in messages and logs.
    fn entity(&self) -> &'static str;

    /// Declared field types; drives the default type stage and sanitizing.
    fn field_types(&self) -> TypeMap;

    /// Record-level shape. The default rejects an empty record.
    fn validate_structure(&self, record: &Record, run: &mut ValidationRun) {
        if record.is_empty() {
            run.add_error(
                RECORD_FIELD,
                OutcomeKind::Structural,
                "Data cannot be empty",
                json!({ "entity": self.entity() }),
            );
        }
    }

    fn validate_required_fields(&self, record: &Record, run: &mut ValidationRun);

    /// Type checks for every declared field that carries a value.
    fn validate_data_types(&self, record: &Record, run: &mut ValidationRun) {
        validate_declared_types(self.field_types(), record, run);
    }

    fn validate_specific_rules(&self, record: &Record, run: &mut ValidationRun);

    fn validate_relationships(&self, record: &Record, run: &mut ValidationRun);

    fn validate_limits(&self, record: &Record, run: &mut ValidationRun);

    /// Forward accumulated warnings to the logging port.
    fn process_warnings(&self, run: &ValidationRun, logger: &dyn ValidationLogger) {
        if run.has_warnings() {
            let context = json!({ "entity": self.entity(), "warnings": run.warnings });
            guarded(|| logger.warn("validation produced warnings", &context));
        }
    }

    /// Sanitized copy of the declared fields, coerced to their kinds.
    fn sanitize(&self, record: &Record) -> Record {
        self.field_types()
            .iter()
            .filter_map(|(field, kind)| {
                record
                    .get(*field)
                    .filter(|v| !v.is_null())
                    .map(|v| (field.to_string(), coerce(v, *kind)))
            })
            .collect()
    }
}

/// Run [`validate_type`] for every declared, non-blank field.
pub fn validate_declared_types(types: TypeMap, record: &Record, run: &mut ValidationRun) {
    for (field, kind) in types {
        let value = record.get(*field);
        if let (false, Some(value)) = (is_blank(value), value) {
            validate_type(run, value, *kind, field);
        }
    }
}

/// A non-empty string field, if present.
pub fn str_field<'a>(record: &'a Record, field: &str) -> Option<&'a str> {
    record
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// A numeric (or numeric string) field, if present.
pub fn number_field(record: &Record, field: &str) -> Option<f64> {
    record.get(field).and_then(as_number)
}

type Stage<R> = fn(&R, &Record, &mut ValidationRun);

fn stages<R: RuleSet>() -> [(&'static str, Stage<R>); 5] {
    [
        ("required_fields", R::validate_required_fields),
        ("data_types", R::validate_data_types),
        ("specific_rules", R::validate_specific_rules),
        ("relationships", R::validate_relationships),
        ("limits", R::validate_limits),
    ]
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Everything one call produced, whether or not it passed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub entity: &'static str,
    pub valid: bool,
    pub status: Option<u16>,
    pub errors: OutcomeMap,
    pub warnings: OutcomeMap,
    pub validated_data: Record,
}

impl ValidationReport {
    /// Success yields the sanitized record; failure the aggregate error.
    pub fn into_result(self) -> Result<Record, ValidationFailure> {
        match self.status {
            None => Ok(self.validated_data),
            Some(STATUS_INTERNAL) => Err(ValidationFailure::internal(
                self.entity,
                self.errors,
                self.warnings,
            )),
            Some(_) => Err(ValidationFailure::invalid(
                self.entity,
                self.errors,
                self.warnings,
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

/// Runs a rule set's stages against input records.
///
/// Each call owns its own [`ValidationRun`]; a validator can be shared
/// across threads and reused indefinitely.
pub struct Validator<R> {
    rules: R,
    logger: Arc<dyn ValidationLogger>,
}

impl<R: RuleSet> Validator<R> {
    /// Validator logging through `tracing`.
    pub fn new(rules: R) -> Self {
        Self::with_logger(rules, Arc::new(TracingLogger))
    }

    pub fn with_logger(rules: R, logger: Arc<dyn ValidationLogger>) -> Self {
        Self { rules, logger }
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn entity(&self) -> &'static str {
        self.rules.entity()
    }

    /// Validate, returning the sanitized record on success.
    pub fn validate(&self, input: &Value) -> Result<Record, ValidationFailure> {
        self.check(input).into_result()
    }

    /// Validate an already-extracted record.
    pub fn validate_record(&self, record: &Record) -> Result<Record, ValidationFailure> {
        self.check_record(record, None).into_result()
    }

    pub fn is_valid(&self, input: &Value) -> bool {
        self.check(input).valid
    }

    /// Run every stage and return the full report without failing.
    pub fn check(&self, input: &Value) -> ValidationReport {
        match input {
            Value::Object(record) => self.check_record(record, None),
            other => self.check_record(&Record::new(), Some(observed_type(other))),
        }
    }

    fn check_record(&self, record: &Record, non_object: Option<&'static str>) -> ValidationReport {
        let entity = self.rules.entity();
        let mut run = ValidationRun::new();
        tracing::debug!(entity, fields = record.len(), "validation started");

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            self.run_stages(record, non_object, &mut run);
        }));

        if let Err(payload) = outcome {
            let reason = panic_message(payload.as_ref());
            let context = json!({ "entity": entity, "reason": reason });
            guarded(|| self.logger.error(INTERNAL_FAILURE_MESSAGE, &context));

            run.errors.clear();
            run.add_error(
                INTERNAL_FIELD,
                OutcomeKind::Internal,
                INTERNAL_FAILURE_MESSAGE,
                context,
            );
            return report(entity, run, Some(STATUS_INTERNAL));
        }

        if run.has_errors() {
            let context = json!({ "entity": entity, "errors": run.errors });
            guarded(|| self.logger.error("validation failed", &context));
            tracing::debug!(entity, errors = run.errors.len(), "validation failed");
            return report(entity, run, Some(STATUS_INVALID));
        }

        run.validated_data = self.rules.sanitize(record);
        tracing::debug!(entity, warnings = run.warnings.len(), "validation passed");
        report(entity, run, None)
    }

    fn run_stages(&self, record: &Record, non_object: Option<&'static str>, run: &mut ValidationRun) {
        self.rules.validate_structure(record, run);
        if let Some(actual) = non_object {
            run.add_error(
                RECORD_FIELD,
                OutcomeKind::Structural,
                "Data must be a JSON object",
                json!({ "entity": self.rules.entity(), "actual_type": actual }),
            );
        }

        if !record.is_empty() {
            for (name, stage) in stages::<R>() {
                tracing::trace!(entity = self.rules.entity(), stage = name, "running stage");
                stage(&self.rules, record, run);
            }
        }

        self.rules.process_warnings(run, self.logger.as_ref());
    }
}

fn report(entity: &'static str, run: ValidationRun, status: Option<u16>) -> ValidationReport {
    ValidationReport {
        entity,
        valid: status.is_none(),
        status,
        errors: run.errors,
        warnings: run.warnings,
        validated_data: run.validated_data,
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
