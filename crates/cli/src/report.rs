//! Batch report over many validation calls.

use serde::Serialize;
use verisync_core::validation::run::OutcomeMap;
use verisync_core::{EntityKind, ValidationReport};

use crate::config::OutputFormat;
use crate::error::CliError;

/// Every record passed, and warnings were not fatal.
pub const EXIT_OK: u8 = 0;
/// At least one record failed.
pub const EXIT_INVALID: u8 = 1;

/// Outcome of one input record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordResult {
    pub index: usize,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "OutcomeMap::is_empty")]
    pub errors: OutcomeMap,
    #[serde(skip_serializing_if = "OutcomeMap::is_empty")]
    pub warnings: OutcomeMap,
}

impl RecordResult {
    fn new(index: usize, report: &ValidationReport) -> Self {
        Self {
            index,
            valid: report.valid,
            status: report.status,
            errors: report.errors.clone(),
            warnings: report.warnings.clone(),
        }
    }
}

/// Summary printed by the binary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub entity: EntityKind,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Records carrying at least one warning, valid or not.
    pub with_warnings: usize,
    pub records: Vec<RecordResult>,
}

impl BatchReport {
    pub fn new(entity: EntityKind, reports: &[ValidationReport]) -> Self {
        let records: Vec<RecordResult> = reports
            .iter()
            .enumerate()
            .map(|(index, report)| RecordResult::new(index, report))
            .collect();
        let passed = records.iter().filter(|r| r.valid).count();

        Self {
            entity,
            total: records.len(),
            passed,
            failed: records.len() - passed,
            with_warnings: records.iter().filter(|r| !r.warnings.is_empty()).count(),
            records,
        }
    }

    pub fn exit_code(&self, fail_on_warnings: bool) -> u8 {
        if self.failed > 0 || (fail_on_warnings && self.with_warnings > 0) {
            EXIT_INVALID
        } else {
            EXIT_OK
        }
    }

    pub fn render(&self, format: OutputFormat) -> Result<String, CliError> {
        let text = match format {
            OutputFormat::Pretty => serde_json::to_string_pretty(self)?,
            OutputFormat::Compact => serde_json::to_string(self)?,
        };
        Ok(text)
    }
}
