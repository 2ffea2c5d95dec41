//! Integration tests for batch reports built from real validation runs.

use std::sync::Arc;

use serde_json::{json, Value};
use verisync_cli::config::OutputFormat;
use verisync_cli::input::parse_records;
use verisync_cli::report::{BatchReport, EXIT_INVALID, EXIT_OK};
use verisync_core::validation::logging::NullLogger;
use verisync_core::{EntityKind, EntityValidators};

fn run(kind: EntityKind, text: &str) -> BatchReport {
    let validators = EntityValidators::with_logger(Arc::new(NullLogger));
    let reports: Vec<_> = parse_records(text)
        .expect("input should parse")
        .iter()
        .map(|record| validators.check(kind, record))
        .collect();
    BatchReport::new(kind, &reports)
}

// ---------------------------------------------------------------------------
// Test: counts and exit status
// ---------------------------------------------------------------------------

#[test]
fn mixed_batch_counts_each_record() {
    let batch = run(
        EntityKind::SyncDescriptor,
        r#"[
            {"entity": "geo", "direction": "verial_to_wc"},
            {"entity": "geo", "direction": "wc_to_verial"},
            {}
        ]"#,
    );

    assert_eq!(batch.total, 3);
    assert_eq!(batch.passed, 1);
    assert_eq!(batch.failed, 2);
    assert_eq!(batch.exit_code(false), EXIT_INVALID);
    assert!(batch.records[1].errors.contains_key("direction"));
    assert!(batch.records[2].errors.contains_key("data"));
}

#[test]
fn warnings_only_fail_when_requested() {
    let product = json!({"sku": "MESA-01", "name": "Mesa roble", "price": "120.50", "stock": 4});
    let batch = run(EntityKind::Product, &product.to_string());

    assert_eq!(batch.passed, 1);
    assert_eq!(batch.with_warnings, 1);
    assert_eq!(batch.exit_code(false), EXIT_OK);
    assert_eq!(batch.exit_code(true), EXIT_INVALID);
}

// ---------------------------------------------------------------------------
// Test: rendered JSON
// ---------------------------------------------------------------------------

#[test]
fn compact_rendering_omits_empty_sections() {
    let batch = run(
        EntityKind::SyncDescriptor,
        "{\"entity\": \"media\", \"direction\": \"wc_to_verial\"}\n",
    );
    let text = batch.render(OutputFormat::Compact).unwrap();
    assert!(!text.contains('\n'));

    let parsed: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["entity"], "sync_descriptor");
    assert_eq!(parsed["records"][0], json!({"index": 0, "valid": true}));
}

#[test]
fn failed_records_carry_status_and_outcomes() {
    let batch = run(EntityKind::Customer, r#"{"email": "not-an-email"}"#);
    let parsed: Value = serde_json::from_str(&batch.render(OutputFormat::Pretty).unwrap()).unwrap();

    let record = &parsed["records"][0];
    assert_eq!(record["valid"], false);
    assert_eq!(record["status"], 400);
    assert_eq!(record["errors"]["email"]["kind"], "pattern_mismatch");
    assert_eq!(record["errors"]["first_name"]["kind"], "missing_field");
}
