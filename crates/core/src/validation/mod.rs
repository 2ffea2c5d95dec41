//! Data validation pipeline.
//!
//! Provides the per-call collector, single-field validators, nested-section
//! helpers, the staged engine and the ports it consumes. Pure logic; no I/O.

pub mod engine;
pub mod fields;
pub mod logging;
pub mod nested;
pub mod pricing;
pub mod run;
