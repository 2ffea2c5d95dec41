//! `verisync-cli` library crate.
//!
//! Re-exports the batch validation modules for integration testing. The
//! binary entrypoint lives in `main.rs`.

pub mod config;
pub mod error;
pub mod input;
pub mod report;
