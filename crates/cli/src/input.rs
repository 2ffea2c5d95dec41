//! Reading input records.
//!
//! Accepted shapes: a single JSON value, a JSON array of values, or JSON
//! lines (one value per non-blank line). Non-object values are passed on
//! unchanged; the engine reports them as structural errors.

use std::io::Read;
use std::path::Path;

use serde_json::Value;

use crate::error::CliError;

/// Read the whole input from `path`, or from standard input.
pub fn read_source(path: Option<&Path>) -> Result<String, CliError> {
    match path {
        Some(path) => std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(CliError::Stdin)?;
            Ok(text)
        }
    }
}

/// Split input text into records.
pub fn parse_records(text: &str) -> Result<Vec<Value>, CliError> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(value) => Ok(vec![value]),
        Err(err) if text.trim().lines().nth(1).is_some() => {
            tracing::debug!(error = %err, "input is not a single JSON document, trying JSON lines");
            parse_lines(text)
        }
        Err(err) => Err(err.into()),
    }
}

fn parse_lines(text: &str) -> Result<Vec<Value>, CliError> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(CliError::from))
        .collect()
}
