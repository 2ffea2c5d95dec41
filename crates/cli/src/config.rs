//! Command-line arguments and environment configuration.

use std::path::{Path, PathBuf};

use clap::Parser;
use verisync_core::EntityKind;

use crate::error::CliError;

/// How the JSON report is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self, CliError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(CliError::Config(format!(
                "VERISYNC_OUTPUT must be 'pretty' or 'compact', got '{other}'"
            ))),
        }
    }
}

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Report layout (default: pretty).
    pub output: OutputFormat,
    /// Exit non-zero when any record carries warnings (default: `false`).
    pub fail_on_warnings: bool,
}

impl CliConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default  |
    /// |-----------------------------|----------|
    /// | `VERISYNC_OUTPUT`           | `pretty` |
    /// | `VERISYNC_FAIL_ON_WARNINGS` | `false`  |
    pub fn from_env() -> Result<Self, CliError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`CliConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CliError> {
        let output = match lookup("VERISYNC_OUTPUT") {
            Some(value) => OutputFormat::parse(&value)?,
            None => OutputFormat::default(),
        };

        let fail_on_warnings = match lookup("VERISYNC_FAIL_ON_WARNINGS") {
            Some(value) => parse_flag(&value).ok_or_else(|| {
                CliError::Config(format!(
                    "VERISYNC_FAIL_ON_WARNINGS must be a boolean, got '{value}'"
                ))
            })?,
            None => false,
        };

        Ok(Self {
            output,
            fail_on_warnings,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Validate JSON sync payloads and print a report.
///
/// Input is a JSON object, a JSON array of objects, or JSON lines.
#[derive(Parser, Debug, Clone)]
#[command(name = "verisync-validate", version)]
pub struct Args {
    /// Entity kind: product, order, customer or sync (plurals accepted)
    #[arg(value_parser = parse_entity)]
    pub entity: EntityKind,

    /// Input file; standard input when absent or `-`
    pub path: Option<PathBuf>,
}

impl Args {
    /// Input file to read, or `None` for standard input.
    pub fn input_path(&self) -> Option<&Path> {
        self.path.as_deref().filter(|path| *path != Path::new("-"))
    }
}

fn parse_entity(s: &str) -> Result<EntityKind, String> {
    EntityKind::parse(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use clap::error::ErrorKind;
    use std::collections::HashMap;

    fn args(list: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("verisync-validate").chain(list.iter().copied()))
    }

    fn config(vars: &[(&str, &str)]) -> Result<CliConfig, CliError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CliConfig::from_lookup(|key| vars.get(key).cloned())
    }

    // -- args ---------------------------------------------------------------

    #[test]
    fn entity_and_optional_path() {
        let parsed = args(&["orders", "batch.json"]).unwrap();
        assert_eq!(parsed.entity, EntityKind::Order);
        assert_eq!(parsed.input_path(), Some(Path::new("batch.json")));

        assert_eq!(args(&["sync", "-"]).unwrap().input_path(), None);
        assert_eq!(args(&["customer"]).unwrap().input_path(), None);
    }

    #[test]
    fn bad_arguments_are_rejected() {
        assert_matches!(args(&[]), Err(e) if e.kind() == ErrorKind::MissingRequiredArgument);
        assert_matches!(args(&["--help"]), Err(e) if e.kind() == ErrorKind::DisplayHelp);
        assert_matches!(
            args(&["invoice"]),
            Err(e) if e.kind() == ErrorKind::ValueValidation && e.to_string().contains("invoice")
        );
        assert_matches!(args(&["product", "a.json", "b.json"]), Err(_));
    }

    // -- env ----------------------------------------------------------------

    #[test]
    fn defaults_without_variables() {
        assert_eq!(config(&[]).unwrap(), CliConfig::default());
    }

    #[test]
    fn variables_override_defaults() {
        let cfg = config(&[
            ("VERISYNC_OUTPUT", "Compact"),
            ("VERISYNC_FAIL_ON_WARNINGS", "yes"),
        ])
        .unwrap();
        assert_eq!(cfg.output, OutputFormat::Compact);
        assert!(cfg.fail_on_warnings);
    }

    #[test]
    fn invalid_values_are_config_errors() {
        assert_matches!(config(&[("VERISYNC_OUTPUT", "yaml")]), Err(CliError::Config(_)));
        assert_matches!(
            config(&[("VERISYNC_FAIL_ON_WARNINGS", "maybe")]),
            Err(CliError::Config(_))
        );
    }
}
