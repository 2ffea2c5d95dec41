use std::path::PathBuf;

/// Exit status for errors that stop the run before a report is printed.
/// Matches the status clap uses for argument errors.
pub const EXIT_CLI_ERROR: u8 = 2;

/// Errors raised by the command-line layer, before or after validation.
///
/// Validation failures are not errors here; they are part of the report.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read standard input: {0}")]
    Stdin(#[source] std::io::Error),

    #[error("Invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn run_errors_share_the_argument_error_status() {
        let usage = clap::Error::raw(ErrorKind::InvalidValue, "bad entity");
        assert_eq!(usage.exit_code(), i32::from(EXIT_CLI_ERROR));
    }

    #[test]
    fn io_error_names_the_path() {
        let err = CliError::Io {
            path: PathBuf::from("batch.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.to_string(), "Failed to read batch.json: gone");
    }
}
