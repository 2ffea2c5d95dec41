use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use verisync_cli::config::{Args, CliConfig};
use verisync_cli::error::{CliError, EXIT_CLI_ERROR};
use verisync_cli::input;
use verisync_cli::report::BatchReport;
use verisync_core::EntityValidators;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "verisync_core=info,verisync_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!(error = %e, "validation run aborted");
            ExitCode::from(EXIT_CLI_ERROR)
        }
    }
}

fn run(args: &Args) -> Result<u8, CliError> {
    let config = CliConfig::from_env()?;

    let text = input::read_source(args.input_path())?;
    let records = input::parse_records(&text)?;
    tracing::info!(
        entity = args.entity.as_str(),
        records = records.len(),
        "Validating records"
    );

    let validators = EntityValidators::new();
    let reports: Vec<_> = records
        .iter()
        .map(|record| validators.check(args.entity, record))
        .collect();

    let batch = BatchReport::new(args.entity, &reports);
    println!("{}", batch.render(config.output)?);

    tracing::info!(
        entity = args.entity.as_str(),
        passed = batch.passed,
        failed = batch.failed,
        with_warnings = batch.with_warnings,
        "Validation finished"
    );
    Ok(batch.exit_code(config.fail_on_warnings))
}
