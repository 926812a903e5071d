mod cli;
mod output;

use crate::cli::Cli;
use anyhow::Context;
use clap::Parser;
use stager::domain::config::LoggingSettings;
use stager::fetch::{HttpTransport, Transport};
use stager::kernel::config::{load_settings, validate_settings};
use stager::{HeadlessDocument, HookRegistry, Pipeline};
use stager_logger::Logger;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

#[stager_runtime::main(cooperative)]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref()).context("Loading settings")?;
    cli.apply(&mut settings);
    validate_settings(&settings)?;

    let _logger = init_logging(&settings.logging, cli.quiet)?;
    info!(
        url = %settings.config_url,
        reloads = cli.reloads,
        features = ?stager::ENABLED,
        "Starting loader"
    );

    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new()?);
    let document = HeadlessDocument::from_settings(Arc::clone(&transport), &settings.surface);

    let mut pipeline = Pipeline::builder()
        .document(Arc::new(document.clone()))
        .transport(transport)
        .settings(settings)
        .hooks(HookRegistry::new())
        .build()?;

    let report = pipeline.run_with_reloads(cli.reloads).await;
    info!(run = report.run, phase = ?report.phase(), "Loader finished");

    if let Some(dir) = &cli.dump {
        output::dump(dir, &document, &report)?;
    }
    if cli.report {
        output::print_report(&report)?;
    } else {
        output::print_summary(&report)?;
    }

    Ok(if report.is_ready() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Console unless `--quiet`, plus a rolling file sink when a directory is configured.
fn init_logging(logging: &LoggingSettings, quiet: bool) -> anyhow::Result<Option<Logger>> {
    if quiet && logging.directory.is_none() {
        return Ok(None);
    }

    let mut builder =
        Logger::builder().name(env!("CARGO_BIN_NAME")).console(!quiet).level_name(&logging.level)?;
    if logging.json && !quiet {
        builder = builder.console_json();
    }

    let logger = match &logging.directory {
        Some(dir) if logging.json => builder.path(dir).json().init()?,
        Some(dir) => builder.path(dir).init()?,
        None => builder.init()?,
    };
    Ok(Some(logger))
}
