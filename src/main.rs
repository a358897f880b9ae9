//! rpm-check - RPM probe based routing instance health checks
//!
//! Reads the RPM probe results of one owner from the device, aggregates
//! them per routing instance, classifies each instance against the pass
//! and fail thresholds and runs the configured command for it.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad arguments or config, unwritable output, etc.)
//!   2 - One or more action commands failed

mod cli;
mod config;
mod device;
mod engine;
mod error;
mod logging;
mod models;
mod report;
mod runner;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, DEFAULT_CONFIG_FILE};
use device::{CliExecutor, CliProbeSource, FileProbeSource, ProbeSource};
use models::RunReport;
use runner::CheckSettings;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Configuration decides where the log goes, so it is loaded first
    let (mut config, config_note) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let level = logging::log_level(args.quiet, args.verbose || config.logging.verbose);
    let log_guard = logging::init_logging(level, config.log_file().as_deref());

    if let Some(note) = config_note {
        warn!("{}", note);
    }
    debug!("Arguments: {:?}", args);

    match run(&args, &config).await {
        Ok(exit_code) => {
            drop(log_guard);
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("rpm check failed: {:#}", e);
            eprintln!("\nError: {:#}", e);
            drop(log_guard);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .rpm-check.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!("{} already exists. Remove it first or edit it manually.", DEFAULT_CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("Created {} with default settings.", DEFAULT_CONFIG_FILE);
    Ok(())
}

/// Run the check and log the results. Returns the exit code (0 or 2).
async fn run(args: &Args, config: &Config) -> Result<i32> {
    let owner = args.owner().to_string();
    let settings = CheckSettings {
        owner: owner.clone(),
        policy: config.policy(),
        templates: config.templates(),
        dry_run: args.dry_run,
    };

    info!("****************");
    info!("rpm check starts");
    info!("****************");
    info!("Input options:");
    info!("  RPM Owner: \"{}\"", owner);
    info!("  Pass Threshold: {:?}%", settings.policy.pass_threshold);
    info!("  Fail Threshold: {:?}%", settings.policy.fail_threshold);
    info!("  Pass Command: \"{}\"", settings.templates.pass);
    info!("  Fail Command: \"{}\"", settings.templates.fail);

    let timeout = config.command_timeout();
    let source: Box<dyn ProbeSource> = match args.input {
        Some(ref input) => {
            info!("  Probe results from file: {}", input.display());
            Box::new(FileProbeSource::new(input))
        }
        None => Box::new(CliProbeSource::new(&config.device.cli_path, timeout)),
    };
    let executor = CliExecutor::new(&config.device.cli_path, timeout);

    let report = runner::run_check(source.as_ref(), &executor, &settings).await;

    log_report(&report);

    if let Some(ref path) = args.output {
        report::write_report(&report, path, args.format == OutputFormat::Json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!("Report saved to: {}", path.display());
    }

    info!("****************");
    info!("rpm check ends");
    info!("****************");

    let failed = report.failed_actions();
    if failed > 0 {
        error!("{} of {} commands failed", failed, report.actions.len());
        return Ok(2);
    }

    Ok(0)
}

/// Log the result tables the way operators read them in the log file.
fn log_report(report: &RunReport) {
    info!("*****************");
    info!("rpm test results:");
    info!("*****************");
    info!("\n{}", report::probe_table(&report.instances));

    info!("************************************************");
    info!("routing-instance operational status based on RPM");
    info!("{}", report::format_thresholds(&report.policy));
    info!("************************************************");
    info!("\n{}", report::instance_table(&report.instances));

    info!(
        "{} probe results across {} routing instances, {} commands",
        report.total_probes(),
        report.instances.len(),
        report.actions.len()
    );
}

/// Load configuration from file or use defaults.
///
/// An explicit `--config` must load. A broken default config file is
/// reported through the returned note and defaults are used instead.
fn load_config(args: &Args) -> Result<(Config, Option<String>)> {
    if let Some(ref config_path) = args.config {
        return Ok((Config::load(config_path)?, None));
    }

    match Config::load_default() {
        Ok(Some(config)) => Ok((config, None)),
        Ok(None) => Ok((Config::default(), None)),
        Err(e) => Ok((
            Config::default(),
            Some(format!("Failed to load {}, using defaults: {:#}", DEFAULT_CONFIG_FILE, e)),
        )),
    }
}
