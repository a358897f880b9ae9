//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation.

use crate::config::validate_threshold;
use clap::Parser;
use std::path::PathBuf;

/// rpm-check - RPM probe based routing instance health checks
///
/// Reads the RPM probe results of one owner, computes pass/fail percentages
/// per routing instance and runs a command for each instance whose pass or
/// fail percentage reaches its threshold.
///
/// `$routing-instance-name` (or `$ri`) in a command is replaced with the
/// routing instance name.
///
/// Examples:
///   rpm-check --rpm-owner probe1
///   rpm-check --rpm-owner probe1 --pass-threshold 70 --fail-threshold 50 \
///       --fail-command "show route instance $routing-instance-name"
///   rpm-check --rpm-owner probe1 --input saved-results.xml --dry-run
///   rpm-check --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Owner of the RPM probes to check
    #[arg(short = 'o', long, value_name = "OWNER", required_unless_present = "init_config")]
    pub rpm_owner: Option<String>,

    /// Pass percentage at or above which an instance is PASS [default: 30.0]
    #[arg(long, value_name = "PERCENT", allow_negative_numbers = true)]
    pub pass_threshold: Option<f64>,

    /// Fail percentage at or above which an instance is FAIL [default: 100.0]
    #[arg(long, value_name = "PERCENT", allow_negative_numbers = true)]
    pub fail_threshold: Option<f64>,

    /// Command to run for PASS instances
    #[arg(long, value_name = "COMMAND")]
    pub pass_command: Option<String>,

    /// Command to run for FAIL instances
    #[arg(long, value_name = "COMMAND")]
    pub fail_command: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .rpm-check.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to the device CLI binary [default: /usr/sbin/cli]
    #[arg(long, value_name = "PATH", env = "RPM_CHECK_CLI_PATH")]
    pub cli_path: Option<String>,

    /// Read probe results XML from a file instead of the device
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Timeout for each device command, in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Log file to append to [default: /var/log/rpm-check.log]
    #[arg(long, value_name = "FILE", env = "RPM_CHECK_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Do not write a log file
    #[arg(long)]
    pub no_log_file: bool,

    /// Also write the report to this file
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Report format (text, json)
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Resolve commands but do not execute them
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .rpm-check.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Long options that older rpm-check invocations spell with a single dash.
const SINGLE_DASH_OPTIONS: &[&str] = &[
    "rpm-owner",
    "pass-threshold",
    "fail-threshold",
    "pass-command",
    "fail-command",
];

/// Options whose next argument is their value.
const VALUE_OPTIONS: &[&str] = &[
    "--rpm-owner",
    "--pass-threshold",
    "--fail-threshold",
    "--pass-command",
    "--fail-command",
    "--config",
    "--cli-path",
    "--input",
    "--timeout",
    "--log-file",
    "--output",
    "--format",
    "-o",
    "-c",
    "-i",
];

/// Rewrites `-rpm-owner` style options to `--rpm-owner`.
///
/// Only tokens in option position are touched: values of other options and
/// everything after `--` pass through unchanged.
pub fn normalize_single_dash<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut normalized = Vec::new();
    let mut expect_value = false;
    let mut positional_only = false;

    for arg in args {
        if expect_value || positional_only {
            expect_value = false;
            normalized.push(arg);
            continue;
        }
        if arg == "--" {
            positional_only = true;
            normalized.push(arg);
            continue;
        }

        let rewritten = match arg.strip_prefix('-') {
            Some(rest) if !rest.starts_with('-') => {
                let name = rest.split('=').next().unwrap_or(rest);
                if SINGLE_DASH_OPTIONS.contains(&name) {
                    format!("-{}", arg)
                } else {
                    arg
                }
            }
            _ => arg,
        };

        expect_value = VALUE_OPTIONS.contains(&rewritten.as_str());
        normalized.push(rewritten);
    }

    normalized
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain text tables (default)
    #[default]
    Text,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    ///
    /// Single-dash spellings of the long options (`-rpm-owner probe1`) are
    /// accepted as well.
    pub fn parse_args() -> Self {
        Self::parse_from(normalize_single_dash(std::env::args()))
    }

    /// The probe owner, empty if not set (should be validated first).
    pub fn owner(&self) -> &str {
        self.rpm_owner.as_deref().unwrap_or("")
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.owner().trim().is_empty() {
            return Err("RPM owner must not be empty".to_string());
        }

        if let Some(pass) = self.pass_threshold {
            validate_threshold("pass", pass)?;
        }
        if let Some(fail) = self.fail_threshold {
            validate_threshold("fail", fail)?;
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if let Some(ref input) = self.input {
            if !input.is_file() {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
        }

        Ok(())
    }
}
