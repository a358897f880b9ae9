//! Configuration file handling.
//!
//! This module handles loading `.rpm-check.toml` and merging it with
//! command-line arguments.

use crate::device::DEFAULT_CLI_PATH;
use crate::models::{CommandTemplates, ThresholdPolicy, DEFAULT_FAIL_THRESHOLD, DEFAULT_PASS_THRESHOLD};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".rpm-check.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Classification thresholds.
    #[serde(default)]
    pub thresholds: ThresholdsConfig,

    /// Action command templates.
    #[serde(default)]
    pub commands: CommandsConfig,

    /// Device CLI settings.
    #[serde(default)]
    pub device: DeviceConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Pass/fail thresholds in percent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdsConfig {
    /// Minimum pass percentage for PASS.
    #[serde(default = "default_pass_threshold")]
    pub pass: f64,

    /// Minimum fail percentage for FAIL.
    #[serde(default = "default_fail_threshold")]
    pub fail: f64,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            pass: default_pass_threshold(),
            fail: default_fail_threshold(),
        }
    }
}

fn default_pass_threshold() -> f64 {
    DEFAULT_PASS_THRESHOLD
}

fn default_fail_threshold() -> f64 {
    DEFAULT_FAIL_THRESHOLD
}

/// Commands run for PASS/FAIL instances. Empty means no action.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandsConfig {
    #[serde(default)]
    pub pass: String,

    #[serde(default)]
    pub fail: String,
}

/// Device CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Path to the device CLI binary.
    #[serde(default = "default_cli_path")]
    pub cli_path: String,

    /// Per-command timeout in seconds, 0 for none.
    #[serde(default)]
    pub timeout_seconds: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            cli_path: default_cli_path(),
            timeout_seconds: 0,
        }
    }
}

fn default_cli_path() -> String {
    DEFAULT_CLI_PATH.to_string()
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log file the run is appended to. Empty disables file logging.
    #[serde(default = "default_log_file")]
    pub file: String,

    /// Enable debug logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
            verbose: false,
        }
    }
}

fn default_log_file() -> String {
    "/var/log/rpm-check.log".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence, but only when given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(pass) = args.pass_threshold {
            self.thresholds.pass = pass;
        }
        if let Some(fail) = args.fail_threshold {
            self.thresholds.fail = fail;
        }

        if let Some(ref cmd) = args.pass_command {
            self.commands.pass = cmd.clone();
        }
        if let Some(ref cmd) = args.fail_command {
            self.commands.fail = cmd.clone();
        }

        if let Some(ref cli_path) = args.cli_path {
            self.device.cli_path = cli_path.clone();
        }
        if let Some(timeout) = args.timeout {
            self.device.timeout_seconds = timeout;
        }

        if args.no_log_file {
            self.logging.file.clear();
        } else if let Some(ref log_file) = args.log_file {
            self.logging.file = log_file.display().to_string();
        }

        // Flags always override
        if args.verbose {
            self.logging.verbose = true;
        }
    }

    pub fn policy(&self) -> ThresholdPolicy {
        ThresholdPolicy {
            pass_threshold: self.thresholds.pass,
            fail_threshold: self.thresholds.fail,
        }
    }

    pub fn templates(&self) -> CommandTemplates {
        CommandTemplates {
            pass: self.commands.pass.clone(),
            fail: self.commands.fail.clone(),
        }
    }

    /// Per-command timeout, `None` when disabled.
    pub fn command_timeout(&self) -> Option<Duration> {
        (self.device.timeout_seconds > 0).then(|| Duration::from_secs(self.device.timeout_seconds))
    }

    /// Log file path, `None` when file logging is disabled.
    pub fn log_file(&self) -> Option<PathBuf> {
        (!self.logging.file.is_empty()).then(|| PathBuf::from(&self.logging.file))
    }

    /// Validate values that may have come from the config file.
    pub fn validate(&self) -> Result<(), String> {
        validate_threshold("pass", self.thresholds.pass)?;
        validate_threshold("fail", self.thresholds.fail)?;

        if self.device.cli_path.trim().is_empty() {
            return Err("Device CLI path must not be empty".to_string());
        }

        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

/// Thresholds are percentages. Values outside 0..=100 are allowed and make
/// the matching verdict always or never reachable.
pub fn validate_threshold(name: &str, value: f64) -> Result<(), String> {
    if !value.is_finite() {
        return Err(format!("{} threshold must be a finite number, got {}", name, value));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::tests::make_args;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.thresholds.pass, 30.0);
        assert_eq!(config.thresholds.fail, 100.0);
        assert!(config.commands.pass.is_empty());
        assert_eq!(config.device.cli_path, "/usr/sbin/cli");
        assert_eq!(config.command_timeout(), None);
        assert_eq!(config.log_file(), Some(PathBuf::from("/var/log/rpm-check.log")));
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[thresholds]
pass = 70.0

[commands]
fail = "request routing-instance $routing-instance-name restart"

[device]
timeout_seconds = 45
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.thresholds.pass, 70.0);
        assert_eq!(config.thresholds.fail, 100.0);
        assert!(config.commands.pass.is_empty());
        assert_eq!(
            config.commands.fail,
            "request routing-instance $routing-instance-name restart"
        );
        assert_eq!(config.command_timeout(), Some(Duration::from_secs(45)));
        assert_eq!(config.device.cli_path, "/usr/sbin/cli");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[thresholds]\nfail = 50.0\n[logging]\nfile = \"\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.thresholds.fail, 50.0);
        assert_eq!(config.log_file(), None);
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[thresholds]\npass = \"high\"").unwrap();
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_merge_with_args() {
        let mut config: Config = toml::from_str("[thresholds]\npass = 70.0\nfail = 60.0").unwrap();
        let mut args = make_args();
        args.fail_threshold = Some(90.0);
        args.pass_command = Some("ping $ri".to_string());
        args.no_log_file = true;

        config.merge_with_args(&args);

        assert_eq!(config.policy().pass_threshold, 70.0);
        assert_eq!(config.policy().fail_threshold, 90.0);
        assert_eq!(config.templates().pass, "ping $ri");
        assert!(config.templates().fail.is_empty());
        assert_eq!(config.log_file(), None);
    }

    #[test]
    fn test_validate_thresholds() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.thresholds.pass = 100.0;
        config.thresholds.fail = 0.0;
        assert!(config.validate().is_ok());

        // Out-of-range values only make a verdict unreachable.
        config.thresholds.pass = 120.0;
        config.thresholds.fail = -5.0;
        assert!(config.validate().is_ok());

        config.thresholds.pass = f64::NAN;
        let err = config.validate().unwrap_err();
        assert!(err.contains("pass threshold must be a finite number"));

        config.thresholds.pass = 30.0;
        config.thresholds.fail = f64::NEG_INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[thresholds]"));
        assert!(toml_str.contains("[commands]"));
        assert!(toml_str.contains("[device]"));
        assert!(toml_str.contains("[logging]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.thresholds.pass, 30.0);
    }
}
