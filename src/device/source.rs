//! Probe record sources.

use super::executor::run_cli;
use super::probe_results::{parse_probe_results, ParsedResults};
use crate::error::DeviceError;
use crate::models::ProbeRecord;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

/// Something that can produce the probe records for an owner.
#[async_trait]
pub trait ProbeSource: Send + Sync {
    /// Fetch the probe records for `owner`, in device order.
    async fn fetch(&self, owner: &str) -> Result<Vec<ProbeRecord>, DeviceError>;
}

/// Reads probe results from the device CLI.
#[derive(Debug, Clone)]
pub struct CliProbeSource {
    cli_path: String,
    timeout: Option<Duration>,
}

impl CliProbeSource {
    pub fn new(cli_path: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            cli_path: cli_path.into(),
            timeout,
        }
    }

    /// Operational command that lists the probe results for `owner` as XML.
    pub fn probe_results_command(owner: &str) -> String {
        format!("show services rpm probe-results owner {} | display xml", owner)
    }
}

#[async_trait]
impl ProbeSource for CliProbeSource {
    async fn fetch(&self, owner: &str) -> Result<Vec<ProbeRecord>, DeviceError> {
        let command = Self::probe_results_command(owner);
        debug!("Fetching probe results: {}", command);

        let xml = run_cli(&self.cli_path, &command, self.timeout).await?;
        Ok(keep_valid(parse_probe_results(&xml, owner)?))
    }
}

/// Reads probe results XML from a file, e.g. a saved device output.
#[derive(Debug, Clone)]
pub struct FileProbeSource {
    path: PathBuf,
}

impl FileProbeSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ProbeSource for FileProbeSource {
    async fn fetch(&self, owner: &str) -> Result<Vec<ProbeRecord>, DeviceError> {
        debug!("Reading probe results from {}", self.path.display());

        let xml = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| DeviceError::Io {
                path: self.path.display().to_string(),
                source,
            })?;

        Ok(keep_valid(parse_probe_results(&xml, owner)?))
    }
}

/// Drop malformed elements, logging each one.
fn keep_valid(parsed: ParsedResults) -> Vec<ProbeRecord> {
    for rejected in &parsed.rejected {
        warn!("Skipping malformed probe result: {}", rejected);
    }
    parsed.records
}
