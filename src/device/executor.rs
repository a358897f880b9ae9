//! Execution of resolved action commands on the device.

use crate::error::DeviceError;
use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Runs an operational command and returns its raw text output.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, command: &str) -> Result<String, DeviceError>;
}

/// Executes commands through the device CLI binary.
#[derive(Debug, Clone)]
pub struct CliExecutor {
    cli_path: String,
    timeout: Option<Duration>,
}

impl CliExecutor {
    pub fn new(cli_path: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            cli_path: cli_path.into(),
            timeout,
        }
    }
}

#[async_trait]
impl CommandExecutor for CliExecutor {
    async fn execute(&self, command: &str) -> Result<String, DeviceError> {
        run_cli(&self.cli_path, command, self.timeout).await
    }
}

/// Run `<cli_path> -c <command>` and return stdout.
///
/// The command is passed as a single argument, so quotes inside it need no
/// escaping. A non-zero exit status is an error carrying stderr.
pub(crate) async fn run_cli(
    cli_path: &str,
    command: &str,
    timeout: Option<Duration>,
) -> Result<String, DeviceError> {
    debug!("Running {} -c {:?}", cli_path, command);

    let mut cmd = Command::new(cli_path);
    cmd.arg("-c").arg(command).kill_on_drop(true);

    let output = match timeout {
        Some(limit) => tokio::time::timeout(limit, cmd.output())
            .await
            .map_err(|_| DeviceError::Timeout {
                command: command.to_string(),
                timeout: limit,
            })?,
        None => cmd.output().await,
    }
    .map_err(|source| DeviceError::Spawn {
        program: cli_path.to_string(),
        source,
    })?;

    if !output.status.success() {
        return Err(DeviceError::CommandFailed {
            command: command.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
