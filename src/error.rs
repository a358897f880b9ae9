//! Error types for the device layer.

use std::time::Duration;
use thiserror::Error;

/// Errors talking to the device CLI.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command `{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("command `{command}` timed out after {}s", .timeout.as_secs())]
    Timeout { command: String, timeout: Duration },

    #[error("invalid probe results XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A probe result element that could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("probe result is missing <{0}>")]
    MissingField(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = RecordError::MissingField("routing-instance-name");
        assert_eq!(err.to_string(), "probe result is missing <routing-instance-name>");

        let err = DeviceError::Timeout {
            command: "show version".to_string(),
            timeout: Duration::from_secs(30),
        };
        assert_eq!(err.to_string(), "command `show version` timed out after 30s");

        let err = DeviceError::CommandFailed {
            command: "show version".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "syntax error".to_string(),
        };
        assert!(err.to_string().contains("syntax error"));
    }
}
