//! Device access: fetching probe results and running commands.
//!
//! Both go through the device's operational CLI binary, invoked directly
//! with an argument vector (no shell).

pub mod executor;
pub mod probe_results;
pub mod source;

pub use executor::{CliExecutor, CommandExecutor};
pub use source::{CliProbeSource, FileProbeSource, ProbeSource};

/// Default location of the device CLI binary.
pub const DEFAULT_CLI_PATH: &str = "/usr/sbin/cli";
