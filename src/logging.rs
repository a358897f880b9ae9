//! Logging setup.
//!
//! Logs go to stdout and, unless disabled, are appended to a log file that
//! accumulates the history of every run.

use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Keeps the file writer alive; log lines are flushed when dropped.
pub struct LogGuard {
    _guard: Option<WorkerGuard>,
}

/// Initialize logging at `level`, optionally appending to `log_file`.
///
/// If the log file cannot be opened, logging falls back to stdout only and
/// a warning is emitted. Failing to share the file's permissions only warns.
pub fn init_logging(level: Level, log_file: Option<&Path>) -> LogGuard {
    // RUST_LOG, when set, refines the level chosen on the command line.
    let filter = || {
        EnvFilter::builder()
            .with_default_directive(LevelFilter::from_level(level).into())
            .from_env_lossy()
    };

    let mut file_error = None;
    let mut permission_warning = None;
    let (file_layer, guard) = match log_file.map(prepare_log_file) {
        Some(Ok(prepared)) => {
            permission_warning = prepared.permission_warning;
            let appender = tracing_appender::rolling::never(prepared.dir, prepared.name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false)
                .with_filter(filter());
            (Some(layer), Some(guard))
        }
        Some(Err(e)) => {
            file_error = Some(e);
            (None, None)
        }
        None => (None, None),
    };

    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_filter(filter());

    if let Err(e) = tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
    {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    if let Some(e) = file_error {
        tracing::warn!("File logging disabled: {:#}", e);
    }
    if let Some(warning) = permission_warning {
        tracing::warn!("{}", warning);
    }

    LogGuard { _guard: guard }
}

/// A log file that is ready for the appender.
struct PreparedLogFile<'a> {
    dir: &'a Path,
    name: &'a OsStr,
    /// Set when the file could not be made writable by everyone.
    permission_warning: Option<String>,
}

/// Create the log file if needed, make it writable by everyone (runs happen
/// under different users), and split it into directory and file name.
fn prepare_log_file(path: &Path) -> Result<PreparedLogFile<'_>> {
    prepare_log_file_with(path, share_permissions)
}

fn prepare_log_file_with(
    path: &Path,
    set_mode: fn(&Path) -> io::Result<()>,
) -> Result<PreparedLogFile<'_>> {
    let name = path
        .file_name()
        .with_context(|| format!("Invalid log file path: {}", path.display()))?;
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    // A file owned by another user can still be appended to.
    let permission_warning = set_mode(path).err().map(|e| {
        format!(
            "Could not make log file {} writable by all users: {}",
            path.display(),
            e
        )
    });

    Ok(PreparedLogFile {
        dir,
        name,
        permission_warning,
    })
}

#[cfg(unix)]
fn share_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = std::fs::metadata(path)?.permissions().mode();
    if mode & 0o777 == 0o666 {
        return Ok(());
    }
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o666))
}

#[cfg(not(unix))]
fn share_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// Pick the log level from the CLI flags and the config file.
pub fn log_level(quiet: bool, verbose: bool) -> Level {
    if quiet {
        Level::ERROR
    } else if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    }
}
