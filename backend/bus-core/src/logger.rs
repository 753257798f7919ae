//! Process-wide logging for bus endpoints.
//!
//! Colored stdout plus a plain log file. Handshake traffic is logged at trace
//! level with payloads redacted, so the file is safe to attach to bug reports.

use crate::error::LoggerError;

use common::ErrorLocation;

use std::io::stdout;
use std::panic::Location;
use std::path::Path;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use fern::Dispatch;
use fern::colors::Color::{Blue, Green, Magenta, Red, Yellow};
use fern::colors::ColoredLevelConfig;
use humantime::format_rfc3339;
use log::{LevelFilter, info, warn};

/// Runs the dispatch setup at most once per process.
static INIT_LOGGER_ONCE: Once = Once::new();

/// Set by the first `initialize` call, successful or not.
static LOGGER_ALREADY_CALLED: AtomicBool = AtomicBool::new(false);

/// Log file created inside the directory given to `initialize`.
pub const LOG_FILE_NAME: &str = "bus.log";

/// Debug builds show state transitions and mechanism choices.
#[cfg(debug_assertions)]
const LOG_LEVEL: LevelFilter = LevelFilter::Debug;

/// Release builds keep to outcomes and best-effort warnings.
#[cfg(not(debug_assertions))]
const LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// Install the global logger, writing to stdout and `log_dir/bus.log`.
///
/// Only the first call does anything. Later calls log a warning and return
/// `Ok`, even if the first one failed.
///
/// # Errors
///
/// The log file cannot be opened, or another logger is already installed.
pub fn initialize(log_dir: &Path) -> Result<(), LoggerError> {
    if LOGGER_ALREADY_CALLED.swap(true, Ordering::SeqCst) {
        warn!("Logger already initialized");
        return Ok(());
    }

    let mut result = Ok(());

    INIT_LOGGER_ONCE.call_once(|| {
        result = initialize_internal(log_dir);
        if result.is_ok() {
            info!("Logger initialized with level: {LOG_LEVEL:?}");
        }
    });

    result
}

/// Build and install the stdout and file dispatches.
///
/// Stdout lines name the module target (`bus_core::auth::client`), which is
/// enough to follow one handshake. The file keeps `file:line` for bug reports.
#[track_caller]
fn initialize_internal(log_dir: &Path) -> Result<(), LoggerError> {
    let location = ErrorLocation::from(Location::caller());
    let log_file_path = log_dir.join(LOG_FILE_NAME);

    let color_configuration = ColoredLevelConfig::new()
        .debug(Blue)
        .info(Green)
        .warn(Yellow)
        .error(Red)
        .trace(Magenta);

    // Colored, for interactive runs
    let stdout_dispatch = Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{date} - {level}] {message} [{target}]",
                date = format_rfc3339(SystemTime::now()),
                level = color_configuration.color(record.level()),
                target = record.target(),
            ))
        })
        .chain(stdout());

    let log_file = fern::log_file(&log_file_path).map_err(|e| LoggerError::LogFile {
        message: format!("Cannot open {}: {e}", log_file_path.display()),
        location,
    })?;

    // Plain text
    let file_dispatch = Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{date} - {level}] {message} [{file}:{line}]",
                date = format_rfc3339(SystemTime::now()),
                level = record.level(),
                file = record.file().unwrap_or("unknown"),
                line = record.line().unwrap_or(0),
            ))
        })
        .chain(log_file);

    Dispatch::new()
        .level(LOG_LEVEL)
        .chain(stdout_dispatch)
        .chain(file_dispatch)
        .apply()
        .map_err(|e| LoggerError::Initialization {
            message: e.to_string(),
            location,
        })
}
