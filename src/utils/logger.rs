//! Logging initialization.
//!
//! Logs go to per-run files under `~/.glassterm/logs` so they never mix with
//! command output in the terminal view. The level is controlled by the
//! `RUST_LOG` environment variable (`debug`, `info`, `warn`, `error`),
//! defaulting to `info`.

use std::fs;
use std::path::PathBuf;

use chrono::Local;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes file-based logging.
///
/// Each run creates a fresh timestamped file, e.g.
/// `~/.glassterm/logs/glassterm.2026-08-26-14-30-25.log`. Failure to set up
/// logging is reported on stderr and otherwise ignored; the session works
/// fine without it.
pub fn init_logging() {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let log_dir = PathBuf::from(home).join(".glassterm").join("logs");

    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Warning: failed to create log directory: {e}");
        return;
    }

    let timestamp = Local::now().format("%Y-%m-%d-%H-%M-%S");
    let log_path = log_dir.join(format!("glassterm.{timestamp}.log"));

    let log_file = match fs::File::create(&log_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: failed to create log file: {e}");
            return;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    // Keep the non-blocking writer alive for the whole program
    std::mem::forget(guard);

    tracing::info!("logging initialized, writing to {}", log_path.display());
}
