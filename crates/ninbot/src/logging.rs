//! Log output: every line goes to stdout and to a per-run log file.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Log file name, from the local start time.
pub const LOG_FILE_FORMAT: &str = "%m.%d.%Y %H.%M %S%.3f";
const LINE_TIME_FORMAT: &str = "%H:%M:%S";

/// Path of the log file for a run starting now.
pub fn log_file_path(log_dir: &Path) -> PathBuf {
    log_dir.join(chrono::Local::now().format(LOG_FILE_FORMAT).to_string())
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `level`.
/// Returns the log file path.
pub fn init(log_dir: &Path, level: &str) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Can't create log directory {}", log_dir.display()))?;
    let path = log_file_path(log_dir);
    let file = File::create(&path)
        .with_context(|| format!("Can't open the log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout.and(Arc::new(file)))
        .with_timer(ChronoLocal::new(LINE_TIME_FORMAT.to_string()))
        .with_ansi(false)
        .with_target(false)
        .init();

    Ok(path)
}
