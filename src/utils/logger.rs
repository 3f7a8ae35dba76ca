use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const DEBUG_ENV: &str = "PEG_DEBUG";

/// Write debug logs to a daily rolling file when PEG_DEBUG is set.
///
/// The returned guard must live until exit or buffered lines are lost.
pub fn init_logging() -> Option<WorkerGuard> {
    std::env::var_os(DEBUG_ENV)?;

    let log_dir = log_dir();
    let _ = std::fs::create_dir_all(&log_dir);

    let file_appender = tracing_appender::rolling::daily(&log_dir, "peg.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // RUST_LOG narrows or widens the default
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("peg=debug"));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_env_filter(filter)
        .init();

    tracing::info!("peg {} logging to {}", env!("CARGO_PKG_VERSION"), log_dir.display());
    Some(guard)
}

/// `~/.local/share/peg` on Linux, the platform equivalent elsewhere
fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("peg")
}
