use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Environment variable naming a log file; when set, logs go to a size-rolled
/// file instead of stderr
pub const LOG_PATH_ENV: &str = "FFRADAR_LOG_PATH";

const MAX_LOG_SIZE: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

/// Initialize the global subscriber. Keep the returned guard alive until
/// exit so buffered file output is flushed.
pub fn init_logging() -> Option<WorkerGuard> {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    if let Ok(path) = std::env::var(LOG_PATH_ENV) {
        let condition = rolling_file::RollingConditionBasic::new().max_size(MAX_LOG_SIZE);
        match rolling_file::BasicRollingFileAppender::new(&path, condition, MAX_LOG_FILES) {
            Ok(appender) => {
                let (writer, guard) = tracing_appender::non_blocking(appender);
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(writer)
                    .init();
                return Some(guard);
            }
            Err(e) => eprintln!("Failed to open log file {path}: {e}"),
        }
    }

    // Fallback to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
    None
}
