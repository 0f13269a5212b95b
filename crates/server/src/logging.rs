use std::path::Path;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE_PREFIX: &str = "kudzidza";

/// Flushes the file writer on drop; hold it until shutdown.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

/// Install the global subscriber: stdout always, plus a daily rolling
/// `kudzidza.<date>.log` under `log_dir` when one is given.
///
/// A directory that cannot be opened disables file logging instead of
/// aborting startup.
pub fn init_tracing(log_level: &str, log_dir: Option<&Path>) -> Option<FileLogGuard> {
    let file = log_dir.and_then(|dir| match daily_file_writer(dir) {
        Ok(writer) => Some(writer),
        Err(err) => {
            eprintln!("file logging disabled for {}: {err}", dir.display());
            None
        }
    });
    let (file_writer, guard) = file.unzip();
    let file_layer = file_writer.map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
    });

    tracing_subscriber::registry()
        .with(level_filter(log_level))
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .init();

    guard.map(|guard| FileLogGuard { _guard: guard })
}

fn level_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_new(log_level).unwrap_or_else(|err| {
        eprintln!("invalid RUST_LOG {log_level:?} ({err}), using info");
        EnvFilter::new("info")
    })
}

fn daily_file_writer(log_dir: &Path) -> Result<(NonBlocking, WorkerGuard), InitError> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .build(log_dir)?;
    Ok(tracing_appender::non_blocking(appender))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_directive_falls_back_to_info() {
        assert_eq!(level_filter("info,kudzidza=loud").to_string(), "info");
        assert_eq!(level_filter("debug").to_string(), "debug");
    }

    #[test]
    fn file_writer_creates_missing_directory() {
        let dir = std::env::temp_dir().join(format!("kudzidza-logs-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        let (writer, guard) = daily_file_writer(&dir).unwrap();
        assert!(dir.is_dir());

        drop(writer);
        drop(guard);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
