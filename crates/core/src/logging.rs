use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub const LOG_DIR_ENV: &str = "SEMSCOPE_LOG_DIR";

/// Directory the rolling log files go to: `$SEMSCOPE_LOG_DIR`, else
/// `~/.semscope/logs`.
pub fn log_dir(override_dir: Option<String>) -> PathBuf {
    if let Some(dir) = override_dir.filter(|d| !d.trim().is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".semscope/logs")
}

pub fn init_logging(component: &str, to_stderr: bool) -> WorkerGuard {
    let log_dir = log_dir(std::env::var(LOG_DIR_ENV).ok());
    let _ = std::fs::create_dir_all(&log_dir);

    // Roll daily, with the component name as the prefix, e.g. cli.log.2026-10-16
    let file_appender = tracing_appender::rolling::daily(&log_dir, component);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);

    if to_stderr {
        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false);
        registry.with(stderr_layer).init();
    } else {
        registry.init();
    }

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_dir_prefers_override() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().to_string_lossy().to_string();
        assert_eq!(log_dir(Some(dir.clone())), PathBuf::from(dir));
    }

    #[test]
    fn test_log_dir_ignores_blank_override() {
        assert!(log_dir(Some("  ".to_string())).ends_with(".semscope/logs"));
        assert!(log_dir(None).ends_with(".semscope/logs"));
    }
}
