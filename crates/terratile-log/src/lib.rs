//! Structured logging for the terrain generator.
//!
//! Console output with uptime timestamps and module paths, plus JSON file
//! logging in debug builds. The level comes from `RUST_LOG` when set, and
//! from the configuration's `debug.log_level` otherwise.

use std::path::Path;

use terratile_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Name of the JSON log file written in debug builds.
pub const LOG_FILE_NAME: &str = "terratile.log";

const DEFAULT_FILTER: &str = "info";

/// Initialize the global tracing subscriber.
///
/// * `log_dir` - Directory for the JSON log file (debug builds only)
/// * `debug_build` - Whether file logging is enabled
/// * `config` - Optional configuration supplying the log level
///
/// Must be called at most once per process.
///
/// ```no_run
/// use terratile_config::Config;
/// use terratile_log::init_logging;
///
/// let config = Config::default();
/// init_logging(Some(std::path::Path::new("./logs")), true, Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config)));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(true) // workers are named tile-gen-N
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && let Ok(log_file) = create_log_file(log_dir)
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        return;
    }

    subscriber.init();
}

/// The filter directive used when `RUST_LOG` is not set.
pub fn filter_directive(config: Option<&Config>) -> String {
    match config {
        Some(config) if !config.debug.log_level.trim().is_empty() => {
            config.debug.log_level.trim().to_string()
        }
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// Create (or truncate) the JSON log file inside `log_dir`, creating the
/// directory first.
pub fn create_log_file(log_dir: &Path) -> std::io::Result<std::fs::File> {
    std::fs::create_dir_all(log_dir)?;
    std::fs::File::create(log_dir.join(LOG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_directive_without_config() {
        assert_eq!(filter_directive(None), "info");
    }

    #[test]
    fn test_directive_from_config() {
        let mut config = Config::default();
        config.debug.log_level = "debug,terratile_terrain=trace".to_string();
        assert_eq!(
            filter_directive(Some(&config)),
            "debug,terratile_terrain=trace"
        );
    }

    #[test]
    fn test_blank_config_level_falls_back() {
        let mut config = Config::default();
        config.debug.log_level = "  ".to_string();
        assert_eq!(filter_directive(Some(&config)), "info");
    }

    #[test]
    fn test_config_directives_parse() {
        let levels = [
            "info",
            "debug,terratile_terrain=trace",
            "warn,terratile_config=debug",
            "error",
        ];

        let mut config = Config::default();
        for level in levels {
            config.debug.log_level = level.to_string();
            let directive = filter_directive(Some(&config));
            let result = EnvFilter::try_new(&directive);
            assert!(result.is_ok(), "Failed to parse filter: {directive}");
        }
    }

    #[test]
    fn test_log_file_created_in_nested_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_dir = temp_dir.path().join("logs").join("run");
        let mut file = create_log_file(&log_dir).unwrap();
        writeln!(file, "{{\"level\":\"INFO\"}}").unwrap();
        let written = std::fs::read_to_string(log_dir.join(LOG_FILE_NAME)).unwrap();
        assert!(written.contains("INFO"));
    }

    #[test]
    fn test_log_file_truncated_on_restart() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join(LOG_FILE_NAME), "previous run").unwrap();
        create_log_file(temp_dir.path()).unwrap();
        let contents = std::fs::read_to_string(temp_dir.path().join(LOG_FILE_NAME)).unwrap();
        assert!(contents.is_empty());
    }

    #[test]
    fn test_log_file_fails_when_dir_is_a_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let blocker = temp_dir.path().join("logs");
        std::fs::write(&blocker, "not a directory").unwrap();
        assert!(create_log_file(&blocker).is_err());
    }
}
