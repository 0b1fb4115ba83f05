//! Logging system configuration and initialization
//!
//! This module provides the logging setup with:
//! - File logging with rotation of the previous run's file
//! - Configuration file based log level control
//! - Structured JSON logging (optional)
//! - Console and file output support
//! - Log files stored relative to executable location
//! - KST (Korea Standard Time) timezone support

#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use chrono::{FixedOffset, Offset, Utc};
use lazy_static::lazy_static;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_appender::{non_blocking, non_blocking::NonBlocking, rolling};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, time::FormatTime},
    layer::{Layered, SubscriberExt},
    util::SubscriberInitExt,
};

// Re-export LoggingConfig from config module
pub use crate::infrastructure::config::LoggingConfig;

/// Base name of the unified log file
const LOG_FILE_STEM: &str = "crawler";

// Global guard to keep the log file writer alive
lazy_static! {
    static ref LOG_GUARDS: Mutex<Vec<tracing_appender::non_blocking::WorkerGuard>> =
        Mutex::new(Vec::new());
}

/// UTC+9
const KST_OFFSET_SECS: i32 = 9 * 3600;

fn kst() -> FixedOffset {
    FixedOffset::east_opt(KST_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Custom time formatter for KST (Korea Standard Time, UTC+9)
struct KstTimeFormatter;

impl FormatTime for KstTimeFormatter {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        let kst_time = Utc::now().with_timezone(&kst());
        write!(w, "{}", kst_time.format("%Y-%m-%d %H:%M:%S%.3f %Z"))
    }
}

/// Get the log directory relative to the executable location
pub fn get_log_directory() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    exe_dir.join("logs")
}

/// Log file name for the configured naming strategy
fn log_file_name(config: &LoggingConfig) -> String {
    match config.file_naming_strategy.as_str() {
        "timestamped" => {
            let now = Utc::now().with_timezone(&kst());
            format!("{}-{}.log", LOG_FILE_STEM, now.format("%Y%m%d"))
        }
        _ => format!("{}.log", LOG_FILE_STEM),
    }
}

/// Rotate existing log file by renaming it with timestamp
fn rotate_existing_log_file(log_dir: &Path, log_file_name: &str) -> Result<()> {
    let log_file_path = log_dir.join(log_file_name);
    if !log_file_path.exists() {
        return Ok(());
    }

    let metadata = std::fs::metadata(&log_file_path)
        .map_err(|e| anyhow!("Failed to get log file metadata: {}", e))?;

    let file_time = metadata
        .created()
        .or_else(|_| metadata.modified())
        .unwrap_or_else(|_| std::time::SystemTime::now());

    let datetime: chrono::DateTime<Utc> = file_time.into();
    let kst_datetime = datetime.with_timezone(&kst());

    let file_stem = log_file_name.trim_end_matches(".log");
    let timestamped_name = format!("{}.{}.log", file_stem, kst_datetime.format("%Y%m%dT%H%M%S"));
    let timestamped_path = log_dir.join(&timestamped_name);

    std::fs::rename(&log_file_path, &timestamped_path).map_err(|e| {
        anyhow!(
            "Failed to rotate log file {} to {}: {}",
            log_file_path.display(),
            timestamped_path.display(),
            e
        )
    })?;

    Ok(())
}

/// Build the env filter; RUST_LOG wins when set
fn build_env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut filter = EnvFilter::new(&config.level);

        // Suppress CDP / parser chatter unless TRACE level is specifically requested
        if !config.level.to_lowercase().contains("trace") {
            for (module, level) in &config.module_filters {
                match format!("{}={}", module, level).parse() {
                    Ok(directive) => filter = filter.add_directive(directive),
                    Err(e) => eprintln!("Ignoring invalid log filter {}={}: {}", module, level, e),
                }
            }
            if let Ok(directive) = format!("video_comment_crawler={}", config.level).parse() {
                filter = filter.add_directive(directive);
            }
        }

        filter
    })
}

type BaseSubscriber = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<BaseSubscriber> + Send + Sync>;

/// Output layers for the configured format
///
/// Console goes to stderr so stdout stays clean for the JSON report.
fn build_layers(config: &LoggingConfig, file_writer: Option<NonBlocking>) -> Vec<BoxedLayer> {
    let mut layers: Vec<BoxedLayer> = Vec::new();

    if let Some(writer) = file_writer {
        if config.json_format {
            layers.push(
                fmt::Layer::new()
                    .json()
                    .with_writer(writer)
                    .with_timer(KstTimeFormatter)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_ansi(false)
                    .boxed(),
            );
        } else {
            // time + level + message only
            layers.push(
                fmt::Layer::new()
                    .with_writer(writer)
                    .with_timer(KstTimeFormatter)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_ansi(false)
                    .boxed(),
            );
        }
    }

    if config.console_output {
        layers.push(
            fmt::Layer::new()
                .with_writer(std::io::stderr)
                .with_timer(KstTimeFormatter)
                .with_target(false)
                .boxed(),
        );
    }

    layers
}

/// Initialize logging with custom configuration
///
/// # Environment Variable Override
/// ```bash
/// # Show CDP traffic while debugging readiness waits
/// RUST_LOG="debug,chromiumoxide=debug" video-comment-crawler <URL>
/// ```
pub fn init_logging_with_config(config: LoggingConfig) -> Result<()> {
    if !config.file_output && !config.console_output {
        return Err(anyhow!("No logging output configured"));
    }

    let log_dir = get_log_directory();
    let file_name = log_file_name(&config);

    let file_writer = if config.file_output {
        std::fs::create_dir_all(&log_dir)
            .map_err(|e| anyhow!("Failed to create log directory {:?}: {}", log_dir, e))?;

        rotate_existing_log_file(&log_dir, &file_name)?;

        if config.auto_cleanup_logs {
            cleanup_old_logs(&log_dir, &config)?;
        }

        let file_appender = rolling::never(&log_dir, &file_name);
        let (file_writer, file_guard) = non_blocking(file_appender);

        // Store the guard globally to prevent it from being dropped
        LOG_GUARDS
            .lock()
            .map_err(|_| anyhow!("Log guard store poisoned"))?
            .push(file_guard);
        Some(file_writer)
    } else {
        None
    };

    Registry::default()
        .with(build_env_filter(&config))
        .with(build_layers(&config, file_writer))
        .try_init()
        .map_err(|e| anyhow!("Failed to install subscriber: {}", e))?;

    info!("Logging system initialized");
    info!("Log directory: {:?}", log_dir);
    info!("Log level: {}", config.level);
    info!("JSON format: {}", config.json_format);
    info!("Console output: {}", config.console_output);
    info!("File output: {}", config.file_output);
    if config.level.to_lowercase().contains("trace") {
        info!("TRACE level active - dependency logs are not filtered");
    }

    Ok(())
}

/// Log system information for diagnostics
pub fn log_system_info() {
    info!("=== Video Comment Crawler System Information ===");
    info!("Application version: {}", env!("CARGO_PKG_VERSION"));
    info!("Operating system: {}", std::env::consts::OS);
    info!("Architecture: {}", std::env::consts::ARCH);

    if let Ok(current_dir) = std::env::current_dir() {
        info!("Working directory: {:?}", current_dir);
    }

    info!("Log directory: {:?}", get_log_directory());
    info!("================================================");
}

/// `.log` files in the directory, newest first
fn collect_log_files(log_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut log_files = Vec::new();

    for entry in std::fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();

        let is_log = path.is_file()
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(".log"));
        if !is_log {
            continue;
        }
        if let Ok(modified) = entry.metadata().and_then(|m| m.modified()) {
            log_files.push((path, modified));
        }
    }

    log_files.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(log_files.into_iter().map(|(path, _)| path).collect())
}

/// Clean up old log files based on configuration, returns how many were removed
fn cleanup_old_logs(log_dir: &Path, config: &LoggingConfig) -> Result<usize> {
    if !log_dir.exists() {
        return Ok(0);
    }

    let log_files = collect_log_files(log_dir)?;
    let keep = if config.keep_only_latest {
        1
    } else {
        config.max_files as usize
    };

    let mut removed = 0;
    for path in log_files.iter().skip(keep) {
        if let Err(e) = std::fs::remove_file(path) {
            warn!("Failed to remove old log file {:?}: {}", path, e);
        } else {
            removed += 1;
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, age_secs: u64) {
        let path = dir.join(name);
        std::fs::write(&path, "x").unwrap();
        let file = std::fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(age_secs))
            .unwrap();
    }

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert!(!config.level.is_empty());
        assert!(config.console_output);
        assert!(config.file_output);
    }

    fn capture_first_line(config: &LoggingConfig) -> String {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("crawler.log");
        let (writer, guard) = non_blocking(std::fs::File::create(&path).unwrap());

        let subscriber = Registry::default()
            .with(EnvFilter::new("info"))
            .with(build_layers(config, Some(writer)));
        tracing::subscriber::with_default(subscriber, || {
            info!(comments = 3, "harvest finished");
        });
        // flushes the background writer
        drop(guard);

        let written = std::fs::read_to_string(&path).unwrap();
        written.lines().next().unwrap_or_default().to_string()
    }

    #[test]
    fn test_json_file_layer_with_console() {
        let config = LoggingConfig {
            json_format: true,
            console_output: true,
            ..LoggingConfig::default()
        };

        let line = capture_first_line(&config);
        let event: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(event["fields"]["message"], "harvest finished");
        assert_eq!(event["fields"]["comments"], 3);
        assert_eq!(event["level"], "INFO");
    }

    #[test]
    fn test_plain_file_layer_with_console() {
        let config = LoggingConfig {
            json_format: false,
            console_output: true,
            ..LoggingConfig::default()
        };

        let line = capture_first_line(&config);
        assert!(line.contains("INFO"));
        assert!(line.contains("harvest finished"));
        assert!(!line.starts_with('{'));
    }

    #[test]
    fn test_layer_count_follows_outputs() {
        let console_only = LoggingConfig {
            file_output: false,
            ..LoggingConfig::default()
        };
        assert_eq!(build_layers(&console_only, None).len(), 1);

        let silent = LoggingConfig {
            console_output: false,
            ..LoggingConfig::default()
        };
        assert!(build_layers(&silent, None).is_empty());
        assert!(init_logging_with_config(LoggingConfig {
            console_output: false,
            file_output: false,
            ..LoggingConfig::default()
        })
        .is_err());
    }

    #[test]
    fn test_log_directory_creation() {
        let log_dir = get_log_directory();
        assert!(log_dir.to_string_lossy().ends_with("logs"));
    }

    #[test]
    fn test_log_file_name_strategies() {
        let mut config = LoggingConfig::default();
        assert_eq!(log_file_name(&config), "crawler.log");

        config.file_naming_strategy = "timestamped".to_string();
        let name = log_file_name(&config);
        assert!(name.starts_with("crawler-") && name.ends_with(".log"));
    }

    #[test]
    fn test_rotation_renames_existing_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("crawler.log"), "previous run").unwrap();

        rotate_existing_log_file(dir.path(), "crawler.log").unwrap();

        assert!(!dir.path().join("crawler.log").exists());
        let rotated: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(rotated.len(), 1);
    }

    #[test]
    fn test_cleanup_keeps_newest_files() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.log", 300);
        touch(dir.path(), "b.log", 200);
        touch(dir.path(), "c.log", 100);
        touch(dir.path(), "notes.txt", 400);

        let config = LoggingConfig {
            max_files: 2,
            ..LoggingConfig::default()
        };
        assert_eq!(cleanup_old_logs(dir.path(), &config).unwrap(), 1);
        assert!(!dir.path().join("a.log").exists());
        assert!(dir.path().join("notes.txt").exists());

        let latest_only = LoggingConfig {
            keep_only_latest: true,
            ..LoggingConfig::default()
        };
        assert_eq!(cleanup_old_logs(dir.path(), &latest_only).unwrap(), 1);
        assert!(dir.path().join("c.log").exists());
    }
}
