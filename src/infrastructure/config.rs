//! Configuration infrastructure
//!
//! Contains configuration loading and management for the comment crawler.
//!
//! Configuration is organized into tiers:
//! 1. Crawler timings and browser launch options
//! 2. Extraction settings (selectors, harvest thresholds, storage paths)
//! 3. Application-managed settings (auto-updated by app)

#![allow(clippy::uninlined_format_args)]
#![allow(missing_docs)]

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

use crate::domain::constants::{page, readiness, thresholds};
use crate::infrastructure::parsing::ParsingConfig;

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Browser launch and readiness timings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// CSS selectors for the parsers
    #[serde(default)]
    pub parsing: ParsingConfig,

    /// Engagement thresholds gating comment extraction
    #[serde(default)]
    pub harvest: HarvestConfig,

    /// Output and state file locations
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Application-managed settings (auto-updated)
    #[serde(default)]
    pub app_managed: AppManagedConfig,
}

/// Browser and readiness protocol settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Run Chromium without a window
    pub headless: bool,

    /// Explicit Chromium binary; auto-detected when absent
    pub chrome_executable: Option<String>,

    /// User-Agent override
    pub user_agent: Option<String>,

    /// Comments container selector waited on after the scroll
    pub comments_container_selector: String,

    /// Wait for the comments container (댓글 컨테이너 대기)
    pub container_timeout_ms: u64,

    /// Wait for the first comment thread (첫 스레드 대기)
    pub first_thread_timeout_ms: u64,

    /// Quiet period after the first thread appears
    pub settle_delay_ms: u64,

    /// Wait for the comment header during metadata fetch
    pub metadata_header_timeout_ms: u64,

    /// Scroll offset that triggers lazy loading of comments
    pub scroll_offset_px: u32,

    /// Interval between selector probes
    pub poll_interval_ms: u64,

    /// Quiet window treated as network idle after the load completes
    pub network_idle_quiet_ms: u64,

    /// Upper bound on waiting for the document to finish loading
    pub navigation_timeout_ms: u64,
}

/// Engagement thresholds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    pub min_view_count: u64,
    pub min_comment_count: u64,
}

/// File locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Markup dump written when the readiness protocol fails (overwritten each time)
    pub diagnostic_dump_path: PathBuf,

    /// CSV keyword history
    pub keyword_store_path: PathBuf,
}

/// Logging configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Log file naming strategy: "unified", "timestamped"
    pub file_naming_strategy: String,

    /// Number of log files to keep (older files will be deleted)
    pub max_files: u32,

    /// Enable automatic log cleanup on startup
    pub auto_cleanup_logs: bool,

    /// Keep only the most recent log file (delete all others)
    pub keep_only_latest: bool,

    /// Module-specific log level filters (e.g., "chromiumoxide": "warn")
    pub module_filters: HashMap<String, String>,
}

/// Application-managed settings that are automatically updated by the app
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppManagedConfig {
    /// URL of the last harvested video
    pub last_harvested_url: Option<String>,

    /// Timestamp of last successful harvest
    pub last_successful_harvest: Option<String>,

    /// Comments collected in the last harvest
    pub last_comment_count: Option<u32>,

    /// Configuration version for migration purposes
    pub config_version: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            headless: defaults::HEADLESS,
            chrome_executable: None,
            user_agent: None,
            comments_container_selector: page::COMMENTS_CONTAINER.to_string(),
            container_timeout_ms: readiness::CONTAINER_TIMEOUT_MS,
            first_thread_timeout_ms: readiness::FIRST_THREAD_TIMEOUT_MS,
            settle_delay_ms: readiness::SETTLE_DELAY_MS,
            metadata_header_timeout_ms: readiness::METADATA_HEADER_TIMEOUT_MS,
            scroll_offset_px: readiness::SCROLL_OFFSET_PX,
            poll_interval_ms: defaults::POLL_INTERVAL_MS,
            network_idle_quiet_ms: defaults::NETWORK_IDLE_QUIET_MS,
            navigation_timeout_ms: defaults::NAVIGATION_TIMEOUT_MS,
        }
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            min_view_count: thresholds::MIN_VIEW_COUNT,
            min_comment_count: thresholds::MIN_COMMENT_COUNT,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let data_dir = ConfigManager::get_app_data_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            diagnostic_dump_path: data_dir.join(defaults::DIAGNOSTIC_DUMP_FILE),
            keyword_store_path: data_dir.join(defaults::KEYWORD_STORE_FILE),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            file_naming_strategy: defaults::LOG_FILE_NAMING_STRATEGY.to_string(),
            max_files: defaults::LOG_MAX_FILES,
            auto_cleanup_logs: defaults::LOG_AUTO_CLEANUP,
            keep_only_latest: defaults::LOG_KEEP_ONLY_LATEST,
            module_filters: {
                let mut filters = HashMap::new();
                filters.insert("chromiumoxide".to_string(), "warn".to_string());
                filters.insert("tungstenite".to_string(), "warn".to_string());
                filters.insert("html5ever".to_string(), "warn".to_string());
                filters.insert("selectors".to_string(), "warn".to_string());
                filters.insert("tokio".to_string(), "info".to_string());
                filters
            },
        }
    }
}

impl Default for AppManagedConfig {
    fn default() -> Self {
        Self {
            last_harvested_url: None,
            last_successful_harvest: None,
            last_comment_count: None,
            config_version: defaults::CONFIG_VERSION,
        }
    }
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join(defaults::APP_DIR_NAME);

        Ok(config_dir)
    }

    /// Get application data directory
    pub fn get_app_data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .context("Failed to get user data directory")?
            .join(defaults::APP_DIR_NAME);

        Ok(data_dir)
    }

    /// Create a configuration manager for the default location
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;
        let config_path = config_dir.join(defaults::CONFIG_FILE_NAME);

        Ok(Self { config_path })
    }

    /// Create a configuration manager for an explicit file
    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Load configuration from file, creating default if it doesn't exist
    pub async fn load_config(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            info!("Configuration file not found, creating default: {:?}", self.config_path);
            let default_config = AppConfig::default();
            self.save_config(&default_config).await?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .context("Failed to read configuration file")?;

        match serde_json::from_str::<AppConfig>(&content) {
            Ok(mut config) => {
                info!("Loaded configuration from: {:?}", self.config_path);
                self.migrate_config_if_needed(&mut config).await?;
                Ok(config)
            }
            Err(parse_error) => {
                warn!("⚠️  Configuration parse error: {}", parse_error);
                warn!("⚠️  Resetting to default configuration");

                // Create backup of corrupted config
                let backup_path = self.config_path.with_extension("json.corrupted");
                if let Err(e) = fs::copy(&self.config_path, &backup_path).await {
                    warn!("Failed to create backup of corrupted config: {}", e);
                } else {
                    info!("Backed up corrupted config to: {:?}", backup_path);
                }

                self.reset_to_defaults().await
            }
        }
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        // Ensure config directory exists
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .context("Failed to create config directory")?;
            }
        }

        let content =
            serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }

    /// Update app-managed settings (like the last harvested URL)
    pub async fn update_app_managed<F>(&self, updater: F) -> Result<()>
    where
        F: FnOnce(&mut AppManagedConfig),
    {
        let mut config = self.load_config().await?;
        updater(&mut config.app_managed);
        self.save_config(&config).await
    }

    /// Reset configuration to defaults (useful for troubleshooting)
    pub async fn reset_to_defaults(&self) -> Result<AppConfig> {
        info!("🔄 Resetting configuration to defaults");

        let default_config = AppConfig::default();
        self.save_config(&default_config)
            .await
            .context("Failed to save default configuration")?;

        info!("✅ Configuration reset to defaults");
        Ok(default_config)
    }

    /// Migrate configuration from older versions
    pub async fn migrate_config_if_needed(&self, config: &mut AppConfig) -> Result<bool> {
        if config.app_managed.config_version >= defaults::CONFIG_VERSION {
            return Ok(false);
        }

        info!(
            "🔄 Migrating configuration from version {} to {}",
            config.app_managed.config_version,
            defaults::CONFIG_VERSION
        );
        // 버전 0 파일은 누락 섹션이 serde default로 채워진 상태
        config.app_managed.config_version = defaults::CONFIG_VERSION;

        self.save_config(config).await?;
        Ok(true)
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// Default configuration values
pub mod defaults {
    /// Directory name under the platform config / data dirs
    pub const APP_DIR_NAME: &str = "video-comment-crawler";

    /// Configuration file name
    pub const CONFIG_FILE_NAME: &str = "crawler_config.json";

    /// Current configuration schema version
    pub const CONFIG_VERSION: u32 = 1;

    /// Default headless mode
    pub const HEADLESS: bool = true;

    /// Default selector probe interval in milliseconds
    pub const POLL_INTERVAL_MS: u64 = 100;

    /// Default network-idle quiet window in milliseconds
    pub const NETWORK_IDLE_QUIET_MS: u64 = 500;

    /// Default document-load bound in milliseconds
    pub const NAVIGATION_TIMEOUT_MS: u64 = 30_000;

    /// Diagnostic markup dump file name
    pub const DIAGNOSTIC_DUMP_FILE: &str = "debug_page_content.html";

    /// Keyword history file name
    pub const KEYWORD_STORE_FILE: &str = "keywords.csv";

    // Log configuration defaults
    /// Default log level
    pub const LOG_LEVEL: &str = "info";

    /// Default JSON format setting
    pub const LOG_JSON_FORMAT: bool = false;

    /// Default console output setting
    pub const LOG_CONSOLE_OUTPUT: bool = true;

    /// Default file output setting
    pub const LOG_FILE_OUTPUT: bool = true;

    /// Default log file naming strategy
    pub const LOG_FILE_NAMING_STRATEGY: &str = "unified";

    /// Default maximum log files to keep
    pub const LOG_MAX_FILES: u32 = 5;

    /// Default auto cleanup logs setting
    pub const LOG_AUTO_CLEANUP: bool = true;

    /// Default keep only latest setting
    pub const LOG_KEEP_ONLY_LATEST: bool = false;
}
