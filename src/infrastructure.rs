//! Infrastructure layer module
//!
//! This module contains implementations for external concerns like
//! browser automation, HTML parsing, configuration, and file-backed storage.

pub mod chromium_driver;
pub mod config;
pub mod diagnostics;
pub mod keyword_store;
pub mod logging;
pub mod page_driver;
pub mod parsing;
pub mod parsing_error;

// Re-export commonly used items
pub use chromium_driver::{ChromiumLauncher, ChromiumPage, ChromiumSession};
pub use config::{AppConfig, ConfigManager, CrawlerConfig, HarvestConfig, StorageConfig};
pub use diagnostics::DiagnosticSink;
pub use keyword_store::{KeywordStore, KeywordStoreError};
pub use logging::{init_logging_with_config, LoggingConfig};
pub use page_driver::{
    BrowserLauncher, BrowserSession, DriverError, DriverResult, LoadState, PageHandle,
    SelectorState,
};
pub use parsing::{CommentParser, HtmlParser, MetadataExtractor, ParsingConfig};
pub use parsing_error::{ParsingError, ParsingResult};
