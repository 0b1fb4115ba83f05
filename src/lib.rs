//! Video Comment Crawler - staged-readiness comment extraction engine
//!
//! Extracts view/comment counts, upload date and a deduplicated, PII-masked
//! list of top-level comments from a progressively rendered video page.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export the main entry points for easier access
pub use application::{CrawlerEngine, HarvestReport, Harvester};
pub use infrastructure::config::AppConfig;
