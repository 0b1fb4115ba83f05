//! Application layer - Use cases and application services
//!
//! This module contains the readiness protocol, the crawler engine that owns
//! the browsing session, and the harvest use case that coordinates them.

pub mod crawler_engine;
pub mod harvester;
pub mod readiness;

// Re-export commonly used items
pub use crawler_engine::{CommentExtraction, CrawlerEngine};
pub use harvester::{CommentOutcome, HarvestReport, Harvester};
pub use readiness::{ReadinessFailure, ReadinessProtocol, ReadinessSettings, ReadinessState};
