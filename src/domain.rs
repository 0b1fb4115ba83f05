//! Domain module - Core entities and value objects
//!
//! All entities here are value objects constructed fresh per extraction call
//! from a markup snapshot and never mutated afterwards.
//!
//! Modern Rust module organization (Rust 2018+ style):
//! - Each module is its own file in the domain/ directory
//! - Public exports are defined here for convenience

pub mod comment;
pub mod constants;
pub mod keyword;
pub mod video;

// Re-export commonly used items for convenience
pub use comment::{CommentRecord, ExtractionBatch, SkipReason, ThreadOutcome};
pub use keyword::KeywordEntry;
pub use video::{MarkupSnapshot, VideoMetadata};
