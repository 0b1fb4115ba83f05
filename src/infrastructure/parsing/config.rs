//! Parsing configuration for watch-page extraction
//!
//! Centralized configuration for CSS selectors used by the metadata and
//! comment parsers. Defaults mirror the live page structure.

use serde::{Deserialize, Serialize};

use crate::domain::constants::page;

/// Main parsing configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    /// Comment thread selectors
    pub comment_selectors: CommentSelectors,

    /// Video metadata selectors
    pub metadata_selectors: MetadataSelectors,
}

/// CSS selectors for comment threads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentSelectors {
    /// Top-level thread wrapper, iterated in document order
    pub thread: String,

    /// Primary comment view inside a thread
    pub comment_view: String,

    /// Timestamp permalink carrying the comment id
    pub permalink: String,

    pub author: String,
    pub content: String,
    pub likes: String,
}

impl Default for CommentSelectors {
    fn default() -> Self {
        Self {
            thread: page::COMMENT_THREAD.to_string(),
            comment_view: page::COMMENT_VIEW.to_string(),
            permalink: page::PERMALINK_ANCHOR.to_string(),
            author: page::AUTHOR_TEXT.to_string(),
            content: page::CONTENT_TEXT.to_string(),
            likes: page::LIKE_COUNT.to_string(),
        }
    }
}

/// CSS selectors for video metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataSelectors {
    pub view_tooltip: String,
    pub view_tooltip_text: String,
    pub upload_date: String,
    pub comment_count: String,
}

impl Default for MetadataSelectors {
    fn default() -> Self {
        Self {
            view_tooltip: page::VIEW_TOOLTIP.to_string(),
            view_tooltip_text: page::VIEW_TOOLTIP_TEXT.to_string(),
            upload_date: page::UPLOAD_DATE_META.to_string(),
            comment_count: page::COMMENT_COUNT_LABEL.to_string(),
        }
    }
}
