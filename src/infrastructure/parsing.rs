//! HTML parsing infrastructure for watch-page extraction
//!
//! Trait-based parsers over a captured `MarkupSnapshot`. Selectors and
//! patterns are compiled once at construction; parsing itself never fails,
//! absent elements degrade to defaults or per-thread skips.

pub mod comment_parser;
pub mod config;
pub mod count_parser;
pub mod metadata_parser;
pub mod pii_masker;

// Re-export public types
pub use crate::infrastructure::parsing_error::{ParsingError, ParsingResult};
pub use comment_parser::CommentParser;
pub use config::{CommentSelectors, MetadataSelectors, ParsingConfig};
pub use count_parser::parse_count;
pub use metadata_parser::MetadataExtractor;
pub use pii_masker::mask;

use scraper::{Html, Selector};

/// Generic HTML parser trait for type-safe parsing
pub trait HtmlParser {
    type Output;

    /// Parse an already-built document
    fn parse_document(&self, document: &Html) -> Self::Output;

    /// Parse raw markup
    fn parse_html(&self, html: &str) -> Self::Output {
        self.parse_document(&Html::parse_document(html))
    }
}

/// Compile a CSS selector, mapping the selector error into `ParsingError`
pub(crate) fn compile_selector(selector: &str) -> ParsingResult<Selector> {
    Selector::parse(selector).map_err(|e| ParsingError::invalid_selector(selector, format!("{e:?}")))
}
