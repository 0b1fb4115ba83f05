//! Video metadata extractor
//!
//! Reads view count, upload date and comment count from a captured watch
//! page. The three lookups are independent and best-effort: a missing
//! element degrades its own field to the zero/empty default and nothing else.

use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use super::config::MetadataSelectors;
use super::count_parser::parse_count;
use super::{compile_selector, HtmlParser, ParsingError, ParsingResult};
use crate::domain::constants::extraction::{MISSING_COUNT_TEXT, VIEW_PHRASE_PATTERN};
use crate::domain::{MarkupSnapshot, VideoMetadata};

/// Parser for the metadata block of a watch page
pub struct MetadataExtractor {
    view_tooltip: Selector,
    view_tooltip_text: Selector,
    upload_date: Selector,
    comment_count: Selector,
    view_phrase: Regex,
}

impl MetadataExtractor {
    /// Create an extractor with default selectors
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&MetadataSelectors::default())
    }

    /// Create an extractor with custom selector configuration
    pub fn with_config(selectors: &MetadataSelectors) -> ParsingResult<Self> {
        Ok(Self {
            view_tooltip: compile_selector(&selectors.view_tooltip)?,
            view_tooltip_text: compile_selector(&selectors.view_tooltip_text)?,
            upload_date: compile_selector(&selectors.upload_date)?,
            comment_count: compile_selector(&selectors.comment_count)?,
            view_phrase: Regex::new(VIEW_PHRASE_PATTERN)
                .map_err(|e| ParsingError::invalid_pattern("view_phrase", e))?,
        })
    }

    /// Extract metadata from a snapshot
    pub fn extract_metadata(&self, snapshot: &MarkupSnapshot) -> VideoMetadata {
        self.parse_html(snapshot.html())
    }

    /// Digit run captured from the view-count tooltip, "0" when unavailable
    fn view_count_text(&self, document: &Html) -> String {
        let Some(tooltip) = document.select(&self.view_tooltip).next() else {
            debug!("View-count tooltip not present");
            return MISSING_COUNT_TEXT.to_string();
        };
        let Some(content) = tooltip.select(&self.view_tooltip_text).next() else {
            debug!("View-count tooltip has no text node");
            return MISSING_COUNT_TEXT.to_string();
        };

        let text = content.text().collect::<String>();
        self.view_phrase
            .captures(text.trim())
            .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| {
                debug!("Tooltip text does not contain a view phrase: {:?}", text.trim());
                MISSING_COUNT_TEXT.to_string()
            })
    }

    fn upload_date(&self, document: &Html) -> String {
        document
            .select(&self.upload_date)
            .next()
            .and_then(|meta| meta.value().attr("content"))
            .map(str::to_string)
            .unwrap_or_default()
    }

    fn comment_count_text(&self, document: &Html) -> String {
        document
            .select(&self.comment_count)
            .next()
            .map(|e| e.text().collect::<String>())
            .unwrap_or_else(|| MISSING_COUNT_TEXT.to_string())
    }
}

impl HtmlParser for MetadataExtractor {
    type Output = VideoMetadata;

    fn parse_document(&self, document: &Html) -> Self::Output {
        let metadata = VideoMetadata {
            upload_date: self.upload_date(document),
            view_count: parse_count(&self.view_count_text(document)),
            comment_count: parse_count(&self.comment_count_text(document)),
        };
        debug!(
            "Extracted metadata: views={}, comments={}, upload_date={:?}",
            metadata.view_count, metadata.comment_count, metadata.upload_date
        );
        metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_PAGE: &str = r#"
        <html><head><meta itemprop="uploadDate" content="2024-03-01T09:00:00-08:00"></head>
        <body>
          <tp-yt-paper-tooltip class="style-scope ytd-watch-info-text">
            <div id="tooltip">조회수 1,234,567회 • 2024. 3. 1.</div>
          </tp-yt-paper-tooltip>
          <ytd-comments-header-renderer>
            <h2><yt-formatted-string class="count-text">댓글 1,024개</yt-formatted-string></h2>
          </ytd-comments-header-renderer>
        </body></html>"#;

    fn extract(html: &str) -> VideoMetadata {
        MetadataExtractor::new()
            .unwrap()
            .extract_metadata(&MarkupSnapshot::new(html))
    }

    #[test]
    fn test_full_metadata() {
        let metadata = extract(FULL_PAGE);
        assert_eq!(metadata.view_count, 1_234_567);
        assert_eq!(metadata.comment_count, 1024);
        assert_eq!(metadata.upload_date, "2024-03-01T09:00:00-08:00");
    }

    #[test]
    fn test_missing_tooltip_degrades_only_views() {
        let html = FULL_PAGE.replace("tp-yt-paper-tooltip", "div");
        let metadata = extract(&html);
        assert_eq!(metadata.view_count, 0);
        assert_eq!(metadata.comment_count, 1024);
        assert_eq!(metadata.upload_date, "2024-03-01T09:00:00-08:00");
    }

    #[test]
    fn test_tooltip_without_phrase() {
        let html = FULL_PAGE.replace("조회수 1,234,567회", "최고의 영상");
        assert_eq!(extract(&html).view_count, 0);
    }

    #[test]
    fn test_english_view_phrase() {
        let html = FULL_PAGE.replace("조회수 1,234,567회", "8,910 views");
        assert_eq!(extract(&html).view_count, 8910);
    }

    #[test]
    fn test_empty_page() {
        assert_eq!(extract("<html><body></body></html>"), VideoMetadata::default());
    }
}
