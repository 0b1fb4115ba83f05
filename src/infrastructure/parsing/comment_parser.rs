//! Comment thread parser
//!
//! Walks comment threads in document order and turns each into a
//! `ThreadOutcome`. A malformed thread becomes a logged skip and never aborts
//! the rest of the batch. Identity is the permalink `lc` parameter; an id
//! that was already emitted earlier in the same pass is skipped.

#![allow(clippy::uninlined_format_args)]

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use super::config::CommentSelectors;
use super::pii_masker::{contains_pii, mask};
use super::{compile_selector, HtmlParser, ParsingError, ParsingResult};
use crate::domain::constants::extraction::{COMMENT_ID_PATTERN, DEFAULT_LIKES};
use crate::domain::{CommentRecord, ExtractionBatch, MarkupSnapshot, SkipReason, ThreadOutcome};

/// Parser for top-level comment threads
pub struct CommentParser {
    thread: Selector,
    comment_view: Selector,
    permalink: Selector,
    author: Selector,
    content: Selector,
    likes: Selector,
    comment_id: Regex,
}

impl CommentParser {
    /// Create a new comment parser with default selectors
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&CommentSelectors::default())
    }

    /// Create parser with custom selector configuration
    pub fn with_config(selectors: &CommentSelectors) -> ParsingResult<Self> {
        Ok(Self {
            thread: compile_selector(&selectors.thread)?,
            comment_view: compile_selector(&selectors.comment_view)?,
            permalink: compile_selector(&selectors.permalink)?,
            author: compile_selector(&selectors.author)?,
            content: compile_selector(&selectors.content)?,
            likes: compile_selector(&selectors.likes)?,
            comment_id: Regex::new(COMMENT_ID_PATTERN)
                .map_err(|e| ParsingError::invalid_pattern("comment_id", e))?,
        })
    }

    /// Parse a snapshot into a deduplicated batch
    pub fn parse_comments(&self, snapshot: &MarkupSnapshot) -> ExtractionBatch {
        self.parse_html(snapshot.html())
    }

    /// Parse every thread of a snapshot, keeping skip reasons
    pub fn parse_threads(&self, snapshot: &MarkupSnapshot) -> Vec<ThreadOutcome> {
        let document = Html::parse_document(snapshot.html());
        let mut batch = ExtractionBatch::new();
        self.walk_threads(&document, &mut batch)
    }

    fn walk_threads(&self, document: &Html, batch: &mut ExtractionBatch) -> Vec<ThreadOutcome> {
        let mut outcomes = Vec::new();

        for (index, thread) in document.select(&self.thread).enumerate() {
            let outcome = self.parse_thread(&thread, batch);
            match &outcome {
                ThreadOutcome::Parsed(record) => {
                    // only an emitted record claims its id
                    batch.push(record.clone());
                }
                ThreadOutcome::Skipped(reason) => {
                    debug!("Skipping comment thread {}: {}", index, reason);
                }
            }
            outcomes.push(outcome);
        }

        outcomes
    }

    fn parse_thread(&self, thread: &ElementRef, batch: &ExtractionBatch) -> ThreadOutcome {
        let Some(view) = thread.select(&self.comment_view).next() else {
            return ThreadOutcome::Skipped(SkipReason::MissingCommentView);
        };

        let Some(href) = view
            .select(&self.permalink)
            .next()
            .and_then(|anchor| anchor.value().attr("href"))
            .filter(|href| !href.is_empty())
        else {
            return ThreadOutcome::Skipped(SkipReason::MissingPermalink);
        };

        let Some(id) = self.extract_comment_id(href) else {
            return ThreadOutcome::Skipped(SkipReason::MissingCommentId);
        };

        if batch.contains_id(&id) {
            return ThreadOutcome::Skipped(SkipReason::DuplicateId(id));
        }

        let Some(author) = Self::text_of(&view, &self.author) else {
            return ThreadOutcome::Skipped(SkipReason::MissingAuthor);
        };
        let Some(content) = Self::text_of(&view, &self.content) else {
            return ThreadOutcome::Skipped(SkipReason::MissingContent);
        };
        let likes = Self::text_of(&view, &self.likes).unwrap_or_else(|| DEFAULT_LIKES.to_string());

        if contains_pii(&author) || contains_pii(&content) {
            debug!("Masking personal data in comment {}", id);
        }

        ThreadOutcome::Parsed(CommentRecord {
            id,
            author: mask(&author),
            content: mask(&content),
            likes,
        })
    }

    /// Pull the `lc` token out of a permalink
    pub fn extract_comment_id(&self, href: &str) -> Option<String> {
        self.comment_id
            .captures(href)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Trimmed text of the first match; present-but-empty still counts as present
    fn text_of(element: &ElementRef, selector: &Selector) -> Option<String> {
        element
            .select(selector)
            .next()
            .map(|e| e.text().collect::<String>().trim().to_string())
    }
}

impl HtmlParser for CommentParser {
    type Output = ExtractionBatch;

    fn parse_document(&self, document: &Html) -> Self::Output {
        let mut batch = ExtractionBatch::new();
        let outcomes = self.walk_threads(document, &mut batch);
        let skipped = outcomes.iter().filter(|o| o.skip_reason().is_some()).count();

        info!(
            "Collected {} comments from initial batch ({} threads, {} skipped)",
            batch.len(),
            outcomes.len(),
            skipped
        );
        batch
    }
}
