//! Crawler engine: session lifecycle and extraction entry points
//!
//! Owns one browsing session and one page. Every extraction call borrows the
//! engine mutably, so a session is never shared between two calls.

#![allow(clippy::uninlined_format_args)]

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tracing::{info, warn};

use super::readiness::{ReadinessFailure, ReadinessProtocol, ReadinessSettings, ReadinessState};
use crate::domain::{ExtractionBatch, MarkupSnapshot, VideoMetadata};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::diagnostics::DiagnosticSink;
use crate::infrastructure::page_driver::{
    BrowserLauncher, BrowserSession, LoadState, PageHandle, SelectorState,
};
use crate::infrastructure::parsing::{CommentParser, MetadataExtractor};

type PageOf<L> = <<L as BrowserLauncher>::Session as BrowserSession>::Page;

/// Result of one comment extraction, failure kept for reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentExtraction {
    pub comments: ExtractionBatch,
    pub failure: Option<ReadinessFailure>,
}

/// Metadata fetch settings
#[derive(Debug, Clone)]
struct MetadataSettings {
    header_selector: String,
    header_timeout: Duration,
}

/// Extraction engine over a page-automation driver
pub struct CrawlerEngine<L: BrowserLauncher> {
    launcher: L,
    session: Option<L::Session>,
    page: Option<PageOf<L>>,
    readiness: ReadinessSettings,
    metadata: MetadataSettings,
    metadata_extractor: MetadataExtractor,
    comment_parser: CommentParser,
    diagnostics: DiagnosticSink,
}

impl<L: BrowserLauncher> CrawlerEngine<L> {
    /// Create an engine; parsers are compiled here so bad selectors fail early
    pub fn new(launcher: L, config: &AppConfig) -> Result<Self> {
        let selectors = &config.parsing;
        let metadata_extractor = MetadataExtractor::with_config(&selectors.metadata_selectors)
            .context("Invalid metadata selectors")?;
        let comment_parser = CommentParser::with_config(&selectors.comment_selectors)
            .context("Invalid comment selectors")?;

        Ok(Self {
            launcher,
            session: None,
            page: None,
            readiness: ReadinessSettings::from_config(
                &config.crawler,
                &selectors.comment_selectors.thread,
            ),
            metadata: MetadataSettings {
                header_selector: selectors.metadata_selectors.comment_count.clone(),
                header_timeout: Duration::from_millis(config.crawler.metadata_header_timeout_ms),
            },
            metadata_extractor,
            comment_parser,
            diagnostics: DiagnosticSink::new(&config.storage.diagnostic_dump_path),
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.page.is_some()
    }

    /// Launch the browser and open a page; no-op when already running
    pub async fn initialize(&mut self) -> Result<()> {
        if self.is_initialized() {
            return Ok(());
        }

        let mut session = self.launcher.launch().await.context("Failed to launch browser")?;
        match session.new_page().await {
            Ok(page) => {
                self.page = Some(page);
                self.session = Some(session);
                info!("Browser session initialized");
                Ok(())
            }
            Err(e) => {
                if let Err(close_err) = session.close().await {
                    warn!("Failed to close browser after page error: {}", close_err);
                }
                Err(anyhow!(e).context("Failed to open page"))
            }
        }
    }

    fn page(&self) -> Result<&PageOf<L>> {
        self.page
            .as_ref()
            .ok_or_else(|| anyhow!("Crawler engine is not initialized"))
    }

    /// Navigate, nudge the comment header into view and read the metadata block
    pub async fn fetch_video_metadata(&mut self, url: &str) -> Result<VideoMetadata> {
        let page = self.page()?;
        info!("Fetching video metadata: {}", url);

        page.goto(url, LoadState::NetworkIdle)
            .await
            .with_context(|| format!("Failed to load {}", url))?;
        page.evaluate_script(&self.readiness.scroll_script())
            .await
            .context("Failed to scroll page")?;

        if let Err(e) = page
            .wait_for_selector(
                &self.metadata.header_selector,
                SelectorState::Visible,
                self.metadata.header_timeout,
            )
            .await
        {
            warn!("Comment count header did not appear, continuing: {}", e);
        }

        let snapshot = MarkupSnapshot::new(page.content().await.context("Failed to read page content")?);
        let metadata = self.metadata_extractor.extract_metadata(&snapshot);
        info!(
            "Video metadata: views={}, comments={}, upload_date={}",
            metadata.view_count, metadata.comment_count, metadata.upload_date
        );
        Ok(metadata)
    }

    /// Run the readiness protocol and parse the initially rendered comments
    pub async fn extract_comments(&mut self, url: &str) -> Result<ExtractionBatch> {
        Ok(self.extract_comments_detailed(url).await?.comments)
    }

    /// Same as `extract_comments` but keeps the readiness failure, if any
    pub async fn extract_comments_detailed(&mut self, url: &str) -> Result<CommentExtraction> {
        let page = self.page()?;
        let final_state = ReadinessProtocol::new(page, url, &self.readiness)
            .run()
            .await
            .context("Browser session failed during comment readiness")?;

        match final_state {
            ReadinessState::Captured(snapshot) => Ok(CommentExtraction {
                comments: self.comment_parser.parse_comments(&snapshot),
                failure: None,
            }),
            ReadinessState::Failed(failure) => {
                self.dump_diagnostics(page).await;
                Ok(CommentExtraction {
                    comments: ExtractionBatch::new(),
                    failure: Some(failure),
                })
            }
            other => Err(anyhow!("Readiness protocol stopped in non-terminal state {}", other.name())),
        }
    }

    /// Best-effort dump of the current markup
    async fn dump_diagnostics(&self, page: &PageOf<L>) {
        let markup = match page.content().await {
            Ok(markup) => markup,
            Err(e) => {
                warn!("Could not capture page content for diagnostics: {}", e);
                return;
            }
        };
        if let Err(e) = self.diagnostics.write_dump(&markup).await {
            warn!("Failed to write diagnostic dump: {:#}", e);
        }
    }

    /// Release the page and the browser; safe to call repeatedly
    pub async fn close(&mut self) -> Result<()> {
        self.page = None;
        if let Some(mut session) = self.session.take() {
            session.close().await.context("Failed to close browser")?;
            info!("Browser session closed");
        }
        Ok(())
    }
}
