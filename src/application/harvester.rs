//! Harvest use case
//!
//! Metadata first; comments only for videos with enough engagement. The
//! browser session is closed on every exit path.

#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::crawler_engine::CrawlerEngine;
use crate::domain::{CommentRecord, VideoMetadata};
use crate::infrastructure::config::HarvestConfig;
use crate::infrastructure::page_driver::BrowserLauncher;

/// Why the comment list looks the way it does
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum CommentOutcome {
    Collected,
    BelowThreshold,
    ReadinessFailed(String),
}

/// Everything learned about one video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestReport {
    pub url: String,
    pub metadata: VideoMetadata,
    pub comments: Vec<CommentRecord>,
    pub comment_outcome: CommentOutcome,
}

/// Runs the metadata-then-comments flow over a crawler engine
pub struct Harvester<L: BrowserLauncher> {
    engine: CrawlerEngine<L>,
    thresholds: HarvestConfig,
}

impl<L: BrowserLauncher> Harvester<L> {
    pub fn new(engine: CrawlerEngine<L>, thresholds: HarvestConfig) -> Self {
        Self { engine, thresholds }
    }

    /// Harvest one video; `force_comments` skips the engagement check
    pub async fn harvest(&mut self, url: &str, force_comments: bool) -> Result<HarvestReport> {
        let result = match self.engine.initialize().await {
            Ok(()) => self.run(url, force_comments).await,
            Err(e) => Err(e),
        };

        let closed = self.engine.close().await;
        match (result, closed) {
            (Ok(report), Ok(())) => Ok(report),
            (Ok(_), Err(close_err)) => Err(close_err),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close_err)) => {
                warn!("Failed to close browser after error: {:#}", close_err);
                Err(e)
            }
        }
    }

    async fn run(&mut self, url: &str, force_comments: bool) -> Result<HarvestReport> {
        let metadata = self.engine.fetch_video_metadata(url).await?;

        let eligible = metadata.meets_thresholds(
            self.thresholds.min_view_count,
            self.thresholds.min_comment_count,
        );
        if !eligible && !force_comments {
            info!(
                "Skipping comments: views {} (min {}), comments {} (min {})",
                metadata.view_count,
                self.thresholds.min_view_count,
                metadata.comment_count,
                self.thresholds.min_comment_count
            );
            return Ok(HarvestReport {
                url: url.to_string(),
                metadata,
                comments: Vec::new(),
                comment_outcome: CommentOutcome::BelowThreshold,
            });
        }

        let extraction = self.engine.extract_comments_detailed(url).await?;
        let comment_outcome = match extraction.failure {
            Some(failure) => CommentOutcome::ReadinessFailed(failure.to_string()),
            None => CommentOutcome::Collected,
        };
        info!("Harvest finished: {} comments ({:?})", extraction.comments.len(), comment_outcome);

        Ok(HarvestReport {
            url: url.to_string(),
            metadata,
            comments: extraction.comments.into_records(),
            comment_outcome,
        })
    }
}
