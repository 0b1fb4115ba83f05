#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

use video_comment_crawler::application::{CrawlerEngine, Harvester};
use video_comment_crawler::infrastructure::keyword_store::KeywordStore;
use video_comment_crawler::infrastructure::logging::{init_logging_with_config, log_system_info};
use video_comment_crawler::infrastructure::{ChromiumLauncher, ConfigManager};

#[derive(Parser)]
#[command(
    name = "video-comment-crawler",
    version,
    about = "Extract metadata and top-level comments from a video page"
)]
struct Cli {
    /// Watch page URL
    url: String,

    /// Path to config JSON file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Search keyword to record in the keyword history
    #[arg(long)]
    keyword: Option<String>,

    /// Collect comments even when the video is below the engagement thresholds
    #[arg(long)]
    force_comments: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };
    let config = config_manager.load_config().await?;

    init_logging_with_config(config.logging.clone())?;
    log_system_info();

    let keywords = KeywordStore::new(&config.storage.keyword_store_path);
    if let Some(keyword) = &cli.keyword {
        let (text, last_used) = keywords
            .check_and_add(keyword)
            .context("Failed to read keyword history")?;
        info!("Keyword '{}' last used: {}", text, last_used.as_deref().unwrap_or("never"));
    }

    let engine = CrawlerEngine::new(ChromiumLauncher::new(&config.crawler), &config)?;
    let mut harvester = Harvester::new(engine, config.harvest.clone());
    let report = harvester.harvest(&cli.url, cli.force_comments).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if let Some(keyword) = &cli.keyword {
        if let Err(e) = keywords.touch(keyword) {
            warn!("Failed to update keyword history: {}", e);
        }
    }

    let comment_count = u32::try_from(report.comments.len()).unwrap_or(u32::MAX);
    config_manager
        .update_app_managed(|managed| {
            managed.last_harvested_url = Some(report.url.clone());
            managed.last_successful_harvest = Some(chrono::Utc::now().to_rfc3339());
            managed.last_comment_count = Some(comment_count);
        })
        .await?;

    Ok(())
}
