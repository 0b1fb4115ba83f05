//! Diagnostic markup dump
//!
//! When the readiness protocol gives up, whatever markup the page had at that
//! moment is written to a fixed path so the failure can be inspected offline.
//! Each failure overwrites the previous dump.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Write-once-per-failure sink for page markup
#[derive(Debug, Clone)]
pub struct DiagnosticSink {
    path: PathBuf,
}

impl DiagnosticSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist markup, replacing any previous dump
    pub async fn write_dump(&self, markup: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create diagnostic directory: {:?}", parent))?;
            }
        }

        fs::write(&self.path, markup)
            .await
            .with_context(|| format!("Failed to write diagnostic dump: {:?}", self.path))?;

        info!("Saved page content for debugging to {:?} ({} bytes)", self.path, markup.len());
        Ok(())
    }
}
