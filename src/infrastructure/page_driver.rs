//! Page-automation driver interface
//!
//! The extraction engine only talks to a browser through these traits.
//! A Chromium implementation lives in `chromium_driver`; tests use an
//! in-memory fake.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Driver-level failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Script evaluation failed: {0}")]
    Script(String),

    #[error("Timed out after {timeout_ms}ms waiting for selector: {selector}")]
    WaitTimeout { selector: String, timeout_ms: u64 },

    #[error("Failed to read page content: {0}")]
    Content(String),

    #[error("Browser session is closed")]
    Closed,
}

impl DriverError {
    /// Create a navigation error
    pub fn navigation(url: &str, reason: impl ToString) -> Self {
        Self::Navigation {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a wait timeout error
    pub fn wait_timeout(selector: &str, timeout: Duration) -> Self {
        Self::WaitTimeout {
            selector: selector.to_string(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

pub type DriverResult<T> = Result<T, DriverError>;

/// Load signal that ends a navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// `load` event fired
    Load,
    /// No network activity for a short quiet window
    NetworkIdle,
}

/// Condition a selector wait resolves on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorState {
    /// Present in the DOM and rendered with a non-empty box
    Visible,
}

/// Starts browsing sessions
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    type Session: BrowserSession;

    async fn launch(&self) -> DriverResult<Self::Session>;
}

/// A running browser owning zero or more pages
#[async_trait]
pub trait BrowserSession: Send {
    type Page: PageHandle;

    async fn new_page(&mut self) -> DriverResult<Self::Page>;

    /// Release the browser; calling twice is a no-op
    async fn close(&mut self) -> DriverResult<()>;
}

/// A single page (tab)
#[async_trait]
pub trait PageHandle: Send + Sync {
    async fn goto(&self, url: &str, wait_until: LoadState) -> DriverResult<()>;

    async fn current_url(&self) -> DriverResult<String>;

    async fn evaluate_script(&self, script: &str) -> DriverResult<()>;

    /// Resolve once `selector` reaches `state`, or fail with `DriverError::WaitTimeout`
    async fn wait_for_selector(
        &self,
        selector: &str,
        state: SelectorState,
        timeout: Duration,
    ) -> DriverResult<()>;

    /// Full serialized markup of the current document
    async fn content(&self) -> DriverResult<String>;
}
