//! Staged readiness protocol for the comment section
//!
//! The comment subsystem renders progressively. The protocol walks an
//! explicit state machine, one suspension point per transition:
//!
//! ```text
//! Init -> Navigated -> ContainerVisible -> FirstThreadVisible -> Stabilized -> Captured
//!            \______________\___________________\_______________________________> Failed
//! ```
//!
//! Only selector waits feed `Failed`. Any other driver error is fatal for the
//! session and propagates to the caller.

#![allow(clippy::uninlined_format_args)]

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::constants::page::SCROLL_SCRIPT_TEMPLATE;
use crate::domain::MarkupSnapshot;
use crate::infrastructure::config::CrawlerConfig;
use crate::infrastructure::page_driver::{DriverResult, LoadState, PageHandle, SelectorState};

/// Stage at which the protocol gave up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessFailure {
    /// State the failed transition started from
    pub stage: String,
    pub reason: String,
}

impl fmt::Display for ReadinessFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> Failed: {}", self.stage, self.reason)
    }
}

/// Protocol state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessState {
    Init,
    Navigated,
    ContainerVisible,
    FirstThreadVisible,
    Stabilized,
    Captured(MarkupSnapshot),
    Failed(ReadinessFailure),
}

impl ReadinessState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Init => "Init",
            Self::Navigated => "Navigated",
            Self::ContainerVisible => "ContainerVisible",
            Self::FirstThreadVisible => "FirstThreadVisible",
            Self::Stabilized => "Stabilized",
            Self::Captured(_) => "Captured",
            Self::Failed(_) => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Captured(_) | Self::Failed(_))
    }
}

/// Selectors and timings the protocol runs with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessSettings {
    pub container_selector: String,
    pub thread_selector: String,
    pub container_timeout: Duration,
    pub first_thread_timeout: Duration,
    pub settle_delay: Duration,
    pub scroll_offset_px: u32,
}

impl ReadinessSettings {
    pub fn from_config(crawler: &CrawlerConfig, thread_selector: &str) -> Self {
        Self {
            container_selector: crawler.comments_container_selector.clone(),
            thread_selector: thread_selector.to_string(),
            container_timeout: Duration::from_millis(crawler.container_timeout_ms),
            first_thread_timeout: Duration::from_millis(crawler.first_thread_timeout_ms),
            settle_delay: Duration::from_millis(crawler.settle_delay_ms),
            scroll_offset_px: crawler.scroll_offset_px,
        }
    }

    pub fn scroll_script(&self) -> String {
        SCROLL_SCRIPT_TEMPLATE.replace("{}", &self.scroll_offset_px.to_string())
    }
}

/// One protocol run against one page and one URL
pub struct ReadinessProtocol<'a, P: PageHandle> {
    page: &'a P,
    url: &'a str,
    settings: &'a ReadinessSettings,
}

impl<'a, P: PageHandle> ReadinessProtocol<'a, P> {
    pub fn new(page: &'a P, url: &'a str, settings: &'a ReadinessSettings) -> Self {
        Self { page, url, settings }
    }

    /// Drive transitions until a terminal state
    pub async fn run(&self) -> DriverResult<ReadinessState> {
        let mut state = ReadinessState::Init;
        while !state.is_terminal() {
            let from = state.name();
            state = self.step(state).await?;
            debug!("Readiness transition: {} -> {}", from, state.name());
        }

        match &state {
            ReadinessState::Captured(snapshot) => {
                info!("Comment section ready, captured {} bytes", snapshot.len());
            }
            ReadinessState::Failed(failure) => warn!("Readiness protocol failed: {}", failure),
            _ => {}
        }
        Ok(state)
    }

    /// Apply exactly one transition
    pub async fn step(&self, state: ReadinessState) -> DriverResult<ReadinessState> {
        match state {
            ReadinessState::Init => self.navigate().await,
            ReadinessState::Navigated => self.reveal_container().await,
            ReadinessState::ContainerVisible => self.await_first_thread().await,
            ReadinessState::FirstThreadVisible => Ok(self.settle().await),
            ReadinessState::Stabilized => self.capture().await,
            terminal => Ok(terminal),
        }
    }

    /// Init -> Navigated
    async fn navigate(&self) -> DriverResult<ReadinessState> {
        let current = self.page.current_url().await?;
        if current == self.url {
            debug!("Page already at {}, skipping navigation", self.url);
        } else {
            info!("Navigating to {}", self.url);
            self.page.goto(self.url, LoadState::Load).await?;
        }
        Ok(ReadinessState::Navigated)
    }

    /// Navigated -> ContainerVisible
    async fn reveal_container(&self) -> DriverResult<ReadinessState> {
        // 스크롤로 댓글 섹션 lazy-loading 유도
        self.page.evaluate_script(&self.settings.scroll_script()).await?;

        Ok(self
            .wait_visible(
                ReadinessState::Navigated,
                &self.settings.container_selector,
                self.settings.container_timeout,
                ReadinessState::ContainerVisible,
            )
            .await)
    }

    /// ContainerVisible -> FirstThreadVisible
    async fn await_first_thread(&self) -> DriverResult<ReadinessState> {
        Ok(self
            .wait_visible(
                ReadinessState::ContainerVisible,
                &self.settings.thread_selector,
                self.settings.first_thread_timeout,
                ReadinessState::FirstThreadVisible,
            )
            .await)
    }

    /// FirstThreadVisible -> Stabilized
    async fn settle(&self) -> ReadinessState {
        if !self.settings.settle_delay.is_zero() {
            tokio::time::sleep(self.settings.settle_delay).await;
        }
        ReadinessState::Stabilized
    }

    /// Stabilized -> Captured
    async fn capture(&self) -> DriverResult<ReadinessState> {
        let html = self.page.content().await?;
        Ok(ReadinessState::Captured(MarkupSnapshot::new(html)))
    }

    async fn wait_visible(
        &self,
        from: ReadinessState,
        selector: &str,
        timeout: Duration,
        next: ReadinessState,
    ) -> ReadinessState {
        match self
            .page
            .wait_for_selector(selector, SelectorState::Visible, timeout)
            .await
        {
            Ok(()) => next,
            Err(e) => ReadinessState::Failed(ReadinessFailure {
                stage: from.name().to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::constants::page::{COMMENTS_CONTAINER, COMMENT_THREAD};
    use crate::infrastructure::page_driver::BrowserSession;
    use crate::infrastructure::BrowserLauncher;
    use crate::test_utils::FakeBrowser;

    const URL: &str = "https://www.youtube.com/watch?v=vid";

    fn settings() -> ReadinessSettings {
        let mut crawler = CrawlerConfig::default();
        crawler.settle_delay_ms = 0;
        ReadinessSettings::from_config(&crawler, COMMENT_THREAD)
    }

    async fn run_with(browser: &FakeBrowser) -> ReadinessState {
        let mut session = browser.launch().await.unwrap();
        let page = session.new_page().await.unwrap();
        let settings = settings();
        ReadinessProtocol::new(&page, URL, &settings).run().await.unwrap()
    }

    #[tokio::test]
    async fn test_reaches_captured() {
        let browser =
            FakeBrowser::new("<html>ok</html>").with_visible(&[COMMENTS_CONTAINER, COMMENT_THREAD]);

        let state = run_with(&browser).await;

        assert_eq!(state, ReadinessState::Captured(MarkupSnapshot::new("<html>ok</html>")));
        let log = browser.log();
        assert_eq!(log.gotos, vec![(URL.to_string(), LoadState::Load)]);
        assert_eq!(log.scripts, vec!["window.scrollTo(0, 500)".to_string()]);
        assert_eq!(log.waits, vec![COMMENTS_CONTAINER.to_string(), COMMENT_THREAD.to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_delay_elapses_before_capture() {
        use crate::domain::constants::readiness::SETTLE_DELAY_MS;

        let browser =
            FakeBrowser::new("<html>ok</html>").with_visible(&[COMMENTS_CONTAINER, COMMENT_THREAD]);
        let mut session = browser.launch().await.unwrap();
        let page = session.new_page().await.unwrap();
        let settings = ReadinessSettings::from_config(&CrawlerConfig::default(), COMMENT_THREAD);
        let protocol = ReadinessProtocol::new(&page, URL, &settings);

        let started = tokio::time::Instant::now();
        let state = protocol.step(ReadinessState::FirstThreadVisible).await.unwrap();

        assert_eq!(state, ReadinessState::Stabilized);
        assert!(started.elapsed() >= Duration::from_millis(SETTLE_DELAY_MS));
    }

    #[tokio::test]
    async fn test_container_timeout_fails_from_navigated() {
        let browser = FakeBrowser::new("<html></html>");

        let state = run_with(&browser).await;

        let ReadinessState::Failed(failure) = &state else {
            panic!("expected Failed, got {:?}", state);
        };
        assert_eq!(failure.stage, "Navigated");
        assert!(failure.reason.contains(COMMENTS_CONTAINER));
        // thread wait never attempted
        assert_eq!(browser.log().waits.len(), 1);
    }

    #[tokio::test]
    async fn test_thread_timeout_fails_from_container_visible() {
        let browser = FakeBrowser::new("<html></html>").with_visible(&[COMMENTS_CONTAINER]);

        let state = run_with(&browser).await;

        assert!(matches!(
            state,
            ReadinessState::Failed(ReadinessFailure { ref stage, .. }) if stage == "ContainerVisible"
        ));
    }

    #[tokio::test]
    async fn test_skips_navigation_when_already_at_url() {
        let browser = FakeBrowser::new("<html></html>")
            .at_url(URL)
            .with_visible(&[COMMENTS_CONTAINER, COMMENT_THREAD]);

        let state = run_with(&browser).await;

        assert!(matches!(state, ReadinessState::Captured(_)));
        assert!(browser.log().gotos.is_empty());
    }

    #[tokio::test]
    async fn test_content_error_is_fatal() {
        let browser = FakeBrowser::new("<html></html>")
            .with_visible(&[COMMENTS_CONTAINER, COMMENT_THREAD])
            .failing_content();

        let mut session = browser.launch().await.unwrap();
        let page = session.new_page().await.unwrap();
        let settings = settings();
        let result = ReadinessProtocol::new(&page, URL, &settings).run().await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_step_is_identity_on_terminal_states() {
        let browser = FakeBrowser::new("");
        let mut session = browser.launch().await.unwrap();
        let page = session.new_page().await.unwrap();
        let settings = settings();
        let protocol = ReadinessProtocol::new(&page, URL, &settings);

        let failed = ReadinessState::Failed(ReadinessFailure {
            stage: "Navigated".into(),
            reason: "timeout".into(),
        });
        assert_eq!(protocol.step(failed.clone()).await.unwrap(), failed);
    }
}
