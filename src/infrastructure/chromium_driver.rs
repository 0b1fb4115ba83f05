//! Chromium implementation of the page-automation driver
//!
//! Uses `chromiumoxide` over CDP. The CDP handler stream is pumped on its own
//! tokio task for the lifetime of the browser and aborted on close.

#![allow(clippy::uninlined_format_args)]

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

use super::config::CrawlerConfig;
use super::page_driver::{
    BrowserLauncher, BrowserSession, DriverError, DriverResult, LoadState, PageHandle,
    SelectorState,
};

/// Launches headless (or headed) Chromium instances
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    headless: bool,
    chrome_executable: Option<String>,
    user_agent: Option<String>,
    poll_interval: Duration,
    network_idle_quiet: Duration,
    navigation_timeout: Duration,
}

impl ChromiumLauncher {
    pub fn new(config: &CrawlerConfig) -> Self {
        Self {
            headless: config.headless,
            chrome_executable: config.chrome_executable.clone(),
            user_agent: config.user_agent.clone(),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            network_idle_quiet: Duration::from_millis(config.network_idle_quiet_ms),
            navigation_timeout: Duration::from_millis(config.navigation_timeout_ms),
        }
    }

    fn browser_config(&self) -> DriverResult<BrowserConfig> {
        let mut builder = BrowserConfig::builder();

        if !self.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        if let Some(agent) = &self.user_agent {
            builder = builder.arg(format!("--user-agent={}", agent));
        }

        builder
            .no_sandbox()
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg("--mute-audio")
            .arg("--lang=ko-KR")
            .build()
            .map_err(DriverError::Launch)
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    type Session = ChromiumSession;

    async fn launch(&self) -> DriverResult<Self::Session> {
        let config = self.browser_config()?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| DriverError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler event error: {}", e);
                }
            }
        });

        info!("Chromium browser launched (headless: {})", self.headless);
        Ok(ChromiumSession {
            browser: Some(browser),
            handler_task: Some(handler_task),
            poll_interval: self.poll_interval,
            network_idle_quiet: self.network_idle_quiet,
            navigation_timeout: self.navigation_timeout,
        })
    }
}

/// A running Chromium instance
pub struct ChromiumSession {
    browser: Option<Browser>,
    handler_task: Option<JoinHandle<()>>,
    poll_interval: Duration,
    network_idle_quiet: Duration,
    navigation_timeout: Duration,
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    type Page = ChromiumPage;

    async fn new_page(&mut self) -> DriverResult<Self::Page> {
        let browser = self.browser.as_ref().ok_or(DriverError::Closed)?;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| DriverError::Launch(format!("new page: {}", e)))?;

        Ok(ChromiumPage {
            page,
            poll_interval: self.poll_interval,
            network_idle_quiet: self.network_idle_quiet,
            navigation_timeout: self.navigation_timeout,
        })
    }

    async fn close(&mut self) -> DriverResult<()> {
        let Some(mut browser) = self.browser.take() else {
            return Ok(());
        };

        let result = browser.close().await.map(|_| ());
        if let Err(e) = &result {
            warn!("Browser did not close cleanly: {}", e);
        }
        if let Some(task) = self.handler_task.take() {
            task.abort();
        }

        info!("Chromium browser closed");
        result.map_err(|e| DriverError::Launch(format!("close: {}", e)))
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        if let Some(task) = self.handler_task.take() {
            task.abort();
        }
    }
}

/// One Chromium tab
pub struct ChromiumPage {
    page: Page,
    poll_interval: Duration,
    network_idle_quiet: Duration,
    navigation_timeout: Duration,
}

impl ChromiumPage {
    async fn evaluate_bool(&self, script: &str) -> DriverResult<bool> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| DriverError::Script(e.to_string()))?
            .into_value::<bool>()
            .map_err(|e| DriverError::Script(e.to_string()))
    }

    async fn wait_until_complete(&self, url: &str) -> DriverResult<()> {
        poll_until(self.navigation_timeout, self.poll_interval, || {
            self.evaluate_bool("document.readyState === 'complete'")
        })
        .await
        .map_err(|e| DriverError::navigation(url, e))
    }
}

/// Why a bounded poll ended without success
#[derive(Debug, Clone, PartialEq, Eq)]
enum PollError {
    Probe(DriverError),
    TimedOut(Duration),
}

impl std::fmt::Display for PollError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Probe(e) => write!(f, "{}", e),
            Self::TimedOut(limit) => write!(f, "not ready within {} ms", limit.as_millis()),
        }
    }
}

/// Re-run `probe` every `interval` until it reports true; a probe error ends the poll
async fn poll_until<F, Fut>(limit: Duration, interval: Duration, mut probe: F) -> Result<(), PollError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = DriverResult<bool>>,
{
    let polled = timeout(limit, async {
        loop {
            if probe().await.map_err(PollError::Probe)? {
                return Ok(());
            }
            sleep(interval).await;
        }
    })
    .await;

    polled.unwrap_or(Err(PollError::TimedOut(limit)))
}

/// Presence / visibility probe for a selector
fn selector_probe(selector: &str, state: SelectorState) -> String {
    // serde_json quoting gives a valid JS string literal
    let literal = serde_json::to_string(selector).unwrap_or_else(|_| "\"\"".to_string());
    match state {
        SelectorState::Visible => format!(
            "(() => {{ const el = document.querySelector({}); if (!el) return false; \
             const r = el.getBoundingClientRect(); const s = window.getComputedStyle(el); \
             return r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none'; }})()",
            literal
        ),
    }
}

#[async_trait]
impl PageHandle for ChromiumPage {
    async fn goto(&self, url: &str, wait_until: LoadState) -> DriverResult<()> {
        debug!("Navigating to {} (wait until {:?})", url, wait_until);
        self.page
            .goto(url)
            .await
            .map_err(|e| DriverError::navigation(url, e))?;

        if wait_until == LoadState::NetworkIdle {
            self.wait_until_complete(url).await?;
            sleep(self.network_idle_quiet).await;
        }
        Ok(())
    }

    async fn current_url(&self) -> DriverResult<String> {
        self.page
            .url()
            .await
            .map(Option::unwrap_or_default)
            .map_err(|e| DriverError::Script(e.to_string()))
    }

    async fn evaluate_script(&self, script: &str) -> DriverResult<()> {
        self.page
            .evaluate(script)
            .await
            .map(|_| ())
            .map_err(|e| DriverError::Script(e.to_string()))
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        state: SelectorState,
        limit: Duration,
    ) -> DriverResult<()> {
        let probe = selector_probe(selector, state);
        let started = Instant::now();

        let polled = timeout(limit, async {
            loop {
                match self.evaluate_bool(&probe).await {
                    Ok(true) => return Ok::<(), DriverError>(()),
                    Ok(false) => {}
                    // 문서 교체 중의 평가 실패는 다음 폴링에서 재시도
                    Err(e) => debug!("Selector probe failed for {}: {}", selector, e),
                }
                sleep(self.poll_interval).await;
            }
        })
        .await;

        match polled {
            Ok(result) => {
                debug!("Selector {} reached {:?} after {:?}", selector, state, started.elapsed());
                result
            }
            Err(_) => Err(DriverError::wait_timeout(selector, limit)),
        }
    }

    async fn content(&self) -> DriverResult<String> {
        self.page
            .content()
            .await
            .map_err(|e| DriverError::Content(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_probe_quotes_selector() {
        let probe = selector_probe("meta[itemprop=\"uploadDate\"]", SelectorState::Visible);
        assert!(probe.contains(r#"document.querySelector("meta[itemprop=\"uploadDate\"]")"#));
        assert!(probe.contains("getBoundingClientRect"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_gives_up_after_limit() {
        let started = Instant::now();
        let result = poll_until(Duration::from_secs(30), Duration::from_millis(100), || async {
            Ok(false)
        })
        .await;

        assert_eq!(result, Err(PollError::TimedOut(Duration::from_secs(30))));
        assert!(started.elapsed() >= Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_stops_when_ready() {
        let mut calls = 0;
        let result = poll_until(Duration::from_secs(30), Duration::from_millis(100), || {
            calls += 1;
            let ready = calls == 3;
            async move { Ok(ready) }
        })
        .await;

        assert_eq!(result, Ok(()));
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn test_poll_until_surfaces_script_error() {
        let result = poll_until(Duration::from_secs(1), Duration::from_millis(10), || async {
            Err(DriverError::Script("context destroyed".to_string()))
        })
        .await;

        assert!(matches!(result, Err(PollError::Probe(DriverError::Script(_)))));
    }

    #[test]
    fn test_launcher_from_config() {
        let launcher = ChromiumLauncher::new(&CrawlerConfig::default());
        assert!(launcher.headless);
        assert_eq!(launcher.poll_interval, Duration::from_millis(CrawlerConfig::default().poll_interval_ms));
        assert_eq!(
            launcher.navigation_timeout,
            Duration::from_millis(CrawlerConfig::default().navigation_timeout_ms)
        );
    }
}
