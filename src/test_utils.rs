//! Test utilities for the comment crawler
//!
//! Provides an in-memory page-automation driver so the readiness protocol
//! and the engine can be exercised without a browser. Selectors listed as
//! visible resolve immediately; any other wait fails with a timeout error
//! right away instead of sleeping.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::infrastructure::config::AppConfig;
use crate::infrastructure::page_driver::{
    BrowserLauncher, BrowserSession, DriverError, DriverResult, LoadState, PageHandle,
    SelectorState,
};

/// Calls observed by the fake driver
#[derive(Debug, Default, Clone)]
pub struct DriverLog {
    pub launches: usize,
    pub gotos: Vec<(String, LoadState)>,
    pub scripts: Vec<String>,
    pub waits: Vec<String>,
    pub close_calls: usize,
}

#[derive(Debug, Default)]
struct FakeState {
    current_url: String,
    markup: String,
    visible: HashSet<String>,
    fail_launch: bool,
    fail_content: bool,
    log: DriverLog,
}

/// Scriptable browser shared between launcher, session and page
#[derive(Debug, Clone, Default)]
pub struct FakeBrowser {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBrowser {
    pub fn new(markup: impl Into<String>) -> Self {
        let browser = Self::default();
        browser.lock().markup = markup.into();
        browser
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Make waits on these selectors succeed
    pub fn with_visible(self, selectors: &[&str]) -> Self {
        self.lock()
            .visible
            .extend(selectors.iter().map(|s| (*s).to_string()));
        self
    }

    pub fn at_url(self, url: &str) -> Self {
        self.lock().current_url = url.to_string();
        self
    }

    pub fn failing_launch(self) -> Self {
        self.lock().fail_launch = true;
        self
    }

    pub fn failing_content(self) -> Self {
        self.lock().fail_content = true;
        self
    }

    pub fn log(&self) -> DriverLog {
        self.lock().log.clone()
    }
}

#[async_trait]
impl BrowserLauncher for FakeBrowser {
    type Session = FakeSession;

    async fn launch(&self) -> DriverResult<Self::Session> {
        let mut state = self.lock();
        if state.fail_launch {
            return Err(DriverError::Launch("no browser in test".to_string()));
        }
        state.log.launches += 1;
        Ok(FakeSession {
            browser: self.clone(),
            closed: false,
        })
    }
}

pub struct FakeSession {
    browser: FakeBrowser,
    closed: bool,
}

#[async_trait]
impl BrowserSession for FakeSession {
    type Page = FakePage;

    async fn new_page(&mut self) -> DriverResult<Self::Page> {
        if self.closed {
            return Err(DriverError::Closed);
        }
        Ok(FakePage {
            browser: self.browser.clone(),
        })
    }

    async fn close(&mut self) -> DriverResult<()> {
        self.browser.lock().log.close_calls += 1;
        self.closed = true;
        Ok(())
    }
}

pub struct FakePage {
    browser: FakeBrowser,
}

#[async_trait]
impl PageHandle for FakePage {
    async fn goto(&self, url: &str, wait_until: LoadState) -> DriverResult<()> {
        let mut state = self.browser.lock();
        state.current_url = url.to_string();
        state.log.gotos.push((url.to_string(), wait_until));
        Ok(())
    }

    async fn current_url(&self) -> DriverResult<String> {
        Ok(self.browser.lock().current_url.clone())
    }

    async fn evaluate_script(&self, script: &str) -> DriverResult<()> {
        self.browser.lock().log.scripts.push(script.to_string());
        Ok(())
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        _state: SelectorState,
        timeout: Duration,
    ) -> DriverResult<()> {
        let mut state = self.browser.lock();
        state.log.waits.push(selector.to_string());
        if state.visible.contains(selector) {
            Ok(())
        } else {
            Err(DriverError::wait_timeout(selector, timeout))
        }
    }

    async fn content(&self) -> DriverResult<String> {
        let state = self.browser.lock();
        if state.fail_content {
            return Err(DriverError::Content("renderer crashed".to_string()));
        }
        Ok(state.markup.clone())
    }
}

/// Config with zero settle delay and dumps under `dir`
pub fn test_config(dir: &std::path::Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.crawler.settle_delay_ms = 0;
    config.storage.diagnostic_dump_path = dir.join("debug_page_content.html");
    config.storage.keyword_store_path = dir.join("keywords.csv");
    config
}

/// Watch page markup with metadata and the given comment threads
pub fn watch_page(views: &str, comments: &str, threads: &[(&str, &str, &str, Option<&str>)]) -> String {
    let body: String = threads
        .iter()
        .map(|(id, author, content, likes)| {
            let likes = likes
                .map(|l| format!(r#"<span id="vote-count-middle">{l}</span>"#))
                .unwrap_or_default();
            format!(
                r#"<ytd-comment-thread-renderer><ytd-comment-view-model>
                     <a id="author-text"><span>{author}</span></a>
                     <span id="published-time-text"><a href="/watch?v=vid&amp;lc={id}">1시간 전</a></span>
                     <span id="content-text">{content}</span>{likes}
                   </ytd-comment-view-model></ytd-comment-thread-renderer>"#
            )
        })
        .collect();

    format!(
        r#"<html><head><meta itemprop="uploadDate" content="2024-05-01T10:00:00-07:00"></head><body>
             <tp-yt-paper-tooltip class="style-scope ytd-watch-info-text"><div id="tooltip">{views} • 2024. 5. 1.</div></tp-yt-paper-tooltip>
             <ytd-comments id="comments">
               <ytd-comments-header-renderer><h2><span class="count-text">{comments}</span></h2></ytd-comments-header-renderer>
               {body}
             </ytd-comments>
           </body></html>"#
    )
}
