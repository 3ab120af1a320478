//! Headless browser transport.
//!
//! This module is only available when the `headless` Cargo feature is enabled.
//! [`BrowserFetcher`] renders the result page in Chrome/Chromium through the
//! Chrome DevTools Protocol, so page scripts run before the HTML is captured.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use futures::StreamExt;
use tracing::{debug, warn};

use crate::fetcher::{FetchedPage, PageFetcher};
use crate::proxy::ProxyDescriptor;
use crate::{Result, SearchError};

/// Well-known Chrome/Chromium executable paths per platform.
#[cfg(target_os = "macos")]
const KNOWN_PATHS: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
];

#[cfg(not(target_os = "macos"))]
const KNOWN_PATHS: &[&str] = &[
    "/opt/google/chrome/chrome",
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
];

/// Well-known command names to search in PATH.
const KNOWN_COMMANDS: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "chrome",
];

/// How long to wait for the results container once navigation is done.
const RESULTS_WAIT: Duration = Duration::from_secs(5);

/// Detects a Chrome/Chromium installation.
///
/// Checks the `CHROME` environment variable, then well-known commands in
/// PATH, then well-known filesystem paths.
pub fn detect_chrome() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("CHROME") {
        let p = PathBuf::from(&path);
        if p.exists() {
            debug!("Chrome found via CHROME env var: {}", path);
            return Some(p);
        }
    }

    for cmd in KNOWN_COMMANDS {
        if let Ok(path) = which::which(cmd) {
            debug!("Chrome found in PATH: {}", path.display());
            return Some(path);
        }
    }

    KNOWN_PATHS
        .iter()
        .map(Path::new)
        .find(|p| p.exists())
        .map(Path::to_path_buf)
}

/// A `PageFetcher` that renders pages in a headless browser.
///
/// Each `fetch()` launches a browser, opens one tab, waits for the results
/// container, captures the rendered HTML and shuts the browser down.
pub struct BrowserFetcher {
    user_agent: String,
    proxy: Option<ProxyDescriptor>,
    chrome_path: Option<PathBuf>,
}

impl BrowserFetcher {
    /// Creates a browser fetcher sending `user_agent`.
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            proxy: None,
            chrome_path: None,
        }
    }

    /// Routes browser traffic through `proxy`.
    pub fn with_proxy(mut self, proxy: Option<ProxyDescriptor>) -> Self {
        self.proxy = proxy;
        self
    }

    /// Uses the given Chrome executable instead of auto-detection.
    pub fn with_chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    fn browser_config(&self) -> Result<BrowserConfig> {
        let chrome = self
            .chrome_path
            .clone()
            .or_else(detect_chrome)
            .ok_or_else(|| {
                SearchError::Transport(
                    "No Chrome/Chromium installation found (set CHROME to its path)".to_string(),
                )
            })?;
        debug!("Using Chrome at: {}", chrome.display());

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome)
            .arg("--headless=new")
            .arg(format!("--user-agent={}", self.user_agent))
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--no-first-run");

        // Chrome takes no credentials on the command line.
        if let Some(ref proxy) = self.proxy {
            if proxy.username.is_some() {
                warn!("Proxy credentials are ignored by the headless browser");
            }
            builder = builder.arg(format!("--proxy-server={}", proxy.server()));
        }

        builder
            .build()
            .map_err(|e| SearchError::Transport(format!("Failed to build browser config: {}", e)))
    }

    async fn render(browser: &Browser, url: &str, user_agent: &str) -> Result<FetchedPage> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| SearchError::Transport(format!("Failed to open tab: {}", e)))?;

        page.set_user_agent(SetUserAgentOverrideParams::new(user_agent))
            .await
            .map_err(|e| SearchError::Transport(format!("Failed to set user agent: {}", e)))?;

        page.goto(url)
            .await
            .map_err(|e| SearchError::Transport(format!("Navigation failed: {}", e)))?;

        // A CAPTCHA page has no results container; let the caller detect it.
        let found = tokio::time::timeout(RESULTS_WAIT, page.find_element("#search")).await;
        if let Err(_) | Ok(Err(_)) = found {
            debug!("Results container not found, proceeding with current page content");
        }

        let body = page
            .content()
            .await
            .map_err(|e| SearchError::Transport(format!("Failed to get page content: {}", e)))?;
        let final_url = page
            .url()
            .await
            .map_err(|e| SearchError::Transport(format!("Failed to read page URL: {}", e)))?
            .unwrap_or_else(|| url.to_string());

        if let Err(e) = page.close().await {
            warn!("Failed to close browser tab: {}", e);
        }

        Ok(FetchedPage::new(body, final_url).evaluated())
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        debug!("Launching headless browser");
        let (mut browser, mut handler) = Browser::launch(self.browser_config()?)
            .await
            .map_err(|e| SearchError::Transport(format!("Failed to launch browser: {}", e)))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("Browser CDP handler error: {}", e);
                }
            }
            debug!("Browser CDP handler exited");
        });

        let page = Self::render(&browser, url, &self.user_agent).await;

        if let Err(e) = browser.close().await {
            warn!("Failed to close browser: {}", e);
        }
        let _ = browser.wait().await;
        handler_task.abort();

        page
    }
}
