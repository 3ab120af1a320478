//! Transport selection.
//!
//! Turns a [`TransportConfig`] into the concrete client settings: which
//! fetcher to use, the user agent it sends and the proxy it goes through.
//! Nothing here touches the network.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::config::TransportConfig;
use crate::fetcher::PageFetcher;
use crate::fetcher_http::HttpFetcher;
use crate::proxy::ProxyDescriptor;
use crate::Result;

/// Default desktop user agent.
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Ubuntu Chromium/65.0.3325.181 Chrome/65.0.3325.181 Safari/537.36";

/// Default mobile user agent, used with `--mobile`.
pub const MOBILE_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 5.0; SM-G900P Build/LRX21T) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/65.0.3325.181 Mobile Safari/537.36";

/// Kind of HTTP client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientKind {
    /// Plain HTTP request, no script execution.
    #[default]
    Direct,
    /// Headless browser, page scripts are executed.
    Scripted,
}

impl ClientKind {
    /// Looks a client up by name. `curl` and `phantomjs` are accepted as
    /// aliases of `direct` and `scripted`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "direct" | "curl" | "http" => Some(Self::Direct),
            "scripted" | "phantomjs" | "headless" | "browser" | "chrome" => Some(Self::Scripted),
            _ => None,
        }
    }

    /// Name reported in the `http-client` output field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "curl",
            Self::Scripted => "phantomjs",
        }
    }
}

impl fmt::Display for ClientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Effective transport settings for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportSelection {
    /// Client actually used.
    pub kind: ClientKind,
    /// User agent actually sent.
    pub user_agent: String,
    /// Proxy, if any.
    pub proxy: Option<ProxyDescriptor>,
}

impl TransportSelection {
    /// Resolves the effective settings. An explicit user agent always wins
    /// over the mobile default.
    pub fn select(config: &TransportConfig) -> Self {
        let user_agent = match (&config.user_agent, config.mobile) {
            (Some(ua), _) => ua.clone(),
            (None, true) => MOBILE_USER_AGENT.to_string(),
            (None, false) => DESKTOP_USER_AGENT.to_string(),
        };

        Self {
            kind: config.client_kind,
            user_agent,
            proxy: config.proxy.clone(),
        }
    }

    /// Builds the fetcher for these settings.
    pub fn build_fetcher(&self) -> Result<Arc<dyn PageFetcher>> {
        debug!("Using {} client with user agent '{}'", self.kind, self.user_agent);
        match self.kind {
            ClientKind::Direct => Ok(Arc::new(HttpFetcher::new(
                &self.user_agent,
                self.proxy.as_ref(),
            )?)),
            ClientKind::Scripted => self.build_scripted(),
        }
    }

    #[cfg(feature = "headless")]
    fn build_scripted(&self) -> Result<Arc<dyn PageFetcher>> {
        use crate::browser::BrowserFetcher;

        Ok(Arc::new(
            BrowserFetcher::new(self.user_agent.clone()).with_proxy(self.proxy.clone()),
        ))
    }

    #[cfg(not(feature = "headless"))]
    fn build_scripted(&self) -> Result<Arc<dyn PageFetcher>> {
        Err(crate::SearchError::Transport(
            "The scripted client requires the `headless` feature".to_string(),
        ))
    }
}
