//! HTTP-based page fetcher using reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::fetcher::{FetchedPage, PageFetcher};
use crate::proxy::ProxyDescriptor;
use crate::{Result, SearchError};

/// A page fetcher that uses plain HTTP requests via reqwest.
///
/// Returns the server-rendered HTML without running scripts. For pages that
/// need JavaScript, use `BrowserFetcher` instead.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher sending `user_agent`, optionally through `proxy`.
    pub fn new(user_agent: &str, proxy: Option<&ProxyDescriptor>) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30));

        if let Some(proxy) = proxy {
            debug!("Using proxy: {}", proxy);
            builder = builder.proxy(proxy.to_reqwest()?);
        }

        let client = builder
            .build()
            .map_err(|e| SearchError::Transport(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Creates an `HttpFetcher` with a custom reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let final_url = response.url().to_string();
        let body = response.text().await?;
        debug!("Fetched {} bytes from {}", body.len(), final_url);
        Ok(FetchedPage::new(body, final_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_fetcher_new() {
        assert!(HttpFetcher::new("test-agent", None).is_ok());
    }

    #[test]
    fn test_http_fetcher_with_proxy() {
        let proxy = ProxyDescriptor::parse("socks5://127.0.0.1:1080").unwrap();
        assert!(HttpFetcher::new("test-agent", Some(&proxy)).is_ok());
    }

    #[test]
    fn test_http_fetcher_with_client() {
        let client = Client::builder().user_agent("test-agent").build().unwrap();
        let _fetcher = HttpFetcher::with_client(client);
    }
}
