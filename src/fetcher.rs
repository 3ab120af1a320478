//! Page fetcher abstraction for retrieving HTML content.

use async_trait::async_trait;

use crate::Result;

/// A page returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// The HTML body.
    pub body: String,
    /// The URL the page was finally served from, after redirects.
    pub url: String,
    /// Whether page scripts ran before the body was captured.
    pub evaluated: bool,
}

impl FetchedPage {
    /// Creates a page captured without running scripts.
    pub fn new(body: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            url: url.into(),
            evaluated: false,
        }
    }

    /// Marks the page as script-evaluated.
    pub fn evaluated(mut self) -> Self {
        self.evaluated = true;
        self
    }
}

/// Trait for fetching the full HTML content of a URL.
///
/// Implementations may use plain HTTP requests or a headless browser.
/// All configuration (user-agent, proxy) is set at construction time;
/// `fetch` is a simple URL-in, page-out interface.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the page at the given URL.
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetched_page_new() {
        let page = FetchedPage::new("<html></html>", "https://www.google.com/search?q=a");
        assert_eq!(page.body, "<html></html>");
        assert_eq!(page.url, "https://www.google.com/search?q=a");
        assert!(!page.evaluated);
    }

    #[test]
    fn test_fetched_page_evaluated() {
        let page = FetchedPage::new("", "u").evaluated();
        assert!(page.evaluated);
    }

    #[tokio::test]
    async fn test_page_fetcher_object() {
        struct Echo;

        #[async_trait]
        impl PageFetcher for Echo {
            async fn fetch(&self, url: &str) -> Result<FetchedPage> {
                Ok(FetchedPage::new(url, url))
            }
        }

        let fetcher: Box<dyn PageFetcher> = Box::new(Echo);
        let page = fetcher.fetch("https://example.com/").await.unwrap();
        assert_eq!(page.body, "https://example.com/");
    }
}
