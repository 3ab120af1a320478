//! Search orchestration.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{ResolvedConfig, SearchOptions};
use crate::fetcher::PageFetcher;
use crate::query::GoogleUrl;
use crate::report::SearchReport;
use crate::result::ParsedResponse;
use crate::serp::GoogleSerp;
use crate::transport::TransportSelection;
use crate::Result;

/// Runs one Google search (or replays a saved page) and builds the report.
///
/// Steps run strictly in order: resolve options, build the URL, fetch or
/// read the page, dump it if asked, normalize.
#[derive(Default)]
pub struct GoogleSearch {
    fetcher: Option<Arc<dyn PageFetcher>>,
}

impl GoogleSearch {
    /// Creates a search that builds its transport from the options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a search that always uses `fetcher`, whatever client the
    /// options select.
    pub fn with_fetcher(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher: Some(fetcher),
        }
    }

    /// Resolves `options` and runs the search.
    ///
    /// Option errors are returned before anything is fetched or read.
    pub async fn run(&self, options: &SearchOptions) -> Result<SearchReport> {
        let config = options.resolve()?;
        self.execute(&config).await
    }

    /// Runs the search for an already resolved configuration.
    pub async fn execute(&self, config: &ResolvedConfig) -> Result<SearchReport> {
        let url = GoogleUrl::from_config(&config.query);

        let (serp, client) = match config.query.source_file {
            Some(ref path) => {
                debug!("Parsing local file {}", path.display());
                (GoogleSerp::from_file(path, &url)?, None)
            }
            None => {
                let selection = TransportSelection::select(&config.transport);
                let fetcher = match self.fetcher {
                    Some(ref fetcher) => Arc::clone(fetcher),
                    None => selection.build_fetcher()?,
                };
                let target = url.to_url()?;
                info!("Querying {}", target);
                let page = fetcher.fetch(target.as_str()).await?;
                (GoogleSerp::from_page(page)?, Some(selection.kind))
            }
        };

        if let Some(ref dump) = config.dump {
            dump.write(serp.body())?;
        }

        Ok(SearchReport::normalize(&serp, &url, client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::error::ConfigError;
    use crate::fetcher::FetchedPage;
    use crate::SearchError;

    const PAGE: &str = r#"<html><body>
        <div id="result-stats">About 2,000 results</div>
        <div class="g"><a href="https://www.rust-lang.org/"><h3>Rust</h3></a></div>
        <div id="brs"><a href="/search?q=rust+book">rust book</a></div>
    </body></html>"#;

    struct CountingFetcher {
        calls: AtomicUsize,
        urls: Mutex<Vec<String>>,
        body: String,
    }

    impl CountingFetcher {
        fn new(body: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                urls: Mutex::new(Vec::new()),
                body: body.to_string(),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PageFetcher for CountingFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchedPage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.urls.lock().unwrap().push(url.to_string());
            Ok(FetchedPage::new(self.body.clone(), url))
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl PageFetcher for FailingFetcher {
        async fn fetch(&self, _url: &str) -> Result<FetchedPage> {
            Err(SearchError::Transport("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_run_fetches_and_normalizes() {
        let fetcher = CountingFetcher::new(PAGE);
        let search = GoogleSearch::with_fetcher(fetcher.clone());

        let report = search.run(&SearchOptions::new("rust")).await.unwrap();

        assert_eq!(fetcher.calls(), 1);
        assert_eq!(
            fetcher.urls.lock().unwrap().as_slice(),
            ["https://www.google.com/search?q=rust&num=10"]
        );
        assert_eq!(report.initial_url(), "https://www.google.com/search?q=rust&num=10");
        assert_eq!(report.http_client(), Some("curl"));
        assert_eq!(report.total_count(), 2000);
        assert_eq!(report.natural_results_count(), 1);
        assert_eq!(
            report.related_searches()[0].url,
            "https://www.google.com/search?q=rust+book"
        );
    }

    #[tokio::test]
    async fn test_keywords_are_sent_untrimmed() {
        let fetcher = CountingFetcher::new(PAGE);
        let search = GoogleSearch::with_fetcher(fetcher.clone());

        let report = search.run(&SearchOptions::new(" foo ")).await.unwrap();
        assert_eq!(
            fetcher.urls.lock().unwrap().as_slice(),
            ["https://www.google.com/search?q=+foo+&num=10"]
        );
        assert_eq!(report.initial_url(), "https://www.google.com/search?q=+foo+&num=10");
    }

    #[tokio::test]
    async fn test_run_reports_scripted_client() {
        let fetcher = CountingFetcher::new(PAGE);
        let search = GoogleSearch::with_fetcher(fetcher);
        for name in ["phantomjs", "scripted", "headless"] {
            let options = SearchOptions::new("rust").with_http_client(name);
            let report = search.run(&options).await.unwrap();
            assert_eq!(report.http_client(), Some("phantomjs"));
        }
    }

    #[tokio::test]
    async fn test_missing_input_never_fetches() {
        let fetcher = CountingFetcher::new(PAGE);
        let search = GoogleSearch::with_fetcher(fetcher.clone());

        let err = search.run(&SearchOptions::default()).await.unwrap_err();
        assert!(matches!(err, SearchError::Config(ConfigError::MissingInput)));
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_existing_dump_fails_before_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.html");
        std::fs::write(&path, "keep me").unwrap();

        let fetcher = CountingFetcher::new(PAGE);
        let search = GoogleSearch::with_fetcher(fetcher.clone());
        let options = SearchOptions::new("rust").with_dump(&path, false);

        let err = search.run(&options).await.unwrap_err();
        assert!(matches!(err, SearchError::Config(ConfigError::DumpExists(_))));
        assert_eq!(fetcher.calls(), 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me");
    }

    #[tokio::test]
    async fn test_invalid_proxy_fails_before_fetch() {
        let fetcher = CountingFetcher::new(PAGE);
        let search = GoogleSearch::with_fetcher(fetcher.clone());
        let options = SearchOptions::new("rust").with_proxy("::bad::");

        let err = search.run(&options).await.unwrap_err();
        assert!(matches!(err, SearchError::Config(ConfigError::InvalidProxy { .. })));
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_dump_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.html");

        let fetcher = CountingFetcher::new(PAGE);
        let search = GoogleSearch::with_fetcher(fetcher);
        let options = SearchOptions::new("rust").with_dump(&path, false);

        search.run(&options).await.unwrap();
        let dumped = std::fs::read_to_string(&path).unwrap();
        assert!(dumped.contains("rust-lang.org"));
    }

    #[tokio::test]
    async fn test_dump_write_failure_fails_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.html");

        let fetcher = CountingFetcher::new(PAGE);
        let search = GoogleSearch::with_fetcher(fetcher.clone());
        let config = SearchOptions::new("rust")
            .with_dump(&path, false)
            .resolve()
            .unwrap();

        // The file shows up between validation and the write.
        std::fs::write(&path, "raced").unwrap();
        let err = search.execute(&config).await.unwrap_err();

        assert!(matches!(err, SearchError::DumpWrite { .. }));
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "raced");
    }

    #[tokio::test]
    async fn test_file_input_skips_transport() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("serp.html");
        std::fs::write(&file, PAGE).unwrap();

        let fetcher = CountingFetcher::new(PAGE);
        let search = GoogleSearch::with_fetcher(fetcher.clone());

        let report = search.run(&SearchOptions::from_file(&file)).await.unwrap();

        assert_eq!(fetcher.calls(), 0);
        assert!(report.initial_url().starts_with("https://www.google.com/search?"));
        assert_eq!(report.url(), report.initial_url());
        assert!(report.http_client().is_none());
        assert!(!report.evaluated());
        assert_eq!(report.natural_results_count(), 1);
    }

    #[tokio::test]
    async fn test_file_takes_precedence_over_keywords() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("serp.html");
        std::fs::write(&file, PAGE).unwrap();

        let fetcher = CountingFetcher::new(PAGE);
        let search = GoogleSearch::with_fetcher(fetcher.clone());
        let mut options = SearchOptions::new("rust").with_tld("fr");
        options.file = Some(file);

        let report = search.run(&options).await.unwrap();
        assert_eq!(fetcher.calls(), 0);
        assert_eq!(report.initial_url(), "https://www.google.fr/search?q=rust&num=10");
    }

    #[tokio::test]
    async fn test_transport_error_is_surfaced() {
        let search = GoogleSearch::with_fetcher(Arc::new(FailingFetcher));
        let err = search.run(&SearchOptions::new("rust")).await.unwrap_err();
        assert_eq!(err.to_string(), "Transport error: connection refused");
    }

    #[tokio::test]
    async fn test_captcha_page_is_an_error() {
        let fetcher = CountingFetcher::new(
            r#"<html><body><iframe src="https://www.google.com/recaptcha/api2/anchor"></iframe></body></html>"#,
        );
        let search = GoogleSearch::with_fetcher(fetcher);
        let err = search.run(&SearchOptions::new("rust")).await.unwrap_err();
        assert!(err.to_string().contains("CAPTCHA"));
    }
}
