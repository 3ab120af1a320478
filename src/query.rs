//! Google request descriptor.

use std::fmt;

use url::Url;

use crate::config::QueryConfig;
use crate::Result;

/// A Google search URL.
///
/// Query parameters are always emitted in the same order (`q`, `num`,
/// `start`, `lr`), so equal inputs render to equal strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleUrl {
    host: String,
    search_term: String,
    page: u32,
    results_per_page: u32,
    language_restriction: Option<String>,
}

impl GoogleUrl {
    /// Creates a descriptor for `host` with no search term.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            search_term: String::new(),
            page: 1,
            results_per_page: 10,
            language_restriction: None,
        }
    }

    /// Builds the descriptor for a resolved query.
    pub fn from_config(config: &QueryConfig) -> Self {
        let mut url = Self::new(format!("www.google.{}", config.tld))
            .with_search_term(config.keywords.clone().unwrap_or_default())
            .with_page(config.page)
            .with_results_per_page(config.results_per_page);
        if let Some(ref lr) = config.language_restriction {
            url = url.with_language_restriction(lr.clone());
        }
        url
    }

    /// Sets the search terms.
    pub fn with_search_term(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    /// Sets the 1-indexed page number.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Sets the page size.
    pub fn with_results_per_page(mut self, results_per_page: u32) -> Self {
        self.results_per_page = results_per_page;
        self
    }

    /// Sets the language restriction, e.g. `lang_fr`.
    pub fn with_language_restriction(mut self, lr: impl Into<String>) -> Self {
        self.language_restriction = Some(lr.into());
        self
    }

    /// Returns the host, e.g. `www.google.co.uk`.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the search terms.
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Returns the page number.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Returns the page size.
    pub fn results_per_page(&self) -> u32 {
        self.results_per_page
    }

    /// Returns the language restriction.
    pub fn language_restriction(&self) -> Option<&str> {
        self.language_restriction.as_deref()
    }

    /// Offset of the first result on the requested page.
    pub fn start(&self) -> u32 {
        (self.page - 1).saturating_mul(self.results_per_page)
    }

    /// Builds the absolute URL.
    pub fn to_url(&self) -> Result<Url> {
        let mut url = Url::parse(&format!("https://{}/search", self.host))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", &self.search_term);
            pairs.append_pair("num", &self.results_per_page.to_string());
            if self.page > 1 {
                pairs.append_pair("start", &self.start().to_string());
            }
            if let Some(ref lr) = self.language_restriction {
                pairs.append_pair("lr", lr);
            }
        }
        Ok(url)
    }
}

impl fmt::Display for GoogleUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_url() {
            Ok(url) => f.write_str(url.as_str()),
            // An unparsable host still renders so the report can show it.
            Err(_) => write!(f, "https://{}/search", self.host),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(keywords: &str) -> QueryConfig {
        QueryConfig {
            keywords: Some(keywords.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_google_url_from_config_defaults() {
        let url = GoogleUrl::from_config(&config("simpsons"));
        assert_eq!(url.host(), "www.google.com");
        assert_eq!(url.search_term(), "simpsons");
        assert_eq!(url.page(), 1);
        assert_eq!(url.results_per_page(), 10);
        assert!(url.language_restriction().is_none());
        assert_eq!(url.to_string(), "https://www.google.com/search?q=simpsons&num=10");
    }

    #[test]
    fn test_google_url_tld() {
        let query = QueryConfig {
            tld: "co.uk".to_string(),
            ..config("rust")
        };
        let url = GoogleUrl::from_config(&query);
        assert_eq!(url.host(), "www.google.co.uk");
        assert!(url.to_string().starts_with("https://www.google.co.uk/search?"));
    }

    #[test]
    fn test_google_url_pagination_and_lr() {
        let query = QueryConfig {
            page: 3,
            results_per_page: 20,
            language_restriction: Some("lang_fr".to_string()),
            ..config("rust lang")
        };
        let url = GoogleUrl::from_config(&query);
        assert_eq!(url.start(), 40);
        assert_eq!(
            url.to_string(),
            "https://www.google.com/search?q=rust+lang&num=20&start=40&lr=lang_fr"
        );
    }

    #[test]
    fn test_google_url_encodes_terms() {
        let url = GoogleUrl::new("www.google.com").with_search_term("a&b=c é");
        assert_eq!(
            url.to_string(),
            "https://www.google.com/search?q=a%26b%3Dc+%C3%A9&num=10"
        );
    }

    #[test]
    fn test_google_url_without_keywords() {
        let query = QueryConfig {
            source_file: Some("serp.html".into()),
            ..Default::default()
        };
        let url = GoogleUrl::from_config(&query);
        assert_eq!(url.host(), "www.google.com");
        assert_eq!(url.to_string(), "https://www.google.com/search?q=&num=10");
    }

    #[test]
    fn test_google_url_is_deterministic() {
        let query = QueryConfig {
            tld: "de".to_string(),
            page: 2,
            results_per_page: 50,
            language_restriction: Some("lang_de".to_string()),
            ..config("wetter berlin")
        };
        let first = GoogleUrl::from_config(&query);
        let second = GoogleUrl::from_config(&query.clone());
        assert_eq!(first, second);
        assert_eq!(first.to_string(), second.to_string());
    }

    #[test]
    fn test_google_url_page_zero_is_first_page() {
        let url = GoogleUrl::new("www.google.com").with_page(0);
        assert_eq!(url.page(), 1);
        assert_eq!(url.start(), 0);
    }

    #[test]
    fn test_google_url_to_url() {
        let url = GoogleUrl::new("www.google.fr").with_search_term("x").to_url().unwrap();
        assert_eq!(url.host_str(), Some("www.google.fr"));
        assert_eq!(url.path(), "/search");
    }
}
