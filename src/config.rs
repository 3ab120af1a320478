//! Option resolution.
//!
//! [`SearchOptions`] is the loose option bag coming from the command line (or
//! any other front end). [`SearchOptions::resolve`] validates it once and
//! produces the immutable [`ResolvedConfig`] the rest of the pipeline works
//! from. Every check that can fail happens here, before any request is made.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dump::DumpRequest;
use crate::error::ConfigError;
use crate::proxy::ProxyDescriptor;
use crate::transport::ClientKind;

/// Largest page size Google accepts.
pub const MAX_RESULTS_PER_PAGE: u32 = 100;

/// Raw search options, as supplied by the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Keywords to search for.
    #[serde(default)]
    pub keywords: Option<String>,
    /// Google TLD, e.g. `co.uk`.
    #[serde(default = "default_tld")]
    pub tld: String,
    /// Language restriction (`lr` parameter).
    #[serde(default)]
    pub lr: Option<String>,
    /// Transport name (`curl`, `phantomjs`, `direct`, `scripted`, ...).
    #[serde(default)]
    pub http_client: Option<String>,
    /// Proxy connection string.
    #[serde(default)]
    pub proxy: Option<String>,
    /// Result page number, 1-indexed.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Results per page.
    #[serde(default = "default_res_per_page")]
    pub res_per_page: i64,
    /// Where to dump the response body.
    #[serde(default)]
    pub dump: Option<PathBuf>,
    /// Overwrite an existing dump file.
    #[serde(default)]
    pub force_dump: bool,
    /// Use the mobile user agent.
    #[serde(default)]
    pub mobile: bool,
    /// Custom user agent.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Parse this local file instead of querying.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_tld() -> String {
    "com".to_string()
}

fn default_page() -> i64 {
    1
}

fn default_res_per_page() -> i64 {
    10
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            keywords: None,
            tld: default_tld(),
            lr: None,
            http_client: None,
            proxy: None,
            page: default_page(),
            res_per_page: default_res_per_page(),
            dump: None,
            force_dump: false,
            mobile: false,
            user_agent: None,
            file: None,
        }
    }
}

impl SearchOptions {
    /// Creates options searching for the given keywords.
    pub fn new(keywords: impl Into<String>) -> Self {
        Self {
            keywords: Some(keywords.into()),
            ..Default::default()
        }
    }

    /// Creates options replaying a local SERP file.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            file: Some(path.into()),
            ..Default::default()
        }
    }

    /// Sets the Google TLD.
    pub fn with_tld(mut self, tld: impl Into<String>) -> Self {
        self.tld = tld.into();
        self
    }

    /// Sets the language restriction.
    pub fn with_lr(mut self, lr: impl Into<String>) -> Self {
        self.lr = Some(lr.into());
        self
    }

    /// Sets the transport by name.
    pub fn with_http_client(mut self, client: impl Into<String>) -> Self {
        self.http_client = Some(client.into());
        self
    }

    /// Sets the proxy connection string.
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Sets the page number.
    pub fn with_page(mut self, page: i64) -> Self {
        self.page = page;
        self
    }

    /// Sets the number of results per page.
    pub fn with_res_per_page(mut self, res_per_page: i64) -> Self {
        self.res_per_page = res_per_page;
        self
    }

    /// Dumps the response body to `path`.
    pub fn with_dump(mut self, path: impl Into<PathBuf>, force: bool) -> Self {
        self.dump = Some(path.into());
        self.force_dump = force;
        self
    }

    /// Requests the mobile layout.
    pub fn with_mobile(mut self, mobile: bool) -> Self {
        self.mobile = mobile;
        self
    }

    /// Sets a custom user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Validates the options and builds the resolved configuration.
    ///
    /// Fails with [`ConfigError::MissingInput`] when there is neither
    /// keywords nor a file, and with the dump errors when the dump target is
    /// unusable. Nothing is written or fetched.
    pub fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        let keywords = non_empty(self.keywords.as_deref());
        let source_file = self
            .file
            .clone()
            .filter(|path| !path.as_os_str().is_empty());

        if keywords.is_none() && source_file.is_none() {
            return Err(ConfigError::MissingInput);
        }

        let mut warnings = Vec::new();

        let page = positive("page", self.page)?;
        let mut results_per_page = positive("res-per-page", self.res_per_page)?;
        if results_per_page > MAX_RESULTS_PER_PAGE {
            warnings.push(ConfigWarning::ResultsPerPageClamped(results_per_page));
            results_per_page = MAX_RESULTS_PER_PAGE;
        }

        let proxy = non_empty(self.proxy.as_deref())
            .map(|p| ProxyDescriptor::parse(&p))
            .transpose()?;

        let dump = self
            .dump
            .clone()
            .filter(|path| !path.as_os_str().is_empty())
            .map(|path| DumpRequest::new(path, self.force_dump));
        if let Some(ref request) = dump {
            request.validate()?;
        }

        let client_name = non_empty(self.http_client.as_deref());
        let client_kind = match client_name.as_deref() {
            None => ClientKind::default(),
            Some(name) => ClientKind::from_name(name).unwrap_or_else(|| {
                warnings.push(ConfigWarning::UnknownHttpClient(name.to_string()));
                ClientKind::default()
            }),
        };

        let user_agent = non_empty(self.user_agent.as_deref());
        // Replaying a file builds no transport.
        if user_agent.is_some() && self.mobile && source_file.is_none() {
            warnings.push(ConfigWarning::UserAgentOverridesMobile);
        }

        for warning in &warnings {
            warn!("{}", warning);
        }

        Ok(ResolvedConfig {
            query: QueryConfig {
                keywords,
                tld: non_empty(Some(self.tld.as_str())).unwrap_or_else(default_tld),
                language_restriction: non_empty(self.lr.as_deref()),
                page,
                results_per_page,
                source_file,
            },
            transport: TransportConfig {
                client_kind,
                proxy,
                user_agent,
                mobile: self.mobile,
            },
            dump,
            warnings,
        })
    }
}

/// Blank values count as absent; other values are kept as given.
fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}

fn positive(option: &'static str, value: i64) -> Result<u32, ConfigError> {
    u32::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or(ConfigError::InvalidNumber { option, value })
}

/// What to search for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    /// Search terms, if any.
    pub keywords: Option<String>,
    /// Google TLD.
    pub tld: String,
    /// Language restriction.
    pub language_restriction: Option<String>,
    /// Page number, 1-indexed.
    pub page: u32,
    /// Results per page, at most [`MAX_RESULTS_PER_PAGE`].
    pub results_per_page: u32,
    /// Local file to parse instead of querying. Takes precedence over keywords.
    pub source_file: Option<PathBuf>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            keywords: None,
            tld: default_tld(),
            language_restriction: None,
            page: 1,
            results_per_page: 10,
            source_file: None,
        }
    }
}

/// How to reach the search engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportConfig {
    /// Which client to use.
    pub client_kind: ClientKind,
    /// Optional proxy.
    pub proxy: Option<ProxyDescriptor>,
    /// Explicit user agent. Wins over `mobile`.
    pub user_agent: Option<String>,
    /// Use the default mobile user agent.
    pub mobile: bool,
}

/// Non-fatal issues found while resolving options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// Both `--mobile` and `--user-agent` were given.
    UserAgentOverridesMobile,
    /// `--http-client` named an unknown client.
    UnknownHttpClient(String),
    /// `--res-per-page` was above the maximum.
    ResultsPerPageClamped(u32),
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserAgentOverridesMobile => f.write_str(
                "You used both of --mobile and --user-agent option, the given user agent \
                 string will be used instead of the default mobile user agent",
            ),
            Self::UnknownHttpClient(name) => {
                write!(f, "Unknown http client '{}', using curl", name)
            }
            Self::ResultsPerPageClamped(n) => write!(
                f,
                "--res-per-page={} is above the maximum, using {}",
                n, MAX_RESULTS_PER_PAGE
            ),
        }
    }
}

/// Fully validated configuration for one invocation.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub query: QueryConfig,
    pub transport: TransportConfig,
    pub dump: Option<DumpRequest>,
    pub warnings: Vec<ConfigWarning>,
}
