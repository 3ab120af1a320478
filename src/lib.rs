//! # serps
//!
//! Issues (or replays) a Google search and turns the result page into a
//! normalized, type-tagged report.
//!
//! The crate is split along the command's pipeline:
//!
//! - [`SearchOptions::resolve`] validates user options into a [`ResolvedConfig`]
//! - [`GoogleUrl`] builds the request descriptor
//! - [`TransportSelection`] picks the client, user agent and proxy
//! - [`GoogleSerp`] parses the page into a [`ParsedResponse`]
//! - [`DumpRequest`] optionally saves the page
//! - [`SearchReport::normalize`] produces the output document
//!
//! ## Example
//!
//! ```rust,no_run
//! use serps::{GoogleSearch, SearchOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let options = SearchOptions::new("rust programming").with_tld("co.uk");
//!     let report = GoogleSearch::new().run(&options).await?;
//!     println!("{}", report.to_json_pretty()?);
//!     Ok(())
//! }
//! ```

mod config;
mod dump;
mod error;
mod query;
mod report;
mod result;
mod search;
mod serp;

#[cfg(feature = "headless")]
pub mod browser;
pub mod fetcher;
pub mod fetcher_http;
pub mod proxy;
pub mod transport;

pub use config::{
    ConfigWarning, QueryConfig, ResolvedConfig, SearchOptions, TransportConfig,
    MAX_RESULTS_PER_PAGE,
};
pub use dump::DumpRequest;
pub use error::{ConfigError, Result, SearchError};
pub use query::GoogleUrl;
pub use report::{NewsEntry, NormalizedResult, ResultDetails, SearchReport, VideoEntry};
pub use result::{
    Image, Link, NaturalResult, NaturalResultData, NaturalResultType, ParsedResponse,
    RelatedSearch, Video,
};
pub use search::GoogleSearch;
pub use serp::GoogleSerp;
pub use transport::{ClientKind, TransportSelection};
