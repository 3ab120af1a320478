//! Result normalization.
//!
//! Collapses the parser's result blocks into the uniform, type-tagged
//! [`SearchReport`] that is printed as JSON.

use serde::{Deserialize, Serialize};

use crate::query::GoogleUrl;
use crate::result::{NaturalResult, NaturalResultData, ParsedResponse, RelatedSearch};
use crate::transport::ClientKind;

/// A news entry of a top-stories block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsEntry {
    pub title: String,
    pub url: String,
}

/// A video entry of a video group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoEntry {
    pub title: String,
}

/// Kind-specific output fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultDetails {
    Classical {
        title: String,
        url: String,
    },
    TopStories {
        #[serde(rename = "isCarousel")]
        is_carousel: bool,
        news: Vec<NewsEntry>,
    },
    VideoGroup {
        videos: Vec<VideoEntry>,
    },
    Knowledge {
        title: String,
    },
    ImageGroup {
        #[serde(rename = "isCarousel")]
        is_carousel: bool,
        #[serde(rename = "imagesCount")]
        images_count: usize,
    },
}

/// One normalized natural result.
///
/// `details` is absent for kinds the normalizer does not know; such results
/// only carry their raw `types`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedResult {
    pub types: Vec<String>,
    #[serde(flatten)]
    pub details: Option<ResultDetails>,
}

impl NormalizedResult {
    /// Normalizes a single parser result.
    pub fn from_result(item: &NaturalResult) -> Self {
        let details = match item.data() {
            NaturalResultData::Classical { title, url } => Some(ResultDetails::Classical {
                title: title.clone(),
                url: url.clone(),
            }),
            NaturalResultData::TopStories { is_carousel, news } => Some(ResultDetails::TopStories {
                is_carousel: *is_carousel,
                news: news
                    .iter()
                    .map(|n| NewsEntry {
                        title: n.title.clone(),
                        url: n.url.clone(),
                    })
                    .collect(),
            }),
            NaturalResultData::VideoGroup { videos } => Some(ResultDetails::VideoGroup {
                videos: videos
                    .iter()
                    .map(|v| VideoEntry {
                        title: v.title.clone(),
                    })
                    .collect(),
            }),
            NaturalResultData::Knowledge { title } => Some(ResultDetails::Knowledge {
                title: title.clone(),
            }),
            NaturalResultData::ImageGroup { is_carousel, images } => {
                Some(ResultDetails::ImageGroup {
                    is_carousel: *is_carousel,
                    images_count: images.len(),
                })
            }
            NaturalResultData::Other => None,
        };

        Self {
            types: item.types().to_vec(),
            details,
        }
    }
}

/// The command's output document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchReport {
    #[serde(rename = "initial-url")]
    initial_url: String,
    url: String,
    #[serde(rename = "http-client")]
    http_client: Option<String>,
    evaluated: bool,
    #[serde(rename = "isMobileDom")]
    is_mobile_dom: bool,
    #[serde(rename = "natural-results-count")]
    natural_results_count: usize,
    #[serde(rename = "total-count")]
    total_count: u64,
    #[serde(rename = "natural-results")]
    natural_results: Vec<NormalizedResult>,
    #[serde(rename = "related-searches")]
    related_searches: Vec<RelatedSearch>,
}

impl SearchReport {
    /// Builds the report for a parsed page.
    ///
    /// `client` is the transport actually used, `None` when the page came
    /// from a local file. Result order is preserved.
    pub fn normalize(
        response: &dyn ParsedResponse,
        initial_url: &GoogleUrl,
        client: Option<ClientKind>,
    ) -> Self {
        let natural_results: Vec<_> = response
            .natural_results()
            .iter()
            .map(NormalizedResult::from_result)
            .collect();

        Self {
            initial_url: initial_url.to_string(),
            url: response.url().to_string(),
            http_client: client.map(|c| c.as_str().to_string()),
            evaluated: response.javascript_evaluated(),
            is_mobile_dom: response.is_mobile(),
            natural_results_count: natural_results.len(),
            total_count: response.number_of_results(),
            natural_results,
            related_searches: response.related_searches().to_vec(),
        }
    }

    pub fn initial_url(&self) -> &str {
        &self.initial_url
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn http_client(&self) -> Option<&str> {
        self.http_client.as_deref()
    }

    pub fn evaluated(&self) -> bool {
        self.evaluated
    }

    pub fn is_mobile_dom(&self) -> bool {
        self.is_mobile_dom
    }

    /// Number of normalized natural results, not the engine's estimate.
    pub fn natural_results_count(&self) -> usize {
        self.natural_results_count
    }

    /// Engine-reported total.
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn natural_results(&self) -> &[NormalizedResult] {
        &self.natural_results
    }

    pub fn related_searches(&self) -> &[RelatedSearch] {
        &self.related_searches
    }

    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
