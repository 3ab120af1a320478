//! Parsed result page types.
//!
//! These are what a SERP parser hands to the normalizer. Each natural
//! result carries its raw `types` list, as reported by the parser, and a
//! closed [`NaturalResultData`] variant holding the kind-specific fields.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kinds of natural result the normalizer knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NaturalResultType {
    /// Standard organic listing.
    Classical,
    /// News block.
    TopStories,
    /// Group of videos.
    VideoGroup,
    /// Knowledge panel.
    Knowledge,
    /// Group of images.
    ImageGroup,
}

impl NaturalResultType {
    /// Name used in the `types` list.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Classical => "classical",
            Self::TopStories => "top_stories",
            Self::VideoGroup => "video_group",
            Self::Knowledge => "knowledge",
            Self::ImageGroup => "image_group",
        }
    }
}

impl fmt::Display for NaturalResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A titled link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub title: String,
    pub url: String,
}

impl Link {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// A video inside a video group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Video {
    pub title: String,
    pub url: Option<String>,
}

/// An image inside an image group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub url: Option<String>,
    pub alt: String,
}

/// Kind-specific content of a natural result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NaturalResultData {
    Classical {
        title: String,
        url: String,
    },
    TopStories {
        is_carousel: bool,
        news: Vec<Link>,
    },
    VideoGroup {
        videos: Vec<Video>,
    },
    Knowledge {
        title: String,
    },
    ImageGroup {
        is_carousel: bool,
        images: Vec<Image>,
    },
    /// A block the normalizer has no fields for.
    Other,
}

impl NaturalResultData {
    /// Returns the known kind, if any.
    pub fn kind(&self) -> Option<NaturalResultType> {
        match self {
            Self::Classical { .. } => Some(NaturalResultType::Classical),
            Self::TopStories { .. } => Some(NaturalResultType::TopStories),
            Self::VideoGroup { .. } => Some(NaturalResultType::VideoGroup),
            Self::Knowledge { .. } => Some(NaturalResultType::Knowledge),
            Self::ImageGroup { .. } => Some(NaturalResultType::ImageGroup),
            Self::Other => None,
        }
    }
}

/// One natural (non-ad) result block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NaturalResult {
    types: Vec<String>,
    data: NaturalResultData,
}

impl NaturalResult {
    /// Creates a result whose type list is its kind's name.
    pub fn new(data: NaturalResultData) -> Self {
        let types = data
            .kind()
            .map(|kind| vec![kind.as_str().to_string()])
            .unwrap_or_default();
        Self { types, data }
    }

    /// Creates a result of a kind the normalizer does not know.
    pub fn other<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: types.into_iter().map(Into::into).collect(),
            data: NaturalResultData::Other,
        }
    }

    /// Adds a raw type tag.
    pub fn with_type(mut self, tag: impl Into<String>) -> Self {
        self.types.push(tag.into());
        self
    }

    /// Raw type list.
    pub fn types(&self) -> &[String] {
        &self.types
    }

    /// Kind-specific content.
    pub fn data(&self) -> &NaturalResultData {
        &self.data
    }

    /// Whether this result is of the given kind.
    pub fn is(&self, kind: NaturalResultType) -> bool {
        self.data.kind() == Some(kind)
    }
}

/// A suggested follow-up query.
pub type RelatedSearch = Link;

/// A parsed search engine result page.
pub trait ParsedResponse {
    /// The rendered document body.
    fn body(&self) -> &str;

    /// The URL the page was served from.
    fn url(&self) -> &str;

    /// Whether page scripts ran before parsing.
    fn javascript_evaluated(&self) -> bool;

    /// Whether the page uses the mobile layout.
    fn is_mobile(&self) -> bool;

    /// Total number of results the engine reports.
    fn number_of_results(&self) -> u64;

    /// Natural results in page order.
    fn natural_results(&self) -> &[NaturalResult];

    /// Related searches in page order.
    fn related_searches(&self) -> &[RelatedSearch];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_result_type_names() {
        assert_eq!(NaturalResultType::Classical.as_str(), "classical");
        assert_eq!(NaturalResultType::TopStories.to_string(), "top_stories");
        assert_eq!(NaturalResultType::ImageGroup.as_str(), "image_group");
    }

    #[test]
    fn test_natural_result_type_serialization() {
        let json = serde_json::to_string(&NaturalResultType::VideoGroup).unwrap();
        assert_eq!(json, "\"video_group\"");
    }

    #[test]
    fn test_natural_result_new_sets_types() {
        let item = NaturalResult::new(NaturalResultData::Knowledge {
            title: "Rust".to_string(),
        });
        assert_eq!(item.types(), ["knowledge"]);
        assert!(item.is(NaturalResultType::Knowledge));
        assert!(!item.is(NaturalResultType::Classical));
    }

    #[test]
    fn test_natural_result_other() {
        let item = NaturalResult::other(["map"]);
        assert_eq!(item.types(), ["map"]);
        assert_eq!(item.data().kind(), None);
        for kind in [
            NaturalResultType::Classical,
            NaturalResultType::TopStories,
            NaturalResultType::VideoGroup,
            NaturalResultType::Knowledge,
            NaturalResultType::ImageGroup,
        ] {
            assert!(!item.is(kind));
        }
    }

    #[test]
    fn test_natural_result_with_type() {
        let item = NaturalResult::new(NaturalResultData::ImageGroup {
            is_carousel: true,
            images: vec![],
        })
        .with_type("carousel");
        assert_eq!(item.types(), ["image_group", "carousel"]);
    }

    #[test]
    fn test_link_new() {
        let link = Link::new("Rust", "https://www.rust-lang.org/");
        assert_eq!(link.title, "Rust");
        assert_eq!(link.url, "https://www.rust-lang.org/");
    }
}
