//! Google result page parser.
//!
//! Extracts natural results, related searches and page metadata from a
//! Google SERP. Parsing is eager: the `scraper` document is dropped once the
//! data is extracted, so a [`GoogleSerp`] is plain owned data.

use std::path::Path;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::fetcher::FetchedPage;
use crate::query::GoogleUrl;
use crate::result::{
    Image, Link, NaturalResult, NaturalResultData, ParsedResponse, RelatedSearch, Video,
};
use crate::{Result, SearchError};

/// Top-level result blocks, matched in document order.
const BLOCKS: &str = "div.g, g-section-with-header, div.kp-wholepage, \
    div#imagebox_bigimages, div#lu_map";

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| SearchError::Parse(format!("Failed to parse selector: {:?}", e)))
}

fn text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

struct Selectors {
    blocks: Selector,
    title: Selector,
    link: Selector,
    heading: Selector,
    carousel: Selector,
    inner_card: Selector,
    video: Selector,
    knowledge_title: Selector,
    image: Selector,
    related: Selector,
    result_stats: Selector,
    mobile: Selector,
}

impl Selectors {
    fn new() -> Result<Self> {
        Ok(Self {
            blocks: selector(BLOCKS)?,
            title: selector("h3")?,
            link: selector("a[href]")?,
            heading: selector("[role=heading], h3")?,
            carousel: selector("g-scrolling-carousel")?,
            inner_card: selector("g-inner-card")?,
            video: selector("video-voyager")?,
            knowledge_title: selector("[data-attrid=title], h2")?,
            image: selector("img")?,
            related: selector("div#brs a[href], div#bres a[href]")?,
            result_stats: selector("div#result-stats")?,
            mobile: selector("div.mnr-c")?,
        })
    }
}

/// A parsed Google result page.
#[derive(Debug, Clone)]
pub struct GoogleSerp {
    body: String,
    url: String,
    evaluated: bool,
    mobile: bool,
    number_of_results: u64,
    natural_results: Vec<NaturalResult>,
    related_searches: Vec<RelatedSearch>,
}

impl GoogleSerp {
    /// Parses `html` served from `url`.
    pub fn parse(html: &str, url: impl Into<String>, evaluated: bool) -> Result<Self> {
        let url = url.into();
        let base = Url::parse(&url).ok();
        let document = Html::parse_document(html);
        let selectors = Selectors::new()?;

        let natural_results = Self::parse_natural_results(&document, &selectors, base.as_ref());
        let related_searches: Vec<RelatedSearch> = document
            .select(&selectors.related)
            .filter_map(|a| {
                let title = text_of(a);
                let href = a.value().attr("href")?;
                (!title.is_empty()).then(|| Link::new(title, resolve(base.as_ref(), href)))
            })
            .collect();
        let number_of_results = document
            .select(&selectors.result_stats)
            .next()
            .map(|stats| parse_result_count(&text_of(stats)))
            .unwrap_or(0);
        let mobile = document.select(&selectors.mobile).next().is_some();

        debug!(
            "Parsed {} natural results, {} related searches",
            natural_results.len(),
            related_searches.len()
        );

        Ok(Self {
            body: document.html(),
            url,
            evaluated,
            mobile,
            number_of_results,
            natural_results,
            related_searches,
        })
    }

    /// Parses a page returned by a transport, rejecting bot-block pages.
    pub fn from_page(page: FetchedPage) -> Result<Self> {
        if page.url.contains("/sorry/")
            || page.body.contains("/sorry/index")
            || page.body.contains("recaptcha")
        {
            return Err(SearchError::Transport(
                "Google returned a CAPTCHA page (bot detected). Try again later or use a proxy."
                    .to_string(),
            ));
        }
        Self::parse(&page.body, page.url, page.evaluated)
    }

    /// Parses a saved result page. The descriptor stands in for the URL the
    /// page was served from.
    pub fn from_file(path: &Path, url: &GoogleUrl) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|source| SearchError::SourceFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&String::from_utf8_lossy(&bytes), url.to_string(), false)
    }

    fn parse_natural_results(
        document: &Html,
        selectors: &Selectors,
        base: Option<&Url>,
    ) -> Vec<NaturalResult> {
        document
            .select(&selectors.blocks)
            .filter(|block| {
                // Blocks nested in another block belong to their parent.
                !block
                    .ancestors()
                    .filter_map(ElementRef::wrap)
                    .any(|ancestor| selectors.blocks.matches(&ancestor))
            })
            .filter_map(|block| parse_block(block, selectors, base))
            .collect()
    }
}

fn parse_block(block: ElementRef<'_>, s: &Selectors, base: Option<&Url>) -> Option<NaturalResult> {
    let element = block.value();
    let is_carousel = block.select(&s.carousel).next().is_some();

    if element.id() == Some("imagebox_bigimages") {
        let images = block
            .select(&s.image)
            .map(|img| Image {
                url: img.value().attr("src").map(str::to_string),
                alt: img.value().attr("alt").unwrap_or_default().to_string(),
            })
            .collect();
        return Some(NaturalResult::new(NaturalResultData::ImageGroup { is_carousel, images }));
    }

    if element.id() == Some("lu_map") {
        return Some(NaturalResult::other(["map"]));
    }

    if element.classes().any(|class| class == "kp-wholepage") {
        let title = block
            .select(&s.knowledge_title)
            .next()
            .map(text_of)
            .unwrap_or_default();
        return Some(NaturalResult::new(NaturalResultData::Knowledge { title }));
    }

    if element.name() == "g-section-with-header" {
        if block.select(&s.video).next().is_some() {
            let videos = block
                .select(&s.video)
                .filter_map(|video| {
                    let title = video.select(&s.heading).next().map(text_of)?;
                    let url = video
                        .select(&s.link)
                        .next()
                        .and_then(|a| a.value().attr("href"))
                        .map(|href| resolve(base, href));
                    Some(Video { title, url })
                })
                .collect();
            return Some(NaturalResult::new(NaturalResultData::VideoGroup { videos }));
        }

        if block.select(&s.inner_card).next().is_some() {
            let news = block
                .select(&s.inner_card)
                .filter_map(|card| {
                    let link = card.select(&s.link).next()?;
                    let title = card
                        .select(&s.heading)
                        .next()
                        .map(text_of)
                        .unwrap_or_else(|| text_of(link));
                    let href = link.value().attr("href")?;
                    Some(Link::new(title, resolve(base, href)))
                })
                .collect();
            return Some(NaturalResult::new(NaturalResultData::TopStories { is_carousel, news }));
        }

        return Some(NaturalResult::other(["section"]));
    }

    parse_classical(block, s, base)
}

fn parse_classical(block: ElementRef<'_>, s: &Selectors, base: Option<&Url>) -> Option<NaturalResult> {
    let title = block.select(&s.title).next().map(text_of)?;
    let href = block.select(&s.link).next()?.value().attr("href")?;

    // Skip Google's internal links
    if href.starts_with('/') && !href.starts_with("/url?") {
        return None;
    }

    let url = match href.strip_prefix("/url?q=") {
        Some(q) => {
            let target = q.split('&').next().unwrap_or(q);
            urlencoding::decode(target)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| target.to_string())
        }
        None => resolve(base, href),
    };

    (!title.is_empty() && !url.is_empty())
        .then(|| NaturalResult::new(NaturalResultData::Classical { title, url }))
}

fn resolve(base: Option<&Url>, href: &str) -> String {
    base.and_then(|base| base.join(href).ok())
        .map(String::from)
        .unwrap_or_else(|| href.to_string())
}

/// Extracts the total from a result-stats line such as
/// `About 1,230,000 results (0.45 seconds)`.
fn parse_result_count(stats: &str) -> u64 {
    // The timing in parentheses also contains digits.
    let without_timing = stats.split('(').next().unwrap_or_default();
    let Ok(number) = Regex::new(r"\d[\d.,\s\x{a0}'\x{202f}]*") else {
        return 0;
    };
    number
        .find(without_timing)
        .map(|m| {
            m.as_str()
                .chars()
                .filter(char::is_ascii_digit)
                .collect::<String>()
        })
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(0)
}

impl ParsedResponse for GoogleSerp {
    fn body(&self) -> &str {
        &self.body
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn javascript_evaluated(&self) -> bool {
        self.evaluated
    }

    fn is_mobile(&self) -> bool {
        self.mobile
    }

    fn number_of_results(&self) -> u64 {
        self.number_of_results
    }

    fn natural_results(&self) -> &[NaturalResult] {
        &self.natural_results
    }

    fn related_searches(&self) -> &[RelatedSearch] {
        &self.related_searches
    }
}
