//! Source sites and the article records extracted from them.
//!
//! Each supported site is a [`SourceKind`] variant with its own extraction
//! rules. The orchestrator picks the rules through the variant, so adding a
//! site means adding a variant, a module and a match arm.

pub mod fetcher;
pub mod pikabu;
pub mod stores;
pub mod vgtimes;

use chrono::{DateTime, Utc};
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ExtractionError;
use crate::utils::logging::log_item_skipped;

pub use stores::Store;

/// A supported source site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    VgTimes,
    Pikabu,
}

impl SourceKind {
    pub const ALL: [SourceKind; 2] = [SourceKind::VgTimes, SourceKind::Pikabu];

    /// Tag used in logs, configuration and article identifiers.
    pub fn tag(&self) -> &'static str {
        match self {
            SourceKind::VgTimes => "vgtimes",
            SourceKind::Pikabu => "pikabu",
        }
    }

    pub fn default_url(&self) -> &'static str {
        match self {
            SourceKind::VgTimes => vgtimes::LISTING_URL,
            SourceKind::Pikabu => pikabu::LISTING_URL,
        }
    }

    /// Extracts the listing page of this site.
    ///
    /// `base_url` resolves relative links, `max_text` bounds summaries.
    pub fn extract(&self, html: &str, base_url: &str, max_text: usize) -> Result<Extraction, ExtractionError> {
        match self {
            SourceKind::VgTimes => vgtimes::extract_listing(html, base_url, max_text),
            SourceKind::Pikabu => pikabu::extract_listing(html, base_url, max_text),
        }
    }

    /// Whether listing items need a second request for body and date.
    pub fn needs_detail(&self) -> bool {
        matches!(self, SourceKind::VgTimes)
    }

    /// Extracts the article page of this site, for kinds that need it.
    pub fn extract_detail(&self, html: &str, max_text: usize) -> Result<ArticleDetail, ExtractionError> {
        match self {
            SourceKind::VgTimes => vgtimes::extract_detail(html, max_text),
            SourceKind::Pikabu => Ok(ArticleDetail::default()),
        }
    }

    /// Article identifier for a site-native id.
    pub fn article_id(&self, native_id: &str) -> String {
        format!("{}:{}", self.tag(), native_id)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vgtimes" => Ok(SourceKind::VgTimes),
            "pikabu" => Ok(SourceKind::Pikabu),
            other => Err(format!("unknown source `{}`", other)),
        }
    }
}

/// A configured site: which rules to use and which page to scrape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub url: String,
}

impl SourceConfig {
    pub fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            url: kind.default_url().to_string(),
        }
    }

    pub fn defaults() -> Vec<Self> {
        SourceKind::ALL.iter().copied().map(Self::new).collect()
    }
}

/// One piece of content scraped from a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub source: SourceKind,
    pub title: String,
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
    pub summary: String,
    pub rating: Option<String>,
    pub store_links: BTreeMap<Store, String>,
    pub images: Vec<String>,
}

impl Article {
    /// Returns a copy completed with data from the article page.
    ///
    /// Listing values win only when the page has nothing better.
    pub fn with_detail(&self, detail: ArticleDetail) -> Article {
        let mut article = self.clone();
        if let Some(body) = detail.body.filter(|b| !b.is_empty()) {
            article.summary = body;
        }
        if detail.published_at.is_some() {
            article.published_at = detail.published_at;
        }
        for (store, url) in detail.store_links {
            article.store_links.entry(store).or_insert(url);
        }
        article
    }
}

/// Data only available on an article's own page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleDetail {
    pub body: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub store_links: BTreeMap<Store, String>,
}

/// Why a listing item produced no article.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingTitle,
    MissingLink,
    MissingId,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::MissingTitle => "missing title",
            SkipReason::MissingLink => "missing link",
            SkipReason::MissingId => "missing id",
        }
    }
}

/// Articles found on one page, plus how many items had to be dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub articles: Vec<Article>,
    pub skipped: usize,
}

impl Extraction {
    pub(crate) fn push(&mut self, source: SourceKind, item: Result<Article, SkipReason>) {
        match item {
            Ok(article) => self.articles.push(article),
            Err(reason) => {
                self.skipped += 1;
                log_item_skipped(source.tag(), reason.as_str(), None);
            }
        }
    }
}

pub(crate) fn selector(css: &str) -> Result<Selector, ExtractionError> {
    Selector::parse(css).map_err(|e| ExtractionError::Selector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

pub(crate) fn parse_base(url: &str) -> Result<url::Url, ExtractionError> {
    url::Url::parse(url).map_err(|source| ExtractionError::BaseUrl {
        url: url.to_string(),
        source,
    })
}
