//! VGTimes free-games section.
//!
//! The listing only carries title, link, picture, rating and store buttons.
//! Body text and an exact publish time come from the article page, see
//! [`extract_detail`].

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::{parse_base, selector, stores, Article, ArticleDetail, Extraction, SkipReason, SourceKind};
use super::stores::LinkMatch;
use crate::error::ExtractionError;
use crate::utils::datetime::{parse_iso_lenient, parse_russian_datetime};
use crate::utils::text::{element_text, has_image_extension, normalize_url, truncate_chars};

pub const LISTING_URL: &str = "https://vgtimes.ru/free/";

const ITEMS: &str = "ul.list-items > li";
const LINK: &str = "div.item-name.type0 a:first-child";
const IMAGE: &str = "div.image_wrap.type0 img";
const ANY_IMAGE: &str = "img";
const RATING: &str = "div.rrating div.text";
const STORE_LINKS: &str = "a.l_ks[target=\"_blank\"]";
const CONTENT: &str = "div.article_text";
const DATE: &str = "div.date";

const DETAIL_CONTENT: [&str; 3] = ["div.article_text", "div.article-content", "div.text_block"];
const DETAIL_DATE: &str = "div.article_date, div.date, time.date";
const JSON_LD: &str = "script[type=\"application/ld+json\"]";

struct ListingSelectors {
    items: Selector,
    link: Selector,
    image: Selector,
    any_image: Selector,
    rating: Selector,
    store_links: Selector,
    content: Selector,
    date: Selector,
}

impl ListingSelectors {
    fn new() -> Result<Self, ExtractionError> {
        Ok(Self {
            items: selector(ITEMS)?,
            link: selector(LINK)?,
            image: selector(IMAGE)?,
            any_image: selector(ANY_IMAGE)?,
            rating: selector(RATING)?,
            store_links: selector(STORE_LINKS)?,
            content: selector(CONTENT)?,
            date: selector(DATE)?,
        })
    }
}

pub fn extract_listing(html: &str, base_url: &str, max_text: usize) -> Result<Extraction, ExtractionError> {
    let selectors = ListingSelectors::new()?;
    let base = parse_base(base_url)?;
    let document = Html::parse_document(html);

    let mut extraction = Extraction::default();
    for item in document.select(&selectors.items) {
        extraction.push(SourceKind::VgTimes, parse_item(item, &selectors, &base, max_text));
    }
    Ok(extraction)
}

fn parse_item(
    item: ElementRef<'_>,
    s: &ListingSelectors,
    base: &Url,
    max_text: usize,
) -> Result<Article, SkipReason> {
    let link_el = item.select(&s.link).next().ok_or(SkipReason::MissingLink)?;
    let url = link_el
        .value()
        .attr("href")
        .and_then(|href| normalize_url(href, base))
        .ok_or(SkipReason::MissingLink)?;
    let title = element_text(link_el);
    if title.is_empty() {
        return Err(SkipReason::MissingTitle);
    }
    let native_id = native_id(&url).ok_or(SkipReason::MissingId)?;

    let summary = item
        .select(&s.content)
        .next()
        .map(|el| truncate_chars(&element_text(el), max_text))
        .unwrap_or_default();

    let published_at = item
        .select(&s.date)
        .next()
        .and_then(|el| parse_russian_datetime(&element_text(el)));

    let rating = item
        .select(&s.rating)
        .next()
        .and_then(|el| element_text(el).replace('-', "").trim().parse::<i64>().ok())
        .map(|r| r.to_string());

    let store_links = stores::collect_store_links(
        item.select(&s.store_links).filter_map(|a| a.value().attr("href")),
        LinkMatch::AnyStorePage,
    );

    let mut images = Vec::new();
    let preferred = item
        .select(&s.image)
        .next()
        .and_then(|img| image_src(img, base));
    let others = item
        .select(&s.any_image)
        .filter_map(|img| image_src(img, base))
        .filter(|src| has_image_extension(src));
    for src in preferred.into_iter().chain(others) {
        if !images.contains(&src) {
            images.push(src);
        }
    }

    Ok(Article {
        id: SourceKind::VgTimes.article_id(&native_id),
        source: SourceKind::VgTimes,
        title,
        url,
        published_at,
        summary,
        rating,
        store_links,
        images,
    })
}

fn image_src(img: ElementRef<'_>, base: &Url) -> Option<String> {
    img.value()
        .attr("data-src")
        .or_else(|| img.value().attr("src"))
        .and_then(|src| normalize_url(src, base))
}

/// Numeric id leading the last path segment: `/free/123799-slug.html` -> `123799`.
pub fn native_id(url: &str) -> Option<String> {
    let path = Url::parse(url).ok()?.path().to_string();
    let last = path.trim_end_matches('/').rsplit('/').next()?;
    let digits: String = last.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}

pub fn extract_detail(html: &str, max_text: usize) -> Result<ArticleDetail, ExtractionError> {
    let document = Html::parse_document(html);

    let mut body = None;
    for css in DETAIL_CONTENT {
        if let Some(el) = document.select(&selector(css)?).next() {
            let text = element_text(el);
            if !text.is_empty() {
                body = Some(truncate_chars(&text, max_text));
                break;
            }
        }
    }

    let mut published_at = None;
    for script in document.select(&selector(JSON_LD)?) {
        let raw: String = script.text().collect();
        if let Some(date) = json_ld_date(&raw) {
            published_at = Some(date);
            break;
        }
    }
    if published_at.is_none() {
        published_at = document
            .select(&selector(DETAIL_DATE)?)
            .next()
            .map(element_text)
            .and_then(|text| parse_russian_datetime(&text).or_else(|| parse_iso_lenient(&text)));
    }

    let store_links = stores::collect_store_links(
        document
            .select(&selector(STORE_LINKS)?)
            .filter_map(|a| a.value().attr("href")),
        LinkMatch::AnyStorePage,
    );

    Ok(ArticleDetail {
        body,
        published_at,
        store_links,
    })
}

fn json_ld_date(raw: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    let value: serde_json::Value = serde_json::from_str(raw.trim()).ok()?;
    let candidates = match value {
        serde_json::Value::Array(items) => items,
        other => vec![other],
    };
    candidates.iter().find_map(|item| {
        if item.get("@type").and_then(|t| t.as_str()) != Some("NewsArticle") {
            return None;
        }
        item.get("datePublished")
            .and_then(|d| d.as_str())
            .and_then(parse_iso_lenient)
    })
}
