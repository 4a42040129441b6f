//! Pikabu Steam community feed.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::{parse_base, selector, stores, Article, Extraction, SkipReason, SourceKind};
use super::stores::LinkMatch;
use crate::error::ExtractionError;
use crate::utils::datetime::parse_iso_lenient;
use crate::utils::text::{element_text, has_image_extension, normalize_url, truncate_chars};

pub const LISTING_URL: &str = "https://pikabu.ru/community/steam";

const ITEMS: &str = "article[data-story-id]";
const TITLE: &str = "h2.story__title a.story__title-link";
const CONTENT: &str = "div.story__content";
const RATING: &str = "div.story__rating-count";
const DATE: &str = "time.story__datetime";
const LINKS: &str = "a[href]";
const IMAGES: [&str; 9] = [
    "div.story-block_type_image img.story-image__image",
    "div.story__image img",
    "img.story__image",
    "div.story__content img",
    "div.story-block img",
    "img[src*='story-image']",
    "img[src*='story__image']",
    "img[src*='story-block']",
    "img[data-src]",
];

struct ListingSelectors {
    items: Selector,
    title: Selector,
    content: Selector,
    rating: Selector,
    date: Selector,
    links: Selector,
    images: Vec<Selector>,
}

impl ListingSelectors {
    fn new() -> Result<Self, ExtractionError> {
        Ok(Self {
            items: selector(ITEMS)?,
            title: selector(TITLE)?,
            content: selector(CONTENT)?,
            rating: selector(RATING)?,
            date: selector(DATE)?,
            links: selector(LINKS)?,
            images: IMAGES.iter().map(|css| selector(css)).collect::<Result<_, _>>()?,
        })
    }
}

pub fn extract_listing(html: &str, base_url: &str, max_text: usize) -> Result<Extraction, ExtractionError> {
    let selectors = ListingSelectors::new()?;
    let base = parse_base(base_url)?;
    let document = Html::parse_document(html);

    let mut extraction = Extraction::default();
    for item in document.select(&selectors.items) {
        extraction.push(SourceKind::Pikabu, parse_item(item, &selectors, &base, max_text));
    }
    Ok(extraction)
}

fn parse_item(
    item: ElementRef<'_>,
    s: &ListingSelectors,
    base: &Url,
    max_text: usize,
) -> Result<Article, SkipReason> {
    let native_id = item
        .value()
        .attr("data-story-id")
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(SkipReason::MissingId)?;

    let title_el = item.select(&s.title).next().ok_or(SkipReason::MissingTitle)?;
    let title = truncate_chars(&element_text(title_el), max_text);
    if title.is_empty() {
        return Err(SkipReason::MissingTitle);
    }
    let url = title_el
        .value()
        .attr("href")
        .and_then(|href| normalize_url(href, base))
        .ok_or(SkipReason::MissingLink)?;

    let rating = item
        .select(&s.rating)
        .next()
        .map(element_text)
        .filter(|r| !r.is_empty());

    let published_at = item
        .select(&s.date)
        .next()
        .and_then(|el| el.value().attr("datetime"))
        .and_then(parse_iso_lenient);

    let content_el = item.select(&s.content).next();
    let summary = content_el
        .map(|el| truncate_chars(&element_text(el), max_text))
        .unwrap_or_default();

    let mut candidates: Vec<String> = Vec::new();
    if let Some(content) = content_el {
        candidates.extend(
            content
                .select(&s.links)
                .filter_map(|a| a.value().attr("href"))
                .filter_map(|href| normalize_url(href, base)),
        );
        candidates.extend(
            stores::find_urls_in_text(&element_text(content))
                .into_iter()
                .map(str::to_string),
        );
    }
    let store_links = stores::collect_store_links(
        candidates.iter().map(String::as_str),
        LinkMatch::ProductPage,
    );

    let mut images = Vec::new();
    for image_selector in &s.images {
        for img in item.select(image_selector) {
            let src = img.value().attr("src").or_else(|| img.value().attr("data-src"));
            let Some(src) = src.and_then(|src| normalize_url(src, base)) else {
                continue;
            };
            if src.contains("/avatars/") || !has_image_extension(&src) || images.contains(&src) {
                continue;
            }
            images.push(src);
        }
    }

    Ok(Article {
        id: SourceKind::Pikabu.article_id(native_id),
        source: SourceKind::Pikabu,
        title,
        url,
        published_at,
        summary,
        rating,
        store_links,
        images,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_selectors_parse() {
        assert!(ListingSelectors::new().is_ok());
    }

    #[test]
    fn test_store_links_from_content_links_and_text() {
        let html = r#"
            <article data-story-id="42">
              <h2 class="story__title"><a class="story__title-link" href="/story/free_game_42">Free game</a></h2>
              <div class="story__content">
                <p>Steam: <a href="https://store.steampowered.com/app/570/?snr=1">here</a></p>
                <p>GOG https://www.gog.com/game/witcher?pp=1</p>
                <p><a href="https://store.steampowered.com/app/999">second steam</a></p>
              </div>
            </article>"#;
        let extraction = extract_listing(html, LISTING_URL, 4000).unwrap();
        let article = &extraction.articles[0];
        assert_eq!(article.store_links.len(), 2);
        assert_eq!(
            article.store_links[&stores::Store::Steam],
            "https://store.steampowered.com/app/570/"
        );
        assert_eq!(
            article.store_links[&stores::Store::Gog],
            "https://www.gog.com/game/witcher"
        );
    }
}
