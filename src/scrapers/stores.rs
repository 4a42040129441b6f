use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::utils::text::strip_tracking;

/// Game stores whose links are surfaced in posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Store {
    Steam,
    EpicGames,
    Gog,
    ItchIo,
}

impl Store {
    pub fn name(&self) -> &'static str {
        match self {
            Store::Steam => "Steam",
            Store::EpicGames => "Epic Games",
            Store::Gog => "GOG",
            Store::ItchIo => "itch.io",
        }
    }

    /// Recognises the store a URL belongs to.
    pub fn detect(url: &str) -> Option<Store> {
        let host = host_of(url)?;
        if host == "store.steampowered.com" {
            Some(Store::Steam)
        } else if host == "epicgames.com" || host.ends_with(".epicgames.com") {
            Some(Store::EpicGames)
        } else if host == "gog.com" || host.ends_with(".gog.com") {
            Some(Store::Gog)
        } else if host == "itch.io" || host.ends_with(".itch.io") {
            Some(Store::ItchIo)
        } else {
            None
        }
    }

    /// Whether `url` points at a product page rather than a store front.
    fn is_product_page(&self, url: &str) -> bool {
        let Some(path) = path_of(url) else {
            return false;
        };
        match self {
            Store::Steam => path
                .split('/')
                .skip_while(|seg| *seg != "app")
                .nth(1)
                .is_some_and(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_digit())),
            Store::EpicGames => path.contains("/p/"),
            Store::Gog => path.contains("/game/"),
            Store::ItchIo => {
                host_of(url).is_some_and(|h| h != "itch.io") && !path.trim_matches('/').is_empty()
            }
        }
    }
}

impl fmt::Display for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How strictly a candidate link has to look like a store page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkMatch {
    /// Any page on a known store host, as in curated store buttons.
    AnyStorePage,
    /// Product pages only, for links picked out of free-form posts.
    ProductPage,
}

/// Normalises a link on a known store host: tracking parameters dropped,
/// scheme ensured.
pub fn normalize_store_url(url: &str) -> Option<(Store, String)> {
    let url = strip_tracking(url.trim());
    if url.is_empty() {
        return None;
    }
    let url = if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url.trim_start_matches('/'))
    };
    let store = Store::detect(&url)?;
    Some((store, url))
}

/// Like [`normalize_store_url`], but only for product pages of a known store.
pub fn clean_store_url(url: &str) -> Option<(Store, String)> {
    let (store, url) = normalize_store_url(url)?;
    if !store.is_product_page(&url) || url.contains("/accounts/") {
        return None;
    }
    Some((store, url))
}

/// Collects store links from candidate URLs, first link per store wins.
pub fn collect_store_links<'a, I>(urls: I, mode: LinkMatch) -> BTreeMap<Store, String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut links = BTreeMap::new();
    for raw in urls {
        let cleaned = match mode {
            LinkMatch::AnyStorePage => normalize_store_url(raw),
            LinkMatch::ProductPage => clean_store_url(raw),
        };
        if let Some((store, url)) = cleaned {
            links.entry(store).or_insert(url);
        }
    }
    links
}

/// Finds bare store URLs inside free text.
pub fn find_urls_in_text(text: &str) -> Vec<&str> {
    text.split(|c: char| c.is_whitespace() || c == '"' || c == '<' || c == '>' || c == '(' || c == ')')
        .filter(|token| token.starts_with("http://") || token.starts_with("https://"))
        .map(|token| token.trim_end_matches(['.', ',', ';', '!']))
        .collect()
}

fn host_of(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()?
        .host_str()
        .map(|h| h.trim_start_matches("www.").to_lowercase())
}

fn path_of(url: &str) -> Option<String> {
    url::Url::parse(url).ok().map(|u| u.path().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_store_url_strips_tracking() {
        assert_eq!(
            clean_store_url("https://store.steampowered.com/app/123/Game/?utm_source=test"),
            Some((Store::Steam, "https://store.steampowered.com/app/123/Game/".to_string()))
        );
        assert_eq!(
            clean_store_url("www.gog.com/en/game/some_game#reviews"),
            Some((Store::Gog, "https://www.gog.com/en/game/some_game".to_string()))
        );
    }

    #[test]
    fn test_clean_store_url_rejects_non_product_pages() {
        assert_eq!(clean_store_url(""), None);
        assert_eq!(clean_store_url("https://store.steampowered.com/"), None);
        assert_eq!(clean_store_url("https://store.epicgames.com/ru/"), None);
        assert_eq!(clean_store_url("https://itch.io/"), None);
        assert_eq!(clean_store_url("https://example.com/app/1"), None);
        assert_eq!(clean_store_url("https://store.epicgames.com/accounts/p/login"), None);
    }

    #[test]
    fn test_clean_store_url_accepts_known_stores() {
        assert_eq!(
            clean_store_url("https://store.epicgames.com/ru/p/hogwarts-legacy").map(|(s, _)| s),
            Some(Store::EpicGames)
        );
        assert_eq!(
            clean_store_url("https://dev.itch.io/cool-game").map(|(s, _)| s),
            Some(Store::ItchIo)
        );
    }

    #[test]
    fn test_collect_store_links_keeps_first_per_store() {
        let links = collect_store_links([
            "https://store.steampowered.com/app/1",
            "https://store.steampowered.com/app/2",
            "https://example.com",
        ], LinkMatch::ProductPage);
        assert_eq!(links.len(), 1);
        assert_eq!(links[&Store::Steam], "https://store.steampowered.com/app/1");
    }

    #[test]
    fn test_store_pages_kept_when_any_store_page_matches() {
        let urls = [
            "https://store.steampowered.com/sub/12345/?snr=1",
            "https://epicgames.com",
            "https://gog.com",
            "https://example.com/app/1",
        ];
        let links = collect_store_links(urls, LinkMatch::AnyStorePage);
        assert_eq!(links.len(), 3);
        assert_eq!(links[&Store::Steam], "https://store.steampowered.com/sub/12345/");
        assert_eq!(links[&Store::EpicGames], "https://epicgames.com");
        assert_eq!(links[&Store::Gog], "https://gog.com");

        assert!(collect_store_links(urls, LinkMatch::ProductPage).is_empty());
        assert_eq!(
            normalize_store_url("store.steampowered.com/bundle/777/"),
            Some((Store::Steam, "https://store.steampowered.com/bundle/777/".to_string()))
        );
    }

    #[test]
    fn test_find_urls_in_text() {
        let text = "Забирайте тут: https://store.steampowered.com/app/42. И ещё (https://www.gog.com/game/x)";
        assert_eq!(
            find_urls_in_text(text),
            vec!["https://store.steampowered.com/app/42", "https://www.gog.com/game/x"]
        );
    }
}
