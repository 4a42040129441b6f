use chrono::{TimeZone, Utc};
use games_news_bot::scrapers::{SourceKind, Store};

const VGTIMES_URL: &str = "https://vgtimes.ru/free/";
const PIKABU_URL: &str = "https://pikabu.ru/community/steam";

const VGTIMES_LISTING: &str = r#"
<html><body>
<ul class="list-items">
  <li>
    <div class="image_wrap type0"><img src="/templates/lazy.gif" data-src="/uploads/posts/2025-04/mechabellum.webp"></div>
    <div class="item-name type0"><a href="/free/123799-mechabellum.html">Mechabellum бесплатно в Steam</a></div>
    <div class="date">5 апреля 2025, 23:22</div>
    <div class="rrating"><div class="text">42</div></div>
    <a class="l_ks" target="_blank" href="https://store.steampowered.com/app/669330/Mechabellum/?utm_source=vgtimes">Steam</a>
  </li>
  <li>
    <div class="image_wrap type0"><img src="//vgtimes.ru/uploads/posts/2025-04/wildcat.jpg"></div>
    <div class="item-name type0"><a href="https://vgtimes.ru/free/123800-wildcat-gun-machine.html">Wildcat Gun Machine в EGS</a></div>
    <a class="l_ks" target="_blank" href="https://store.epicgames.com/ru/p/wildcat-gun-machine">EGS</a>
    <a class="l_ks" target="_blank" href="https://store.epicgames.com/ru/p/other-game">EGS mirror</a>
  </li>
  <li>
    <div class="item-name type0"><a href="/free/123801-gog-giveaway.html">GOG раздаёт классику</a></div>
    <div class="rrating"><div class="text">-</div></div>
    <a class="l_ks" target="_blank" href="https://www.gog.com/en/game/some_classic">GOG</a>
  </li>
</ul>
</body></html>
"#;

const VGTIMES_BROKEN_ITEMS: &str = r#"
<ul class="list-items">
  <li><div class="item-name type0"><span>Без ссылки</span></div></li>
  <li><div class="item-name type0"><a href="/free/123802-empty.html">  </a></div></li>
  <li><div class="item-name type0"><a href="/free/about.html">О разделе</a></div></li>
  <li><div class="item-name type0"><a href="/free/123803-survivor.html">Survivor</a></div></li>
</ul>
"#;

const VGTIMES_ARTICLE: &str = r#"
<html><head>
<script type="application/ld+json">{"@type": "Organization", "name": "VGTimes"}</script>
<script type="application/ld+json">{"@type": "NewsArticle", "datePublished": "2025-04-0523:22:00+03:00MSK"}</script>
</head><body>
<div class="article_text">
  <p>В Steam стартовала раздача.</p>
  <script>trackView();</script>
  <p>Забрать игру можно до 10 апреля.</p>
  <a class="l_ks" target="_blank" href="https://store.steampowered.com/app/669330/?snr=1_4">Steam</a>
</div>
</body></html>
"#;

const PIKABU_LISTING: &str = r#"
<html><body>
<article class="story" data-story-id="12623145">
  <h2 class="story__title"><a class="story__title-link" href="https://pikabu.ru/story/razdacha_12623145">Раздача в Steam</a></h2>
  <div class="story__rating-count">128</div>
  <time class="story__datetime" datetime="2025-04-05T23:22:00+03:00">вчера</time>
  <div class="story__content">
    <p>Забираем тут: https://store.steampowered.com/app/1234/Free_Game/ и радуемся.</p>
    <p><a href="https://www.gog.com/game/another_one?pp=1">GOG</a></p>
    <div class="story-block story-block_type_image">
      <img class="story-image__image" src="https://cs.pikabu.ru/post_img/2025/04/05/1.png">
    </div>
    <img src="https://cs.pikabu.ru/images/avatars/42.jpg">
    <img data-src="https://cs.pikabu.ru/post_img/2025/04/05/2.jpg">
  </div>
</article>
<article class="story" data-story-id="">
  <h2 class="story__title"><a class="story__title-link" href="/story/no_id">Без id</a></h2>
</article>
<article class="story" data-story-id="12623146">
  <div class="story__content"><p>Пост без заголовка</p></div>
</article>
</body></html>
"#;

#[test]
fn test_vgtimes_listing_extracts_every_item() {
    let extraction = SourceKind::VgTimes
        .extract(VGTIMES_LISTING, VGTIMES_URL, 4000)
        .unwrap();

    assert_eq!(extraction.skipped, 0);
    assert_eq!(extraction.articles.len(), 3);

    let first = &extraction.articles[0];
    assert_eq!(first.id, "vgtimes:123799");
    assert_eq!(first.source, SourceKind::VgTimes);
    assert_eq!(first.title, "Mechabellum бесплатно в Steam");
    assert_eq!(first.url, "https://vgtimes.ru/free/123799-mechabellum.html");
    assert_eq!(
        first.published_at,
        Some(Utc.with_ymd_and_hms(2025, 4, 5, 20, 22, 0).unwrap())
    );
    assert_eq!(first.rating.as_deref(), Some("42"));
    assert_eq!(
        first.store_links.get(&Store::Steam).map(String::as_str),
        Some("https://store.steampowered.com/app/669330/Mechabellum/")
    );
    assert_eq!(
        first.images,
        vec!["https://vgtimes.ru/uploads/posts/2025-04/mechabellum.webp".to_string()]
    );

    let second = &extraction.articles[1];
    assert_eq!(second.id, "vgtimes:123800");
    assert!(second.published_at.is_none());
    assert_eq!(second.images, vec!["https://vgtimes.ru/uploads/posts/2025-04/wildcat.jpg".to_string()]);
    assert_eq!(second.store_links.len(), 1);
    assert_eq!(
        second.store_links.get(&Store::EpicGames).map(String::as_str),
        Some("https://store.epicgames.com/ru/p/wildcat-gun-machine")
    );

    let third = &extraction.articles[2];
    assert_eq!(third.id, "vgtimes:123801");
    assert!(third.rating.is_none());
    assert!(third.images.is_empty());
    assert!(third.store_links.contains_key(&Store::Gog));
}

#[test]
fn test_vgtimes_keeps_package_and_storefront_links() {
    let html = r#"
<ul class="list-items">
  <li>
    <div class="item-name type0"><a href="/free/123810-bundle.html">Набор в Steam и EGS</a></div>
    <a class="l_ks" target="_blank" href="https://store.steampowered.com/sub/12345/?snr=1_5_9">Steam</a>
    <a class="l_ks" target="_blank" href="https://epicgames.com">EGS</a>
    <a class="l_ks" target="_blank" href="https://vgtimes.ru/games/">VGTimes</a>
  </li>
</ul>
"#;
    let extraction = SourceKind::VgTimes.extract(html, VGTIMES_URL, 4000).unwrap();

    let item = &extraction.articles[0];
    assert_eq!(item.store_links.len(), 2);
    assert_eq!(
        item.store_links.get(&Store::Steam).map(String::as_str),
        Some("https://store.steampowered.com/sub/12345/")
    );
    assert_eq!(
        item.store_links.get(&Store::EpicGames).map(String::as_str),
        Some("https://epicgames.com")
    );
}

#[test]
fn test_vgtimes_incomplete_items_are_skipped() {
    let extraction = SourceKind::VgTimes
        .extract(VGTIMES_BROKEN_ITEMS, VGTIMES_URL, 4000)
        .unwrap();

    assert_eq!(extraction.skipped, 3);
    assert_eq!(extraction.articles.len(), 1);
    assert_eq!(extraction.articles[0].id, "vgtimes:123803");
    assert_eq!(extraction.articles[0].title, "Survivor");
}

#[test]
fn test_extraction_is_deterministic() {
    let first = SourceKind::VgTimes.extract(VGTIMES_LISTING, VGTIMES_URL, 4000).unwrap();
    let second = SourceKind::VgTimes.extract(VGTIMES_LISTING, VGTIMES_URL, 4000).unwrap();
    assert_eq!(first, second);

    let first = SourceKind::Pikabu.extract(PIKABU_LISTING, PIKABU_URL, 4000).unwrap();
    let second = SourceKind::Pikabu.extract(PIKABU_LISTING, PIKABU_URL, 4000).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_page_without_items_yields_nothing() {
    let extraction = SourceKind::VgTimes
        .extract("<html><body><p>Технические работы</p></body></html>", VGTIMES_URL, 4000)
        .unwrap();
    assert!(extraction.articles.is_empty());
    assert_eq!(extraction.skipped, 0);
}

#[test]
fn test_invalid_base_url_is_an_extraction_error() {
    assert!(SourceKind::VgTimes.extract(VGTIMES_LISTING, "not a url", 4000).is_err());
}

#[test]
fn test_pikabu_listing() {
    let extraction = SourceKind::Pikabu
        .extract(PIKABU_LISTING, PIKABU_URL, 4000)
        .unwrap();

    assert_eq!(extraction.articles.len(), 1);
    assert_eq!(extraction.skipped, 2);

    let story = &extraction.articles[0];
    assert_eq!(story.id, "pikabu:12623145");
    assert_eq!(story.title, "Раздача в Steam");
    assert_eq!(story.url, "https://pikabu.ru/story/razdacha_12623145");
    assert_eq!(story.rating.as_deref(), Some("128"));
    assert_eq!(
        story.published_at,
        Some(Utc.with_ymd_and_hms(2025, 4, 5, 20, 22, 0).unwrap())
    );
    assert!(story.summary.starts_with("Забираем тут:"));
    assert_eq!(
        story.store_links.get(&Store::Steam).map(String::as_str),
        Some("https://store.steampowered.com/app/1234/Free_Game/")
    );
    assert_eq!(
        story.store_links.get(&Store::Gog).map(String::as_str),
        Some("https://www.gog.com/game/another_one")
    );
    assert_eq!(
        story.images,
        vec![
            "https://cs.pikabu.ru/post_img/2025/04/05/1.png".to_string(),
            "https://cs.pikabu.ru/post_img/2025/04/05/2.jpg".to_string(),
        ]
    );
}

#[test]
fn test_summary_respects_max_text_length() {
    let extraction = SourceKind::Pikabu.extract(PIKABU_LISTING, PIKABU_URL, 20).unwrap();
    let summary = &extraction.articles[0].summary;
    assert!(summary.ends_with("..."));
    assert!(summary.chars().count() <= 23);
}

#[test]
fn test_vgtimes_article_page() {
    let detail = SourceKind::VgTimes.extract_detail(VGTIMES_ARTICLE, 4000).unwrap();

    assert_eq!(
        detail.body.as_deref(),
        Some("В Steam стартовала раздача. Забрать игру можно до 10 апреля. Steam")
    );
    assert_eq!(
        detail.published_at,
        Some(Utc.with_ymd_and_hms(2025, 4, 5, 20, 22, 0).unwrap())
    );
    assert_eq!(
        detail.store_links.get(&Store::Steam).map(String::as_str),
        Some("https://store.steampowered.com/app/669330/")
    );
}

#[test]
fn test_article_page_completes_listing_item() {
    let extraction = SourceKind::VgTimes.extract(VGTIMES_LISTING, VGTIMES_URL, 4000).unwrap();
    let listing = &extraction.articles[1];
    let detail = SourceKind::VgTimes.extract_detail(VGTIMES_ARTICLE, 4000).unwrap();

    let complete = listing.with_detail(detail);

    assert_eq!(complete.id, listing.id);
    assert!(complete.summary.starts_with("В Steam стартовала раздача."));
    assert!(complete.published_at.is_some());
    assert!(complete.store_links.contains_key(&Store::EpicGames));
    assert!(complete.store_links.contains_key(&Store::Steam));
}

#[test]
fn test_pikabu_needs_no_article_page() {
    assert!(!SourceKind::Pikabu.needs_detail());
    let detail = SourceKind::Pikabu.extract_detail("<html></html>", 4000).unwrap();
    assert!(detail.body.is_none());
}
