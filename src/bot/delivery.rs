use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::RequestError;
use teloxide::types::{InputFile, InputMedia, InputMediaPhoto, ParseMode, Recipient};
use tracing::{debug, warn};
use url::Url;

use crate::bot::formatter::{format_message, MAX_CAPTION_CHARS, MAX_MESSAGE_CHARS};
use crate::error::DispatchError;
use crate::scrapers::Article;

/// Telegram accepts at most ten photos per media group.
pub const MAX_MEDIA_GROUP: usize = 10;

/// The messaging surface new articles are handed to.
#[async_trait]
pub trait Delivery: Send + Sync {
    async fn deliver(&self, audience: &Recipient, article: &Article) -> Result<(), DispatchError>;
}

/// Posts articles to a Telegram chat or channel.
#[derive(Clone)]
pub struct TelegramDelivery {
    bot: Bot,
}

impl TelegramDelivery {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Delivery for TelegramDelivery {
    async fn deliver(&self, audience: &Recipient, article: &Article) -> Result<(), DispatchError> {
        let images = photo_urls(article);

        if images.is_empty() {
            let text = format_message(article, MAX_MESSAGE_CHARS);
            self.bot
                .send_message(audience.clone(), text)
                .parse_mode(ParseMode::MarkdownV2)
                .await
                .map_err(classify)?;
            return Ok(());
        }

        let caption = format_message(article, MAX_CAPTION_CHARS);
        debug!("Sending {} with {} photo(s)", article.id, images.len());
        let media: Vec<InputMedia> = images
            .into_iter()
            .enumerate()
            .map(|(i, url)| {
                let photo = InputMediaPhoto::new(InputFile::url(url));
                let photo = if i == 0 {
                    photo.caption(caption.clone()).parse_mode(ParseMode::MarkdownV2)
                } else {
                    photo
                };
                InputMedia::Photo(photo)
            })
            .collect();

        self.bot
            .send_media_group(audience.clone(), media)
            .await
            .map_err(classify)?;
        Ok(())
    }
}

/// Telegram answering with an API error means the post itself was refused.
fn classify(err: RequestError) -> DispatchError {
    match err {
        RequestError::Api(api) => DispatchError::Rejected(api.to_string()),
        other => DispatchError::Telegram(other),
    }
}

/// Image URLs Telegram can fetch itself, capped to one media group.
pub fn photo_urls(article: &Article) -> Vec<Url> {
    article
        .images
        .iter()
        .filter_map(|raw| match Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url),
            _ => {
                warn!("Skipping invalid image URL {} for {}", raw, article.id);
                None
            }
        })
        .take(MAX_MEDIA_GROUP)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::SourceKind;
    use std::collections::BTreeMap;

    #[test]
    fn test_photo_urls_filters_and_caps() {
        let mut images: Vec<String> = (0..12)
            .map(|i| format!("https://cs.pikabu.ru/post_img/{}.jpg", i))
            .collect();
        images.insert(0, "not a url".to_string());
        images.insert(1, "ftp://example.com/a.jpg".to_string());
        let article = Article {
            id: "pikabu:1".to_string(),
            source: SourceKind::Pikabu,
            title: "t".to_string(),
            url: "https://pikabu.ru/story/t_1".to_string(),
            published_at: None,
            summary: String::new(),
            rating: None,
            store_links: BTreeMap::new(),
            images,
        };
        let urls = photo_urls(&article);
        assert_eq!(urls.len(), MAX_MEDIA_GROUP);
        assert_eq!(urls[0].as_str(), "https://cs.pikabu.ru/post_img/0.jpg");
    }
}
