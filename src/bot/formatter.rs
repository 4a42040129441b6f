use crate::scrapers::Article;
use crate::utils::datetime::format_datetime;
use crate::utils::markdown::{escape_markdown, link};
use crate::utils::text::truncate_chars;

/// Summary length shown in a channel post.
pub const SUMMARY_PREVIEW_CHARS: usize = 500;
/// Telegram limit for photo captions.
pub const MAX_CAPTION_CHARS: usize = 1024;
/// Telegram limit for text messages.
pub const MAX_MESSAGE_CHARS: usize = 4096;

const MAX_TITLE_CHARS: usize = 200;

/// Renders an article as a MarkdownV2 post of at most `limit` characters.
pub fn format_message(article: &Article, limit: usize) -> String {
    let mut lines = vec![format!(
        "🎮 {}",
        link(&truncate_chars(&article.title, MAX_TITLE_CHARS), &article.url)
    )];

    if !article.store_links.is_empty() {
        let stores: Vec<String> = article
            .store_links
            .iter()
            .map(|(store, url)| link(store.name(), url))
            .collect();
        lines.push(format!("🛒 {}", stores.join(" \\| ")));
    }
    if let Some(date) = &article.published_at {
        lines.push(format!("📅 {}", escape_markdown(&format_datetime(date))));
    }
    if let Some(rating) = article.rating.as_deref().filter(|r| !r.is_empty() && *r != "0") {
        lines.push(format!("📊 ⭐ {}", escape_markdown(rating)));
    }

    let header = lines.join("\n");
    let summary = article.summary.trim();
    if summary.is_empty() {
        return header;
    }

    let budget = limit.saturating_sub(header.chars().count() + 2);
    let mut preview_len = SUMMARY_PREVIEW_CHARS.min(budget);
    loop {
        let preview = escape_markdown(&truncate_chars(summary, preview_len));
        if preview.chars().count() <= budget {
            return format!("{}\n\n{}", header, preview);
        }
        if preview_len == 0 {
            return header;
        }
        let overflow = preview.chars().count() - budget;
        preview_len = preview_len.saturating_sub(overflow.max(1));
    }
}
