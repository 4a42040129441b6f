//! Telegram MarkdownV2 escaping.

/// Escapes markdown special characters for MarkdownV2 parsing mode
///
/// This function escapes all characters that have special meaning in Telegram's
/// MarkdownV2 format to ensure they are displayed as literal text.
///
/// # Arguments
/// * `text` - The text to escape
///
/// # Returns
/// A string with all markdown special characters escaped with backslashes
///
/// # Example
/// ```
/// use games_news_bot::utils::markdown::escape_markdown;
///
/// let text = "Free *game* (Steam)";
/// let escaped = escape_markdown(text);
/// assert_eq!(escaped, "Free \\*game\\* \\(Steam\\)");
/// ```
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        if matches!(
            c,
            '\\' | '_' | '*' | '[' | ']' | '(' | ')' | '~' | '`' | '>' | '#' | '+' | '-' | '='
                | '|' | '{' | '}' | '.' | '!'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escapes the URL part of an inline link, where only `)` and `\` are special.
pub fn escape_link_url(url: &str) -> String {
    url.replace('\\', "\\\\").replace(')', "\\)")
}

/// Builds an inline `[text](url)` link with both parts escaped.
pub fn link(text: &str, url: &str) -> String {
    format!("[{}]({})", escape_markdown(text), escape_link_url(url))
}
