pub mod delivery;
pub mod formatter;

use teloxide::types::{ChatId, Recipient};

/// Turns a configured channel (`@name` or numeric id) into a recipient.
pub fn parse_recipient(channel: &str) -> Recipient {
    let channel = channel.trim();
    match channel.parse::<i64>() {
        Ok(id) => Recipient::Id(ChatId(id)),
        Err(_) if channel.starts_with('@') => Recipient::ChannelUsername(channel.to_string()),
        Err(_) => Recipient::ChannelUsername(format!("@{}", channel)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recipient() {
        assert_eq!(parse_recipient("-1001234567890"), Recipient::Id(ChatId(-1001234567890)));
        assert_eq!(
            parse_recipient("@free_games"),
            Recipient::ChannelUsername("@free_games".to_string())
        );
        assert_eq!(
            parse_recipient("free_games"),
            Recipient::ChannelUsername("@free_games".to_string())
        );
    }
}
