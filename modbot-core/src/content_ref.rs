//! Stable references to reported content.
//!
//! A reported message is identified by the `guild/channel/message` triple a
//! user obtains from "Copy Message Link". The same canonical form doubles as
//! the ticket number quoted in moderation notices and appeals.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::{ChannelId, GuildId, MessageId};

/// Opaque, stable identifier of a piece of reported content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentRef {
    pub guild: GuildId,
    pub channel: ChannelId,
    pub message: MessageId,
}

impl ContentRef {
    pub fn new(
        guild: impl Into<GuildId>,
        channel: impl Into<ChannelId>,
        message: impl Into<MessageId>,
    ) -> Self {
        Self {
            guild: guild.into(),
            channel: channel.into(),
            message: message.into(),
        }
    }

    /// Parse a content reference out of a pasted message link or a bare
    /// `guild/channel/message` ticket.
    ///
    /// The link format embeds three decimal path segments; anything before
    /// them (scheme, host, `/channels/` prefix) is ignored. The last three
    /// all-digit segments win, so a numeric-looking host does not confuse
    /// the parse.
    pub fn parse(text: &str) -> Option<Self> {
        let numeric: Vec<u64> = text
            .trim()
            .trim_end_matches('/')
            .split('/')
            .filter_map(|segment| {
                let segment = segment.trim();
                if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
                    segment.parse().ok()
                } else {
                    None
                }
            })
            .collect();

        match numeric.as_slice() {
            [.., guild, channel, message] => Some(Self::new(*guild, *channel, *message)),
            _ => None,
        }
    }

    /// The canonical ticket string for this content.
    pub fn ticket(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.guild, self.channel, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_message_link() {
        let parsed = ContentRef::parse("https://chat.example.com/channels/12345/67890/11111");
        assert_eq!(parsed, Some(ContentRef::new(12345, 67890, 11111)));
    }

    #[test]
    fn test_parse_bare_ticket() {
        let parsed = ContentRef::parse("12345/67890/11111");
        assert_eq!(parsed, Some(ContentRef::new(12345, 67890, 11111)));
    }

    #[test]
    fn test_parse_with_surrounding_whitespace_and_trailing_slash() {
        let parsed = ContentRef::parse("  12345/67890/11111/  ");
        assert_eq!(parsed, Some(ContentRef::new(12345, 67890, 11111)));
    }

    #[test]
    fn test_parse_rejects_too_few_components() {
        assert_eq!(ContentRef::parse("12345/67890"), None);
        assert_eq!(ContentRef::parse("12345"), None);
        assert_eq!(ContentRef::parse(""), None);
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        assert_eq!(ContentRef::parse("not a link at all"), None);
        assert_eq!(ContentRef::parse("a/b/c"), None);
    }

    #[test]
    fn test_parse_takes_last_three_numeric_segments() {
        // A host with digits in its path must not shift the triple.
        let parsed = ContentRef::parse("https://example.com/99/channels/1/2/3");
        assert_eq!(parsed, Some(ContentRef::new(1, 2, 3)));
    }

    #[test]
    fn test_ticket_round_trips_through_parse() {
        let content = ContentRef::new(12345, 67890, 11111);
        assert_eq!(ContentRef::parse(&content.ticket()), Some(content));
    }
}
