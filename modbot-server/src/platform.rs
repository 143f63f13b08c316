//! Chat-platform collaborator.
//!
//! The engine talks to the platform only through the [`ChatPlatform`] trait:
//! resolve a reported reference to its message, send channel messages and
//! DMs, and set/clear the lightweight review flag on a message. The HTTP
//! implementation maps the platform's 404s onto the typed not-found outcomes
//! the dialogue needs for its distinct retry prompts.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use modbot_core::{ChannelId, ContentRef, GuildId, MessageId, UserId};

/// Why a pasted content reference could not be resolved.
///
/// Each variant produces its own retry prompt in the reporting dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveFailure {
    /// The bot is not in the referenced guild (or it does not exist).
    UnknownGuild,
    /// The channel was deleted or never existed.
    UnknownChannel,
    /// The message was deleted or never existed.
    UnknownMessage,
}

/// Outcome of resolving a content reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found(PlatformMessage),
    NotFound(ResolveFailure),
}

/// A message fetched from the chat platform.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformMessage {
    pub id: MessageId,
    pub channel: ChannelId,
    pub guild: GuildId,
    pub author: UserId,
    pub author_name: String,
    pub content: String,
}

impl PlatformMessage {
    pub fn content_ref(&self) -> ContentRef {
        ContentRef {
            guild: self.guild,
            channel: self.channel,
            message: self.id,
        }
    }
}

/// The platform operations this bot needs.
///
/// All operations are fallible; transport failures surface as errors and
/// abort the current event, while "not found" is a regular outcome.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Resolve a (guild, channel, message) triple to the underlying message.
    async fn fetch_message(&self, content: ContentRef) -> Result<Resolution>;

    /// Post a message to a channel, returning the posted message's id.
    async fn send_message(&self, channel: ChannelId, text: &str) -> Result<MessageId>;

    /// Send a direct message to a user.
    async fn send_direct_message(&self, user: UserId, text: &str) -> Result<()>;

    /// Mark a message with the provisional under-review flag.
    async fn flag_message(&self, content: ContentRef) -> Result<()>;

    /// Clear any review flag from a message.
    async fn unflag_message(&self, content: ContentRef) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct ChannelResponse {
    id: u64,
    guild_id: u64,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    id: u64,
    content: String,
    author: MessageAuthor,
}

#[derive(Debug, Deserialize)]
struct MessageAuthor {
    id: u64,
    username: String,
}

/// REST client for the chat platform, authenticated with a bot token.
#[derive(Clone)]
pub struct HttpPlatform {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpPlatform {
    pub fn new(base_url: String, token: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build platform HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response> {
        self.client
            .get(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| anyhow!("platform request failed: {}", e))
    }
}

#[async_trait]
impl ChatPlatform for HttpPlatform {
    async fn fetch_message(&self, content: ContentRef) -> Result<Resolution> {
        // Mirror the dialogue's resolution order so each failure mode maps
        // to its own prompt: guild, then channel, then message.
        let guild_resp = self.get(&format!("/guilds/{}", content.guild)).await?;
        if guild_resp.status() == StatusCode::NOT_FOUND {
            return Ok(Resolution::NotFound(ResolveFailure::UnknownGuild));
        }
        if !guild_resp.status().is_success() {
            return Err(anyhow!(
                "platform API error fetching guild: {}",
                guild_resp.status()
            ));
        }

        let channel_resp = self.get(&format!("/channels/{}", content.channel)).await?;
        if channel_resp.status() == StatusCode::NOT_FOUND {
            return Ok(Resolution::NotFound(ResolveFailure::UnknownChannel));
        }
        if !channel_resp.status().is_success() {
            return Err(anyhow!(
                "platform API error fetching channel: {}",
                channel_resp.status()
            ));
        }
        let channel: ChannelResponse = channel_resp.json().await?;
        if channel.guild_id != content.guild.0 {
            // Channel exists but not under the referenced guild.
            return Ok(Resolution::NotFound(ResolveFailure::UnknownChannel));
        }

        let message_resp = self
            .get(&format!(
                "/channels/{}/messages/{}",
                content.channel, content.message
            ))
            .await?;
        if message_resp.status() == StatusCode::NOT_FOUND {
            return Ok(Resolution::NotFound(ResolveFailure::UnknownMessage));
        }
        if !message_resp.status().is_success() {
            return Err(anyhow!(
                "platform API error fetching message: {}",
                message_resp.status()
            ));
        }
        let message: MessageResponse = message_resp.json().await?;

        Ok(Resolution::Found(PlatformMessage {
            id: MessageId(message.id),
            channel: ChannelId(channel.id),
            guild: content.guild,
            author: UserId(message.author.id),
            author_name: message.author.username,
            content: message.content,
        }))
    }

    async fn send_message(&self, channel: ChannelId, text: &str) -> Result<MessageId> {
        let response = self
            .client
            .post(self.url(&format!("/channels/{}/messages", channel)))
            .bearer_auth(&self.token)
            .json(&SendMessageRequest { content: text })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "platform API error sending message: {} - {}",
                status,
                error_text
            ));
        }

        let posted: SendMessageResponse = response.json().await?;
        Ok(MessageId(posted.id))
    }

    async fn send_direct_message(&self, user: UserId, text: &str) -> Result<()> {
        let response = self
            .client
            .post(self.url(&format!("/users/{}/messages", user)))
            .bearer_auth(&self.token)
            .json(&SendMessageRequest { content: text })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "platform API error sending DM: {} - {}",
                status,
                error_text
            ));
        }

        Ok(())
    }

    async fn flag_message(&self, content: ContentRef) -> Result<()> {
        let response = self
            .client
            .put(self.url(&format!(
                "/channels/{}/messages/{}/flags/review",
                content.channel, content.message
            )))
            .bearer_auth(&self.token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "platform API error flagging message: {}",
                response.status()
            ));
        }
        Ok(())
    }

    async fn unflag_message(&self, content: ContentRef) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!(
                "/channels/{}/messages/{}/flags/review",
                content.channel, content.message
            )))
            .bearer_auth(&self.token)
            .send()
            .await?;

        // Clearing a flag that was never set is fine.
        if !response.status().is_success() && response.status() != StatusCode::NOT_FOUND {
            return Err(anyhow!(
                "platform API error unflagging message: {}",
                response.status()
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_construction_normalizes_base_url() {
        let platform =
            HttpPlatform::new("https://chat.example.com/".to_string(), "token".to_string())
                .unwrap();
        assert_eq!(platform.base_url, "https://chat.example.com");
    }
}
