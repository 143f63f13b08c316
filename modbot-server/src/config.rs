use anyhow::{bail, Context, Result};
use std::env;

use modbot_core::{ChannelId, GuildId, UserId};

/// What to do when an appeal ticket matches no known case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmatchedTicketPolicy {
    /// Continue the appeal with no carried-over severity or actions.
    Proceed,
    /// Re-prompt at the ticket step until a known ticket (or cancel).
    Reject,
}

#[derive(Clone)]
pub struct Config {
    pub platform_api_base: String,
    pub platform_token: String,
    pub scoring_api_base: String,
    pub scoring_api_key: String,
    pub webhook_secret: String,
    pub port: u16,
    /// The guild the bot serves; messages observed in other guilds are not
    /// scanned.
    pub home_guild: GuildId,
    /// The moderation channel cases are posted into and commands read from.
    pub mod_channel: ChannelId,
    /// The bot's own user id: ignored as a message author, and the reporter
    /// identity on auto-generated cases.
    pub bot_user: UserId,
    /// Severity at or above which observed content is provisionally hidden
    /// and auto-reported.
    pub auto_hide_threshold: f64,
    pub appeal_policy: UnmatchedTicketPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let platform_api_base = env::var("PLATFORM_API_BASE")
            .context("PLATFORM_API_BASE environment variable is required")?;

        let platform_token = env::var("PLATFORM_TOKEN")
            .context("PLATFORM_TOKEN environment variable is required")?;

        let scoring_api_base = env::var("SCORING_API_BASE")
            .unwrap_or_else(|_| "https://commentanalyzer.googleapis.com".to_string());

        let scoring_api_key = env::var("SCORING_API_KEY")
            .context("SCORING_API_KEY environment variable is required")?;

        let webhook_secret = env::var("WEBHOOK_SECRET")
            .context("WEBHOOK_SECRET environment variable is required")?;

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .context("PORT must be a valid number")?;

        let home_guild = env::var("HOME_GUILD_ID")
            .context("HOME_GUILD_ID environment variable is required")?
            .parse::<u64>()
            .map(GuildId)
            .context("HOME_GUILD_ID must be a valid number")?;

        let mod_channel = env::var("MOD_CHANNEL_ID")
            .context("MOD_CHANNEL_ID environment variable is required")?
            .parse::<u64>()
            .map(ChannelId)
            .context("MOD_CHANNEL_ID must be a valid number")?;

        let bot_user = env::var("BOT_USER_ID")
            .context("BOT_USER_ID environment variable is required")?
            .parse::<u64>()
            .map(UserId)
            .context("BOT_USER_ID must be a valid number")?;

        let auto_hide_threshold = parse_threshold(env::var("AUTO_HIDE_THRESHOLD").ok())?;
        let appeal_policy = parse_appeal_policy(env::var("APPEAL_UNMATCHED_POLICY").ok())?;

        Ok(Config {
            platform_api_base,
            platform_token,
            scoring_api_base,
            scoring_api_key,
            webhook_secret,
            port,
            home_guild,
            mod_channel,
            bot_user,
            auto_hide_threshold,
            appeal_policy,
        })
    }
}

/// Parse AUTO_HIDE_THRESHOLD from an optional string value.
/// Defaults to 0.8; must land in [0, 1].
pub fn parse_threshold(value: Option<String>) -> Result<f64> {
    let threshold = match value {
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .context("AUTO_HIDE_THRESHOLD must be a valid number")?,
        None => 0.8,
    };
    if !(0.0..=1.0).contains(&threshold) {
        bail!("AUTO_HIDE_THRESHOLD must be between 0 and 1");
    }
    Ok(threshold)
}

/// Parse APPEAL_UNMATCHED_POLICY from an optional string value.
/// Defaults to `proceed`, which matches the historical behavior of
/// continuing an appeal with empty carried-over history.
pub fn parse_appeal_policy(value: Option<String>) -> Result<UnmatchedTicketPolicy> {
    match value.as_deref().map(str::trim) {
        None | Some("") | Some("proceed") => Ok(UnmatchedTicketPolicy::Proceed),
        Some("reject") => Ok(UnmatchedTicketPolicy::Reject),
        Some(other) => bail!(
            "APPEAL_UNMATCHED_POLICY must be `proceed` or `reject`, got `{}`",
            other
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_threshold_default() {
        assert_eq!(parse_threshold(None).unwrap(), 0.8);
    }

    #[test]
    fn test_parse_threshold_valid() {
        assert_eq!(parse_threshold(Some("0.5".to_string())).unwrap(), 0.5);
        assert_eq!(parse_threshold(Some("1".to_string())).unwrap(), 1.0);
        assert_eq!(parse_threshold(Some("0".to_string())).unwrap(), 0.0);
    }

    #[test]
    fn test_parse_threshold_rejects_out_of_range() {
        assert!(parse_threshold(Some("1.5".to_string())).is_err());
        assert!(parse_threshold(Some("-0.1".to_string())).is_err());
        assert!(parse_threshold(Some("high".to_string())).is_err());
    }

    #[test]
    fn test_parse_appeal_policy_default_and_values() {
        assert_eq!(
            parse_appeal_policy(None).unwrap(),
            UnmatchedTicketPolicy::Proceed
        );
        assert_eq!(
            parse_appeal_policy(Some("proceed".to_string())).unwrap(),
            UnmatchedTicketPolicy::Proceed
        );
        assert_eq!(
            parse_appeal_policy(Some("reject".to_string())).unwrap(),
            UnmatchedTicketPolicy::Reject
        );
    }

    #[test]
    fn test_parse_appeal_policy_rejects_unknown() {
        assert!(parse_appeal_policy(Some("maybe".to_string())).is_err());
    }
}
