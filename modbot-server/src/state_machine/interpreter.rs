//! Effect interpreter.
//!
//! Executes the effects produced by a dialogue transition against the chat
//! platform and the scorer, returning any result events to feed back into
//! the transition function. Collaborator failures abort the current event:
//! the error propagates to the engine, which leaves the case where it was so
//! the reporter's next message retries the step.

use anyhow::Result;
use tracing::{debug, error, info, warn};

use modbot_core::ChannelId;

use super::effect::{Effect, LogLevel};
use super::event::Event;
use crate::platform::{ChatPlatform, Resolution};
use crate::scoring::Scorer;

/// Everything the interpreter needs to execute one case's effects.
pub struct InterpreterContext<'a> {
    pub platform: &'a dyn ChatPlatform,
    pub scorer: &'a dyn Scorer,
    /// The reporter's DM channel; `None` for auto-generated cases, whose
    /// transitions never produce replies.
    pub dm_channel: Option<ChannelId>,
    pub mod_channel: ChannelId,
    /// Severity at or above which a resolved target is flagged immediately.
    pub auto_hide_threshold: f64,
}

/// Execute a batch of effects in order, collecting result events.
pub async fn execute_effects(
    ctx: &InterpreterContext<'_>,
    effects: Vec<Effect>,
) -> Result<Vec<Event>> {
    let mut events = Vec::new();
    for effect in effects {
        if let Some(event) = execute_effect(ctx, effect).await? {
            events.push(event);
        }
    }
    Ok(events)
}

async fn execute_effect(ctx: &InterpreterContext<'_>, effect: Effect) -> Result<Option<Event>> {
    match effect {
        Effect::Reply { text } => {
            match ctx.dm_channel {
                Some(channel) => {
                    ctx.platform.send_message(channel, &text).await?;
                }
                None => {
                    warn!("dropping reply for case with no DM channel");
                }
            }
            Ok(None)
        }

        Effect::ResolveTarget { content } => {
            match ctx.platform.fetch_message(content).await? {
                Resolution::Found(message) => {
                    let score = ctx.scorer.score(&message.content).await?;
                    info!(
                        ticket = %content,
                        severity = score.severity,
                        "resolved reported message"
                    );
                    let target = crate::case::ResolvedTarget {
                        content: message.content_ref(),
                        author: message.author,
                        author_name: message.author_name,
                        text: message.content,
                    };
                    Ok(Some(Event::TargetResolved {
                        target,
                        severity: score.severity,
                        category: score.category,
                        subcategory: score.subcategory,
                        auto_hide: score.severity >= ctx.auto_hide_threshold,
                    }))
                }
                Resolution::NotFound(failure) => {
                    info!(ticket = %content, ?failure, "reported message did not resolve");
                    Ok(Some(Event::TargetResolveFailed { failure }))
                }
            }
        }

        Effect::FlagContent { content } => {
            ctx.platform.flag_message(content).await?;
            info!(ticket = %content, "flagged content pending review");
            Ok(None)
        }

        Effect::PostModSummary { summary } => {
            let mod_message = ctx.platform.send_message(ctx.mod_channel, &summary).await?;
            Ok(Some(Event::SummaryPosted { mod_message }))
        }

        Effect::Log { level, message } => {
            match level {
                LogLevel::Debug => debug!("{}", message),
                LogLevel::Info => info!("{}", message),
                LogLevel::Warn => warn!("{}", message),
                LogLevel::Error => error!("{}", message),
            }
            Ok(None)
        }
    }
}
