//! The moderation engine: owns the registry and the queue, routes inbound
//! messages to the right handler, and drives cases through the state machine.
//!
//! All processing is serialized behind one engine instance; handlers take
//! `&mut self` and the server wraps the engine in a mutex. Registry state
//! therefore never sees concurrent mutation, and each webhook delivery is
//! processed to quiescence before the next begins.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tracing::{debug, info};

use modbot_core::{ChannelId, ContentRef, UserId, APPEAL_KEYWORD, HELP_KEYWORD, START_KEYWORD};

use crate::case::{Case, CaseId, CaseState};
use crate::config::{Config, UnmatchedTicketPolicy};
use crate::dispatcher::ModQueue;
use crate::platform::{ChatPlatform, PlatformMessage};
use crate::registry::CaseRegistry;
use crate::scoring::Scorer;
use crate::state_machine::{execute_effects, transition, Event, InterpreterContext};

/// The engine's slice of the server configuration.
#[derive(Clone)]
pub struct EngineConfig {
    pub home_guild: modbot_core::GuildId,
    pub mod_channel: ChannelId,
    pub bot_user: UserId,
    pub auto_hide_threshold: f64,
    pub appeal_policy: UnmatchedTicketPolicy,
}

impl From<&Config> for EngineConfig {
    fn from(config: &Config) -> Self {
        Self {
            home_guild: config.home_guild,
            mod_channel: config.mod_channel,
            bot_user: config.bot_user,
            auto_hide_threshold: config.auto_hide_threshold,
            appeal_policy: config.appeal_policy,
        }
    }
}

pub struct Engine {
    pub(crate) registry: CaseRegistry,
    pub(crate) queue: ModQueue,
    pub(crate) platform: Arc<dyn ChatPlatform>,
    pub(crate) scorer: Arc<dyn Scorer>,
    pub(crate) config: EngineConfig,
}

impl Engine {
    pub fn new(
        platform: Arc<dyn ChatPlatform>,
        scorer: Arc<dyn Scorer>,
        config: EngineConfig,
    ) -> Self {
        Self {
            registry: CaseRegistry::new(),
            queue: ModQueue::new(),
            platform,
            scorer,
            config,
        }
    }

    /// Drive one case through the state machine until quiescent: transition,
    /// execute effects, feed result events back in, repeat.
    ///
    /// On a collaborator failure the case is checked back in unchanged in
    /// state, so the reporter's next message retries the failed step.
    pub async fn run_case(&mut self, id: CaseId, event: Event) -> Result<()> {
        let Some(mut case) = self.registry.take(id) else {
            debug!(case = %id, "event for unknown case dropped");
            return Ok(());
        };

        let ctx = InterpreterContext {
            platform: self.platform.as_ref(),
            scorer: self.scorer.as_ref(),
            dm_channel: case.dm_channel,
            mod_channel: self.config.mod_channel,
            auto_hide_threshold: self.config.auto_hide_threshold,
        };

        let mut pending = vec![event];
        while let Some(event) = pending.pop() {
            debug!(case = %case.id, state = ?case.state, event = %event.log_summary(), "transition");
            let result = transition(case, event);
            case = result.case;

            match execute_effects(&ctx, result.effects).await {
                Ok(mut events) => {
                    // Preserve effect order across the stack.
                    events.reverse();
                    pending.extend(events);
                }
                Err(error) => {
                    self.registry.put_back(case);
                    return Err(error);
                }
            }
        }

        if case.state.is_terminal() {
            // Only cancellation completes a case inside the dialogue loop.
            // A cancelled case is discarded outright: it was never moderated,
            // so it must not show up in appeal-ticket history either.
            debug!(case = %case.id, "dialogue cancelled, case discarded");
        } else {
            self.registry.put_back(case);
        }
        Ok(())
    }

    /// Handle a message the bot received in a DM.
    ///
    /// Routing: an open dialogue gets the message as its next event; the
    /// start and appeal keywords open a dialogue; anything else gets a usage
    /// hint.
    pub async fn handle_direct_message(
        &mut self,
        user: UserId,
        user_name: &str,
        dm_channel: ChannelId,
        text: &str,
    ) -> Result<()> {
        if let Some(id) = self.registry.dialogue_case_for(user) {
            let event = self.dialogue_event(id, text);
            return self.run_case(id, event).await;
        }

        match text.trim() {
            t if t == START_KEYWORD => {
                let case = Case::new_report(user, user_name, dm_channel, Utc::now());
                info!(case = %case.id, reporter = %user, "report dialogue opened");
                let id = self.registry.insert(case);
                self.run_case(id, Event::UserMessage { text: text.to_string() })
                    .await
            }
            t if t == APPEAL_KEYWORD => {
                let case = Case::new_appeal(user, user_name, dm_channel, Utc::now());
                info!(case = %case.id, reporter = %user, "appeal dialogue opened");
                let id = self.registry.insert(case);
                self.run_case(id, Event::UserMessage { text: text.to_string() })
                    .await
            }
            // `help` and anything unrecognized both get the usage hint.
            _ => {
                self.platform
                    .send_message(dm_channel, &crate::state_machine::dialogue_help())
                    .await?;
                Ok(())
            }
        }
    }

    /// Turn a dialogue message into the right event for the case's state.
    ///
    /// The ticket step needs registry access (ticket parse plus history
    /// lookup), which the pure transition function cannot do, so the event
    /// is pre-resolved here. Keywords still go through as plain messages.
    fn dialogue_event(&self, id: CaseId, text: &str) -> Event {
        let at_ticket_step = self
            .registry
            .get(id)
            .is_some_and(|c| c.state == CaseState::AwaitingTicket);
        let trimmed = text.trim();
        let is_keyword = trimmed == modbot_core::CANCEL_KEYWORD || trimmed == HELP_KEYWORD;

        if at_ticket_step && !is_keyword {
            let parsed = ContentRef::parse(text);
            let history = parsed.and_then(|content| self.registry.find_history(&content));
            Event::TicketSubmitted {
                parsed,
                history,
                policy: self.config.appeal_policy,
            }
        } else {
            Event::UserMessage {
                text: text.to_string(),
            }
        }
    }

    /// Inspect a message observed in a monitored guild channel and open an
    /// auto-generated case when its severity meets the threshold.
    pub async fn observe_channel_message(&mut self, message: PlatformMessage) -> Result<()> {
        if message.guild != self.config.home_guild {
            return Ok(());
        }
        let score = self.scorer.score(&message.content).await?;
        if score.severity < self.config.auto_hide_threshold {
            return Ok(());
        }

        let content = message.content_ref();
        if self.registry.has_active_case_for(&content) {
            debug!(ticket = %content, "auto-report skipped, case already open");
            return Ok(());
        }

        info!(ticket = %content, severity = score.severity, "auto-reporting message");
        self.platform.flag_message(content).await?;

        let target = crate::case::ResolvedTarget {
            content,
            author: message.author,
            author_name: message.author_name,
            text: message.content,
        };
        let case = Case::new_auto(
            self.config.bot_user,
            "automod",
            target,
            score.severity,
            Utc::now(),
        );
        let mod_message = self
            .platform
            .send_message(self.config.mod_channel, &case.summary())
            .await?;
        let id = self.registry.insert(case);
        self.registry.set_mod_message(id, mod_message);
        Ok(())
    }

    /// Handle a message posted in the moderation channel.
    ///
    /// A reply to a case's summary message is a decision on that case; the
    /// `next` and `help` keywords drive the queue; everything else is
    /// ordinary channel chatter and is ignored.
    pub async fn handle_mod_message(
        &mut self,
        text: &str,
        reply_to: Option<modbot_core::MessageId>,
    ) -> Result<()> {
        if let Some(reply_to) = reply_to {
            return self.moderation_reply(reply_to, text).await;
        }

        match text.trim() {
            "next" => self.moderation_next().await,
            t if t == HELP_KEYWORD => {
                self.platform
                    .send_message(self.config.mod_channel, &modbot_core::moderator_help())
                    .await?;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Read access to the registry, for status surfaces and tests.
    pub fn registry(&self) -> &CaseRegistry {
        &self.registry
    }
}
