//! The moderation queue: surfacing cases to moderators and applying their
//! decisions.
//!
//! Moderators work the queue from the moderation channel. `next` closes the
//! case currently on display and posts the highest-priority waiting case;
//! replying to a case's summary message records a decision on it. Priority
//! is recomputed from scratch on every `next`, so case age is always
//! current.

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::debug;

use modbot_core::{parse_decision, priority, Action, ContentRef, DecisionParse, MessageId};

use crate::case::{Case, CaseId};
use crate::engine::Engine;

/// Queue-side bookkeeping: which case the moderation channel is currently
/// showing. The case itself stays in the registry.
#[derive(Default)]
pub struct ModQueue {
    current: Option<(CaseId, ContentRef)>,
}

impl ModQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_current(&mut self, id: CaseId, content: ContentRef) {
        self.current = Some((id, content));
    }

    /// The case on display, if any.
    pub fn current(&self) -> Option<(CaseId, ContentRef)> {
        self.current
    }

    /// Clear and return the case on display, if any.
    pub fn take_current(&mut self) -> Option<(CaseId, ContentRef)> {
        self.current.take()
    }
}

/// One queue candidate with its priority snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueEntry {
    pub id: CaseId,
    pub content: ContentRef,
    pub priority: f64,
    pub created_at: DateTime<Utc>,
}

/// Hours elapsed since `created_at`, never negative.
fn age_hours(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    ((now - created_at).num_seconds().max(0) as f64) / 3600.0
}

/// Pick the entry to surface next: highest priority, oldest case on a tie.
///
/// Both comparisons are strict, so the selection is stable regardless of the
/// order entries were gathered in.
pub fn select_next(entries: &[QueueEntry]) -> Option<&QueueEntry> {
    let mut best: Option<&QueueEntry> = None;
    for entry in entries {
        let better = match best {
            None => true,
            Some(current) => {
                entry.priority > current.priority
                    || (entry.priority == current.priority
                        && entry.created_at < current.created_at)
            }
        };
        if better {
            best = Some(entry);
        }
    }
    best
}

impl Engine {
    /// Handle `next` in the moderation channel: close out the case on
    /// display, then surface the highest-priority waiting case.
    pub(crate) async fn moderation_next(&mut self) -> Result<()> {
        if let Some((_, content)) = self.queue.take_current() {
            self.close_case(content).await?;
        }

        let now = Utc::now();
        let entries: Vec<QueueEntry> = self
            .registry
            .awaiting_moderation()
            .filter_map(|case| {
                let content = case.target.as_ref()?.content;
                let duplicates = self.registry.duplicate_count(&content);
                Some(QueueEntry {
                    id: case.id,
                    content,
                    priority: priority(age_hours(case.created_at, now), case.severity, duplicates),
                    created_at: case.created_at,
                })
            })
            .collect();

        let Some(entry) = select_next(&entries).cloned() else {
            self.platform
                .send_message(self.config.mod_channel, "There are no reports to moderate")
                .await?;
            return Ok(());
        };

        let Some(summary) = self.registry.get(entry.id).map(Case::summary) else {
            return Ok(());
        };
        let mod_message = self
            .platform
            .send_message(self.config.mod_channel, &summary)
            .await?;
        self.registry.set_mod_message(entry.id, mod_message);
        self.queue.set_current(entry.id, entry.content);
        Ok(())
    }

    /// Handle a reply to a case's summary message: parse it as a decision
    /// and apply the actions.
    ///
    /// Only the case currently on display accepts decisions. Replies sent
    /// before any `next`, or referencing a summary the queue has moved past,
    /// are dropped so a decision always lands on one well-defined case.
    pub(crate) async fn moderation_reply(&mut self, reply_to: MessageId, text: &str) -> Result<()> {
        let Some((id, _)) = self.queue.current() else {
            debug!(message = %reply_to, "moderator reply dropped, no case on display");
            return Ok(());
        };
        let references_current = self
            .registry
            .get(id)
            .is_some_and(|case| case.mod_message == Some(reply_to));
        if !references_current {
            debug!(message = %reply_to, "moderator reply dropped, not the displayed summary");
            return Ok(());
        }

        match parse_decision(text) {
            DecisionParse::Empty => {
                self.platform
                    .send_message(
                        self.config.mod_channel,
                        "That reply contained no actions. Say `help` to see your options.",
                    )
                    .await?;
                Ok(())
            }
            DecisionParse::Unrecognized { attempted } => {
                let listed: Vec<String> = attempted.iter().map(|t| format!("`{}`", t)).collect();
                let text = format!(
                    "I didn't recognize {}. No actions were applied. \
                     Say `help` to see your options.",
                    listed.join(", ")
                );
                self.platform
                    .send_message(self.config.mod_channel, &text)
                    .await?;
                Ok(())
            }
            DecisionParse::Actions(actions) => self.apply_decision(id, &actions).await,
        }
    }

    async fn apply_decision(&mut self, id: CaseId, actions: &[Action]) -> Result<()> {
        let Some(mut case) = self.registry.take(id) else {
            return Ok(());
        };
        let result = self.apply_actions(&mut case, actions).await;
        let ticket = case
            .target
            .as_ref()
            .map(|t| t.content.ticket())
            .unwrap_or_else(|| "unknown".to_string());
        self.registry.put_back(case);
        result?;

        let listed: Vec<String> = actions.iter().map(|a| format!("`{}`", a)).collect();
        let confirmation = format!("Applied {} to ticket `{}`", listed.join(", "), ticket);
        self.platform
            .send_message(self.config.mod_channel, &confirmation)
            .await?;
        Ok(())
    }

    /// Record each action on the case and fire its immediate side effects,
    /// in vocabulary order.
    async fn apply_actions(&self, case: &mut Case, actions: &[Action]) -> Result<()> {
        for &action in actions {
            case.record_action(action);
            let Some(target) = case.target.as_ref() else {
                continue;
            };

            if action.targets_user() {
                let notice = format!(
                    "A moderator has taken action on your account: {}.",
                    action.description()
                );
                self.platform
                    .send_direct_message(target.author, &notice)
                    .await?;
            }
            match action {
                Action::HideMessage | Action::ShadowHideMessage => {
                    self.platform.flag_message(target.content).await?;
                }
                // Clears the provisional review flag; previously recorded
                // actions stay on the case.
                Action::NoAction => {
                    self.platform.unflag_message(target.content).await?;
                }
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(priority: f64, age_minutes: i64) -> QueueEntry {
        QueueEntry {
            id: CaseId::new(),
            content: ContentRef::new(1, 2, 3),
            priority,
            created_at: Utc::now() - Duration::minutes(age_minutes),
        }
    }

    #[test]
    fn test_select_next_prefers_highest_priority() {
        let entries = vec![entry(1.0, 10), entry(5.0, 5), entry(3.0, 20)];
        let selected = select_next(&entries).unwrap();
        assert_eq!(selected.id, entries[1].id);
    }

    #[test]
    fn test_select_next_breaks_ties_by_age() {
        let oldest = entry(2.0, 60);
        let entries = vec![entry(2.0, 5), oldest.clone(), entry(2.0, 30)];
        let selected = select_next(&entries).unwrap();
        assert_eq!(selected.id, oldest.id);
    }

    #[test]
    fn test_select_next_is_order_independent() {
        let a = entry(2.0, 60);
        let b = entry(2.0, 5);
        let forward = select_next(&[a.clone(), b.clone()]).unwrap().id;
        let backward = select_next(&[b, a]).unwrap().id;
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_select_next_empty() {
        assert_eq!(select_next(&[]), None);
    }

    #[test]
    fn test_age_hours_never_negative() {
        let now = Utc::now();
        assert_eq!(age_hours(now + Duration::hours(1), now), 0.0);
        let age = age_hours(now - Duration::minutes(90), now);
        assert!((age - 1.5).abs() < 1e-6);
    }
}
