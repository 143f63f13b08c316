//! Events that trigger dialogue state transitions.
//!
//! Events represent things that happened: a message arrived in the
//! reporter's DM, a collaborator call completed, the engine looked up an
//! appeal ticket. They are inputs to the pure transition function.

use modbot_core::{Category, ContentRef, MessageId};

use crate::case::ResolvedTarget;
use crate::config::UnmatchedTicketPolicy;
use crate::platform::ResolveFailure;
use crate::registry::CarriedHistory;

/// All events that can drive a case's dialogue.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A message from the reporter in their dialogue.
    UserMessage { text: String },

    /// The pasted reference was resolved and its content scored.
    TargetResolved {
        target: ResolvedTarget,
        severity: f64,
        category: Category,
        subcategory: String,
        /// Severity met the auto-hide threshold; the content should be
        /// provisionally hidden pending review.
        auto_hide: bool,
    },

    /// The platform could not resolve the pasted reference.
    TargetResolveFailed { failure: ResolveFailure },

    /// The case summary was posted into the moderation channel.
    SummaryPosted { mod_message: MessageId },

    /// Appeal flow: the engine parsed the submitted ticket and looked up any
    /// prior history in the registry.
    TicketSubmitted {
        /// `None` if the text did not parse as a ticket at all.
        parsed: Option<ContentRef>,
        /// Prior history for the ticket, if any case matched it.
        history: Option<CarriedHistory>,
        policy: UnmatchedTicketPolicy,
    },
}

impl Event {
    /// Short human-readable summary for logs (full events can carry whole
    /// message bodies).
    pub fn log_summary(&self) -> String {
        match self {
            Event::UserMessage { text } => format!("UserMessage({} chars)", text.len()),
            Event::TargetResolved {
                severity,
                auto_hide,
                ..
            } => format!("TargetResolved(severity={:.2}, auto_hide={})", severity, auto_hide),
            Event::TargetResolveFailed { failure } => {
                format!("TargetResolveFailed({:?})", failure)
            }
            Event::SummaryPosted { mod_message } => format!("SummaryPosted({})", mod_message),
            Event::TicketSubmitted { parsed, history, .. } => format!(
                "TicketSubmitted(parsed={}, matched={})",
                parsed.is_some(),
                history.is_some()
            ),
        }
    }
}
