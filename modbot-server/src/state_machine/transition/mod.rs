//! Pure dialogue transition function.
//!
//! Takes the current case and an event, returns the updated case and a list
//! of effects. No side effects; all I/O is described as data and executed by
//! the interpreter.
//!
//! Each dialogue phase has its own handler module with co-located tests:
//! - `opening`: ReportStart and AwaitingTarget
//! - `classification`: TargetIdentified and AwaitingSubtype
//! - `submission`: AwaitingComment and AwaitingConfirmation
//! - `appeal`: AwaitingTicket
//! - `terminal`: AwaitingModeration and Complete

mod appeal;
mod classification;
mod opening;
mod submission;
mod terminal;

use modbot_core::{APPEAL_KEYWORD, CANCEL_KEYWORD, HELP_KEYWORD, START_KEYWORD};

use super::effect::Effect;
use super::event::Event;
use crate::case::{Case, CaseState};

/// Result of a dialogue transition.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionResult {
    /// The case after the transition.
    pub case: Case,
    /// Effects to execute.
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(case: Case, effects: Vec<Effect>) -> Self {
        Self { case, effects }
    }

    /// Keep the case as-is and send a single reply.
    pub fn reply(case: Case, text: impl Into<String>) -> Self {
        Self {
            case,
            effects: vec![Effect::Reply { text: text.into() }],
        }
    }

    pub fn no_change(case: Case) -> Self {
        Self {
            case,
            effects: vec![],
        }
    }
}

/// Usage text for the reporter-facing dialogue.
pub fn dialogue_help() -> String {
    let mut help = String::new();
    help.push_str(&format!(
        "Use the `{}` command to begin the reporting process.\n",
        START_KEYWORD
    ));
    help.push_str(&format!(
        "Use the `{}` command to contest a prior moderation decision.\n",
        APPEAL_KEYWORD
    ));
    help.push_str(&format!(
        "Use the `{}` command to cancel the current process.",
        CANCEL_KEYWORD
    ));
    help
}

/// Pure dialogue transition function.
///
/// The cancel and help keywords are handled here, ahead of any per-state
/// logic: cancel discards the dialogue from any dialogue-owned state, and
/// help never changes state.
pub fn transition(case: Case, event: Event) -> TransitionResult {
    if let Event::UserMessage { text } = &event {
        let trimmed = text.trim();
        if trimmed == CANCEL_KEYWORD && case.state.in_dialogue() {
            let farewell = if case.is_appeal {
                "Appeal cancelled."
            } else {
                "Report cancelled."
            };
            let mut case = case;
            case.state = CaseState::Complete;
            return TransitionResult::reply(case, farewell);
        }
        if trimmed == HELP_KEYWORD && case.state.in_dialogue() {
            return TransitionResult::reply(case, dialogue_help());
        }
    }

    match case.state {
        CaseState::ReportStart => opening::start(case, event),
        CaseState::AwaitingTarget => opening::awaiting_target(case, event),
        CaseState::TargetIdentified => classification::awaiting_category(case, event),
        CaseState::AwaitingSubtype => classification::awaiting_subtype(case, event),
        CaseState::AwaitingComment => submission::awaiting_comment(case, event),
        CaseState::AwaitingConfirmation => submission::awaiting_confirmation(case, event),
        CaseState::AwaitingTicket => appeal::awaiting_ticket(case, event),
        CaseState::AwaitingModeration | CaseState::Complete => terminal::handle(case, event),
    }
}
