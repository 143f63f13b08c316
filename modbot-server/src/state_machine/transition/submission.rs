//! Handlers for the submission phase: comment collection, confirmation, and
//! hand-off to the moderation queue.

use modbot_core::CONFIRM_KEYWORD;

use super::opening::unexpected;
use super::TransitionResult;
use crate::case::{Case, CaseState};
use crate::state_machine::effect::Effect;
use crate::state_machine::event::Event;

fn confirm_prompt(noun: &str) -> String {
    format!(
        "Reply `{confirm}` to send this {noun} to the mods\n\
         Reply `cancel` to cancel the {noun} process",
        confirm = CONFIRM_KEYWORD,
        noun = noun,
    )
}

fn noun(case: &Case) -> &'static str {
    if case.is_appeal {
        "appeal"
    } else {
        "report"
    }
}

/// `AwaitingComment`: the whole message becomes the attached comment, then
/// the reporter sees the exact summary the mods will see.
pub fn awaiting_comment(mut case: Case, event: Event) -> TransitionResult {
    match event {
        Event::UserMessage { text } => {
            case.comment = Some(text.trim().to_string());
            case.state = CaseState::AwaitingConfirmation;
            let noun = noun(&case);
            let preview = format!(
                "Alright, here's the {noun} I'm sending to the mods\n{summary}\n{prompt}",
                noun = noun,
                summary = case.summary(),
                prompt = confirm_prompt(noun),
            );
            TransitionResult::reply(case, preview)
        }
        other => unexpected(case, other),
    }
}

/// `AwaitingConfirmation`: only the literal confirm keyword sends the case to
/// the mods; anything else re-prompts. The state advances when the summary
/// post comes back with its message id.
pub fn awaiting_confirmation(mut case: Case, event: Event) -> TransitionResult {
    match event {
        Event::UserMessage { text } => {
            if text.trim() == CONFIRM_KEYWORD {
                let summary = case.summary();
                TransitionResult::new(case, vec![Effect::PostModSummary { summary }])
            } else {
                let prompt = confirm_prompt(noun(&case));
                TransitionResult::reply(case, prompt)
            }
        }
        Event::SummaryPosted { mod_message } => {
            case.mod_message = Some(mod_message);
            case.state = CaseState::AwaitingModeration;
            let sent = format!("Your {} has been sent to the mods", noun(&case));
            TransitionResult::reply(case, sent)
        }
        other => unexpected(case, other),
    }
}
