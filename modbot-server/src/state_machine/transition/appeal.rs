//! Handler for the appeal ticket step.
//!
//! The engine parses the reporter's message and looks up any prior history
//! before calling the transition, so this handler only sees the already
//! resolved `TicketSubmitted` event.

use super::opening::unexpected;
use super::TransitionResult;
use crate::case::{Case, CaseState};
use crate::config::UnmatchedTicketPolicy;
use crate::state_machine::event::Event;

/// `AwaitingTicket`: expecting the ticket from a moderation notice.
pub fn awaiting_ticket(mut case: Case, event: Event) -> TransitionResult {
    match event {
        Event::TicketSubmitted {
            parsed,
            history,
            policy,
        } => {
            let Some(content) = parsed else {
                return TransitionResult::reply(
                    case,
                    "I'm sorry, I couldn't read that ticket. \
                     It looks like `guild/channel/message`. \
                     Please try again or say `cancel` to cancel.",
                );
            };
            match history {
                Some(history) => {
                    let actions = if history.actions.is_empty() {
                        "No actions are on record for it.".to_string()
                    } else {
                        let listed: Vec<String> = history
                            .actions
                            .iter()
                            .map(|a| format!("- `{}` ({})", a, a.description()))
                            .collect();
                        format!(
                            "The following actions are on record:\n{}",
                            listed.join("\n")
                        )
                    };
                    case.target = Some(history.target);
                    case.severity = history.severity;
                    case.actions = history.actions;
                    case.state = CaseState::AwaitingComment;
                    TransitionResult::reply(
                        case,
                        format!(
                            "I found your ticket. {}\n\
                             Add any comments you'd like to send to the mods.",
                            actions
                        ),
                    )
                }
                None => match policy {
                    UnmatchedTicketPolicy::Proceed => {
                        case.state = CaseState::AwaitingComment;
                        TransitionResult::reply(
                            case,
                            format!(
                                "I couldn't find a moderated case for ticket `{}`, \
                                 but your appeal can still be reviewed.\n\
                                 Add any comments you'd like to send to the mods.",
                                content
                            ),
                        )
                    }
                    UnmatchedTicketPolicy::Reject => TransitionResult::reply(
                        case,
                        format!(
                            "I couldn't find a moderated case for ticket `{}`. \
                             Please check the ticket on your moderation notice \
                             and try again, or say `cancel` to cancel.",
                            content
                        ),
                    ),
                },
            }
        }
        other => unexpected(case, other),
    }
}
