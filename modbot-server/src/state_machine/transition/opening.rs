//! Handlers for the opening phase: greeting the reporter and resolving the
//! reported message.

use modbot_core::{Category, ContentRef};

use super::TransitionResult;
use crate::case::{Case, CaseState};
use crate::platform::ResolveFailure;
use crate::state_machine::effect::{Effect, LogLevel};
use crate::state_machine::event::Event;

/// `ReportStart`: the dialogue was just opened by the start or appeal
/// keyword. Greet and ask for the message link (report) or ticket (appeal).
pub fn start(mut case: Case, event: Event) -> TransitionResult {
    match event {
        Event::UserMessage { .. } => {
            if case.is_appeal {
                case.state = CaseState::AwaitingTicket;
                TransitionResult::reply(
                    case,
                    "Thank you for starting the appeal process. \
                     Say `help` at any time for more information.\n\n\
                     Please paste the ticket from your moderation notice. \
                     It looks like `guild/channel/message`.",
                )
            } else {
                case.state = CaseState::AwaitingTarget;
                TransitionResult::reply(
                    case,
                    "Thank you for starting the reporting process. \
                     Say `help` at any time for more information.\n\n\
                     Please copy paste the link to the message you want to report.\n\
                     You can obtain this link by right-clicking the message \
                     and clicking `Copy Message Link`.",
                )
            }
        }
        other => unexpected(case, other),
    }
}

/// `AwaitingTarget`: expecting a message link. A parseable link kicks off
/// resolution; resolution results come back as events.
pub fn awaiting_target(mut case: Case, event: Event) -> TransitionResult {
    match event {
        Event::UserMessage { text } => match ContentRef::parse(&text) {
            Some(content) => TransitionResult::new(
                case,
                vec![Effect::ResolveTarget { content }],
            ),
            None => TransitionResult::reply(
                case,
                "I'm sorry, I couldn't read that link. \
                 Please try again or say `cancel` to cancel.",
            ),
        },
        Event::TargetResolved {
            target,
            severity,
            category,
            subcategory,
            auto_hide,
        } => {
            let mut effects = Vec::new();
            if auto_hide {
                effects.push(Effect::FlagContent {
                    content: target.content,
                });
            }
            let found = format!(
                "I found this message:\n```{}: {}```\n\
                 If this is not the right message, say `cancel` and restart \
                 the reporting process.\n\
                 Otherwise, let me know which of the following abuse types \
                 this message is, by name or number:\n{}",
                target.author_name,
                target.text,
                Category::menu()
            );
            effects.push(Effect::Reply { text: found });
            case.target = Some(target);
            case.severity = severity;
            // Machine classification is a default; the reporter's choice in
            // the next step overwrites it.
            case.category = Some(category);
            case.subcategory = Some(subcategory);
            case.state = CaseState::TargetIdentified;
            TransitionResult::new(case, effects)
        }
        Event::TargetResolveFailed { failure } => {
            let text = match failure {
                ResolveFailure::UnknownGuild => {
                    "I cannot accept reports of messages from guilds that I'm not in. \
                     Please have the guild owner add me to the guild and try again."
                }
                ResolveFailure::UnknownChannel => {
                    "It seems this channel was deleted or never existed. \
                     Please try again or say `cancel` to cancel."
                }
                ResolveFailure::UnknownMessage => {
                    "It seems this message was deleted or never existed. \
                     Please try again or say `cancel` to cancel."
                }
            };
            TransitionResult::reply(case, text)
        }
        other => unexpected(case, other),
    }
}

pub(super) fn unexpected(case: Case, event: Event) -> TransitionResult {
    let message = format!(
        "ignoring event {} in state {:?}",
        event.log_summary(),
        case.state
    );
    TransitionResult::new(
        case,
        vec![Effect::Log {
            level: LogLevel::Warn,
            message,
        }],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::transition::test_support::*;
    use crate::state_machine::transition::transition;

    #[test]
    fn test_start_moves_to_awaiting_target() {
        let result = transition(report_case(), user_message("report"));
        assert_eq!(result.case.state, CaseState::AwaitingTarget);
        assert!(
            matches!(&result.effects[0], Effect::Reply { text } if text.contains("Copy Message Link"))
        );
    }

    #[test]
    fn test_start_appeal_asks_for_ticket() {
        let result = transition(appeal_case(), user_message("appeal"));
        assert_eq!(result.case.state, CaseState::AwaitingTicket);
        assert!(
            matches!(&result.effects[0], Effect::Reply { text } if text.contains("ticket"))
        );
    }

    #[test]
    fn test_valid_link_requests_resolution() {
        let mut case = report_case();
        case.state = CaseState::AwaitingTarget;
        let result = transition(
            case,
            user_message("https://chat.example.com/channels/12345/67890/11111"),
        );
        assert_eq!(result.case.state, CaseState::AwaitingTarget);
        assert_eq!(
            result.effects,
            vec![Effect::ResolveTarget {
                content: ContentRef::new(12345, 67890, 11111)
            }]
        );
    }

    #[test]
    fn test_unparseable_link_reprompts() {
        let mut case = report_case();
        case.state = CaseState::AwaitingTarget;
        let result = transition(case, user_message("that message over there"));
        assert_eq!(result.case.state, CaseState::AwaitingTarget);
        assert!(
            matches!(&result.effects[0], Effect::Reply { text } if text.contains("couldn't read that link"))
        );
    }

    #[test]
    fn test_resolution_snapshots_target_and_presents_menu() {
        let mut case = report_case();
        case.state = CaseState::AwaitingTarget;
        let result = transition(
            case,
            Event::TargetResolved {
                target: resolved_target(),
                severity: 0.4,
                category: Category::Spam,
                subcategory: "spam".to_string(),
                auto_hide: false,
            },
        );
        assert_eq!(result.case.state, CaseState::TargetIdentified);
        assert_eq!(result.case.severity, 0.4);
        assert_eq!(result.case.target, Some(resolved_target()));
        assert!(
            matches!(&result.effects[0], Effect::Reply { text } if text.contains("spammy: buy cheap widgets") && text.contains("1. `spam`"))
        );
    }

    #[test]
    fn test_high_severity_resolution_flags_content_first() {
        let mut case = report_case();
        case.state = CaseState::AwaitingTarget;
        let result = transition(
            case,
            Event::TargetResolved {
                target: resolved_target(),
                severity: 0.93,
                category: Category::HateHarassment,
                subcategory: "other".to_string(),
                auto_hide: true,
            },
        );
        assert_eq!(
            result.effects[0],
            Effect::FlagContent {
                content: resolved_target().content
            }
        );
        assert!(matches!(&result.effects[1], Effect::Reply { .. }));
    }

    #[test]
    fn test_each_resolve_failure_gets_its_own_prompt() {
        for (failure, needle) in [
            (ResolveFailure::UnknownGuild, "guilds that I'm not in"),
            (ResolveFailure::UnknownChannel, "channel was deleted"),
            (ResolveFailure::UnknownMessage, "message was deleted"),
        ] {
            let mut case = report_case();
            case.state = CaseState::AwaitingTarget;
            let result = transition(case, Event::TargetResolveFailed { failure });
            assert_eq!(result.case.state, CaseState::AwaitingTarget);
            assert!(
                matches!(&result.effects[0], Effect::Reply { text } if text.contains(needle)),
                "{:?}",
                failure
            );
        }
    }

    #[test]
    fn test_unexpected_event_only_logs() {
        let result = transition(
            report_case(),
            Event::TargetResolveFailed {
                failure: ResolveFailure::UnknownMessage,
            },
        );
        assert_eq!(result.case.state, CaseState::ReportStart);
        assert!(matches!(&result.effects[0], Effect::Log { .. }));
    }
}
