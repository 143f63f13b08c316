//! Handlers for the classification phase: category and subcategory menus.

use modbot_core::Category;

use super::opening::unexpected;
use super::TransitionResult;
use crate::case::{Case, CaseState};
use crate::state_machine::event::Event;

fn invalid_option(menu: String) -> String {
    format!(
        "I'm sorry. That doesn't seem to match one of the options. \
         Please try again.\n{}",
        menu
    )
}

/// `TargetIdentified`: expecting a category, by name or menu position.
pub fn awaiting_category(mut case: Case, event: Event) -> TransitionResult {
    match event {
        Event::UserMessage { text } => match Category::parse(&text) {
            Some(category) => {
                case.category = Some(category);
                case.subcategory = None;
                case.state = CaseState::AwaitingSubtype;
                let prompt = format!(
                    "You've identified this message as `{}`. \
                     Which of the following best describes it, by name or number?\n{}",
                    category,
                    category.subtype_menu()
                );
                TransitionResult::reply(case, prompt)
            }
            None => TransitionResult::reply(case, invalid_option(Category::menu())),
        },
        other => unexpected(case, other),
    }
}

/// `AwaitingSubtype`: expecting a subcategory from the chosen category's
/// list, by name or menu position.
pub fn awaiting_subtype(mut case: Case, event: Event) -> TransitionResult {
    let Some(category) = case.category else {
        // Unreachable through normal flow; recover by re-asking for the
        // category.
        case.state = CaseState::TargetIdentified;
        return TransitionResult::reply(case, invalid_option(Category::menu()));
    };
    match event {
        Event::UserMessage { text } => match category.parse_subtype(&text) {
            Some(subtype) => {
                case.subcategory = Some(subtype.to_string());
                case.state = CaseState::AwaitingComment;
                let prompt = format!(
                    "You've classified this message as `{}/{}`.\n\
                     Add any comments you'd like to send to the mods.",
                    category, subtype
                );
                TransitionResult::reply(case, prompt)
            }
            None => TransitionResult::reply(case, invalid_option(category.subtype_menu())),
        },
        other => unexpected(case, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::effect::Effect;
    use crate::state_machine::transition::test_support::*;
    use crate::state_machine::transition::transition;

    fn identified_case() -> Case {
        let mut case = report_case();
        case.state = CaseState::TargetIdentified;
        case.target = Some(resolved_target());
        case
    }

    #[test]
    fn test_category_by_name() {
        let result = transition(identified_case(), user_message("spam"));
        assert_eq!(result.case.state, CaseState::AwaitingSubtype);
        assert_eq!(result.case.category, Some(Category::Spam));
        assert!(
            matches!(&result.effects[0], Effect::Reply { text } if text.contains("identified this message as `spam`"))
        );
    }

    #[test]
    fn test_category_by_number() {
        let result = transition(identified_case(), user_message("3"));
        assert_eq!(result.case.category, Some(Category::HateHarassment));
        assert!(
            matches!(&result.effects[0], Effect::Reply { text } if text.contains("1. `race`"))
        );
    }

    #[test]
    fn test_unknown_category_reprompts_with_menu() {
        let result = transition(identified_case(), user_message("phishing"));
        assert_eq!(result.case.state, CaseState::TargetIdentified);
        assert!(
            matches!(&result.effects[0], Effect::Reply { text } if text.contains("doesn't seem to match") && text.contains("1. `spam`"))
        );
    }

    #[test]
    fn test_reporter_choice_overrides_machine_classification() {
        let mut case = identified_case();
        case.category = Some(Category::Spam);
        case.subcategory = Some("spam".to_string());
        let result = transition(case, user_message("violence"));
        assert_eq!(result.case.category, Some(Category::Violence));
        assert_eq!(result.case.subcategory, None);
    }

    #[test]
    fn test_subtype_by_name_and_number() {
        let mut case = identified_case();
        case.state = CaseState::AwaitingSubtype;
        case.category = Some(Category::Fraud);
        let result = transition(case, user_message("impersonation"));
        assert_eq!(result.case.state, CaseState::AwaitingComment);
        assert_eq!(result.case.subcategory, Some("impersonation".to_string()));
        assert!(
            matches!(&result.effects[0], Effect::Reply { text } if text.contains("`fraud/impersonation`") && text.contains("comments"))
        );

        let mut case = identified_case();
        case.state = CaseState::AwaitingSubtype;
        case.category = Some(Category::Fraud);
        let result = transition(case, user_message("2"));
        assert_eq!(
            result.case.subcategory,
            Some("compromised account".to_string())
        );
    }

    #[test]
    fn test_subtype_must_come_from_the_chosen_category() {
        let mut case = identified_case();
        case.state = CaseState::AwaitingSubtype;
        case.category = Some(Category::Spam);
        let result = transition(case, user_message("self harm"));
        assert_eq!(result.case.state, CaseState::AwaitingSubtype);
        assert!(
            matches!(&result.effects[0], Effect::Reply { text } if text.contains("1. `spam`"))
        );
    }
}
