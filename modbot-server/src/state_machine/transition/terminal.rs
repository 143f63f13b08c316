//! Handler for cases the dialogue no longer owns.
//!
//! `AwaitingModeration` cases belong to the moderation queue and `Complete`
//! cases are finished; dialogue events reaching them are logged and dropped.

use super::TransitionResult;
use crate::case::Case;
use crate::state_machine::effect::{Effect, LogLevel};
use crate::state_machine::event::Event;

pub fn handle(case: Case, event: Event) -> TransitionResult {
    let message = format!(
        "case {} in state {:?} ignoring event {}",
        case.id,
        case.state,
        event.log_summary()
    );
    TransitionResult::new(
        case,
        vec![Effect::Log {
            level: LogLevel::Debug,
            message,
        }],
    )
}
