//! Explicit state machine for the reporting and appeal dialogues.
//!
//! The design separates:
//! - **State**: what the case knows (the `Case` record and its `CaseState`)
//! - **Events**: what happened (`Event`)
//! - **Effects**: what to do (`Effect`)
//! - **Transition**: pure function `(Case, Event) -> (Case, Vec<Effect>)`
//!
//! The interpreter executes effects against the chat platform and the scorer
//! and returns result events, which the engine feeds back into the
//! transition function until the dialogue turn is quiescent.

pub mod effect;
pub mod event;
pub mod interpreter;
pub mod transition;

pub use effect::*;
pub use event::*;
pub use interpreter::*;
pub use transition::*;
