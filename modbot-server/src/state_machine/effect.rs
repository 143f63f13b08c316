//! Effects (side effects as data).
//!
//! Effects describe what should happen as a result of a dialogue transition.
//! They are pure data; the interpreter executes them against the chat
//! platform and the scorer. This separation lets the transition logic be
//! tested without mocking HTTP.

use modbot_core::ContentRef;

/// All effects that dialogue transitions can produce.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send a reply into the reporter's DM channel.
    Reply { text: String },

    /// Resolve the reported reference on the platform and score its content.
    /// Produces `TargetResolved` or `TargetResolveFailed`.
    ResolveTarget { content: ContentRef },

    /// Mark content as provisionally hidden pending review.
    FlagContent { content: ContentRef },

    /// Post the case summary into the moderation channel.
    /// Produces `SummaryPosted`.
    PostModSummary { summary: String },

    /// Log a message (for debugging/tracing).
    Log { level: LogLevel, message: String },
}

/// Log level for logging effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}
