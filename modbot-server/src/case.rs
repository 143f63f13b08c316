//! The case data model: one moderation request in flight.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

use modbot_core::{Action, Category, ChannelId, ContentRef, UserId, AUTO_CLASSIFICATION};

/// Newtype for a case identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaseId(pub Uuid);

impl CaseId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CaseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a case is in its lifecycle.
///
/// The dialogue states (`ReportStart` through `AwaitingConfirmation`, plus
/// `AwaitingTicket` for appeals) are owned by the reporter-facing state
/// machine; `AwaitingModeration` is owned by the moderation queue; `Complete`
/// is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseState {
    ReportStart,
    AwaitingTarget,
    TargetIdentified,
    AwaitingSubtype,
    AwaitingComment,
    AwaitingConfirmation,
    /// Appeal flow only: waiting for the ticket from the moderation notice.
    AwaitingTicket,
    AwaitingModeration,
    Complete,
}

impl CaseState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CaseState::Complete)
    }

    /// True while the reporter's dialogue owns the case. A reporter may not
    /// open a second dialogue until their current case leaves this phase.
    pub fn in_dialogue(&self) -> bool {
        !matches!(self, CaseState::AwaitingModeration | CaseState::Complete)
    }
}

/// Snapshot of the reported message, captured once at resolution time and
/// immutable thereafter.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTarget {
    pub content: ContentRef,
    pub author: UserId,
    pub author_name: String,
    pub text: String,
}

/// A moderation case: the unit of work flowing from report (or trigger)
/// through moderator decision to archive.
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    pub id: CaseId,
    pub state: CaseState,
    pub reporter: UserId,
    pub reporter_name: String,
    /// DM channel for dialogue replies and reporter notifications.
    /// `None` for auto-generated cases.
    pub dm_channel: Option<ChannelId>,
    pub target: Option<ResolvedTarget>,
    pub category: Option<Category>,
    pub subcategory: Option<String>,
    pub comment: Option<String>,
    pub severity: f64,
    /// Enforcement actions applied so far. Set semantics; iteration order is
    /// the vocabulary's declared order.
    pub actions: BTreeSet<Action>,
    pub created_at: DateTime<Utc>,
    pub is_appeal: bool,
    /// Marks a case fabricated by the auto-report generator.
    pub auto: bool,
    /// The summary message posted into the moderation channel; moderator
    /// replies are routed back to the case through it.
    pub mod_message: Option<modbot_core::MessageId>,
}

impl Case {
    /// A fresh user-filed report, entering the dialogue at `ReportStart`.
    pub fn new_report(
        reporter: UserId,
        reporter_name: impl Into<String>,
        dm_channel: ChannelId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: CaseId::new(),
            state: CaseState::ReportStart,
            reporter,
            reporter_name: reporter_name.into(),
            dm_channel: Some(dm_channel),
            target: None,
            category: None,
            subcategory: None,
            comment: None,
            severity: 0.0,
            actions: BTreeSet::new(),
            created_at: now,
            is_appeal: false,
            auto: false,
            mod_message: None,
        }
    }

    /// A fresh appeal, entering the dialogue at `ReportStart` with the
    /// appeal branch taken from there.
    pub fn new_appeal(
        reporter: UserId,
        reporter_name: impl Into<String>,
        dm_channel: ChannelId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            is_appeal: true,
            ..Self::new_report(reporter, reporter_name, dm_channel, now)
        }
    }

    /// An auto-generated case, born directly in `AwaitingModeration`.
    pub fn new_auto(
        reporter: UserId,
        reporter_name: impl Into<String>,
        target: ResolvedTarget,
        severity: f64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: CaseId::new(),
            state: CaseState::AwaitingModeration,
            reporter,
            reporter_name: reporter_name.into(),
            dm_channel: None,
            target: Some(target),
            category: None,
            subcategory: None,
            comment: Some("Automatically generated report".to_string()),
            severity,
            actions: BTreeSet::new(),
            created_at: now,
            is_appeal: false,
            auto: true,
            mod_message: None,
        }
    }

    /// Record an action on the case. Returns false if it was already present
    /// (membership is a no-op; the caller may still re-fire side effects).
    pub fn record_action(&mut self, action: Action) -> bool {
        self.actions.insert(action)
    }

    /// Human-readable classification: `category/subcategory`, or the fixed
    /// auto-moderation marker.
    pub fn classification_label(&self) -> String {
        if self.auto {
            return AUTO_CLASSIFICATION.to_string();
        }
        match (&self.category, &self.subcategory) {
            (Some(category), Some(subcategory)) => format!("{}/{}", category, subcategory),
            (Some(category), None) => category.to_string(),
            _ => "unclassified".to_string(),
        }
    }

    /// The moderator-facing summary posted into the moderation channel, also
    /// used as the reporter's confirmation preview.
    pub fn summary(&self) -> String {
        let (author_name, text, ticket) = match &self.target {
            Some(target) => (
                target.author_name.as_str(),
                target.text.as_str(),
                target.content.ticket(),
            ),
            None => ("unknown", "", "unknown".to_string()),
        };

        let mut out = if self.is_appeal {
            let mut s = format!(
                "User `{}` is appealing the moderation of the following message from user `{}`\n",
                self.reporter_name, author_name
            );
            s.push_str(&format!("```{}```\n", text));
            if self.actions.is_empty() {
                s.push_str("No prior actions are on record for this ticket.\n");
            } else {
                let tokens: Vec<String> =
                    self.actions.iter().map(|a| format!("`{}`", a)).collect();
                s.push_str(&format!("Actions under appeal: {}\n", tokens.join(", ")));
            }
            s
        } else {
            let mut s = format!(
                "User `{}` reported the following message from user `{}` as `{}`\n",
                self.reporter_name,
                author_name,
                self.classification_label()
            );
            s.push_str(&format!("```{}```\n", text));
            s
        };

        out.push_str(&format!("Ticket: `{}`\n", ticket));
        out.push_str(&format!("Severity score: {:.2}\n", self.severity));
        out.push_str("The following comments are attached:\n");
        out.push_str(&format!("`{}`", self.comment.as_deref().unwrap_or("")));
        out
    }
}
