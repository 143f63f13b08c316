//! The closed enforcement-action vocabulary and the moderator decision
//! grammar.
//!
//! Moderator replies are parsed as a token list (whitespace, comma, or
//! newline separated) validated against the vocabulary. Unrecognized tokens
//! produce a parse error naming them rather than being silently ignored; a
//! stray word in prose can therefore never apply an action by accident.

use std::collections::BTreeSet;
use std::fmt;

/// One enforcement action from the closed vocabulary.
///
/// Declaration order is vocabulary order: actions matched in a single reply
/// apply in this order, and `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    /// `law` - incident is reported to law enforcement.
    ReportToAuthorities,
    /// `m_demote` - message is demoted in search.
    DemoteMessage,
    /// `m_hide` - message is hidden on platform; no user can access it.
    HideMessage,
    /// `m_shadow` - message is hidden from the world, still visible to its poster.
    ShadowHideMessage,
    /// `u_demote` - user is demoted in search and recommendations.
    DemoteUser,
    /// `u_hide` - user is hidden in search and recommendations.
    HideUser,
    /// `u_shadow` - user is shadowbanned; nothing they do is visible to others.
    ShadowBanUser,
    /// `u_suspend` - user is suspended from the platform temporarily.
    SuspendUser,
    /// `u_ban` - user is banned from the platform; account is deactivated.
    BanUser,
    /// `none` - no action is taken; clears the provisional review flag.
    NoAction,
}

/// The full vocabulary in declared order.
pub const VOCABULARY: [Action; 10] = [
    Action::ReportToAuthorities,
    Action::DemoteMessage,
    Action::HideMessage,
    Action::ShadowHideMessage,
    Action::DemoteUser,
    Action::HideUser,
    Action::ShadowBanUser,
    Action::SuspendUser,
    Action::BanUser,
    Action::NoAction,
];

impl Action {
    /// The literal token moderators type.
    pub fn token(&self) -> &'static str {
        match self {
            Action::ReportToAuthorities => "law",
            Action::DemoteMessage => "m_demote",
            Action::HideMessage => "m_hide",
            Action::ShadowHideMessage => "m_shadow",
            Action::DemoteUser => "u_demote",
            Action::HideUser => "u_hide",
            Action::ShadowBanUser => "u_shadow",
            Action::SuspendUser => "u_suspend",
            Action::BanUser => "u_ban",
            Action::NoAction => "none",
        }
    }

    /// One-line description shown in the moderator help text.
    pub fn description(&self) -> &'static str {
        match self {
            Action::ReportToAuthorities => "incident is reported to law enforcement",
            Action::DemoteMessage => "message is demoted in search",
            Action::HideMessage => "message is hidden on platform. No user can access it",
            Action::ShadowHideMessage => "message is hidden from world. Available to poster",
            Action::DemoteUser => "user is demoted in search and recommendations",
            Action::HideUser => "user is hidden in search and recommendations",
            Action::ShadowBanUser => {
                "user is shadowbanned. Nothing they do is visible to anyone but them"
            }
            Action::SuspendUser => "user is suspended from platform temporarily",
            Action::BanUser => "user is banned from platform. Account is deactivated",
            Action::NoAction => "no action is taken",
        }
    }

    /// Whether applying this action should notify the target author
    /// immediately (user-targeting sanctions).
    pub fn targets_user(&self) -> bool {
        matches!(
            self,
            Action::DemoteUser
                | Action::HideUser
                | Action::ShadowBanUser
                | Action::SuspendUser
                | Action::BanUser
        )
    }

    /// Whether the case closer sends the target author a moderation notice
    /// (with appeal ticket) for this action.
    ///
    /// Shadow actions are excluded: notifying the author would defeat them.
    pub fn notifies_on_close(&self) -> bool {
        matches!(
            self,
            Action::HideMessage | Action::HideUser | Action::SuspendUser | Action::BanUser
        )
    }

    /// Look a single token up in the vocabulary.
    pub fn parse_token(token: &str) -> Option<Action> {
        VOCABULARY
            .iter()
            .copied()
            .find(|a| a.token().eq_ignore_ascii_case(token))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// Result of parsing a moderator decision reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionParse {
    /// The reply contained no tokens at all.
    Empty,
    /// At least one token was not in the vocabulary; nothing is applied.
    Unrecognized { attempted: Vec<String> },
    /// Every token was valid. Actions are deduplicated and in vocabulary order.
    Actions(Vec<Action>),
}

/// Parse a moderator reply as a decision token list.
///
/// Tokens are separated by whitespace, commas, or newlines. The whole reply
/// must consist of vocabulary tokens; any unrecognized token fails the parse
/// so a typo cannot half-apply a decision.
pub fn parse_decision(reply: &str) -> DecisionParse {
    let mut matched: BTreeSet<Action> = BTreeSet::new();
    let mut unrecognized: Vec<String> = Vec::new();

    for token in reply
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
    {
        match Action::parse_token(token) {
            Some(action) => {
                matched.insert(action);
            }
            None => unrecognized.push(token.to_string()),
        }
    }

    if !unrecognized.is_empty() {
        DecisionParse::Unrecognized {
            attempted: unrecognized,
        }
    } else if matched.is_empty() {
        DecisionParse::Empty
    } else {
        DecisionParse::Actions(matched.into_iter().collect())
    }
}

/// The moderator help text: commands plus the action vocabulary.
pub fn moderator_help() -> String {
    let mut help = String::new();
    help.push_str("Type `next` to see the next report\n");
    help.push_str("Type `help` to see this message\n");
    help.push_str("Reply directly to a report to moderate it\n");
    help.push_str("Here are your options moderating a report\n");
    for action in VOCABULARY {
        help.push_str(&format!("`{:<10}` {}\n", action.token(), action.description()));
    }
    help
}
