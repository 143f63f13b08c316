//! The fixed two-level abuse classification taxonomy and dialogue keywords.
//!
//! The taxonomy is closed: reporters pick a category and then a subcategory
//! from the category's own list, either by literal name or by 1-based
//! position in the presented menu. Automatically generated cases carry the
//! out-of-taxonomy "auto moderated" marker instead.

use std::fmt;

/// Keyword that opens a reporting dialogue.
pub const START_KEYWORD: &str = "report";
/// Keyword that abandons the current dialogue from any state.
pub const CANCEL_KEYWORD: &str = "cancel";
/// Keyword that prints usage information.
pub const HELP_KEYWORD: &str = "help";
/// Keyword that confirms sending a report to the moderators.
pub const CONFIRM_KEYWORD: &str = "yes";
/// Keyword that opens an appeal dialogue.
pub const APPEAL_KEYWORD: &str = "appeal";

/// Classification marker for cases fabricated by the auto-report generator.
/// Deliberately not part of [`Category::ALL`]; users can never select it.
pub const AUTO_CLASSIFICATION: &str = "auto moderated";

/// Top-level abuse category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Spam,
    Fraud,
    HateHarassment,
    Violence,
    IntimateMaterials,
    Other,
}

impl Category {
    /// The user-facing taxonomy, in menu order.
    pub const ALL: [Category; 6] = [
        Category::Spam,
        Category::Fraud,
        Category::HateHarassment,
        Category::Violence,
        Category::IntimateMaterials,
        Category::Other,
    ];

    /// The literal name shown to reporters.
    pub fn name(&self) -> &'static str {
        match self {
            Category::Spam => "spam",
            Category::Fraud => "fraud",
            Category::HateHarassment => "hate speech/harassment",
            Category::Violence => "violence",
            Category::IntimateMaterials => "intimate materials",
            Category::Other => "other",
        }
    }

    /// The closed subcategory list for this category, in menu order.
    pub fn subtypes(&self) -> &'static [&'static str] {
        match self {
            Category::Spam => &["spam"],
            Category::Fraud => &[
                "impersonation",
                "compromised account",
                "monetary solicitation",
                "other",
            ],
            Category::HateHarassment => &[
                "race",
                "ethnicity",
                "nationality",
                "sexual orientation",
                "gender",
                "religion",
                "age",
                "ability",
                "other",
            ],
            Category::Violence => &["toward others", "self harm", "suicide", "other"],
            Category::IntimateMaterials => &[
                "sexually explicit materials",
                "personal information",
                "other",
            ],
            Category::Other => &["illegal goods", "theft", "vandalism", "other"],
        }
    }

    /// Parse a category from user input: either the literal name or its
    /// 1-based position in the menu.
    pub fn parse(input: &str) -> Option<Category> {
        let input = input.trim();
        if let Ok(n) = input.parse::<usize>() {
            if (1..=Self::ALL.len()).contains(&n) {
                return Some(Self::ALL[n - 1]);
            }
            return None;
        }
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(input))
    }

    /// Parse a subcategory the same way, against this category's list.
    pub fn parse_subtype(&self, input: &str) -> Option<&'static str> {
        let input = input.trim();
        let subtypes = self.subtypes();
        if let Ok(n) = input.parse::<usize>() {
            if (1..=subtypes.len()).contains(&n) {
                return Some(subtypes[n - 1]);
            }
            return None;
        }
        subtypes
            .iter()
            .copied()
            .find(|s| s.eq_ignore_ascii_case(input))
    }

    /// Numbered menu of all categories, one per line.
    pub fn menu() -> String {
        Self::ALL
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{}. `{}`", i + 1, c.name()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Numbered menu of this category's subcategories.
    pub fn subtype_menu(&self) -> String {
        self.subtypes()
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}. `{}`", i + 1, s))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
