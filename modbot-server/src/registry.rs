//! The case registry: sole owner of active and archived cases.
//!
//! Cases live in an arena keyed by case id with two secondary indexes: by
//! reporter (dialogue-phase cases only, enforcing one open dialogue per
//! reporter) and by content reference (duplicate detection and ticket
//! lookup). All mutation flows through the registry; the state machine and
//! the queue each check a case out, work on it, and check it back in.

use std::collections::{BTreeSet, HashMap};

use modbot_core::{Action, ContentRef, MessageId, UserId};

use crate::case::{Case, CaseId, CaseState, ResolvedTarget};

/// Prior moderation history carried into an appeal from the case(s) matching
/// its ticket.
#[derive(Debug, Clone, PartialEq)]
pub struct CarriedHistory {
    pub target: ResolvedTarget,
    pub severity: f64,
    pub actions: BTreeSet<Action>,
}

#[derive(Default)]
pub struct CaseRegistry {
    cases: HashMap<CaseId, Case>,
    /// Reporter -> their dialogue-phase case, if any.
    by_reporter: HashMap<UserId, CaseId>,
    /// Content reference -> active cases targeting it.
    by_content: HashMap<ContentRef, Vec<CaseId>>,
    archive: Vec<Case>,
}

impl CaseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn index(&mut self, case: &Case) {
        if case.state.in_dialogue() {
            self.by_reporter.insert(case.reporter, case.id);
        }
        if let Some(target) = &case.target {
            self.by_content.entry(target.content).or_default().push(case.id);
        }
    }

    fn unindex(&mut self, case: &Case) {
        if self.by_reporter.get(&case.reporter) == Some(&case.id) {
            self.by_reporter.remove(&case.reporter);
        }
        if let Some(target) = &case.target {
            if let Some(ids) = self.by_content.get_mut(&target.content) {
                ids.retain(|id| *id != case.id);
                if ids.is_empty() {
                    self.by_content.remove(&target.content);
                }
            }
        }
    }

    /// Insert a case into the active set.
    pub fn insert(&mut self, case: Case) -> CaseId {
        let id = case.id;
        self.index(&case);
        self.cases.insert(id, case);
        id
    }

    /// Check a case out for mutation. The caller must `put_back` (or drop)
    /// the case; indexes are rebuilt on re-insertion so state changes made
    /// while checked out are reflected.
    pub fn take(&mut self, id: CaseId) -> Option<Case> {
        let case = self.cases.remove(&id)?;
        self.unindex(&case);
        Some(case)
    }

    /// Check a case back in.
    pub fn put_back(&mut self, case: Case) {
        self.insert(case);
    }

    pub fn get(&self, id: CaseId) -> Option<&Case> {
        self.cases.get(&id)
    }

    /// Record the moderation-channel message representing a case.
    pub fn set_mod_message(&mut self, id: CaseId, message: MessageId) {
        if let Some(case) = self.cases.get_mut(&id) {
            case.mod_message = Some(message);
        }
    }

    /// The reporter's current dialogue-phase case, if any. Cases parked in
    /// `AwaitingModeration` do not count: the reporter may file again.
    pub fn dialogue_case_for(&self, reporter: UserId) -> Option<CaseId> {
        self.by_reporter.get(&reporter).copied()
    }

    /// All active cases awaiting moderation.
    pub fn awaiting_moderation(&self) -> impl Iterator<Item = &Case> {
        self.cases
            .values()
            .filter(|c| c.state == CaseState::AwaitingModeration)
    }

    /// Number of active awaiting-moderation cases targeting this content.
    pub fn duplicate_count(&self, content: &ContentRef) -> usize {
        self.by_content
            .get(content)
            .map(|ids| {
                ids.iter()
                    .filter(|id| {
                        self.cases
                            .get(id)
                            .is_some_and(|c| c.state == CaseState::AwaitingModeration)
                    })
                    .count()
            })
            .unwrap_or(0)
    }

    /// Whether any active case already targets this content. Used by the
    /// auto-report generator to avoid double-queueing a re-delivered message.
    pub fn has_active_case_for(&self, content: &ContentRef) -> bool {
        self.by_content.get(content).is_some_and(|ids| !ids.is_empty())
    }

    /// Remove and return every active case targeting this content, for the
    /// case closer to resolve together.
    pub fn take_active_for_content(&mut self, content: &ContentRef) -> Vec<Case> {
        let ids: Vec<CaseId> = self
            .by_content
            .get(content)
            .map(|ids| ids.clone())
            .unwrap_or_default();
        ids.into_iter().filter_map(|id| self.take(id)).collect()
    }

    /// Move a completed case into the archive.
    pub fn archive_case(&mut self, case: Case) {
        debug_assert!(case.state.is_terminal());
        self.archive.push(case);
    }

    pub fn archived(&self) -> &[Case] {
        &self.archive
    }

    pub fn active_count(&self) -> usize {
        self.cases.len()
    }

    /// Look up prior moderation history for an appeal ticket, across both
    /// active and archived cases. Matches by content reference; the result
    /// unions the actions of every match and carries the highest severity.
    pub fn find_history(&self, content: &ContentRef) -> Option<CarriedHistory> {
        let matches = self
            .cases
            .values()
            .chain(self.archive.iter())
            .filter_map(|c| {
                c.target
                    .as_ref()
                    .filter(|t| t.content == *content)
                    .map(|t| (c, t))
            });

        let mut history: Option<CarriedHistory> = None;
        for (case, target) in matches {
            match &mut history {
                None => {
                    history = Some(CarriedHistory {
                        target: target.clone(),
                        severity: case.severity,
                        actions: case.actions.clone(),
                    });
                }
                Some(h) => {
                    h.severity = h.severity.max(case.severity);
                    h.actions.extend(case.actions.iter().copied());
                }
            }
        }
        history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use modbot_core::{ChannelId, UserId};

    fn target(n: u64) -> ResolvedTarget {
        ResolvedTarget {
            content: ContentRef::new(1, 2, n),
            author: UserId(42),
            author_name: "author".to_string(),
            text: "text".to_string(),
        }
    }

    fn queued_case(reporter: u64, msg: u64) -> Case {
        let mut case = Case::new_report(UserId(reporter), "r", ChannelId(5), Utc::now());
        case.target = Some(target(msg));
        case.state = CaseState::AwaitingModeration;
        case
    }

    #[test]
    fn test_one_dialogue_case_per_reporter() {
        let mut registry = CaseRegistry::new();
        let case = Case::new_report(UserId(1), "alice", ChannelId(9), Utc::now());
        let id = registry.insert(case);

        assert_eq!(registry.dialogue_case_for(UserId(1)), Some(id));
        assert_eq!(registry.dialogue_case_for(UserId(2)), None);
    }

    #[test]
    fn test_awaiting_moderation_frees_the_reporter() {
        let mut registry = CaseRegistry::new();
        let case = Case::new_report(UserId(1), "alice", ChannelId(9), Utc::now());
        let id = registry.insert(case);

        let mut case = registry.take(id).unwrap();
        case.state = CaseState::AwaitingModeration;
        case.target = Some(target(7));
        registry.put_back(case);

        // The reporter can open a new dialogue while this one is queued.
        assert_eq!(registry.dialogue_case_for(UserId(1)), None);
        assert_eq!(registry.awaiting_moderation().count(), 1);
    }

    #[test]
    fn test_duplicate_count_only_counts_awaiting_moderation() {
        let mut registry = CaseRegistry::new();
        registry.insert(queued_case(1, 7));
        registry.insert(queued_case(2, 7));

        // A mid-dialogue case on the same content is not a queue duplicate.
        let mut dialogue = Case::new_report(UserId(3), "c", ChannelId(5), Utc::now());
        dialogue.target = Some(target(7));
        dialogue.state = CaseState::AwaitingComment;
        registry.insert(dialogue);

        assert_eq!(registry.duplicate_count(&ContentRef::new(1, 2, 7)), 2);
        assert_eq!(registry.duplicate_count(&ContentRef::new(1, 2, 8)), 0);
    }

    #[test]
    fn test_take_active_for_content_drains_duplicates() {
        let mut registry = CaseRegistry::new();
        registry.insert(queued_case(1, 7));
        registry.insert(queued_case(2, 7));
        registry.insert(queued_case(3, 8));

        let taken = registry.take_active_for_content(&ContentRef::new(1, 2, 7));
        assert_eq!(taken.len(), 2);
        assert_eq!(registry.active_count(), 1);
        assert_eq!(registry.duplicate_count(&ContentRef::new(1, 2, 7)), 0);
    }

    #[test]
    fn test_find_history_unions_actions_across_archive() {
        let mut registry = CaseRegistry::new();

        let mut first = queued_case(1, 7);
        first.record_action(Action::HideMessage);
        first.severity = 0.4;
        first.state = CaseState::Complete;
        registry.archive_case(first);

        let mut second = queued_case(2, 7);
        second.record_action(Action::SuspendUser);
        second.severity = 0.9;
        registry.insert(second);

        let history = registry.find_history(&ContentRef::new(1, 2, 7)).unwrap();
        assert_eq!(history.severity, 0.9);
        assert!(history.actions.contains(&Action::HideMessage));
        assert!(history.actions.contains(&Action::SuspendUser));
    }

    #[test]
    fn test_find_history_misses_unknown_ticket() {
        let registry = CaseRegistry::new();
        assert_eq!(registry.find_history(&ContentRef::new(9, 9, 9)), None);
    }
}
