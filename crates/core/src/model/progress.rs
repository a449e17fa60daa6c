use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ids::{ModuleId, QuestionId};

/// Completion record for one module.
///
/// Timestamps persist as epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleProgress {
    #[serde(default)]
    completed: bool,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    completed_at: Option<DateTime<Utc>>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    last_update: DateTime<Utc>,
}

impl ModuleProgress {
    /// A freshly completed module.
    #[must_use]
    pub fn completed_at(at: DateTime<Utc>) -> Self {
        Self {
            completed: true,
            completed_at: Some(at),
            last_update: at,
        }
    }

    /// Marks the module completed at `at`.
    ///
    /// Re-completing overwrites both timestamps; the flag itself never flips back.
    pub fn mark_completed(&mut self, at: DateTime<Utc>) {
        self.completed = true;
        self.completed_at = Some(at);
        self.last_update = at;
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn first_completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn last_update(&self) -> DateTime<Utc> {
        self.last_update
    }
}

/// Persisted `progress` map: module id to completion record.
pub type ProgressMap = BTreeMap<ModuleId, ModuleProgress>;

/// Insertion-ordered set of question ids answered correctly at least once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrectQuestionSet(Vec<QuestionId>);

impl CorrectQuestionSet {
    /// Appends `id` unless already present. Returns whether the set grew.
    pub fn insert(&mut self, id: QuestionId) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.0.push(id);
        true
    }

    #[must_use]
    pub fn contains(&self, id: &QuestionId) -> bool {
        self.0.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QuestionId> {
        self.0.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[QuestionId] {
        &self.0
    }
}

/// Persisted `correct_questions` map: one correct set per module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrectQuestions(BTreeMap<ModuleId, CorrectQuestionSet>);

impl CorrectQuestions {
    /// Records `question` as answered correctly in `module`. Returns whether anything changed.
    pub fn record(&mut self, module: &ModuleId, question: QuestionId) -> bool {
        self.0.entry(module.clone()).or_default().insert(question)
    }

    #[must_use]
    pub fn get(&self, module: &str) -> Option<&CorrectQuestionSet> {
        self.0.get(module)
    }

    /// Number of distinct correct questions in `module` (0 if none recorded).
    #[must_use]
    pub fn count(&self, module: &str) -> usize {
        self.get(module).map_or(0, CorrectQuestionSet::len)
    }

    /// Sum of all correct-set sizes.
    #[must_use]
    pub fn total(&self) -> usize {
        self.0.values().map(CorrectQuestionSet::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ModuleId, &CorrectQuestionSet)> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn correct_set_is_idempotent_union_preserving_order() {
        let mut set = CorrectQuestionSet::default();
        assert!(set.insert(QuestionId::from("b")));
        assert!(set.insert(QuestionId::from("a")));
        assert!(!set.insert(QuestionId::from("b")));
        assert!(set.insert(QuestionId::from("c")));
        assert!(!set.insert(QuestionId::from("a")));

        let ids: Vec<_> = set.iter().map(QuestionId::as_str).collect();
        assert_eq!(ids, ["b", "a", "c"]);
    }

    #[test]
    fn counts_per_module_and_total() {
        let mut book = CorrectQuestions::default();
        let idioms = ModuleId::new("idiom-body");
        let poems = ModuleId::new("poems");
        book.record(&idioms, QuestionId::from(1_u64));
        book.record(&idioms, QuestionId::from("1"));
        book.record(&idioms, QuestionId::from(2_u64));
        book.record(&poems, QuestionId::from("jing-ye-si"));

        assert_eq!(book.count("idiom-body"), 2);
        assert_eq!(book.count("poems"), 1);
        assert_eq!(book.count("missing"), 0);
        assert_eq!(book.total(), 3);
    }

    #[test]
    fn recompletion_overwrites_timestamps() {
        let first = fixed_now();
        let later = first + Duration::hours(3);
        let mut progress = ModuleProgress::completed_at(first);
        progress.mark_completed(later);

        assert!(progress.is_completed());
        assert_eq!(progress.first_completed_at(), Some(later));
        assert_eq!(progress.last_update(), later);
    }

    #[test]
    fn progress_persists_millisecond_timestamps() {
        let progress = ModuleProgress::completed_at(fixed_now());
        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "completed": true,
                "completedAt": 1_700_000_000_000_i64,
                "lastUpdate": 1_700_000_000_000_i64
            })
        );
    }
}
