use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::score::rounded_percent;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StatsError {
    #[error("correct answers ({correct}) exceed questions attempted ({total})")]
    CorrectExceedsTotal { correct: u64, total: u64 },
}

/// Lifetime study totals, accumulated one finished session at a time.
///
/// Persisted as `{"totalQuestions", "correctAnswers", "totalTime", "lastStudyDate"}`.
/// Counters only ever grow; `correct_answers <= total_questions` always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StoredStatsRecord")]
pub struct StoredStats {
    total_questions: u64,
    correct_answers: u64,
    total_time: u64,
    last_study_date: Option<NaiveDate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredStatsRecord {
    #[serde(default)]
    total_questions: u64,
    #[serde(default)]
    correct_answers: u64,
    #[serde(default)]
    total_time: u64,
    #[serde(default)]
    last_study_date: Option<NaiveDate>,
}

impl TryFrom<StoredStatsRecord> for StoredStats {
    type Error = StatsError;

    fn try_from(record: StoredStatsRecord) -> Result<Self, Self::Error> {
        Self::from_persisted(
            record.total_questions,
            record.correct_answers,
            record.total_time,
            record.last_study_date,
        )
    }
}

impl StoredStats {
    /// Rehydrate stats from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `StatsError::CorrectExceedsTotal` if the counters are inconsistent.
    pub fn from_persisted(
        total_questions: u64,
        correct_answers: u64,
        total_time: u64,
        last_study_date: Option<NaiveDate>,
    ) -> Result<Self, StatsError> {
        if correct_answers > total_questions {
            return Err(StatsError::CorrectExceedsTotal {
                correct: correct_answers,
                total: total_questions,
            });
        }
        Ok(Self {
            total_questions,
            correct_answers,
            total_time,
            last_study_date,
        })
    }

    /// Fold one finished session into the totals and stamp the study date.
    ///
    /// # Errors
    ///
    /// Returns `StatsError::CorrectExceedsTotal` if `correct > attempted`; the
    /// totals are left untouched in that case.
    pub fn append_session(
        &mut self,
        attempted: u64,
        correct: u64,
        elapsed_seconds: u64,
        studied_on: NaiveDate,
    ) -> Result<(), StatsError> {
        if correct > attempted {
            return Err(StatsError::CorrectExceedsTotal {
                correct,
                total: attempted,
            });
        }
        self.total_questions = self.total_questions.saturating_add(attempted);
        self.correct_answers = self.correct_answers.saturating_add(correct);
        self.total_time = self.total_time.saturating_add(elapsed_seconds);
        self.last_study_date = Some(studied_on);
        Ok(())
    }

    #[must_use]
    pub fn total_questions(&self) -> u64 {
        self.total_questions
    }

    #[must_use]
    pub fn correct_answers(&self) -> u64 {
        self.correct_answers
    }

    /// Cumulative study time in seconds.
    #[must_use]
    pub fn total_time(&self) -> u64 {
        self.total_time
    }

    #[must_use]
    pub fn last_study_date(&self) -> Option<NaiveDate> {
        self.last_study_date
    }

    /// Lifetime accuracy; 0 before any question has been answered.
    #[must_use]
    pub fn accuracy_percent(&self) -> u8 {
        rounded_percent(self.correct_answers, self.total_questions)
    }

    /// Whole days between the last study date and `today`, if any study happened.
    #[must_use]
    pub fn days_since_last_study(&self, today: NaiveDate) -> Option<i64> {
        self.last_study_date
            .map(|last| (today - last).num_days())
    }
}
