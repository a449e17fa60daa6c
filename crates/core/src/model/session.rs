use chrono::{DateTime, Utc};

use crate::model::ModuleId;
use crate::score::rounded_percent;
use crate::time::whole_seconds_between;

/// Coarse grading of a session's accuracy, used to colour the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Good,
    Ok,
    NeedsPractice,
}

impl ScoreBand {
    #[must_use]
    pub fn from_accuracy(percent: u8) -> Self {
        match percent {
            80.. => ScoreBand::Good,
            60..=79 => ScoreBand::Ok,
            _ => ScoreBand::NeedsPractice,
        }
    }
}

/// Final tally of a completed practice session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    module_id: ModuleId,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    correct_count: u32,
    wrong_count: u32,
}

impl SessionSummary {
    #[must_use]
    pub fn from_tally(
        module_id: ModuleId,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        correct_count: u32,
        wrong_count: u32,
    ) -> Self {
        Self {
            module_id,
            started_at,
            completed_at,
            correct_count,
            wrong_count,
        }
    }

    #[must_use]
    pub fn module_id(&self) -> &ModuleId {
        &self.module_id
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    /// Answers given, correct or not. Questions skipped over do not count.
    #[must_use]
    pub fn questions_answered(&self) -> u32 {
        self.correct_count.saturating_add(self.wrong_count)
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn wrong_count(&self) -> u32 {
        self.wrong_count
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        whole_seconds_between(self.started_at, self.completed_at)
    }

    /// 0 when nothing was answered.
    #[must_use]
    pub fn accuracy_percent(&self) -> u8 {
        rounded_percent(
            u64::from(self.correct_count),
            u64::from(self.questions_answered()),
        )
    }

    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.accuracy_percent() == 100
    }

    #[must_use]
    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_accuracy(self.accuracy_percent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn summary(correct: u32, wrong: u32) -> SessionSummary {
        let start = fixed_now();
        SessionSummary::from_tally(
            ModuleId::new("poems"),
            start,
            start + Duration::seconds(95),
            correct,
            wrong,
        )
    }

    #[test]
    fn all_correct_is_perfect() {
        let s = summary(3, 0);
        assert_eq!(s.questions_answered(), 3);
        assert_eq!(s.accuracy_percent(), 100);
        assert!(s.is_perfect());
        assert_eq!(s.band(), ScoreBand::Good);
    }

    #[test]
    fn no_answers_claims_no_accuracy() {
        let s = summary(0, 0);
        assert_eq!(s.accuracy_percent(), 0);
        assert!(!s.is_perfect());
        assert_eq!(s.band(), ScoreBand::NeedsPractice);
    }

    #[test]
    fn mixed_tally_rounds_and_bands() {
        let s = summary(2, 1);
        assert_eq!(s.accuracy_percent(), 67);
        assert_eq!(s.band(), ScoreBand::Ok);
        assert_eq!(s.elapsed_seconds(), 95);
        assert_eq!(summary(4, 1).band(), ScoreBand::Good);
        assert_eq!(summary(1, 1).band(), ScoreBand::NeedsPractice);
    }
}
