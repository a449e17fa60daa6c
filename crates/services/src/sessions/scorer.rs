use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, error, info};

use quiz_core::Clock;
use quiz_core::model::{ModuleId, Outcome, Question, QuestionId, SessionSummary};

use super::progress::SessionProgress;
use crate::error::SessionError;
use crate::progress::ProgressLedger;

/// Result of moving past the current question.
#[must_use]
pub enum ScorerStep {
    /// More questions remain; keep answering with the returned scorer.
    Active(SessionScorer),
    /// The last question was passed; the outcome has been persisted.
    Complete(SessionSummary),
}

impl fmt::Debug for ScorerStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScorerStep::Active(scorer) => f.debug_tuple("Active").field(scorer).finish(),
            ScorerStep::Complete(summary) => f.debug_tuple("Complete").field(summary).finish(),
        }
    }
}

/// In-memory tally for one practice session over a module.
///
/// The scorer only exists while the session is active: `advance` consumes it
/// and hands back either the scorer for the next question or the final
/// summary, so nothing can be recorded once a session has completed. Dropping
/// a scorer abandons the session without touching the ledger, apart from the
/// correct-question ids already forwarded.
pub struct SessionScorer {
    module_id: ModuleId,
    questions: Vec<Question>,
    current: usize,
    /// Indices into `questions` that already have an outcome.
    answered: HashSet<usize>,
    correct_count: u32,
    wrong_count: u32,
    started_at: DateTime<Utc>,
    clock: Clock,
    ledger: Arc<ProgressLedger>,
}

impl SessionScorer {
    /// Start a session over `questions`, shuffled once.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if there are no questions.
    pub fn start(
        module_id: ModuleId,
        questions: Vec<Question>,
        ledger: Arc<ProgressLedger>,
    ) -> Result<Self, SessionError> {
        Self::start_with_rng(module_id, questions, ledger, &mut rand::rng())
    }

    /// Like [`SessionScorer::start`], shuffling with the given generator.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if there are no questions.
    pub fn start_with_rng<R: Rng + ?Sized>(
        module_id: ModuleId,
        mut questions: Vec<Question>,
        ledger: Arc<ProgressLedger>,
        rng: &mut R,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }
        questions.as_mut_slice().shuffle(rng);

        let clock = ledger.clock();
        debug!(module = %module_id, count = questions.len(), "session started");
        Ok(Self {
            module_id,
            questions,
            current: 0,
            answered: HashSet::new(),
            correct_count: 0,
            wrong_count: 0,
            started_at: clock.now(),
            clock,
            ledger,
        })
    }

    /// Use `clock` for the completion timestamp instead of the ledger's.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
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
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        // `current < questions.len()` for as long as the scorer exists.
        &self.questions[self.current]
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress::new(self.current, self.questions.len())
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn wrong_count(&self) -> u32 {
        self.wrong_count
    }

    /// Whether the current question already has an outcome this session.
    #[must_use]
    pub fn is_current_answered(&self) -> bool {
        self.answered.contains(&self.current)
    }

    /// Count a correct answer for the current question and, when the question
    /// is addressable, add it to the module's correct set.
    ///
    /// Returns `false` without counting if the question was already answered.
    pub async fn record_correct(&mut self, question: Option<QuestionId>) -> bool {
        if !self.answered.insert(self.current) {
            return false;
        }
        self.correct_count = self.correct_count.saturating_add(1);
        if let Some(question) = question {
            self.ledger
                .record_correct_question(&self.module_id, question)
                .await;
        }
        true
    }

    /// Returns `false` without counting if the question was already answered.
    pub fn record_wrong(&mut self) -> bool {
        if !self.answered.insert(self.current) {
            return false;
        }
        self.wrong_count = self.wrong_count.saturating_add(1);
        true
    }

    /// Record `outcome` against the current question. A question is scored at
    /// most once per session; repeats return `false`.
    pub async fn record_outcome(&mut self, outcome: Outcome) -> bool {
        match outcome {
            Outcome::Correct => {
                let id = self.current_question().id.clone();
                self.record_correct(Some(id)).await
            }
            Outcome::Wrong => self.record_wrong(),
        }
    }

    /// Step back one question. Returns `false` at the first question.
    pub fn retreat(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Move to the next question, or complete the session after the last one.
    ///
    /// Completion folds the tally into the ledger's stats and marks the
    /// module completed, exactly once.
    pub async fn advance(mut self) -> ScorerStep {
        if self.current + 1 < self.questions.len() {
            self.current += 1;
            return ScorerStep::Active(self);
        }

        let summary = SessionSummary::from_tally(
            self.module_id.clone(),
            self.started_at,
            self.clock.now(),
            self.correct_count,
            self.wrong_count,
        );
        if let Err(err) = self
            .ledger
            .append_session_result(
                u64::from(summary.questions_answered()),
                u64::from(summary.correct_count()),
                summary.elapsed_seconds(),
            )
            .await
        {
            error!(module = %self.module_id, error = %err, "failed to record session result");
        }
        self.ledger.mark_module_completed(&self.module_id).await;

        info!(
            module = %self.module_id,
            answered = summary.questions_answered(),
            correct = summary.correct_count(),
            accuracy = summary.accuracy_percent(),
            elapsed_secs = summary.elapsed_seconds(),
            "session completed"
        );
        ScorerStep::Complete(summary)
    }

    /// Walk away from the session; only already-forwarded correct ids remain.
    pub fn abandon(self) {
        debug!(
            module = %self.module_id,
            position = self.current + 1,
            total = self.questions.len(),
            "session abandoned"
        );
    }
}

impl fmt::Debug for SessionScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionScorer")
            .field("module_id", &self.module_id)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("answered", &self.answered.len())
            .field("correct_count", &self.correct_count)
            .field("wrong_count", &self.wrong_count)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}
