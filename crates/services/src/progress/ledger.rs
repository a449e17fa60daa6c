use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use quiz_core::Clock;
use quiz_core::model::{
    CorrectQuestionSet, CorrectQuestions, ModuleId, ModuleProgress, ProgressMap, QuestionId,
    StoredStats,
};
use quiz_core::score::rounded_percent;
use storage::KeyValueStore;

use super::migration::{GateOutcome, VersionGate, keys, write_empty_ledger};
use super::snapshot::ProgressSnapshot;
use crate::error::LedgerError;

/// Question count per module, as known to the caller at render time.
pub type ModuleTotals = BTreeMap<ModuleId, usize>;

/// Sole owner of persisted progress: module completion, correct-question
/// sets and lifetime stats.
///
/// Constructed once per process and shared by handle; every read goes to the
/// store.
#[derive(Clone)]
pub struct ProgressLedger {
    store: KeyValueStore,
    clock: Clock,
}

impl ProgressLedger {
    /// Open the ledger, running the version gate first.
    pub async fn open(store: KeyValueStore, clock: Clock) -> (Self, GateOutcome) {
        Self::open_with_gate(store, clock, VersionGate::default()).await
    }

    /// Open the ledger against an explicit gate.
    pub async fn open_with_gate(
        store: KeyValueStore,
        clock: Clock,
        gate: VersionGate,
    ) -> (Self, GateOutcome) {
        let outcome = gate.run(&store).await;
        let ledger = Self { store, clock };
        ledger.ensure_initialised().await;
        (ledger, outcome)
    }

    async fn ensure_initialised(&self) {
        if self.store.get::<ProgressMap>(keys::PROGRESS).await.is_none() {
            self.store.put(keys::PROGRESS, &ProgressMap::new()).await;
        }
        if self.store.get::<StoredStats>(keys::STATS).await.is_none() {
            self.store.put(keys::STATS, &StoredStats::default()).await;
        }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }
}

//
// ─── MODULE COMPLETION ───────────────────────────────────────────────────────
//

impl ProgressLedger {
    /// Mark `module` completed now. Returns `false` if the write failed.
    pub async fn mark_module_completed(&self, module: &ModuleId) -> bool {
        let now = self.clock.now();
        let mut progress = self.all_progress().await;
        progress
            .entry(module.clone())
            .and_modify(|entry| entry.mark_completed(now))
            .or_insert_with(|| ModuleProgress::completed_at(now));
        debug!(module = %module, "module marked completed");
        self.store.put(keys::PROGRESS, &progress).await
    }

    pub async fn is_module_completed(&self, module: &str) -> bool {
        self.module_progress(module)
            .await
            .is_some_and(|entry| entry.is_completed())
    }

    pub async fn module_progress(&self, module: &str) -> Option<ModuleProgress> {
        self.all_progress().await.remove(module)
    }

    pub async fn all_progress(&self) -> ProgressMap {
        self.store.get_or_default(keys::PROGRESS).await
    }

    /// Completed modules over `total_modules`, in percent; 0 when there are no modules.
    pub async fn completion_rate_percent(&self, total_modules: usize) -> u8 {
        let completed = self
            .all_progress()
            .await
            .values()
            .filter(|entry| entry.is_completed())
            .count();
        rounded_percent(completed as u64, total_modules as u64)
    }
}

//
// ─── CORRECT QUESTIONS ───────────────────────────────────────────────────────
//

impl ProgressLedger {
    /// Add `question` to the module's correct set. Repeats are no-ops and
    /// existing entries keep their order.
    ///
    /// Returns whether the set grew.
    pub async fn record_correct_question(&self, module: &ModuleId, question: QuestionId) -> bool {
        let mut book = self.all_correct_questions().await;
        if !book.record(module, question) {
            return false;
        }
        self.store.put(keys::CORRECT_QUESTIONS, &book).await
    }

    pub async fn is_question_correct(&self, module: &str, question: &QuestionId) -> bool {
        self.all_correct_questions()
            .await
            .get(module)
            .is_some_and(|set| set.contains(question))
    }

    pub async fn correct_questions(&self, module: &str) -> CorrectQuestionSet {
        self.all_correct_questions()
            .await
            .get(module)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn all_correct_questions(&self) -> CorrectQuestions {
        self.store.get_or_default(keys::CORRECT_QUESTIONS).await
    }

    /// Distinct correct questions over `total_questions`; 0 when the module has no questions.
    pub async fn module_progress_percent(&self, module: &str, total_questions: usize) -> u8 {
        if total_questions == 0 {
            return 0;
        }
        let correct = self.all_correct_questions().await.count(module);
        rounded_percent(correct as u64, total_questions as u64)
    }

    /// Weighted progress across the listed modules: summed correct counts over
    /// summed totals. Modules not listed in `totals` count for nothing.
    pub async fn aggregate_progress_percent(&self, totals: &ModuleTotals) -> u8 {
        let book = self.all_correct_questions().await;
        let (correct, total) = totals
            .iter()
            .fold((0_u64, 0_u64), |(correct, total), (module, count)| {
                (
                    correct + book.count(module.as_str()) as u64,
                    total + *count as u64,
                )
            });
        rounded_percent(correct, total)
    }

    /// Items mastered across every module, independent of any denominator.
    pub async fn total_correct_count(&self) -> usize {
        self.all_correct_questions().await.total()
    }
}

//
// ─── STATS ───────────────────────────────────────────────────────────────────
//

impl ProgressLedger {
    /// Fold one finished session into the lifetime stats, stamping today's date.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Stats` if `correct > attempted`; nothing is written.
    pub async fn append_session_result(
        &self,
        attempted: u64,
        correct: u64,
        elapsed_seconds: u64,
    ) -> Result<(), LedgerError> {
        let mut stats = self.stats().await;
        stats.append_session(attempted, correct, elapsed_seconds, self.clock.today())?;
        if !self.store.put(keys::STATS, &stats).await {
            warn!("session result was not persisted");
        }
        Ok(())
    }

    pub async fn stats(&self) -> StoredStats {
        self.store.get_or_default(keys::STATS).await
    }

    pub async fn lifetime_accuracy_percent(&self) -> u8 {
        self.stats().await.accuracy_percent()
    }
}

//
// ─── RESET / SNAPSHOT ────────────────────────────────────────────────────────
//

impl ProgressLedger {
    /// Wipe progress, correct sets and stats. Returns `false` if any write failed.
    pub async fn reset_all(&self) -> bool {
        info!("resetting all progress");
        write_empty_ledger(&self.store).await
    }

    pub async fn export_snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            progress: Some(self.all_progress().await),
            stats: Some(self.stats().await),
            correct_questions: Some(self.all_correct_questions().await),
            export_time: Some(self.clock.now()),
        }
    }

    /// Write whichever parts of `snapshot` are present. Returns `false` if any write failed.
    pub async fn import_snapshot(&self, snapshot: &ProgressSnapshot) -> bool {
        let mut ok = true;
        if let Some(progress) = &snapshot.progress {
            ok &= self.store.put(keys::PROGRESS, progress).await;
        }
        if let Some(stats) = &snapshot.stats {
            ok &= self.store.put(keys::STATS, stats).await;
        }
        if let Some(correct) = &snapshot.correct_questions {
            ok &= self.store.put(keys::CORRECT_QUESTIONS, correct).await;
        }
        info!(ok, "imported progress snapshot");
        ok
    }
}
