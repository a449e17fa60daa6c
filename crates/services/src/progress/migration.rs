use tracing::{info, warn};

use quiz_core::model::{CorrectQuestions, ProgressMap, StoredStats};
use storage::KeyValueStore;

/// Schema version of the JSON shapes the ledger stores.
pub const DATA_VERSION: u32 = 6;

pub(crate) mod keys {
    pub const DATA_VERSION: &str = "data_version";
    pub const PROGRESS: &str = "progress";
    pub const STATS: &str = "stats";
    pub const CORRECT_QUESTIONS: &str = "correct_questions";
}

/// What the gate found when it checked the stored schema version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// Stored version matched; nothing was touched.
    Current,
    /// Stored version was missing or different; all progress was wiped.
    Reset { found: Option<u32> },
}

impl GateOutcome {
    #[must_use]
    pub fn was_reset(self) -> bool {
        matches!(self, GateOutcome::Reset { .. })
    }
}

/// Destructive schema check run once when the ledger is opened.
///
/// There is no field-by-field upgrade: any version other than `current`
/// wipes progress, stats and correct sets, then records `current`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionGate {
    current: u32,
}

impl Default for VersionGate {
    fn default() -> Self {
        Self::new(DATA_VERSION)
    }
}

impl VersionGate {
    #[must_use]
    pub fn new(current: u32) -> Self {
        Self { current }
    }

    #[must_use]
    pub fn current(&self) -> u32 {
        self.current
    }

    pub async fn run(&self, store: &KeyValueStore) -> GateOutcome {
        let found = store.get::<u32>(keys::DATA_VERSION).await;
        if found == Some(self.current) {
            return GateOutcome::Current;
        }

        info!(
            found = ?found,
            current = self.current,
            "stored data version differs; resetting progress"
        );
        if write_empty_ledger(store).await {
            store.put(keys::DATA_VERSION, &self.current).await;
        } else {
            warn!(
                current = self.current,
                "progress reset incomplete; leaving data version unstamped"
            );
        }
        GateOutcome::Reset { found }
    }
}

/// Overwrite all three ledger structures with their empty shapes.
///
/// Returns `false` if any write failed.
pub(crate) async fn write_empty_ledger(store: &KeyValueStore) -> bool {
    let progress = store.put(keys::PROGRESS, &ProgressMap::new()).await;
    let stats = store.put(keys::STATS, &StoredStats::default()).await;
    let correct = store
        .put(keys::CORRECT_QUESTIONS, &CorrectQuestions::default())
        .await;
    progress && stats && correct
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use storage::{DEFAULT_NAMESPACE, InMemoryBackend, KeyValueBackend, StorageError};

    fn store() -> (InMemoryBackend, KeyValueStore) {
        let backend = InMemoryBackend::new();
        let store = KeyValueStore::new(Arc::new(backend.clone()), DEFAULT_NAMESPACE);
        (backend, store)
    }

    #[tokio::test]
    async fn fresh_store_is_initialised() {
        let (_backend, store) = store();
        let outcome = VersionGate::default().run(&store).await;

        assert_eq!(outcome, GateOutcome::Reset { found: None });
        assert_eq!(store.get::<u32>(keys::DATA_VERSION).await, Some(DATA_VERSION));
        assert_eq!(store.get::<ProgressMap>(keys::PROGRESS).await, Some(ProgressMap::new()));
        assert_eq!(store.get::<StoredStats>(keys::STATS).await, Some(StoredStats::default()));
    }

    #[tokio::test]
    async fn mismatch_wipes_then_matching_run_is_a_no_op() {
        let (backend, store) = store();
        backend
            .write("g3_chinese_data_version", "5")
            .await
            .unwrap();
        backend
            .write(
                "g3_chinese_correct_questions",
                r#"{"poems":["1","2"]}"#,
            )
            .await
            .unwrap();
        backend
            .write(
                "g3_chinese_stats",
                r#"{"totalQuestions":9,"correctAnswers":4,"totalTime":60,"lastStudyDate":"2026-10-01"}"#,
            )
            .await
            .unwrap();

        let outcome = VersionGate::default().run(&store).await;
        assert_eq!(outcome, GateOutcome::Reset { found: Some(5) });
        assert_eq!(
            store.get::<CorrectQuestions>(keys::CORRECT_QUESTIONS).await,
            Some(CorrectQuestions::default())
        );
        assert_eq!(store.get::<StoredStats>(keys::STATS).await, Some(StoredStats::default()));
        assert_eq!(store.get::<u32>(keys::DATA_VERSION).await, Some(DATA_VERSION));

        backend
            .write("g3_chinese_correct_questions", r#"{"poems":["7"]}"#)
            .await
            .unwrap();
        let outcome = VersionGate::default().run(&store).await;
        assert_eq!(outcome, GateOutcome::Current);
        let kept = store
            .get::<CorrectQuestions>(keys::CORRECT_QUESTIONS)
            .await
            .unwrap();
        assert_eq!(kept.count("poems"), 1);
    }

    /// Rejects writes to the stats key while `failing` is set.
    struct StatsWriteFault {
        inner: InMemoryBackend,
        failing: AtomicBool,
    }

    #[async_trait::async_trait]
    impl KeyValueBackend for StatsWriteFault {
        async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.read(key).await
        }

        async fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.failing.load(Ordering::SeqCst) && key.ends_with(keys::STATS) {
                return Err(StorageError::ReadOnly);
            }
            self.inner.write(key, value).await
        }

        async fn delete(&self, key: &str) -> Result<(), StorageError> {
            self.inner.delete(key).await
        }
    }

    #[tokio::test]
    async fn partial_reset_leaves_version_unstamped() {
        let backend = Arc::new(StatsWriteFault {
            inner: InMemoryBackend::new(),
            failing: AtomicBool::new(true),
        });
        backend.inner.write("g3_chinese_data_version", "5").await.unwrap();
        backend
            .inner
            .write(
                "g3_chinese_stats",
                r#"{"totalQuestions":9,"correctAnswers":4,"totalTime":60}"#,
            )
            .await
            .unwrap();
        let store = KeyValueStore::new(backend.clone(), DEFAULT_NAMESPACE);

        let outcome = VersionGate::default().run(&store).await;
        assert_eq!(outcome, GateOutcome::Reset { found: Some(5) });
        assert_eq!(store.get::<u32>(keys::DATA_VERSION).await, Some(5));

        backend.failing.store(false, Ordering::SeqCst);
        let outcome = VersionGate::default().run(&store).await;
        assert_eq!(outcome, GateOutcome::Reset { found: Some(5) });
        assert_eq!(store.get::<StoredStats>(keys::STATS).await, Some(StoredStats::default()));
        assert_eq!(store.get::<u32>(keys::DATA_VERSION).await, Some(DATA_VERSION));
    }

    #[tokio::test]
    async fn unreadable_version_counts_as_mismatch() {
        let (backend, store) = store();
        backend
            .write("g3_chinese_data_version", "\"six\"")
            .await
            .unwrap();
        let outcome = VersionGate::new(6).run(&store).await;
        assert_eq!(outcome, GateOutcome::Reset { found: None });
        assert!(outcome.was_reset());
    }
}
