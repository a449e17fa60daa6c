use std::sync::Arc;

use tracing::info;

use quiz_core::Clock;
use storage::{KeyValueStore, Storage};

use crate::error::AppServicesError;
use crate::progress::{GateOutcome, ProgressLedger};
use crate::quiz::{ModuleCatalog, QuestionSource};
use crate::sessions::PracticeService;

/// Assembles app-facing services around a single ledger instance.
#[derive(Clone)]
pub struct AppServices {
    ledger: Arc<ProgressLedger>,
    practice: Arc<PracticeService>,
    gate: GateOutcome,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        namespace: &str,
        clock: Clock,
        catalog: ModuleCatalog,
        source: Arc<dyn QuestionSource>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, namespace, clock, catalog, source).await)
    }

    /// Build services over an existing storage handle. Runs the version gate.
    pub async fn from_storage(
        storage: &Storage,
        namespace: &str,
        clock: Clock,
        catalog: ModuleCatalog,
        source: Arc<dyn QuestionSource>,
    ) -> Self {
        let store = KeyValueStore::from_storage(storage, namespace);
        let (ledger, gate) = ProgressLedger::open(store, clock).await;
        if gate.was_reset() {
            info!(?gate, "progress store initialised");
        }
        let ledger = Arc::new(ledger);
        let practice = Arc::new(PracticeService::new(
            Arc::new(catalog),
            source,
            Arc::clone(&ledger),
        ));
        Self {
            ledger,
            practice,
            gate,
        }
    }

    #[must_use]
    pub fn ledger(&self) -> Arc<ProgressLedger> {
        Arc::clone(&self.ledger)
    }

    #[must_use]
    pub fn practice(&self) -> Arc<PracticeService> {
        Arc::clone(&self.practice)
    }

    #[must_use]
    pub fn catalog(&self) -> &ModuleCatalog {
        self.practice.catalog()
    }

    /// What the version gate did when these services were built.
    #[must_use]
    pub fn gate_outcome(&self) -> GateOutcome {
        self.gate
    }
}
