use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use quiz_core::model::ModuleId;

use super::scorer::SessionScorer;
use crate::error::SessionError;
use crate::progress::{ModuleTotals, ProgressLedger};
use crate::quiz::{ModuleCatalog, QuestionSource, QuizKind, QuizModule};

/// A freshly started session with the quiz type that plays it.
pub struct StartedSession {
    pub module: QuizModule,
    pub kind: Arc<dyn QuizKind>,
    pub scorer: SessionScorer,
}

/// One catalog entry with its persisted progress, for the module grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleOverview {
    pub module: QuizModule,
    pub completed: bool,
    /// `None` when the module's questions could not be loaded.
    pub total_questions: Option<usize>,
    pub percent: u8,
}

/// Wires catalog, question data and ledger together to start sessions.
#[derive(Clone)]
pub struct PracticeService {
    catalog: Arc<ModuleCatalog>,
    source: Arc<dyn QuestionSource>,
    ledger: Arc<ProgressLedger>,
}

impl PracticeService {
    #[must_use]
    pub fn new(
        catalog: Arc<ModuleCatalog>,
        source: Arc<dyn QuestionSource>,
        ledger: Arc<ProgressLedger>,
    ) -> Self {
        Self {
            catalog,
            source,
            ledger,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &ModuleCatalog {
        &self.catalog
    }

    /// Load the module's questions and start a shuffled session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownModule` for ids missing from the catalog,
    /// `SessionError::DataLoad` when question data cannot be loaded, and
    /// `SessionError::Empty` when the module has no questions.
    pub async fn start_session(&self, module_id: &str) -> Result<StartedSession, SessionError> {
        let module = self
            .catalog
            .module(module_id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownModule(module_id.to_owned()))?;
        let kind = module.quiz_type.kind();
        let questions = kind
            .load_questions(self.source.as_ref(), &module.data_key)
            .await?;
        let scorer =
            SessionScorer::start(module.id.clone(), questions, Arc::clone(&self.ledger))?;
        Ok(StartedSession {
            module,
            kind,
            scorer,
        })
    }

    async fn question_counts(&self) -> HashMap<ModuleId, Option<usize>> {
        let mut counts = HashMap::new();
        for module in self.catalog.modules() {
            let loaded = module
                .quiz_type
                .kind()
                .load_questions(self.source.as_ref(), &module.data_key)
                .await;
            let count = match loaded {
                Ok(questions) => Some(questions.len()),
                Err(err) => {
                    warn!(module = %module.id, error = %err, "skipping module with unloadable data");
                    None
                }
            };
            counts.insert(module.id.clone(), count);
        }
        counts
    }

    /// Question counts for every module whose data loads.
    pub async fn module_totals(&self) -> ModuleTotals {
        self.question_counts()
            .await
            .into_iter()
            .filter_map(|(id, count)| count.map(|count| (id, count)))
            .collect()
    }

    /// Catalog order, with completion and percent for each module.
    pub async fn module_overview(&self) -> Vec<ModuleOverview> {
        let counts = self.question_counts().await;
        let mut overview = Vec::with_capacity(counts.len());
        for module in self.catalog.modules() {
            let total_questions = counts.get(&module.id).copied().flatten();
            let percent = self
                .ledger
                .module_progress_percent(module.id.as_str(), total_questions.unwrap_or(0))
                .await;
            overview.push(ModuleOverview {
                completed: self.ledger.is_module_completed(module.id.as_str()).await,
                module: module.clone(),
                total_questions,
                percent,
            });
        }
        overview
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::Question;
    use quiz_core::time::fixed_clock;
    use storage::{DEFAULT_NAMESPACE, InMemoryBackend, KeyValueStore};

    use crate::quiz::{Category, CategoryGroup, InMemoryQuestionSource, QuizType};

    fn catalog() -> ModuleCatalog {
        let module = |id: &str, quiz_type, data_key: &str| QuizModule {
            id: ModuleId::new(id),
            title: id.to_owned(),
            desc: String::new(),
            quiz_type,
            data_key: data_key.to_owned(),
        };
        ModuleCatalog::new(vec![CategoryGroup {
            category: Category::Daily,
            modules: vec![
                module("unity", QuizType::PoemFill, "unity"),
                module("polyphones", QuizType::Polyphone, "polyphones"),
                module("empty", QuizType::PoemFill, "nothing"),
            ],
        }])
        .unwrap()
    }

    async fn service() -> (Arc<ProgressLedger>, PracticeService) {
        let store = KeyValueStore::new(Arc::new(InMemoryBackend::new()), DEFAULT_NAMESPACE);
        let (ledger, _) = ProgressLedger::open(store, fixed_clock()).await;
        let ledger = Arc::new(ledger);
        let source = InMemoryQuestionSource::new()
            .with_set(
                "unity",
                vec![
                    Question::new("u1", "人心齐，____", "泰山移"),
                    Question::new("u2", "众人拾柴____", "火焰高"),
                ],
            )
            .with_set("nothing", Vec::new());
        let service = PracticeService::new(
            Arc::new(catalog()),
            Arc::new(source),
            Arc::clone(&ledger),
        );
        (ledger, service)
    }

    #[tokio::test]
    async fn start_reports_unknown_missing_and_empty() {
        let (_, service) = service().await;
        assert!(matches!(
            service.start_session("nope").await,
            Err(SessionError::UnknownModule(id)) if id == "nope"
        ));
        assert!(matches!(
            service.start_session("polyphones").await,
            Err(SessionError::DataLoad(_))
        ));
        assert!(matches!(
            service.start_session("empty").await,
            Err(SessionError::Empty)
        ));
    }

    #[tokio::test]
    async fn started_session_uses_catalog_type() {
        let (_, service) = service().await;
        let started = service.start_session("unity").await.unwrap();
        assert_eq!(started.kind.quiz_type(), QuizType::PoemFill);
        assert_eq!(started.scorer.total(), 2);
        assert_eq!(started.module.id.as_str(), "unity");
    }

    #[tokio::test]
    async fn overview_and_totals_skip_unloadable_modules() {
        let (ledger, service) = service().await;
        ledger
            .record_correct_question(&ModuleId::new("unity"), "u1".into())
            .await;

        let totals = service.module_totals().await;
        assert_eq!(totals.get("unity"), Some(&2));
        assert_eq!(totals.get("empty"), Some(&0));
        assert!(!totals.contains_key("polyphones"));
        assert_eq!(ledger.aggregate_progress_percent(&totals).await, 50);

        let overview = service.module_overview().await;
        assert_eq!(overview.len(), 3);
        assert_eq!(overview[0].percent, 50);
        assert_eq!(overview[0].total_questions, Some(2));
        assert_eq!(overview[1].total_questions, None);
        assert_eq!(overview[1].percent, 0);
        assert!(!overview[0].completed);
    }
}
