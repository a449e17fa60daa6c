#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod progress;
pub mod quiz;
pub mod sessions;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, CatalogError, DataLoadError, LedgerError, SessionError};
pub use progress::{
    DATA_VERSION, GateOutcome, ModuleTotals, ProgressLedger, ProgressSnapshot, VersionGate,
};
pub use quiz::{
    Category, ModuleCatalog, QuestionSource, QuestionView, QuizKind, QuizModule, QuizType,
};
pub use sessions::{
    ModuleOverview, PracticeService, ScorerStep, SessionProgress, SessionScorer, StartedSession,
};
