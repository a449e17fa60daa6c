//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::StatsError;
use storage::sqlite::SqliteInitError;

/// Question data for a module could not be loaded. The session never starts.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DataLoadError {
    #[error("no question data found for `{data_key}`")]
    NotFound { data_key: String },
    #[error("invalid data key `{data_key}`")]
    InvalidKey { data_key: String },
    #[error("failed to read question data for `{data_key}`: {source}")]
    Io {
        data_key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed question data for `{data_key}`: {source}")]
    Parse {
        data_key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("question data for `{data_key}` is unusable: {reason}")]
    Invalid { data_key: String, reason: String },
}

/// Errors emitted when starting a practice session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    Empty,
    #[error("unknown module `{0}`")]
    UnknownModule(String),
    #[error(transparent)]
    DataLoad(#[from] DataLoadError),
}

/// Errors emitted by the progress ledger.
///
/// Persistence faults are not among them; those are logged and absorbed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LedgerError {
    #[error(transparent)]
    Stats(#[from] StatsError),
    #[error("malformed progress snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Errors emitted while loading a module catalog.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("module id `{0}` appears more than once")]
    DuplicateModule(String),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
