use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quiz_core::model::{CorrectQuestions, ProgressMap, StoredStats};

use crate::error::LedgerError;

/// Portable copy of the ledger for backup and transfer.
///
/// Every part is optional on import; absent parts leave the ledger untouched.
/// Stats that break `correctAnswers <= totalQuestions` are rejected while parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<ProgressMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<StoredStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_questions: Option<CorrectQuestions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_time: Option<DateTime<Utc>>,
}

impl ProgressSnapshot {
    /// # Errors
    ///
    /// Returns `LedgerError::Snapshot` if the JSON is malformed or the stats are inconsistent.
    pub fn from_json(json: &str) -> Result<Self, LedgerError> {
        Ok(serde_json::from_str(json)?)
    }

    /// # Errors
    ///
    /// Returns `LedgerError::Snapshot` if serialization fails.
    pub fn to_json(&self) -> Result<String, LedgerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_inconsistent_stats() {
        let err = ProgressSnapshot::from_json(
            r#"{"stats":{"totalQuestions":1,"correctAnswers":5,"totalTime":0}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::Snapshot(_)));
    }

    #[test]
    fn empty_object_is_an_empty_snapshot() {
        let snapshot = ProgressSnapshot::from_json("{}").unwrap();
        assert_eq!(snapshot, ProgressSnapshot::default());
    }
}
