use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use quiz_core::model::Question;

use crate::error::DataLoadError;

/// Where question records come from, addressed by a module's data key.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Load every question stored under `data_key`, in file order.
    ///
    /// # Errors
    ///
    /// Returns `DataLoadError` if the data is missing, unreadable or malformed.
    async fn load(&self, data_key: &str) -> Result<Vec<Question>, DataLoadError>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum QuestionFile {
    Wrapped { questions: Vec<Question> },
    Bare(Vec<Question>),
}

impl QuestionFile {
    fn into_questions(self) -> Vec<Question> {
        match self {
            QuestionFile::Wrapped { questions } | QuestionFile::Bare(questions) => questions,
        }
    }
}

/// Reads `<root>/<data_key>.json`, either `{"questions": [...]}` or a bare array.
#[derive(Debug, Clone)]
pub struct JsonDirectorySource {
    root: PathBuf,
}

impl JsonDirectorySource {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, data_key: &str) -> Result<PathBuf, DataLoadError> {
        let valid = !data_key.is_empty()
            && data_key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(DataLoadError::InvalidKey {
                data_key: data_key.to_owned(),
            });
        }
        Ok(self.root.join(format!("{data_key}.json")))
    }
}

#[async_trait]
impl QuestionSource for JsonDirectorySource {
    async fn load(&self, data_key: &str) -> Result<Vec<Question>, DataLoadError> {
        let path = self.path_for(data_key)?;
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(DataLoadError::NotFound {
                    data_key: data_key.to_owned(),
                });
            }
            Err(source) => {
                return Err(DataLoadError::Io {
                    data_key: data_key.to_owned(),
                    source,
                });
            }
        };
        let file: QuestionFile =
            serde_json::from_str(&raw).map_err(|source| DataLoadError::Parse {
                data_key: data_key.to_owned(),
                source,
            })?;
        let questions = file.into_questions();
        debug!(data_key, path = %path.display(), count = questions.len(), "loaded questions");
        Ok(questions)
    }
}

/// Fixed question sets held in memory, for tests and prototyping.
#[derive(Debug, Clone, Default)]
pub struct InMemoryQuestionSource {
    sets: HashMap<String, Vec<Question>>,
}

impl InMemoryQuestionSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_set(mut self, data_key: impl Into<String>, questions: Vec<Question>) -> Self {
        self.sets.insert(data_key.into(), questions);
        self
    }
}

#[async_trait]
impl QuestionSource for InMemoryQuestionSource {
    async fn load(&self, data_key: &str) -> Result<Vec<Question>, DataLoadError> {
        self.sets
            .get(data_key)
            .cloned()
            .ok_or_else(|| DataLoadError::NotFound {
                data_key: data_key.to_owned(),
            })
    }
}
