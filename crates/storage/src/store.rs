use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::repository::{KeyValueBackend, Storage};

/// Key prefix used when no namespace is configured.
pub const DEFAULT_NAMESPACE: &str = "g3_chinese_";

/// Namespaced JSON view over a raw key-value backend.
///
/// Persistence faults never reach callers: writes report `false`, reads fall
/// back to the caller's default, and the fault is logged. There is no cache;
/// every read goes to the backend.
#[derive(Clone)]
pub struct KeyValueStore {
    backend: Arc<dyn KeyValueBackend>,
    namespace: String,
}

impl KeyValueStore {
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueBackend>, namespace: impl Into<String>) -> Self {
        Self {
            backend,
            namespace: namespace.into(),
        }
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, namespace: impl Into<String>) -> Self {
        Self::new(Arc::clone(&storage.backend), namespace)
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Full backend key for `key`.
    #[must_use]
    pub fn namespaced(&self, key: &str) -> String {
        format!("{}{key}", self.namespace)
    }

    /// Serialize `value` and store it under `key`. Returns `false` on any fault.
    pub async fn put<T>(&self, key: &str, value: &T) -> bool
    where
        T: Serialize + Sync + ?Sized,
    {
        let full_key = self.namespaced(key);
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(err) => {
                error!(key = %full_key, error = %err, "failed to serialize value");
                return false;
            }
        };
        match self.backend.write(&full_key, &json).await {
            Ok(()) => {
                debug!(key = %full_key, bytes = json.len(), "stored value");
                true
            }
            Err(err) => {
                error!(key = %full_key, error = %err, "failed to store value");
                false
            }
        }
    }

    /// Read and deserialize `key`; `None` if missing, empty, unreadable or malformed.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let full_key = self.namespaced(key);
        let raw = match self.backend.read(&full_key).await {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return None,
            Err(err) => {
                warn!(key = %full_key, error = %err, "failed to read value");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key = %full_key, error = %err, "stored value is malformed; using default");
                None
            }
        }
    }

    /// Like [`KeyValueStore::get`], returning `default` in every fallback case.
    pub async fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).await.unwrap_or(default)
    }

    /// [`KeyValueStore::get`] with `T::default()` as the fallback.
    pub async fn get_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        self.get(key).await.unwrap_or_default()
    }

    /// Delete `key`. Returns `false` on any fault.
    pub async fn remove(&self, key: &str) -> bool {
        let full_key = self.namespaced(key);
        match self.backend.delete(&full_key).await {
            Ok(()) => true,
            Err(err) => {
                error!(key = %full_key, error = %err, "failed to remove value");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryBackend;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Sample {
        count: u32,
    }

    fn store() -> (InMemoryBackend, KeyValueStore) {
        let backend = InMemoryBackend::new();
        let store = KeyValueStore::new(Arc::new(backend.clone()), DEFAULT_NAMESPACE);
        (backend, store)
    }

    #[tokio::test]
    async fn writes_under_namespaced_key() {
        let (backend, store) = store();
        assert!(store.put("stats", &Sample { count: 3 }).await);

        let raw = backend.raw_entries().unwrap();
        assert_eq!(raw.get("g3_chinese_stats").map(String::as_str), Some(r#"{"count":3}"#));
        assert_eq!(store.get::<Sample>("stats").await, Some(Sample { count: 3 }));
    }

    #[tokio::test]
    async fn missing_empty_and_malformed_values_fall_back() {
        let (backend, store) = store();
        assert_eq!(store.get_or("stats", Sample { count: 9 }).await, Sample { count: 9 });

        backend.write("g3_chinese_stats", "").await.unwrap();
        assert_eq!(store.get::<Sample>("stats").await, None);

        backend.write("g3_chinese_stats", "{not json").await.unwrap();
        assert_eq!(store.get_or_default::<Sample>("stats").await, Sample::default());

        backend.write("g3_chinese_stats", r#"{"count":"three"}"#).await.unwrap();
        assert_eq!(store.get::<Sample>("stats").await, None);
    }

    #[tokio::test]
    async fn write_faults_are_reported_not_raised() {
        let (backend, store) = store();
        assert!(store.put("stats", &Sample { count: 1 }).await);
        backend.set_read_only(true);

        assert!(!store.put("stats", &Sample { count: 2 }).await);
        assert!(!store.remove("stats").await);
        assert_eq!(store.get::<Sample>("stats").await, Some(Sample { count: 1 }));
    }

    #[tokio::test]
    async fn namespaces_do_not_collide() {
        let backend = Arc::new(InMemoryBackend::new());
        let a = KeyValueStore::new(backend.clone(), "a_");
        let b = KeyValueStore::new(backend, "b_");

        assert!(a.put("data_version", &1_u32).await);
        assert_eq!(b.get::<u32>("data_version").await, None);
        assert!(b.remove("data_version").await);
        assert_eq!(a.get::<u32>("data_version").await, Some(1));
    }
}
