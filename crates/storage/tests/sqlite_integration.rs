use std::sync::Arc;

use storage::repository::{KeyValueBackend, Storage};
use storage::sqlite::SqliteRepository;
use storage::store::{DEFAULT_NAMESPACE, KeyValueStore};

#[tokio::test]
async fn sqlite_backend_upserts_and_deletes() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert_eq!(repo.read("missing").await.unwrap(), None);

    repo.write("g3_chinese_stats", "{}").await.unwrap();
    repo.write("g3_chinese_stats", r#"{"totalQuestions":1}"#)
        .await
        .unwrap();
    assert_eq!(
        repo.read("g3_chinese_stats").await.unwrap().as_deref(),
        Some(r#"{"totalQuestions":1}"#)
    );

    repo.delete("g3_chinese_stats").await.unwrap();
    repo.delete("g3_chinese_stats").await.unwrap();
    assert_eq!(repo.read("g3_chinese_stats").await.unwrap(), None);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.write("k", "v").await.unwrap();
    repo.migrate().await.expect("second migrate");
    assert_eq!(repo.read("k").await.unwrap().as_deref(), Some("v"));
}

#[tokio::test]
async fn namespaced_store_over_sqlite() {
    let storage = Storage::sqlite("sqlite:file:memdb_kv_store?mode=memory&cache=shared")
        .await
        .expect("sqlite storage");
    let store = KeyValueStore::from_storage(&storage, DEFAULT_NAMESPACE);

    assert!(store.put("data_version", &6_u32).await);
    assert_eq!(store.get::<u32>("data_version").await, Some(6));

    let raw = storage.backend.read("g3_chinese_data_version").await.unwrap();
    assert_eq!(raw.as_deref(), Some("6"));

    let other = KeyValueStore::new(Arc::clone(&storage.backend), "other_");
    assert_eq!(other.get::<u32>("data_version").await, None);

    assert!(store.remove("data_version").await);
    assert_eq!(store.get_or("data_version", 0_u32).await, 0);
}
