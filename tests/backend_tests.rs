//! End-to-end tests against the persistent storage engines.

#![cfg(any(feature = "sqlite", feature = "fjall"))]

mod common;

use common::{TestStore, ids};
use json_kv::{Backend, Store, StoreConfig};
use serde_json::json;

async fn exercise(store: &Store) -> anyhow::Result<()> {
    store.set("user:1", &json!({"name": "ada"})).await?;
    store.set("user:2", &json!({"name": "grace"})).await?;
    store.add("visits", 2.0).await?;
    store.push("tags", "rust").await?;

    assert_eq!(store.get("user:1").await?, Some(json!({"name": "ada"})));
    assert_eq!(store.size().await, 4);

    let mut users = ids(&store.starts_with("user:").await?)
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    users.sort();
    assert_eq!(users, vec!["user:1", "user:2"]);

    assert!(store.delete("user:2").await?);
    assert_eq!(
        store.to_json().await.get("tags"),
        Some(&json!(["rust"]))
    );
    Ok(())
}

async fn reopen_and_check(config: &StoreConfig) -> anyhow::Result<()> {
    let store = Store::open(config).await?;
    assert_eq!(store.get("visits").await?, Some(json!(2)));
    assert_eq!(store.get("user:2").await?, None);
    assert_eq!(store.size().await, 3);

    assert!(store.delete_all().await);
    assert_eq!(store.size().await, 0);
    store.close().await?;
    Ok(())
}

#[cfg(feature = "sqlite")]
#[tokio::test]
async fn test_sqlite_persists_across_reopen() -> anyhow::Result<()> {
    let TestStore { store, dir } = TestStore::open(Backend::Sqlite, "nested/db.sqlite").await?;

    exercise(&store).await?;
    store.close().await?;

    let config = StoreConfig::new(dir.path().join("nested/db.sqlite")).with_backend(Backend::Sqlite);
    reopen_and_check(&config).await
}

#[cfg(feature = "sqlite")]
#[tokio::test]
async fn test_sqlite_backup_round_trip() -> anyhow::Result<()> {
    let TestStore { store, dir } = TestStore::open(Backend::Sqlite, "db.sqlite").await?;
    store.set("a", &json!([1, {"b": null}])).await?;

    let path = dir.path().join("backup.json");
    let outcome = store.backup(Some(&path)).await;
    assert!(outcome.success);

    let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(written, json!({"a": [1, {"b": null}]}));

    store.close().await?;
    Ok(())
}

#[cfg(feature = "fjall")]
#[tokio::test]
async fn test_fjall_persists_across_reopen() -> anyhow::Result<()> {
    let TestStore { store, dir } = TestStore::open(Backend::Fjall, "data").await?;

    exercise(&store).await?;
    store.close().await?;

    let config = StoreConfig::new(dir.path().join("data")).with_backend(Backend::Fjall);
    reopen_and_check(&config).await
}
