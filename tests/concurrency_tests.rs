//! Interleaving of read-modify-write operations.
//!
//! Mutations are a read followed by a separate write. A storage engine with
//! per-call latency makes both reads of two concurrent mutations land before
//! either write, so one update is lost.

mod common;

use std::time::Duration;

use common::slow_store;
use serde_json::json;

const LATENCY: Duration = Duration::from_millis(10);

#[tokio::test(start_paused = true)]
async fn test_concurrent_adds_lose_an_update() -> anyhow::Result<()> {
    let store = slow_store(LATENCY).await?;

    let (first, second) = tokio::join!(store.add("n", 1.0), store.add("n", 1.0));

    assert_eq!(first?, Some(1.0));
    assert_eq!(second?, Some(1.0));
    assert_eq!(store.get("n").await?, Some(json!(1)));

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_pushes_lose_an_element() -> anyhow::Result<()> {
    let store = slow_store(LATENCY).await?;

    let (first, second) = tokio::join!(store.push("list", "a"), store.push("list", "b"));
    first?;
    second?;

    let stored = store.get("list").await?;
    assert!(
        stored == Some(json!(["a"])) || stored == Some(json!(["b"])),
        "expected a single element, got {:?}",
        stored
    );

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_sequential_adds_accumulate() -> anyhow::Result<()> {
    let store = slow_store(LATENCY).await?;

    store.add("n", 1.0).await?;
    store.add("n", 1.0).await?;

    assert_eq!(store.get("n").await?, Some(json!(2)));

    Ok(())
}
