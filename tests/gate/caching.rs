use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::future::join_all;
use yfdesk::{CacheMode, MemoryCache, ProviderError, RateWindow, RequestGate, RequestKey};

fn gate(ttl: Duration) -> RequestGate {
    RequestGate::new(
        RateWindow {
            permits: 100,
            window: Duration::from_secs(1),
        },
        ttl,
        Arc::new(MemoryCache::new()),
    )
}

fn key(date: &str) -> RequestKey {
    RequestKey::new("AAPL", "option_chain").param("date", date)
}

async fn counted(counter: &AtomicUsize, value: Vec<u32>) -> Result<Vec<u32>, ProviderError> {
    counter.fetch_add(1, Ordering::SeqCst);
    Ok(value)
}

#[tokio::test]
async fn identical_request_within_ttl_is_served_from_cache() {
    let gate = gate(Duration::from_secs(3600));
    let calls = AtomicUsize::new(0);

    let first = gate
        .acquire_and_call(&key("2025-01-17"), || counted(&calls, vec![1, 2, 3]))
        .await
        .unwrap();
    let second = gate
        .acquire_and_call(&key("2025-01-17"), || counted(&calls, vec![9, 9, 9]))
        .await
        .unwrap();

    assert_eq!(first, second, "cached payload must be returned unchanged");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(gate.cached_len().await.unwrap(), 1);
}

#[tokio::test]
async fn different_parameters_are_different_entries() {
    let gate = gate(Duration::from_secs(3600));
    let calls = AtomicUsize::new(0);

    gate.acquire_and_call(&key("2025-01-17"), || counted(&calls, vec![1]))
        .await
        .unwrap();
    gate.acquire_and_call(&key("2025-02-21"), || counted(&calls, vec![2]))
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn failures_are_not_cached() {
    let gate = gate(Duration::from_secs(3600));
    let calls = AtomicUsize::new(0);

    let err = gate
        .acquire_and_call::<Vec<u32>, _, _>(&key("2025-01-17"), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ProviderError::Data("boom".into()))
        })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("boom"));
    assert_eq!(gate.cached_len().await.unwrap(), 0);

    let ok = gate
        .acquire_and_call(&key("2025-01-17"), || counted(&calls, vec![7]))
        .await
        .unwrap();
    assert_eq!(ok, vec![7]);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn expired_entries_trigger_a_new_call() {
    let gate = gate(Duration::from_millis(50));
    let calls = AtomicUsize::new(0);

    gate.acquire_and_call(&key("2025-01-17"), || counted(&calls, vec![1]))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(120)).await;
    let fresh = gate
        .acquire_and_call(&key("2025-01-17"), || counted(&calls, vec![2]))
        .await
        .unwrap();

    assert_eq!(fresh, vec![2]);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn purge_removes_only_expired_entries() {
    let gate = gate(Duration::from_millis(50));
    let calls = AtomicUsize::new(0);

    gate.acquire_and_call(&key("2025-01-17"), || counted(&calls, vec![1]))
        .await
        .unwrap();
    assert_eq!(gate.purge_expired().await.unwrap(), 0);

    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(gate.purge_expired().await.unwrap(), 1);
    assert_eq!(gate.cached_len().await.unwrap(), 0);
}

#[tokio::test]
async fn refresh_skips_the_read_but_writes() {
    let gate = gate(Duration::from_secs(3600));
    let calls = AtomicUsize::new(0);
    let k = key("2025-01-17");

    gate.acquire_and_call(&k, || counted(&calls, vec![1])).await.unwrap();
    let refreshed = gate
        .acquire_and_call_with(&k, CacheMode::Refresh, || counted(&calls, vec![2]))
        .await
        .unwrap();
    let cached = gate
        .acquire_and_call(&k, || counted(&calls, vec![3]))
        .await
        .unwrap();

    assert_eq!(refreshed, vec![2]);
    assert_eq!(cached, vec![2], "refresh must overwrite the stored payload");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn bypass_neither_reads_nor_writes() {
    let gate = gate(Duration::from_secs(3600));
    let calls = AtomicUsize::new(0);
    let k = key("2025-01-17");

    gate.acquire_and_call_with(&k, CacheMode::Bypass, || counted(&calls, vec![1]))
        .await
        .unwrap();
    assert_eq!(gate.cached_len().await.unwrap(), 0);

    gate.acquire_and_call(&k, || counted(&calls, vec![2])).await.unwrap();
    gate.acquire_and_call_with(&k, CacheMode::Bypass, || counted(&calls, vec![3]))
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn concurrent_misses_for_one_key_make_one_call() {
    let gate = gate(Duration::from_secs(3600));
    let calls = AtomicUsize::new(0);
    let k = key("2025-01-17");

    let results = join_all((0..10).map(|_| {
        gate.acquire_and_call(&k, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(30)).await;
            Ok::<_, ProviderError>(vec![42_u32])
        })
    }))
    .await;

    assert!(results.iter().all(|r| r.as_ref().unwrap() == &vec![42]));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
