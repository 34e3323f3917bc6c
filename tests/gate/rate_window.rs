use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::join_all;
use tokio::time::Instant;
use yfdesk::{CacheMode, MemoryCache, ProviderError, RateWindow, RequestGate, RequestKey};

#[tokio::test(start_paused = true)]
async fn no_more_than_permits_starts_in_any_window() {
    let window = Duration::from_millis(200);
    let gate = RequestGate::new(
        RateWindow { permits: 3, window },
        Duration::from_secs(60),
        Arc::new(MemoryCache::new()),
    );
    let starts = Mutex::new(Vec::new());

    let keys: Vec<RequestKey> = (0..10)
        .map(|i| RequestKey::new("AAPL", "info").param("n", i))
        .collect();

    join_all(keys.iter().map(|k| {
        gate.acquire_and_call_with(k, CacheMode::Bypass, || async {
            starts.lock().unwrap().push(Instant::now());
            Ok::<_, ProviderError>(())
        })
    }))
    .await;

    let mut starts = starts.into_inner().unwrap();
    starts.sort();
    assert_eq!(starts.len(), 10);
    for pair in starts.windows(4) {
        assert!(
            pair[3] - pair[0] >= window,
            "four starts within {:?}",
            pair[3] - pair[0]
        );
    }
}

#[tokio::test(start_paused = true)]
async fn cache_hits_do_not_consume_permits() {
    let gate = RequestGate::new(
        RateWindow {
            permits: 1,
            window: Duration::from_secs(10),
        },
        Duration::from_secs(60),
        Arc::new(MemoryCache::new()),
    );
    let k = RequestKey::new("AAPL", "calendar");

    let t0 = Instant::now();
    gate.acquire_and_call(&k, || async { Ok::<_, ProviderError>(1_u8) })
        .await
        .unwrap();
    for _ in 0..5 {
        gate.acquire_and_call(&k, || async { Ok::<_, ProviderError>(2_u8) })
            .await
            .unwrap();
    }

    assert!(Instant::now() - t0 < Duration::from_secs(1));
}
