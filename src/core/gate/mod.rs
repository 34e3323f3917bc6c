//! The process-wide gateway every outbound provider call passes through.
//!
//! A [`RequestGate`] combines a sliding-window rate limiter with a response cache keyed by
//! [`RequestKey`]. Build one at startup, share it behind an `Arc`, and drop it at shutdown.

mod cache;
mod window;

pub use cache::{CacheBackend, CacheEntry, MemoryCache, SqliteCache};
pub use window::{RateWindow, SlidingWindow};

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use crate::core::error::{CacheError, ProviderError};

/// Default cache file, next to the working directory.
pub const DEFAULT_CACHE_PATH: &str = "yfinance.cache";

/// Default time-to-live of a cached response.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Defines the behavior of the cache for a gated call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CacheMode {
    /// Read from the cache if a non-expired entry is present; otherwise, call the provider
    /// and write the response to the cache. (Default)
    #[default]
    Use,
    /// Always call the provider, bypassing any cached entry, and write the new response to the cache.
    Refresh,
    /// Always call the provider and do not read from or write to the cache.
    Bypass,
}

/// Identity of a request: ticker, logical endpoint, and the parameters that shape the response.
///
/// Parameters are kept sorted so that insertion order never changes the identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    symbol: String,
    endpoint: &'static str,
    params: BTreeMap<&'static str, String>,
}

impl RequestKey {
    pub fn new(symbol: impl Into<String>, endpoint: &'static str) -> Self {
        Self {
            symbol: symbol.into(),
            endpoint,
            params: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn param(mut self, name: &'static str, value: impl ToString) -> Self {
        self.params.insert(name, value.to_string());
        self
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn endpoint(&self) -> &'static str {
        self.endpoint
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.symbol, self.endpoint)?;
        let mut sep = '|';
        for (k, v) in &self.params {
            write!(f, "{sep}{k}={v}")?;
            sep = '&';
        }
        Ok(())
    }
}

/// Rate limiter + response cache shared by every provider call in the process.
#[derive(Debug)]
pub struct RequestGate {
    window: Arc<SlidingWindow>,
    cache: Arc<dyn CacheBackend>,
    ttl: Duration,
    inflight: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl RequestGate {
    /// Create a new builder (SQLite cache at [`DEFAULT_CACHE_PATH`], 5 calls/s, 1h TTL).
    pub fn builder() -> RequestGateBuilder {
        RequestGateBuilder::default()
    }

    pub fn new(window: RateWindow, ttl: Duration, cache: Arc<dyn CacheBackend>) -> Self {
        Self {
            window: Arc::new(SlidingWindow::new(window)),
            cache,
            ttl,
            inflight: StdMutex::new(HashMap::new()),
        }
    }

    pub fn rate_window(&self) -> RateWindow {
        self.window.config()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The limiter behind this gate, for providers that send several requests per call.
    pub fn limiter(&self) -> Arc<SlidingWindow> {
        Arc::clone(&self.window)
    }

    /// Serve `key` from the cache, or wait for rate capacity and run `call`.
    ///
    /// A successful result is cached for the gate's TTL; a failure is returned as-is and
    /// nothing is cached.
    ///
    /// # Errors
    ///
    /// Returns whatever error `call` produced.
    pub async fn acquire_and_call<T, F, Fut>(
        &self,
        key: &RequestKey,
        call: F,
    ) -> Result<T, ProviderError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        self.acquire_and_call_with(key, CacheMode::Use, call).await
    }

    /// Like [`acquire_and_call`](Self::acquire_and_call) with an explicit [`CacheMode`].
    ///
    /// # Errors
    ///
    /// Returns whatever error `call` produced.
    pub async fn acquire_and_call_with<T, F, Fut>(
        &self,
        key: &RequestKey,
        mode: CacheMode,
        call: F,
    ) -> Result<T, ProviderError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let id = key.to_string();

        if mode == CacheMode::Bypass {
            return self.window.with_permit(&id, call()).await;
        }

        if mode == CacheMode::Use
            && let Some(hit) = self.lookup(&id).await
        {
            return Ok(hit);
        }

        // One caller per identity populates the cache; the rest wait and re-read.
        let slot = self.slot(&id);
        let _turn = slot.slot.lock().await;

        if mode == CacheMode::Use
            && let Some(hit) = self.lookup(&id).await
        {
            return Ok(hit);
        }

        let value = self.window.with_permit(&id, call()).await?;
        self.store(&id, &value).await;
        Ok(value)
    }

    /// Physically delete expired cache entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache store cannot be written.
    pub async fn purge_expired(&self) -> Result<u64, CacheError> {
        self.cache.purge_expired(Utc::now()).await
    }

    /// Number of stored cache entries, including stale ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache store cannot be read.
    pub async fn cached_len(&self) -> Result<usize, CacheError> {
        self.cache.len().await
    }

    async fn lookup<T: DeserializeOwned>(&self, id: &str) -> Option<T> {
        let entry = match self.cache.load(id).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key = id, error = %e, "cache read failed; treating as miss");
                return None;
            }
        };

        if !entry.is_fresh(Utc::now()) {
            tracing::trace!(key = id, "cache entry expired");
            return None;
        }

        match serde_json::from_str(&entry.payload) {
            Ok(v) => {
                tracing::debug!(key = id, "cache hit");
                Some(v)
            }
            Err(e) => {
                tracing::warn!(key = id, error = %e, "cached payload unreadable; treating as miss");
                None
            }
        }
    }

    async fn store<T: Serialize>(&self, id: &str, value: &T) {
        let payload = match serde_json::to_string(value) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(key = id, error = %e, "response not cacheable");
                return;
            }
        };
        let entry = CacheEntry {
            key: id.to_string(),
            payload,
            created_at: Utc::now(),
            ttl: self.ttl,
        };
        if let Err(e) = self.cache.store(entry).await {
            tracing::warn!(key = id, error = %e, "cache write failed");
        }
    }

    fn slot<'a>(&'a self, id: &'a str) -> SlotGuard<'a> {
        let mut inflight = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = Arc::clone(inflight.entry(id.to_string()).or_default());
        SlotGuard {
            inflight: &self.inflight,
            id,
            slot,
        }
    }
}

/// A caller's share of a key's in-flight slot. Dropping it, on completion or when the caller's
/// future is dropped mid-call, removes the map entry once no one else is waiting on it.
struct SlotGuard<'a> {
    inflight: &'a StdMutex<HashMap<String, Arc<Mutex<()>>>>,
    id: &'a str,
    slot: Arc<Mutex<()>>,
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        let mut inflight = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        // Only the map and this caller still hold the slot.
        if Arc::strong_count(&self.slot) <= 2
            && inflight.get(self.id).is_some_and(|s| Arc::ptr_eq(s, &self.slot))
        {
            inflight.remove(self.id);
        }
    }
}

/* ----------------------- Builder ----------------------- */

#[derive(Debug)]
enum Backend {
    Memory,
    Sqlite(PathBuf),
    Custom(Arc<dyn CacheBackend>),
}

/// Builder for [`RequestGate`].
#[derive(Debug)]
pub struct RequestGateBuilder {
    window: RateWindow,
    ttl: Duration,
    backend: Backend,
}

impl Default for RequestGateBuilder {
    fn default() -> Self {
        Self {
            window: RateWindow::default(),
            ttl: DEFAULT_TTL,
            backend: Backend::Sqlite(PathBuf::from(DEFAULT_CACHE_PATH)),
        }
    }
}

impl RequestGateBuilder {
    /// Allow at most `permits` call starts in any sliding `window`. Default: 5 per second.
    #[must_use]
    pub fn rate(mut self, permits: u32, window: Duration) -> Self {
        self.window = RateWindow { permits, window };
        self
    }

    /// Time-to-live of cached responses. Default: one hour.
    #[must_use]
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Keep the cache in process memory only.
    #[must_use]
    pub fn memory(mut self) -> Self {
        self.backend = Backend::Memory;
        self
    }

    /// Persist the cache in a SQLite file at `path`.
    #[must_use]
    pub fn sqlite(mut self, path: impl Into<PathBuf>) -> Self {
        self.backend = Backend::Sqlite(path.into());
        self
    }

    /// Use a caller-supplied cache backend.
    #[must_use]
    pub fn backend(mut self, backend: Arc<dyn CacheBackend>) -> Self {
        self.backend = Backend::Custom(backend);
        self
    }

    /// Open the cache and build the gate.
    ///
    /// # Errors
    ///
    /// Returns an error if the SQLite cache cannot be opened.
    pub async fn build(self) -> Result<RequestGate, CacheError> {
        let cache: Arc<dyn CacheBackend> = match self.backend {
            Backend::Memory => Arc::new(MemoryCache::new()),
            Backend::Sqlite(path) => Arc::new(SqliteCache::open(path).await?),
            Backend::Custom(b) => b,
        };
        Ok(RequestGate::new(self.window, self.ttl, cache))
    }
}
