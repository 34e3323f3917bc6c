//! Core components of `yfdesk`.
//!
//! This module contains the foundational building blocks of the library, including:
//! - The [`RequestGate`] (rate window + response cache) every provider call goes through.
//! - The [`MarketDataProvider`] seam and its Yahoo implementation, [`YahooProvider`].
//! - The error types ([`DeskError`], [`ProviderError`], [`CacheError`]).

/// The Yahoo HTTP client (`YahooProvider`) and its builder.
pub mod client;
/// Error types for the crate.
pub mod error;
/// Rate limiting and response caching.
pub mod gate;
/// The provider trait.
pub mod provider;
pub(crate) mod quotesummary;
pub(crate) mod wire;

pub use client::{YahooProvider, YahooProviderBuilder};
pub use error::{CacheError, DeskError, ProviderError};
pub use gate::{
    CacheBackend, CacheEntry, CacheMode, DEFAULT_CACHE_PATH, DEFAULT_TTL, MemoryCache, RateWindow,
    RequestGate, RequestGateBuilder, RequestKey, SlidingWindow, SqliteCache,
};
pub use provider::MarketDataProvider;
