//! # yfdesk
//!
//! A read-only, rate-limited and cached facade over Yahoo Finance market data.
//!
//! Every outbound request passes through one shared [`RequestGate`]: a sliding-window rate
//! limiter in front of a durable (SQLite) or in-memory response cache. On top of it,
//! [`Desk`] offers single-call accessors (profile info, calendar, analyst ratings, price
//! history, statements, holders, earnings, insider trades) and a filtered options scan that
//! fans out across expirations concurrently.
//!
//! ## Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use yfdesk::{Desk, FilterCriteria, RequestGate, YahooProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gate = Arc::new(RequestGate::builder().rate(5, std::time::Duration::from_secs(1)).build().await?);
//!     let yahoo = YahooProvider::builder().rate_limiter(gate.limiter()).build()?;
//!     let desk = Desk::builder(Arc::new(yahoo)).gate(gate).build();
//!
//!     let calls = desk
//!         .filtered_options("AAPL", &FilterCriteria::new().strike_lower(150.0).strike_upper(250.0))
//!         .await?;
//!     for row in calls.iter().take(5) {
//!         println!("{} {} {:?}", row.expiration, row.strike, row.open_interest);
//!     }
//!     Ok(())
//! }
//! ```

/// Analyst recommendations and rating changes.
pub mod analysis;
/// Core components: the gate, the provider seam and error types.
pub mod core;
mod desk;
/// Calendar events, financial statements and earnings history.
pub mod fundamentals;
/// Daily price history.
pub mod history;
/// Ownership data.
pub mod holders;
/// Option chains and the filtered options pipeline.
pub mod options;
/// Ticker summary information.
pub mod profile;

pub use crate::core::{
    CacheBackend, CacheEntry, CacheError, CacheMode, DEFAULT_CACHE_PATH, DEFAULT_TTL, DeskError,
    MarketDataProvider, MemoryCache, ProviderError, RateWindow, RequestGate, RequestGateBuilder,
    RequestKey, SlidingWindow, SqliteCache, YahooProvider, YahooProviderBuilder,
};
pub use desk::{Desk, DeskBuilder};

pub use analysis::{RecommendationRow, UpgradeDowngradeRow};
pub use fundamentals::{Calendar, EarningsRow, Frequency, StatementKind, StatementRow};
pub use history::{Candle, Period};
pub use holders::{Holder, Holders, InsiderTransaction};
pub use options::{
    Aggregation, ChainFetcher, ConcurrentAggregator, DateRange, ExpirationDate, FetchOutcome,
    FilterCriteria, OptionChain, OptionContract, OptionKind, OptionRow,
};
pub use profile::Info;
