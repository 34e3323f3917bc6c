//! Option chains: expiration selection, gated per-expiration fetches, concurrent
//! aggregation and strike/liquidity filtering.

mod aggregate;
pub(crate) mod api;
mod fetch;
mod filter;
mod model;
mod select;
mod wire;

pub use aggregate::{Aggregation, ConcurrentAggregator, DEFAULT_MAX_CONCURRENCY};
pub use fetch::ChainFetcher;
pub use filter::filter_and_sort;
pub use model::{
    DateFormatError, ExpirationDate, FetchOutcome, FilterCriteria, OptionChain, OptionContract,
    OptionKind, OptionRow,
};
pub use select::{DateRange, select};
