//! Single-expiration chain fetch through the request gate.

use crate::core::{CacheMode, MarketDataProvider, ProviderError, RequestGate, RequestKey};

use super::model::{ExpirationDate, FetchOutcome, OptionChain, OptionKind};

/// Fetches one expiration's chain through the gate. Failures come back as values.
#[derive(Clone, Copy)]
pub struct ChainFetcher<'a> {
    provider: &'a dyn MarketDataProvider,
    gate: &'a RequestGate,
    cache_mode: CacheMode,
}

impl<'a> ChainFetcher<'a> {
    pub fn new(provider: &'a dyn MarketDataProvider, gate: &'a RequestGate) -> Self {
        Self {
            provider,
            gate,
            cache_mode: CacheMode::Use,
        }
    }

    #[must_use]
    pub const fn cache_mode(mut self, mode: CacheMode) -> Self {
        self.cache_mode = mode;
        self
    }

    /// The full chain for one expiration, through the gate.
    ///
    /// The chain is cached per `(symbol, expiration)` whatever side the caller wants, so
    /// calls and puts share one cached response.
    ///
    /// # Errors
    ///
    /// Returns the provider's error; failures are never cached.
    pub async fn chain(
        &self,
        symbol: &str,
        expiration: ExpirationDate,
    ) -> Result<OptionChain, ProviderError> {
        let key = RequestKey::new(symbol, "option_chain").param("date", expiration);
        self.gate
            .acquire_and_call_with(&key, self.cache_mode, || {
                self.provider.option_chain(symbol, expiration)
            })
            .await
    }

    /// Like [`chain`](Self::chain), but rows are tagged with `expiration` and a failure is
    /// returned as a value.
    pub async fn fetch(
        &self,
        symbol: &str,
        expiration: ExpirationDate,
        kind: Option<OptionKind>,
    ) -> FetchOutcome {
        match self.chain(symbol, expiration).await {
            Ok(chain) => FetchOutcome::Success {
                expiration,
                rows: chain.into_rows(expiration, kind),
            },
            Err(e) => FetchOutcome::Failure {
                expiration,
                reason: e.to_string(),
            },
        }
    }
}
