//! The remote market-data collaborator.

use async_trait::async_trait;

use crate::analysis::{RecommendationRow, UpgradeDowngradeRow};
use crate::core::error::ProviderError;
use crate::fundamentals::{Calendar, EarningsRow, Frequency, StatementKind, StatementRow};
use crate::history::{Candle, Period};
use crate::holders::{Holders, InsiderTransaction};
use crate::options::{ExpirationDate, OptionChain};
use crate::profile::Info;

/// One remote call per method. Implementations do not cache or throttle; the
/// [`RequestGate`](crate::core::RequestGate) wrapped around them does.
///
/// Every failure is opaque to the caller and is not retried.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Available option expirations, in the provider's order.
    async fn expirations(&self, symbol: &str) -> Result<Vec<ExpirationDate>, ProviderError>;

    /// Calls and puts for one expiration.
    async fn option_chain(
        &self,
        symbol: &str,
        expiration: ExpirationDate,
    ) -> Result<OptionChain, ProviderError>;

    async fn info(&self, symbol: &str) -> Result<Info, ProviderError>;

    async fn calendar(&self, symbol: &str) -> Result<Calendar, ProviderError>;

    async fn recommendations(&self, symbol: &str) -> Result<Vec<RecommendationRow>, ProviderError>;

    async fn upgrades_downgrades(
        &self,
        symbol: &str,
    ) -> Result<Vec<UpgradeDowngradeRow>, ProviderError>;

    async fn price_history(&self, symbol: &str, period: Period)
    -> Result<Vec<Candle>, ProviderError>;

    async fn financial_statement(
        &self,
        symbol: &str,
        kind: StatementKind,
        frequency: Frequency,
    ) -> Result<Vec<StatementRow>, ProviderError>;

    async fn holders(&self, symbol: &str) -> Result<Holders, ProviderError>;

    async fn earnings_history(&self, symbol: &str) -> Result<Vec<EarningsRow>, ProviderError>;

    async fn insider_transactions(
        &self,
        symbol: &str,
    ) -> Result<Vec<InsiderTransaction>, ProviderError>;
}
