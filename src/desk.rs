//! The caller-facing surface: one method per dataset, all gated.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::analysis::{RecommendationRow, UpgradeDowngradeRow};
use crate::core::{
    CacheMode, DEFAULT_TTL, DeskError, MarketDataProvider, MemoryCache, ProviderError, RateWindow,
    RequestGate, RequestKey,
};
use crate::fundamentals::{Calendar, EarningsRow, Frequency, StatementKind, StatementRow};
use crate::history::{Candle, Period};
use crate::holders::{Holders, InsiderTransaction};
use crate::options::{
    ChainFetcher, ConcurrentAggregator, DEFAULT_MAX_CONCURRENCY, DateRange, ExpirationDate,
    FilterCriteria, OptionKind, OptionRow, filter_and_sort,
};
use crate::profile::Info;

/// Read-only market data for ticker symbols.
///
/// Every outbound call goes through one shared [`RequestGate`], so a `Desk` and its clones
/// respect a single rate window and cache. Cloning is cheap.
///
/// ```no_run
/// # use std::sync::Arc;
/// # use yfdesk::{Desk, FilterCriteria, OptionKind, RequestGate, YahooProvider};
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let gate = Arc::new(RequestGate::builder().build().await?);
/// let yahoo = YahooProvider::builder().rate_limiter(gate.limiter()).build()?;
/// let desk = Desk::builder(Arc::new(yahoo)).gate(gate).build();
///
/// let rows = desk
///     .filtered_options(
///         "AAPL",
///         &FilterCriteria::new()
///             .start_date("2025-02-01")
///             .end_date("2025-03-31")
///             .kind(OptionKind::Call),
///     )
///     .await?;
/// println!("{} contracts", rows.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Desk {
    provider: Arc<dyn MarketDataProvider>,
    gate: Arc<RequestGate>,
    max_concurrency: usize,
    aggregate_timeout: Option<Duration>,
    cache_mode: CacheMode,
}

impl std::fmt::Debug for Desk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Desk")
            .field("gate", &self.gate)
            .field("max_concurrency", &self.max_concurrency)
            .field("aggregate_timeout", &self.aggregate_timeout)
            .field("cache_mode", &self.cache_mode)
            .finish_non_exhaustive()
    }
}

impl Desk {
    /// Start building a desk around `provider`.
    pub fn builder(provider: Arc<dyn MarketDataProvider>) -> DeskBuilder {
        DeskBuilder {
            provider,
            gate: None,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            aggregate_timeout: None,
            cache_mode: CacheMode::Use,
        }
    }

    /// The shared gate, e.g. for [`RequestGate::purge_expired`].
    pub fn gate(&self) -> &Arc<RequestGate> {
        &self.gate
    }

    /// A handle sharing this desk's gate but using `mode` for its calls.
    #[must_use]
    pub fn with_cache_mode(&self, mode: CacheMode) -> Self {
        Self {
            cache_mode: mode,
            ..self.clone()
        }
    }

    async fn gated<T, F, Fut>(
        &self,
        key: RequestKey,
        label: &'static str,
        call: F,
    ) -> Result<T, DeskError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        self.gate
            .acquire_and_call_with(&key, self.cache_mode, call)
            .await
            .map_err(|e| DeskError::provider(key.symbol(), label, e))
    }

    /* ---------------- Single-call accessors ---------------- */

    /// Summary information merged from the provider's profile, statistics and price data.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::Provider`] if the provider call fails.
    #[tracing::instrument(skip(self), err)]
    pub async fn info(&self, symbol: &str) -> Result<Info, DeskError> {
        let key = RequestKey::new(symbol, "info");
        self.gated(key, "info", || self.provider.info(symbol)).await
    }

    /// Upcoming earnings and dividend dates.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::Provider`] if the provider call fails.
    #[tracing::instrument(skip(self), err)]
    pub async fn calendar(&self, symbol: &str) -> Result<Calendar, DeskError> {
        let key = RequestKey::new(symbol, "calendar");
        self.gated(key, "calendar", || self.provider.calendar(symbol))
            .await
    }

    /// The `limit` most recent recommendation periods (5 is the customary default).
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::Provider`] if the provider call fails.
    #[tracing::instrument(skip(self), err)]
    pub async fn recommendations(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<RecommendationRow>, DeskError> {
        let key = RequestKey::new(symbol, "recommendations");
        let mut rows = self
            .gated(key, "recommendations", || self.provider.recommendations(symbol))
            .await?;
        rows.truncate(limit);
        Ok(rows)
    }

    /// The `limit` most recent rating changes, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::Provider`] if the provider call fails.
    #[tracing::instrument(skip(self), err)]
    pub async fn upgrades_downgrades(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<UpgradeDowngradeRow>, DeskError> {
        let key = RequestKey::new(symbol, "upgrades_downgrades");
        let mut rows = self
            .gated(key, "upgrades/downgrades", || {
                self.provider.upgrades_downgrades(symbol)
            })
            .await?;
        rows.sort_by(|a, b| b.ts.cmp(&a.ts));
        rows.truncate(limit);
        Ok(rows)
    }

    /// Daily bars over `period`.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::Provider`] if the provider call fails.
    #[tracing::instrument(skip(self), err)]
    pub async fn price_history(
        &self,
        symbol: &str,
        period: Period,
    ) -> Result<Vec<Candle>, DeskError> {
        let key = RequestKey::new(symbol, "price_history").param("period", period);
        self.gated(key, "price history", || {
            self.provider.price_history(symbol, period)
        })
        .await
    }

    /// Income, balance-sheet or cash-flow statement periods.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::Provider`] if the provider call fails.
    #[tracing::instrument(skip(self), err)]
    pub async fn financial_statements(
        &self,
        symbol: &str,
        kind: StatementKind,
        frequency: Frequency,
    ) -> Result<Vec<StatementRow>, DeskError> {
        let key = RequestKey::new(symbol, "financial_statements")
            .param("kind", kind)
            .param("frequency", frequency);
        self.gated(key, "financial statements", || {
            self.provider.financial_statement(symbol, kind, frequency)
        })
        .await
    }

    /// The `top_n` largest institutional and mutual-fund holders.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::Provider`] if the provider call fails.
    #[tracing::instrument(skip(self), err)]
    pub async fn institutional_holders(
        &self,
        symbol: &str,
        top_n: usize,
    ) -> Result<Holders, DeskError> {
        let key = RequestKey::new(symbol, "holders");
        let mut holders = self
            .gated(key, "institutional holders", || self.provider.holders(symbol))
            .await?;
        holders.institutional.truncate(top_n);
        holders.mutual_fund.truncate(top_n);
        Ok(holders)
    }

    /// Up to `limit` quarters of reported vs. estimated EPS.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::Provider`] if the provider call fails.
    #[tracing::instrument(skip(self), err)]
    pub async fn earnings_history(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<EarningsRow>, DeskError> {
        let key = RequestKey::new(symbol, "earnings_history");
        let mut rows = self
            .gated(key, "earnings history", || {
                self.provider.earnings_history(symbol)
            })
            .await?;
        rows.truncate(limit);
        Ok(rows)
    }

    /// Up to `limit` insider transactions, in provider order.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::Provider`] if the provider call fails.
    #[tracing::instrument(skip(self), err)]
    pub async fn insider_trades(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<InsiderTransaction>, DeskError> {
        let key = RequestKey::new(symbol, "insider_transactions");
        let mut rows = self
            .gated(key, "insider trades", || {
                self.provider.insider_transactions(symbol)
            })
            .await?;
        rows.truncate(limit);
        Ok(rows)
    }

    /* ---------------- Options ---------------- */

    /// Expiration dates the provider lists for `symbol`.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::Provider`] if the provider call fails.
    #[tracing::instrument(skip(self), err)]
    pub async fn option_expirations(&self, symbol: &str) -> Result<Vec<ExpirationDate>, DeskError> {
        let key = RequestKey::new(symbol, "expirations");
        self.gated(key, "option expirations", || {
            self.provider.expirations(symbol)
        })
        .await
    }

    /// One expiration's chain; calls then puts when `kind` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::Validation`] if `expiry` is missing or not `YYYY-MM-DD`, and
    /// [`DeskError::Provider`] if the provider call fails.
    #[tracing::instrument(skip(self), err)]
    pub async fn options_chain(
        &self,
        symbol: &str,
        expiry: Option<&str>,
        kind: Option<OptionKind>,
    ) -> Result<Vec<OptionRow>, DeskError> {
        let expiry = expiry
            .filter(|e| !e.is_empty())
            .ok_or_else(|| DeskError::Validation("No expiry date provided".into()))?;
        let expiration: ExpirationDate = expiry
            .parse()
            .map_err(|_| DeskError::Validation("Invalid expiry format. Use YYYY-MM-DD".into()))?;

        let chain = self
            .fetcher()
            .chain(symbol, expiration)
            .await
            .map_err(|e| DeskError::provider(symbol, "options chain", e))?;
        Ok(chain.into_rows(expiration, kind))
    }

    /// Contracts across every expiration in the criteria's date range, restricted by strike
    /// and kind, sorted by open interest then volume (both descending).
    ///
    /// Expirations whose chain cannot be fetched are skipped; the call fails only if none
    /// could be fetched.
    ///
    /// # Errors
    ///
    /// - [`DeskError::Validation`] if a date bound is malformed (checked before any request)
    ///   or no expiration falls inside the range.
    /// - [`DeskError::NoData`] if the symbol has no options or every selected expiration failed.
    /// - [`DeskError::Provider`] if listing expirations fails.
    #[tracing::instrument(skip(self), err)]
    pub async fn filtered_options(
        &self,
        symbol: &str,
        criteria: &FilterCriteria,
    ) -> Result<Vec<OptionRow>, DeskError> {
        let range = DateRange::parse(criteria.start_date.as_deref(), criteria.end_date.as_deref())?;

        let available = self.option_expirations(symbol).await?;
        if available.is_empty() {
            return Err(DeskError::NoData(format!("No options available for {symbol}")));
        }

        let selected = range.select(&available);
        if selected.is_empty() {
            return Err(DeskError::Validation(format!(
                "No options found for {symbol} within specified date range"
            )));
        }
        tracing::debug!(symbol, selected = selected.len(), "fetching option chains");

        let aggregation = ConcurrentAggregator::new(self.fetcher())
            .max_concurrency(self.max_concurrency)
            .timeout(self.aggregate_timeout)
            .aggregate(symbol, &selected, criteria.kind)
            .await;

        if !aggregation.has_data() {
            return Err(DeskError::NoData(format!(
                "No options found for {symbol} matching criteria"
            )));
        }

        Ok(filter_and_sort(
            aggregation.rows,
            criteria.strike_lower,
            criteria.strike_upper,
        ))
    }

    fn fetcher(&self) -> ChainFetcher<'_> {
        ChainFetcher::new(self.provider.as_ref(), &self.gate).cache_mode(self.cache_mode)
    }
}

/* ----------------------- Builder ----------------------- */

pub struct DeskBuilder {
    provider: Arc<dyn MarketDataProvider>,
    gate: Option<Arc<RequestGate>>,
    max_concurrency: usize,
    aggregate_timeout: Option<Duration>,
    cache_mode: CacheMode,
}

impl DeskBuilder {
    /// Share an existing gate across desks.
    #[must_use]
    pub fn gate(mut self, gate: Arc<RequestGate>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Upper bound on concurrent chain fetches in [`Desk::filtered_options`]. Default: 8.
    #[must_use]
    pub const fn max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = n;
        self
    }

    /// Give up waiting on outstanding chain fetches after `timeout` and use what completed.
    #[must_use]
    pub const fn aggregate_timeout(mut self, timeout: Duration) -> Self {
        self.aggregate_timeout = Some(timeout);
        self
    }

    /// Default cache mode for every call. Default: [`CacheMode::Use`].
    #[must_use]
    pub const fn cache_mode(mut self, mode: CacheMode) -> Self {
        self.cache_mode = mode;
        self
    }

    /// Build around the supplied gate, or open the default SQLite-backed one.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::Cache`] if no gate was supplied and the default cache cannot be opened.
    pub async fn open(self) -> Result<Desk, DeskError> {
        let gate = match self.gate {
            Some(g) => g,
            None => Arc::new(RequestGate::builder().build().await?),
        };
        Ok(Desk {
            provider: self.provider,
            gate,
            max_concurrency: self.max_concurrency.max(1),
            aggregate_timeout: self.aggregate_timeout,
            cache_mode: self.cache_mode,
        })
    }

    /// Build around the supplied gate, or an in-memory one with default limits if none was set.
    pub fn build(self) -> Desk {
        let gate = self.gate.unwrap_or_else(|| {
            Arc::new(RequestGate::new(
                RateWindow::default(),
                DEFAULT_TTL,
                Arc::new(MemoryCache::new()),
            ))
        });
        Desk {
            provider: self.provider,
            gate,
            max_concurrency: self.max_concurrency.max(1),
            aggregate_timeout: self.aggregate_timeout,
            cache_mode: self.cache_mode,
        }
    }
}
