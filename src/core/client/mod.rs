//! Yahoo Finance implementation of [`MarketDataProvider`] + builder.
//! Internals are split into `auth` (cookie/crumb) and `constants` (UA + defaults).

mod auth;
mod constants;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use tokio::sync::{Mutex, RwLock};
use url::Url;

use crate::analysis::{self, RecommendationRow, UpgradeDowngradeRow};
use crate::core::MarketDataProvider;
use crate::core::error::ProviderError;
use crate::core::gate::SlidingWindow;
use crate::fundamentals::{self, Calendar, EarningsRow, Frequency, StatementKind, StatementRow};
use crate::history::{self, Candle, Period};
use crate::holders::{self, Holders, InsiderTransaction};
use crate::options::{self, ExpirationDate, OptionChain};
use crate::profile::{self, Info};
use constants::{
    DEFAULT_BASE_CHART, DEFAULT_BASE_OPTIONS_V7, DEFAULT_BASE_QUOTE_API, DEFAULT_COOKIE_URL,
    DEFAULT_CRUMB_URL, USER_AGENT,
};

#[derive(Debug, Default)]
struct ClientState {
    cookie: Option<String>,
    crumb: Option<String>,
}

/// HTTP client for Yahoo's chart, quoteSummary and options endpoints.
///
/// Cheap to clone; clones share the cookie/crumb state. Performs no caching of its own: wrap
/// it in a [`Desk`](crate::Desk) for that. Given the gate's limiter through
/// [`YahooProviderBuilder::rate_limiter`], every request it sends (cookie, crumb and fallbacks
/// included) takes a permit.
#[derive(Debug, Clone)]
pub struct YahooProvider {
    http: Client,
    base_chart: Url,
    base_quote_api: Url,
    base_options_v7: Url,
    cookie_url: Url,
    crumb_url: Url,

    state: Arc<RwLock<ClientState>>,
    credential_fetch_lock: Arc<Mutex<()>>,
    limiter: Option<Arc<SlidingWindow>>,
}

impl YahooProvider {
    /// Create a new builder.
    pub fn builder() -> YahooProviderBuilder {
        YahooProviderBuilder::default()
    }

    /* -------- internal getters used by other modules -------- */

    pub(crate) fn base_chart(&self) -> &Url {
        &self.base_chart
    }
    pub(crate) fn base_quote_api(&self) -> &Url {
        &self.base_quote_api
    }
    pub(crate) fn base_options_v7(&self) -> &Url {
        &self.base_options_v7
    }

    /// Waits for the shared limiter, if any, before one HTTP request.
    pub(crate) async fn throttle(&self, url: &Url) {
        if let Some(limiter) = &self.limiter {
            limiter.acquire_request(url.path()).await;
        }
    }

    /// GET `url` asking for JSON. Any status is returned to the caller.
    pub(crate) async fn send(&self, url: &Url) -> Result<reqwest::Response, ProviderError> {
        self.throttle(url).await;
        tracing::trace!(%url, "GET");
        Ok(self
            .http
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await?)
    }

    /// GET `url` and return the body, failing on a non-2xx status.
    pub(crate) async fn get_text(&self, url: &Url) -> Result<String, ProviderError> {
        let resp = self.send(url).await?;
        if !resp.status().is_success() {
            return Err(ProviderError::Status {
                status: resp.status().as_u16(),
                url: url.to_string(),
            });
        }
        Ok(resp.text().await?)
    }
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    async fn expirations(&self, symbol: &str) -> Result<Vec<ExpirationDate>, ProviderError> {
        options::api::expiration_dates(self, symbol).await
    }

    async fn option_chain(
        &self,
        symbol: &str,
        expiration: ExpirationDate,
    ) -> Result<OptionChain, ProviderError> {
        options::api::option_chain(self, symbol, expiration).await
    }

    async fn info(&self, symbol: &str) -> Result<Info, ProviderError> {
        profile::api::info(self, symbol).await
    }

    async fn calendar(&self, symbol: &str) -> Result<Calendar, ProviderError> {
        fundamentals::api::calendar(self, symbol).await
    }

    async fn recommendations(&self, symbol: &str) -> Result<Vec<RecommendationRow>, ProviderError> {
        analysis::api::recommendations(self, symbol).await
    }

    async fn upgrades_downgrades(
        &self,
        symbol: &str,
    ) -> Result<Vec<UpgradeDowngradeRow>, ProviderError> {
        analysis::api::upgrades_downgrades(self, symbol).await
    }

    async fn price_history(
        &self,
        symbol: &str,
        period: Period,
    ) -> Result<Vec<Candle>, ProviderError> {
        history::api::daily_bars(self, symbol, period).await
    }

    async fn financial_statement(
        &self,
        symbol: &str,
        kind: StatementKind,
        frequency: Frequency,
    ) -> Result<Vec<StatementRow>, ProviderError> {
        fundamentals::api::statement(self, symbol, kind, frequency).await
    }

    async fn holders(&self, symbol: &str) -> Result<Holders, ProviderError> {
        holders::api::holders(self, symbol).await
    }

    async fn earnings_history(&self, symbol: &str) -> Result<Vec<EarningsRow>, ProviderError> {
        fundamentals::api::earnings_history(self, symbol).await
    }

    async fn insider_transactions(
        &self,
        symbol: &str,
    ) -> Result<Vec<InsiderTransaction>, ProviderError> {
        holders::api::insider_transactions(self, symbol).await
    }
}

/* ----------------------- Builder ----------------------- */

#[derive(Debug, Default)]
pub struct YahooProviderBuilder {
    user_agent: Option<String>,
    base_chart: Option<Url>,
    base_quote_api: Option<Url>,
    base_options_v7: Option<Url>,
    cookie_url: Option<Url>,
    crumb_url: Option<Url>,

    preauth_cookie: Option<String>,
    preauth_crumb: Option<String>,

    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,

    limiter: Option<Arc<SlidingWindow>>,
}

impl YahooProviderBuilder {
    /// Override the User-Agent.
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Override the chart API base (e.g., `https://query1.finance.yahoo.com/v8/finance/chart/`).
    #[must_use]
    pub fn base_chart(mut self, url: Url) -> Self {
        self.base_chart = Some(url);
        self
    }

    /// Override the quoteSummary API base (e.g., `https://query1.finance.yahoo.com/v10/finance/quoteSummary/`).
    #[must_use]
    pub fn base_quote_api(mut self, url: Url) -> Self {
        self.base_quote_api = Some(url);
        self
    }

    /// Override the options API base (e.g., `https://query1.finance.yahoo.com/v7/finance/options/`).
    #[must_use]
    pub fn base_options_v7(mut self, url: Url) -> Self {
        self.base_options_v7 = Some(url);
        self
    }

    /// Override the cookie bootstrap URL.
    #[must_use]
    pub fn cookie_url(mut self, url: Url) -> Self {
        self.cookie_url = Some(url);
        self
    }

    /// Override the crumb URL.
    #[must_use]
    pub fn crumb_url(mut self, url: Url) -> Self {
        self.crumb_url = Some(url);
        self
    }

    /// Provide credentials up front and skip the cookie/crumb bootstrap.
    #[must_use]
    pub fn preauth(mut self, cookie: impl Into<String>, crumb: impl Into<String>) -> Self {
        self.preauth_cookie = Some(cookie.into());
        self.preauth_crumb = Some(crumb.into());
        self
    }

    /// Count every HTTP request against `limiter`, normally [`RequestGate::limiter`](crate::RequestGate::limiter).
    ///
    /// The first request of a gated call spends the permit the gate already took.
    #[must_use]
    pub fn rate_limiter(mut self, limiter: Arc<SlidingWindow>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    /// Set a global request timeout (overall). Default: none.
    #[must_use]
    pub const fn timeout(mut self, dur: Duration) -> Self {
        self.timeout = Some(dur);
        self
    }

    /// Set a connect timeout. Default: none.
    #[must_use]
    pub const fn connect_timeout(mut self, dur: Duration) -> Self {
        self.connect_timeout = Some(dur);
        self
    }

    /// # Errors
    ///
    /// Returns an error if a default URL fails to parse or the HTTP client cannot be built.
    pub fn build(self) -> Result<YahooProvider, ProviderError> {
        let base_chart = match self.base_chart {
            Some(u) => u,
            None => Url::parse(DEFAULT_BASE_CHART)?,
        };
        let base_quote_api = match self.base_quote_api {
            Some(u) => u,
            None => Url::parse(DEFAULT_BASE_QUOTE_API)?,
        };
        let base_options_v7 = match self.base_options_v7 {
            Some(u) => u,
            None => Url::parse(DEFAULT_BASE_OPTIONS_V7)?,
        };
        let cookie_url = match self.cookie_url {
            Some(u) => u,
            None => Url::parse(DEFAULT_COOKIE_URL)?,
        };
        let crumb_url = match self.crumb_url {
            Some(u) => u,
            None => Url::parse(DEFAULT_CRUMB_URL)?,
        };

        let mut httpb = reqwest::Client::builder()
            .user_agent(self.user_agent.as_deref().unwrap_or(USER_AGENT))
            .cookie_store(true);

        if let Some(t) = self.timeout {
            httpb = httpb.timeout(t);
        }
        if let Some(ct) = self.connect_timeout {
            httpb = httpb.connect_timeout(ct);
        }

        Ok(YahooProvider {
            http: httpb.build()?,
            base_chart,
            base_quote_api,
            base_options_v7,
            cookie_url,
            crumb_url,
            state: Arc::new(RwLock::new(ClientState {
                cookie: self.preauth_cookie,
                crumb: self.preauth_crumb,
            })),
            credential_fetch_lock: Arc::new(Mutex::new(())),
            limiter: self.limiter,
        })
    }
}
