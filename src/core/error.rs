use thiserror::Error;

/// Failure of a single remote call made by a [`MarketDataProvider`](crate::core::MarketDataProvider).
///
/// The core never inspects these beyond rendering them; they are opaque and not retried.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// An error occurred during an HTTP request.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A provided URL could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The server returned an unexpected or unsuccessful HTTP status code.
    #[error("Unexpected response status: {status} at {url}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The URL that returned the error.
        url: String,
    },

    /// Cookie or crumb acquisition failed.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The data received from the API was in an unexpected format or was missing a required field.
    #[error("Data format unexpected or missing field: {0}")]
    Data(String),
}

/// Failure of the persistent response cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backing store could not be opened, read or written.
    #[error("cache storage: {0}")]
    Storage(#[from] sqlx::Error),

    /// A payload could not be encoded or decoded.
    #[error("cache payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// The error returned across the [`Desk`](crate::Desk) call surface.
///
/// Its `Display` output is the human-readable reason handed to callers.
#[derive(Debug, Error)]
pub enum DeskError {
    /// Input was rejected before any network activity, or nothing matched the requested range.
    #[error("{0}")]
    Validation(String),

    /// The provider failed for a ticker/endpoint.
    #[error("Error retrieving {endpoint} for {symbol}: {source}")]
    Provider {
        /// Ticker symbol of the failed request.
        symbol: String,
        /// Logical endpoint name (e.g. `calendar`).
        endpoint: &'static str,
        /// Underlying provider failure.
        #[source]
        source: ProviderError,
    },

    /// The provider returned nothing usable (no options at all, or every expiration failed).
    #[error("{0}")]
    NoData(String),

    /// The response cache could not be opened.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl DeskError {
    pub(crate) fn provider(symbol: &str, endpoint: &'static str, source: ProviderError) -> Self {
        Self::Provider {
            symbol: symbol.to_string(),
            endpoint,
            source,
        }
    }
}
