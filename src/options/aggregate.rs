//! Bounded fan-out of [`ChainFetcher`] over many expirations.

use std::time::Duration;

use futures::stream::{self, StreamExt};

use super::fetch::ChainFetcher;
use super::model::{ExpirationDate, FetchOutcome, OptionKind, OptionRow};

/// Default number of expirations fetched at once.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Merged result of one aggregation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    /// Rows of every successful expiration, laid out in the order expirations were given.
    pub rows: Vec<OptionRow>,
    /// Expirations that produced a chain (possibly empty).
    pub succeeded: Vec<ExpirationDate>,
    /// Expirations that failed, with the reason.
    pub failed: Vec<(ExpirationDate, String)>,
    /// `true` if the overall timeout cut the run short.
    pub timed_out: bool,
}

impl Aggregation {
    /// `false` when no expiration succeeded.
    pub fn has_data(&self) -> bool {
        !self.succeeded.is_empty()
    }
}

pub struct ConcurrentAggregator<'a> {
    fetcher: ChainFetcher<'a>,
    max_concurrency: usize,
    timeout: Option<Duration>,
}

impl<'a> ConcurrentAggregator<'a> {
    pub fn new(fetcher: ChainFetcher<'a>) -> Self {
        Self {
            fetcher,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            timeout: None,
        }
    }

    /// Upper bound on in-flight fetches (at least 1).
    #[must_use]
    pub fn max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = n.max(1);
        self
    }

    /// Stop waiting after `timeout` and keep whatever completed.
    #[must_use]
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch every expiration concurrently. A failed expiration is logged and skipped; it
    /// never cancels the others.
    pub async fn aggregate(
        &self,
        symbol: &str,
        expirations: &[ExpirationDate],
        kind: Option<OptionKind>,
    ) -> Aggregation {
        let fetcher = self.fetcher;
        let mut pending = stream::iter(expirations.iter().copied().enumerate())
            .map(|(i, exp)| async move { (i, fetcher.fetch(symbol, exp, kind).await) })
            .buffer_unordered(self.max_concurrency);

        let deadline = self.timeout.map(|t| tokio::time::Instant::now() + t);
        let mut completed = Vec::with_capacity(expirations.len());
        let mut timed_out = false;

        loop {
            let next = match deadline {
                Some(at) => match tokio::time::timeout_at(at, pending.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        timed_out = true;
                        break;
                    }
                },
                None => pending.next().await,
            };
            let Some(done) = next else { break };
            completed.push(done);
        }

        if timed_out {
            tracing::warn!(
                symbol,
                completed = completed.len(),
                total = expirations.len(),
                "options aggregation timed out; using completed expirations"
            );
        }

        completed.sort_by_key(|(i, _)| *i);

        let mut out = Aggregation {
            timed_out,
            ..Aggregation::default()
        };
        for (_, outcome) in completed {
            match outcome {
                FetchOutcome::Success { expiration, rows } => {
                    out.succeeded.push(expiration);
                    out.rows.extend(rows);
                }
                FetchOutcome::Failure { expiration, reason } => {
                    tracing::warn!(symbol, %expiration, %reason, "error fetching options for expiry");
                    out.failed.push((expiration, reason));
                }
            }
        }
        out
    }
}
