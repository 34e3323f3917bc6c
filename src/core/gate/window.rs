//! Sliding-window limiter shared by every outbound call.

use std::cell::Cell;
use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Permit count over a window duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateWindow {
    /// Maximum number of calls allowed to start within any `window`.
    pub permits: u32,
    /// Length of the sliding window.
    pub window: Duration,
}

impl Default for RateWindow {
    fn default() -> Self {
        Self {
            permits: 5,
            window: Duration::from_secs(1),
        }
    }
}

tokio::task_local! {
    // Limiter whose permit the enclosing gated call holds but has not spent on a request yet.
    static PREPAID: Cell<Option<usize>>;
}

/// Sliding-log limiter: remembers when each permitted call started.
///
/// Callers over the limit sleep until the oldest start leaves the window, then re-check.
/// A [`RequestGate`](super::RequestGate) owns one; hand it to
/// [`YahooProviderBuilder::rate_limiter`](crate::core::client::YahooProviderBuilder::rate_limiter)
/// so every HTTP request the provider sends is counted, not just each gated call.
#[derive(Debug)]
pub struct SlidingWindow {
    window: RateWindow,
    starts: Mutex<VecDeque<Instant>>,
}

impl SlidingWindow {
    pub(crate) fn new(window: RateWindow) -> Self {
        let permits = window.permits.max(1);
        Self {
            window: RateWindow { permits, ..window },
            starts: Mutex::new(VecDeque::with_capacity(permits as usize)),
        }
    }

    pub fn config(&self) -> RateWindow {
        self.window
    }

    fn id(&self) -> usize {
        std::ptr::from_ref(self) as usize
    }

    /// Takes a permit, then runs `call`. The first [`acquire_request`](Self::acquire_request)
    /// on this limiter inside `call` spends that permit instead of waiting for another.
    pub(crate) async fn with_permit<F: Future>(&self, context: &str, call: F) -> F::Output {
        self.acquire(context).await;
        PREPAID.scope(Cell::new(Some(self.id())), call).await
    }

    /// Permit for one outbound HTTP request.
    pub async fn acquire_request(&self, context: &str) {
        let prepaid = PREPAID
            .try_with(|p| {
                let held = p.get() == Some(self.id());
                if held {
                    p.set(None);
                }
                held
            })
            .unwrap_or(false);
        if !prepaid {
            self.acquire(context).await;
        }
    }

    /// Waits until a permit is available and records the call start.
    pub(crate) async fn acquire(&self, context: &str) {
        loop {
            let wait = {
                let mut starts = self.starts.lock().await;
                let now = Instant::now();

                while let Some(&oldest) = starts.front() {
                    if now.duration_since(oldest) >= self.window.window {
                        starts.pop_front();
                    } else {
                        break;
                    }
                }

                if starts.len() < self.window.permits as usize {
                    starts.push_back(now);
                    return;
                }

                // Full: the front entry is the next one to expire.
                match starts.front() {
                    Some(&oldest) => (oldest + self.window.window).saturating_duration_since(now),
                    None => Duration::ZERO,
                }
            };

            tracing::debug!(
                context,
                wait_ms = wait.as_millis() as u64,
                permits = self.window.permits,
                "rate window saturated; waiting"
            );
            tokio::time::sleep(wait).await;
        }
    }
}
