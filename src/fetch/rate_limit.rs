use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tracing::trace;

pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 10;

/// Caps task starts to `limit` per rolling `window`.
///
/// Start slots are reserved when a task is submitted, so tasks are released
/// in submission order. The n-th start is never earlier than one window after
/// the (n - limit)-th start.
#[derive(Debug)]
pub struct RateLimiter {
    limit: usize,
    window: Duration,
    starts: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        let limit = limit.max(1) as usize;
        Self {
            limit,
            window,
            starts: Mutex::new(VecDeque::with_capacity(limit)),
        }
    }

    pub fn per_second(limit: u32) -> Self {
        Self::new(limit, Duration::from_secs(1))
    }

    /// Reserves a start slot now and runs `task` once the slot opens.
    pub fn schedule<F, Fut, T>(&self, task: F) -> impl Future<Output = T> + use<F, Fut, T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let start_at = self.reserve();
        async move {
            sleep_until(start_at).await;
            task().await
        }
    }

    fn reserve(&self) -> Instant {
        let mut starts = self.starts.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        let mut start_at = now;
        if let Some(&last) = starts.back() {
            start_at = start_at.max(last);
        }
        if starts.len() >= self.limit {
            if let Some(oldest) = starts.pop_front() {
                start_at = start_at.max(oldest + self.window);
            }
        }

        starts.push_back(start_at);
        if start_at > now {
            trace!(delay = ?(start_at - now), "request queued by rate limiter");
        }
        start_at
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::per_second(DEFAULT_REQUESTS_PER_SECOND)
    }
}
