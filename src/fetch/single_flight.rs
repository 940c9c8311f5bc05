use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::future::{self, BoxFuture, FutureExt, Shared};
use tracing::{debug, warn};

use crate::domain::ticket::{Ticket, TicketId};
use crate::error::FetchError;
use crate::fetch::rate_limit::RateLimiter;

/// Result of asking the cache for one ticket.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Found(Arc<Ticket>),
    /// The identifier was empty; nothing was requested.
    Skipped,
    Failed(FetchError),
}

impl FetchOutcome {
    pub fn into_ticket(self) -> Option<Arc<Ticket>> {
        match self {
            FetchOutcome::Found(ticket) => Some(ticket),
            FetchOutcome::Skipped | FetchOutcome::Failed(_) => None,
        }
    }
}

pub type PendingFetch = Shared<BoxFuture<'static, FetchOutcome>>;

/// Single-flight table of ticket fetches.
///
/// Each identifier is loaded at most once per cache instance, behind the
/// shared rate limiter. Later requests for the same identifier await the
/// stored handle, whether it is still pending, resolved, or failed. Failed
/// entries are kept, so a ticket that failed once stays failed for the
/// lifetime of the cache.
pub struct FetchCache {
    limiter: Arc<RateLimiter>,
    timeout: Option<Duration>,
    entries: Mutex<HashMap<TicketId, PendingFetch>>,
}

impl FetchCache {
    pub fn new(limiter: Arc<RateLimiter>) -> Self {
        Self {
            limiter,
            timeout: None,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Bounds each loader run, measured from when the rate limiter releases it.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn fetch_once<F, Fut>(&self, id: &TicketId, loader: F) -> PendingFetch
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Ticket, FetchError>> + Send + 'static,
    {
        if id.is_empty() {
            return future::ready(FetchOutcome::Skipped).boxed().shared();
        }

        // Lookup and insert happen under one lock so two callers can never
        // both start a load for the same identifier.
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pending) = entries.get(id) {
            debug!(ticket = %id, "joining existing fetch");
            return pending.clone();
        }

        let pending = self.start(id.clone(), loader);
        entries.insert(id.clone(), pending.clone());
        pending
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn start<F, Fut>(&self, id: TicketId, loader: F) -> PendingFetch
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Ticket, FetchError>> + Send + 'static,
    {
        let timeout = self.timeout;
        let scheduled = self.limiter.schedule(move || async move {
            match timeout {
                Some(limit) => tokio::time::timeout(limit, loader())
                    .await
                    .unwrap_or_else(|_| Err(FetchError::Timeout(limit))),
                None => loader().await,
            }
        });

        async move {
            match scheduled.await {
                Ok(ticket) => {
                    debug!(ticket = %id, "ticket fetched");
                    FetchOutcome::Found(Arc::new(ticket))
                }
                Err(err) => {
                    warn!(ticket = %id, error = %err, "ticket fetch failed");
                    FetchOutcome::Failed(err)
                }
            }
        }
        .boxed()
        .shared()
    }
}
