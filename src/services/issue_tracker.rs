use async_trait::async_trait;

use crate::domain::ticket::{Ticket, TicketId};
use crate::error::FetchError;

/// Tracker backend. Must tolerate concurrent calls.
#[async_trait]
pub trait IssueTrackerService: Send + Sync {
    async fn get_issue(&self, id: &TicketId) -> Result<Ticket, FetchError>;

    /// Human-facing link for a ticket key.
    fn browse_url(&self, key: &str) -> Option<String>;
}
