use std::sync::Arc;

use serde::Serialize;

use crate::domain::ticket::Ticket;

/// One commit in the changelog range.
///
/// Only `full_text` is read during correlation; `tickets` is the output slot.
/// Tickets are shared between every commit that references them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommitRecord {
    pub revision: String,
    pub author_name: String,
    pub author_email: String,
    pub date: String,
    pub summary: String,
    pub full_text: String,
    pub tickets: Vec<Arc<Ticket>>,
}

impl CommitRecord {
    pub fn short_revision(&self) -> &str {
        let end = self
            .revision
            .char_indices()
            .nth(7)
            .map(|(index, _)| index)
            .unwrap_or(self.revision.len());
        &self.revision[..end]
    }

    pub fn has_tickets(&self) -> bool {
        !self.tickets.is_empty()
    }
}
