use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::commit::CommitRecord;
use crate::domain::ticket::{IssueType, Ticket, TicketFields, TicketId};
use crate::error::{AppResult, FetchError};
use crate::services::{CommitRange, IssueTrackerService, VersionControlService};

pub fn ticket(key: &str, issue_type: &str, summary: &str) -> Ticket {
    Ticket {
        id: format!("id-{key}"),
        key: key.to_string(),
        fields: Some(TicketFields {
            issuetype: Some(IssueType {
                name: issue_type.to_string(),
            }),
            summary: Some(summary.to_string()),
            ..TicketFields::default()
        }),
    }
}

/// In-memory tracker that records how often each key was requested.
#[derive(Default)]
pub struct StubTracker {
    tickets: HashMap<String, Ticket>,
    failures: HashMap<String, FetchError>,
    delays: HashMap<String, Duration>,
    calls: Mutex<HashMap<String, usize>>,
}

impl StubTracker {
    pub fn with_ticket(mut self, ticket: Ticket) -> Self {
        self.tickets.insert(ticket.key.clone(), ticket);
        self
    }

    /// Serves `ticket` when `lookup_key` is requested, as Jira does for moved issues.
    pub fn with_ticket_under(mut self, lookup_key: &str, ticket: Ticket) -> Self {
        self.tickets.insert(lookup_key.to_string(), ticket);
        self
    }

    pub fn with_failure(mut self, key: &str, error: FetchError) -> Self {
        self.failures.insert(key.to_string(), error);
        self
    }

    pub fn with_delay(mut self, key: &str, delay: Duration) -> Self {
        self.delays.insert(key.to_string(), delay);
        self
    }

    pub fn calls(&self, key: &str) -> usize {
        self.calls.lock().unwrap().get(key).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl IssueTrackerService for StubTracker {
    async fn get_issue(&self, id: &TicketId) -> Result<Ticket, FetchError> {
        let key = id.as_str().to_string();
        *self.calls.lock().unwrap().entry(key.clone()).or_default() += 1;

        if let Some(delay) = self.delays.get(&key) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(error) = self.failures.get(&key) {
            return Err(error.clone());
        }
        self.tickets
            .get(&key)
            .cloned()
            .ok_or(FetchError::NotFound { key })
    }

    fn browse_url(&self, key: &str) -> Option<String> {
        Some(format!("https://tracker.test/browse/{key}"))
    }
}

/// Fixed commit history; counts how often it was read.
#[derive(Default)]
pub struct StubHistory {
    commits: Vec<CommitRecord>,
    reads: Mutex<usize>,
}

impl StubHistory {
    pub fn new(commits: Vec<CommitRecord>) -> Self {
        Self {
            commits,
            reads: Mutex::new(0),
        }
    }

    pub fn reads(&self) -> usize {
        *self.reads.lock().unwrap()
    }
}

#[async_trait]
impl VersionControlService for StubHistory {
    async fn commit_log(&self, _range: &CommitRange) -> AppResult<Vec<CommitRecord>> {
        *self.reads.lock().unwrap() += 1;
        Ok(self.commits.clone())
    }
}
