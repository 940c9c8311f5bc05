use std::sync::Arc;

use futures::future::join_all;
use tracing::debug;

use crate::domain::commit::CommitRecord;
use crate::domain::pattern::TicketPattern;
use crate::domain::ticket::Ticket;
use crate::fetch::{FetchCache, FetchOutcome};
use crate::services::IssueTrackerService;

/// Decides whether a fetched ticket belongs in the changelog.
pub trait TicketFilter: Send + Sync {
    fn include(&self, ticket: &Ticket) -> bool;
}

/// Keeps tickets with a non-empty `fields` object. Permission-denied stubs
/// come back without fields and are dropped silently.
#[derive(Debug, Clone, Copy, Default)]
pub struct HasFields;

impl TicketFilter for HasFields {
    fn include(&self, ticket: &Ticket) -> bool {
        ticket
            .fields
            .as_ref()
            .is_some_and(|fields| !fields.is_empty())
    }
}

pub struct CommitCorrelator {
    pattern: TicketPattern,
    tracker: Arc<dyn IssueTrackerService>,
    cache: Arc<FetchCache>,
    filter: Arc<dyn TicketFilter>,
}

impl CommitCorrelator {
    pub fn new(
        pattern: TicketPattern,
        tracker: Arc<dyn IssueTrackerService>,
        cache: Arc<FetchCache>,
    ) -> Self {
        Self {
            pattern,
            tracker,
            cache,
            filter: Arc::new(HasFields),
        }
    }

    pub fn with_filter(mut self, filter: Arc<dyn TicketFilter>) -> Self {
        self.filter = filter;
        self
    }

    /// Attaches every referenced, retrievable ticket to `commit`.
    ///
    /// Never fails: a ticket whose fetch failed is left out and its siblings
    /// are still attached.
    pub async fn correlate(&self, commit: CommitRecord) -> CommitRecord {
        let ids = self.pattern.extract(&commit.full_text);
        if ids.is_empty() {
            return CommitRecord {
                tickets: Vec::new(),
                ..commit
            };
        }

        let fetches = ids.iter().map(|id| {
            let tracker = Arc::clone(&self.tracker);
            let key = id.clone();
            self.cache
                .fetch_once(id, move || async move { tracker.get_issue(&key).await })
        });
        let outcomes = join_all(fetches).await;

        for outcome in &outcomes {
            if let FetchOutcome::Failed(err) = outcome {
                debug!(revision = commit.short_revision(), error = %err, "omitting ticket");
            }
        }

        let tickets: Vec<Arc<Ticket>> = outcomes
            .into_iter()
            .filter_map(FetchOutcome::into_ticket)
            .filter(|ticket| self.filter.include(ticket))
            .collect();

        debug!(
            revision = commit.short_revision(),
            referenced = ids.len(),
            attached = tickets.len(),
            "correlated commit"
        );

        CommitRecord { tickets, ..commit }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pattern::DEFAULT_TICKET_PATTERN;
    use crate::domain::ticket::TicketFields;
    use crate::error::FetchError;
    use crate::fetch::RateLimiter;
    use crate::services::testing::{StubTracker, ticket};

    fn correlator(tracker: Arc<StubTracker>) -> CommitCorrelator {
        let pattern = TicketPattern::parse(DEFAULT_TICKET_PATTERN).unwrap();
        let cache = Arc::new(FetchCache::new(Arc::new(RateLimiter::default())));
        CommitCorrelator::new(pattern, tracker, cache)
    }

    fn commit(text: &str) -> CommitRecord {
        CommitRecord {
            revision: "abcdef0123".to_string(),
            summary: text.lines().next().unwrap_or_default().to_string(),
            full_text: text.to_string(),
            ..CommitRecord::default()
        }
    }

    fn keys(commit: &CommitRecord) -> Vec<&str> {
        commit.tickets.iter().map(|t| t.key.as_str()).collect()
    }

    #[tokio::test]
    async fn failed_fetch_is_omitted() {
        let tracker = Arc::new(
            StubTracker::default()
                .with_ticket(ticket("AB-1", "Story", "first"))
                .with_failure("BC-2", FetchError::Transport("connection reset".to_string())),
        );
        let result = correlator(Arc::clone(&tracker))
            .correlate(commit("AB-1 BC-2 work"))
            .await;

        assert_eq!(keys(&result), vec!["AB-1"]);
        assert_eq!(tracker.calls("BC-2"), 1);
    }

    #[tokio::test]
    async fn duplicate_references_fetch_once() {
        let tracker = Arc::new(StubTracker::default().with_ticket(ticket("AB-1", "Bug", "x")));
        let result = correlator(Arc::clone(&tracker))
            .correlate(commit("AB-1: fix\n\nfollow-up to AB-1"))
            .await;

        assert_eq!(keys(&result), vec!["AB-1"]);
        assert_eq!(tracker.calls("AB-1"), 1);
    }

    #[tokio::test]
    async fn commit_without_references_is_untouched() {
        let tracker = Arc::new(StubTracker::default());
        let input = commit("chore: bump dependencies");
        let result = correlator(Arc::clone(&tracker)).correlate(input.clone()).await;

        assert!(result.tickets.is_empty());
        assert_eq!(result.full_text, input.full_text);
        assert_eq!(result.revision, input.revision);
        assert_eq!(tracker.total_calls(), 0);
    }

    #[tokio::test]
    async fn tickets_without_fields_are_excluded() {
        let hidden = Ticket {
            id: "9".to_string(),
            key: "SEC-9".to_string(),
            fields: None,
        };
        let blank = Ticket {
            id: "10".to_string(),
            key: "SEC-10".to_string(),
            fields: Some(TicketFields::default()),
        };
        let tracker = Arc::new(
            StubTracker::default()
                .with_ticket(hidden)
                .with_ticket(blank)
                .with_ticket(ticket("AB-1", "Task", "visible")),
        );
        let result = correlator(tracker)
            .correlate(commit("SEC-9 SEC-10 AB-1"))
            .await;

        assert_eq!(keys(&result), vec!["AB-1"]);
    }

    #[test]
    fn has_fields_is_stable() {
        let included = ticket("AB-1", "Bug", "x");
        assert!(HasFields.include(&included));
        assert!(HasFields.include(&included));
    }

    struct BugsOnly;

    impl TicketFilter for BugsOnly {
        fn include(&self, ticket: &Ticket) -> bool {
            ticket.issue_type_name() == "Bug"
        }
    }

    #[tokio::test]
    async fn filter_can_be_replaced() {
        let tracker = Arc::new(
            StubTracker::default()
                .with_ticket(ticket("AB-1", "Bug", "crash"))
                .with_ticket(ticket("AB-2", "Story", "feature")),
        );
        let result = correlator(tracker)
            .with_filter(Arc::new(BugsOnly))
            .correlate(commit("AB-1 AB-2"))
            .await;

        assert_eq!(keys(&result), vec!["AB-1"]);
    }
}
