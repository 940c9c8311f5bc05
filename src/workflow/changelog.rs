use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tracing::info;

use crate::domain::commit::CommitRecord;
use crate::domain::ticket::Ticket;
use crate::error::{AppError, AppResult};
use crate::workflow::correlate::CommitCorrelator;

/// Annotated commit batch.
#[derive(Debug, Clone, Serialize)]
pub struct Changelog {
    /// Same length and order as the input batch.
    pub commits: Vec<CommitRecord>,
    /// Every attached ticket keyed by tracker id. When two tickets share an
    /// id, the one seen in the later commit wins.
    pub tickets_by_id: BTreeMap<String, Arc<Ticket>>,
    /// Distinct tickets by key with the commits that reference them, stably
    /// sorted by issue type name.
    pub tickets: Vec<TicketEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TicketEntry {
    pub ticket: Arc<Ticket>,
    /// Revisions referencing the ticket, in batch order.
    pub commits: Vec<String>,
}

impl Changelog {
    pub fn from_commits(commits: Vec<CommitRecord>) -> AppResult<Self> {
        let tickets_by_id = index_tickets(&commits)?;
        let tickets = group_by_key(&commits);
        Ok(Self {
            commits,
            tickets_by_id,
            tickets,
        })
    }
}

pub struct ChangelogGenerator {
    correlator: CommitCorrelator,
}

impl ChangelogGenerator {
    pub fn new(correlator: CommitCorrelator) -> Self {
        Self { correlator }
    }

    /// Correlates every commit concurrently. Throughput is bounded only by the
    /// correlator's rate limiter; an empty batch resolves immediately.
    pub async fn generate(&self, commits: Vec<CommitRecord>) -> AppResult<Changelog> {
        let total = commits.len();
        let commits = join_all(
            commits
                .into_iter()
                .map(|commit| self.correlator.correlate(commit)),
        )
        .await;

        let changelog = Changelog::from_commits(commits)?;
        info!(
            commits = total,
            with_tickets = changelog.commits.iter().filter(|c| c.has_tickets()).count(),
            tickets = changelog.tickets.len(),
            "changelog generated"
        );

        Ok(changelog)
    }
}

fn index_tickets(commits: &[CommitRecord]) -> AppResult<BTreeMap<String, Arc<Ticket>>> {
    let mut by_id = BTreeMap::new();
    for commit in commits {
        for ticket in &commit.tickets {
            if ticket.id.trim().is_empty() {
                return Err(AppError::Aggregation(format!(
                    "ticket {} referenced by {} has no id",
                    ticket.key,
                    commit.short_revision()
                )));
            }
            by_id.insert(ticket.id.clone(), Arc::clone(ticket));
        }
    }
    Ok(by_id)
}

fn group_by_key(commits: &[CommitRecord]) -> Vec<TicketEntry> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<TicketEntry> = Vec::new();
    for commit in commits {
        for ticket in &commit.tickets {
            let index = *positions.entry(ticket.key.as_str()).or_insert_with(|| {
                entries.push(TicketEntry {
                    ticket: Arc::clone(ticket),
                    commits: Vec::new(),
                });
                entries.len() - 1
            });
            let revisions = &mut entries[index].commits;
            if revisions.last() != Some(&commit.revision) {
                revisions.push(commit.revision.clone());
            }
        }
    }
    entries.sort_by(|a, b| a.ticket.issue_type_name().cmp(b.ticket.issue_type_name()));
    entries
}
