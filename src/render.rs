use std::fmt::Write as _;

use crate::error::{AppError, AppResult};
use crate::services::IssueTrackerService;
use crate::workflow::changelog::Changelog;

const RULE: &str = "---------------------";

pub fn render_text(changelog: &Changelog, tracker: &dyn IssueTrackerService) -> String {
    let mut out = String::new();

    out.push_str("Jira Tickets\n");
    out.push_str(RULE);
    out.push('\n');
    for ticket in changelog.tickets.iter().map(|entry| &entry.ticket) {
        let link = match tracker.browse_url(&ticket.key) {
            Some(url) => format!("[{}]({url})", ticket.key),
            None => format!("[{}]", ticket.key),
        };
        let _ = writeln!(
            out,
            "  * [{}] - {link} {}",
            ticket.issue_type_name(),
            ticket.summary()
        );
    }
    if changelog.tickets.is_empty() {
        out.push_str(" ~ None ~\n");
    }

    out.push_str("\nOther Commits\n");
    out.push_str(RULE);
    out.push('\n');
    let mut untracked = 0;
    for commit in changelog.commits.iter().filter(|c| !c.has_tickets()) {
        untracked += 1;
        let _ = writeln!(
            out,
            "  * {} - [{}] - {}",
            commit.author_name,
            commit.short_revision(),
            commit.summary
        );
    }
    if untracked == 0 {
        out.push_str(" ~ None ~\n");
    }

    out
}

pub fn render_json(changelog: &Changelog) -> AppResult<String> {
    serde_json::to_string_pretty(changelog)
        .map_err(|err| AppError::Render(format!("failed to serialize changelog: {err}")))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::commit::CommitRecord;
    use crate::domain::ticket::Ticket;
    use crate::services::testing::{StubTracker, ticket};

    fn commit(revision: &str, summary: &str, tickets: Vec<Arc<Ticket>>) -> CommitRecord {
        CommitRecord {
            revision: revision.to_string(),
            author_name: "Ada".to_string(),
            summary: summary.to_string(),
            full_text: summary.to_string(),
            tickets,
            ..CommitRecord::default()
        }
    }

    fn changelog(commits: Vec<CommitRecord>) -> Changelog {
        Changelog::from_commits(commits).unwrap()
    }

    #[test]
    fn renders_tickets_and_other_commits() {
        let story = Arc::new(ticket("AB-2", "Story", "Add export"));
        let bug = Arc::new(ticket("AB-1", "Bug", "Fix crash"));
        let log = changelog(vec![
            commit("1111111aaaa", "AB-2 export", vec![Arc::clone(&story)]),
            commit("2222222bbbb", "AB-1 crash", vec![Arc::clone(&bug)]),
            commit("3333333cccc", "AB-2 polish", vec![story]),
            commit("4444444dddd", "chore: deps", Vec::new()),
        ]);

        let text = render_text(&log, &StubTracker::default());
        let expected = "\
Jira Tickets
---------------------
  * [Bug] - [AB-1](https://tracker.test/browse/AB-1) Fix crash
  * [Story] - [AB-2](https://tracker.test/browse/AB-2) Add export

Other Commits
---------------------
  * Ada - [4444444] - chore: deps
";
        assert_eq!(text, expected);
    }

    #[test]
    fn renders_placeholders_when_empty() {
        let text = render_text(&changelog(Vec::new()), &StubTracker::default());
        assert_eq!(
            text,
            "Jira Tickets\n---------------------\n ~ None ~\n\nOther Commits\n---------------------\n ~ None ~\n"
        );
    }

    #[test]
    fn renders_json() {
        let log = changelog(vec![commit("abc", "AB-1", vec![Arc::new(ticket("AB-1", "Bug", "x"))])]);
        let json: serde_json::Value = serde_json::from_str(&render_json(&log).unwrap()).unwrap();
        assert_eq!(json["commits"][0]["tickets"][0]["key"], "AB-1");
        assert_eq!(json["commits"][0]["full_text"], "AB-1");
        assert_eq!(json["tickets"][0]["commits"], serde_json::json!(["abc"]));
    }
}
