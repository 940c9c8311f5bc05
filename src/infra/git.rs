use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::domain::commit::CommitRecord;
use crate::error::{AppError, AppResult};
use crate::services::{CommitRange, VersionControlService};

const FIELD_SEPARATOR: char = '\u{1f}';
const RECORD_SEPARATOR: char = '\u{1e}';
const LOG_FORMAT: &str = "--format=%H%x1f%an%x1f%ae%x1f%aI%x1f%s%x1f%B%x1e";

pub struct GitCli {
    workspace_root: PathBuf,
}

impl GitCli {
    pub fn new(workspace_root: PathBuf) -> Self {
        Self { workspace_root }
    }
}

#[async_trait]
impl VersionControlService for GitCli {
    async fn commit_log(&self, range: &CommitRange) -> AppResult<Vec<CommitRecord>> {
        if range.base.trim().is_empty() || range.release.trim().is_empty() {
            return Err(AppError::VersionControl(
                "both base and release refs are required".to_string(),
            ));
        }

        let revisions = range.as_revision_range();
        debug!(repo = %self.workspace_root.display(), %revisions, "reading git log");

        let output = Command::new("git")
            .arg("-C")
            .arg(&self.workspace_root)
            .args(["log", "--no-color", LOG_FORMAT, revisions.as_str(), "--"])
            .output()
            .await
            .map_err(|err| AppError::VersionControl(format!("failed to run git: {err}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::VersionControl(format!(
                "git log {revisions} failed: {}",
                stderr.trim()
            )));
        }

        parse_log(&String::from_utf8_lossy(&output.stdout))
    }
}

fn parse_log(stdout: &str) -> AppResult<Vec<CommitRecord>> {
    stdout
        .split(RECORD_SEPARATOR)
        .map(|record| record.trim_start_matches(['\n', '\r']))
        .filter(|record| !record.trim().is_empty())
        .map(parse_record)
        .collect()
}

fn parse_record(record: &str) -> AppResult<CommitRecord> {
    let fields: Vec<&str> = record.splitn(6, FIELD_SEPARATOR).collect();
    let [revision, author_name, author_email, date, summary, body] = fields[..] else {
        return Err(AppError::VersionControl(format!(
            "unexpected git log record: {record:?}"
        )));
    };

    Ok(CommitRecord {
        revision: revision.to_string(),
        author_name: author_name.to_string(),
        author_email: author_email.to_string(),
        date: date.to_string(),
        summary: summary.to_string(),
        full_text: body.trim_end().to_string(),
        tickets: Vec::new(),
    })
}
