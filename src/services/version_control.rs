use async_trait::async_trait;

use crate::domain::commit::CommitRecord;
use crate::error::AppResult;

/// Commits reachable from `release` but not from `base`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRange {
    pub base: String,
    pub release: String,
}

impl CommitRange {
    pub fn as_revision_range(&self) -> String {
        format!("{}..{}", self.base.trim(), self.release.trim())
    }
}

#[async_trait]
pub trait VersionControlService: Send + Sync {
    async fn commit_log(&self, range: &CommitRange) -> AppResult<Vec<CommitRecord>>;
}
