pub mod issue_tracker;
pub mod version_control;

#[cfg(test)]
pub mod testing;

pub use issue_tracker::IssueTrackerService;
pub use version_control::{CommitRange, VersionControlService};
