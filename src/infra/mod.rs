pub mod git;
pub mod jira;
