use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::pattern::DEFAULT_TICKET_PATTERN;
use crate::error::{AppError, AppResult};
use crate::fetch::rate_limit::DEFAULT_REQUESTS_PER_SECOND;

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jira_host: Option<String>,
    pub jira_email: Option<String>,
    pub jira_token: Option<String>,
    pub jira_base_url: Option<String>,
    pub ticket_pattern: String,
    pub requests_per_second: u32,
    /// `None` disables the per-fetch timeout.
    pub fetch_timeout: Option<Duration>,
    pub workspace_root: PathBuf,
}

impl AppConfig {
    pub fn load(workspace_hint: &Path) -> AppResult<Self> {
        Self::from_lookup(workspace_hint, |key| env::var(key).ok())
    }

    pub fn from_lookup<F>(workspace_hint: &Path, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let requests_per_second = match get("JIRA_REQUESTS_PER_SECOND") {
            Some(raw) => parse_rate(&raw)?,
            None => DEFAULT_REQUESTS_PER_SECOND,
        };
        let fetch_timeout = match get("JIRA_FETCH_TIMEOUT_SECS") {
            Some(raw) => parse_timeout(&raw)?,
            None => Some(Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS)),
        };

        Ok(Self {
            jira_host: get("JIRA_HOST"),
            jira_email: get("JIRA_EMAIL"),
            jira_token: get("JIRA_TOKEN"),
            jira_base_url: get("JIRA_BASE_URL"),
            ticket_pattern: get("JIRA_TICKET_ID_PATTERN")
                .unwrap_or_else(|| DEFAULT_TICKET_PATTERN.to_string()),
            requests_per_second,
            fetch_timeout,
            workspace_root: workspace_hint.to_path_buf(),
        })
    }
}

pub fn parse_rate(raw: &str) -> AppResult<u32> {
    match raw.trim().parse::<u32>() {
        Ok(rate) if rate > 0 => Ok(rate),
        _ => Err(AppError::Configuration(format!(
            "requests per second must be a positive integer, got '{raw}'"
        ))),
    }
}

/// Seconds; `0` disables the timeout.
pub fn parse_timeout(raw: &str) -> AppResult<Option<Duration>> {
    let secs = raw.trim().parse::<u64>().map_err(|_| {
        AppError::Configuration(format!(
            "fetch timeout must be a whole number of seconds, got '{raw}'"
        ))
    })?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}
