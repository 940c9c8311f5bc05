use async_trait::async_trait;
use base64::prelude::{BASE64_STANDARD, Engine as _};
use reqwest::{
    Client, StatusCode, Url,
    header::{ACCEPT, AUTHORIZATION},
};

use crate::domain::ticket::{Ticket, TicketId};
use crate::error::FetchError;
use crate::services::IssueTrackerService;

/// Jira REST (v2) client used to look up referenced issues.
pub struct JiraClient {
    http: Client,
    host: Option<String>,
    email: Option<String>,
    token: Option<String>,
    base_url: Option<String>,
}

impl JiraClient {
    pub fn new(
        host: Option<String>,
        email: Option<String>,
        token: Option<String>,
        base_url: Option<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            host,
            email,
            token,
            base_url,
        }
    }

    fn api_details(&self) -> Result<(String, &str, &str), FetchError> {
        let host = self
            .host
            .as_deref()
            .filter(|host| !host.trim().is_empty())
            .ok_or(FetchError::NotConfigured)?;
        let email = self.email.as_deref().ok_or(FetchError::NotConfigured)?;
        let token = self.token.as_deref().ok_or(FetchError::NotConfigured)?;
        Ok((Self::origin(host), email, token))
    }

    fn auth_header(email: &str, token: &str) -> String {
        let credentials = format!("{email}:{token}");
        let encoded = BASE64_STANDARD.encode(credentials);
        format!("Basic {encoded}")
    }

    fn origin(host: &str) -> String {
        let host = host.trim().trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{host}")
        }
    }

    /// The key is pushed as a single escaped path segment.
    fn issue_endpoint(origin: &str, key: &str) -> Result<Url, FetchError> {
        let mut url = Url::parse(origin)
            .map_err(|err| FetchError::Transport(format!("invalid Jira host {origin}: {err}")))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::Transport(format!("invalid Jira host {origin}")))?
            .pop_if_empty()
            .extend(["rest", "api", "2", "issue", key]);
        Ok(url)
    }
}

#[async_trait]
impl IssueTrackerService for JiraClient {
    async fn get_issue(&self, id: &TicketId) -> Result<Ticket, FetchError> {
        let (origin, email, token) = self.api_details()?;

        let response = self
            .http
            .get(Self::issue_endpoint(&origin, id.as_str())?)
            .header(AUTHORIZATION, Self::auth_header(email, token))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| FetchError::Transport(format!("failed to call Jira: {err}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                key: id.as_str().to_string(),
            });
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(FetchError::Transport(format!(
                "Jira responded with {status}: {body}"
            )));
        }

        response
            .json::<Ticket>()
            .await
            .map_err(|err| FetchError::Transport(format!("failed to parse Jira response: {err}")))
    }

    fn browse_url(&self, key: &str) -> Option<String> {
        let base = self
            .base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .or_else(|| self.host.as_deref().map(Self::origin))?;
        Some(format!("{base}/browse/{key}"))
    }
}
