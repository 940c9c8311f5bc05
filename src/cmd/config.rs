use clap::{Args, Subcommand};

use crate::config::AppConfig;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Show the effective configuration (secrets masked).
    Show,
}

pub fn run(config: &AppConfig, command: ConfigCommand) -> String {
    match command {
        ConfigCommand::Show => show(config),
    }
}

fn show(config: &AppConfig) -> String {
    let timeout = config
        .fetch_timeout
        .map(|timeout| format!("{}s", timeout.as_secs()))
        .unwrap_or_else(|| "disabled".to_string());

    [
        format!("Jira host: {}", display_value(&config.jira_host)),
        format!("Jira email: {}", display_value(&config.jira_email)),
        format!("Jira API token: {}", mask_secret(&config.jira_token)),
        format!("Jira base URL: {}", display_value(&config.jira_base_url)),
        format!("Ticket pattern: {}", config.ticket_pattern),
        format!("Requests per second: {}", config.requests_per_second),
        format!("Fetch timeout: {timeout}"),
        format!("Repository: {}", config.workspace_root.display()),
    ]
    .join("\n")
}

fn display_value(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<not set>".to_string())
}

fn mask_secret(value: &Option<String>) -> String {
    match value {
        Some(token) if token.chars().count() > 6 => {
            let chars: Vec<char> = token.chars().collect();
            let prefix: String = chars[..3].iter().collect();
            let suffix: String = chars[chars.len() - 3..].iter().collect();
            format!("{prefix}***{suffix}")
        }
        Some(token) if !token.is_empty() => "***".to_string(),
        _ => "<not set>".to_string(),
    }
}
