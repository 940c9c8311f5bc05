mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod fetch;
mod infra;
mod render;
mod services;
mod workflow;

use std::path::Path;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::cmd::changelog::{self, ChangelogArgs};
use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::infra::git::GitCli;
use crate::infra::jira::JiraClient;

#[derive(Parser)]
#[command(
    name = "jira-changelog",
    author,
    version,
    about = "Build a changelog from the Jira tickets referenced in a commit range"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the Jira tickets and untracked commits between two refs.
    Changelog(ChangelogArgs),
    /// Inspect configuration.
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Config(args) => {
            let config = AppConfig::load(&cwd)?;
            println!("{}", config_cmd::run(&config, args.command));
            Ok(())
        }
        Commands::Changelog(args) => {
            let repo = args.repo.clone().unwrap_or(cwd);
            run_changelog(&repo, args).await
        }
    }
}

async fn run_changelog(repo: &Path, args: ChangelogArgs) -> AppResult<()> {
    let config = AppConfig::load(repo)?;

    if config.jira_host.is_none() {
        warn!("Jira host not configured; every ticket lookup will fail");
    }
    if config.jira_email.is_none() || config.jira_token.is_none() {
        warn!("Jira credentials not configured; every ticket lookup will fail");
    }

    let git = Arc::new(GitCli::new(config.workspace_root.clone()));
    let issue_tracker = Arc::new(JiraClient::new(
        config.jira_host.clone(),
        config.jira_email.clone(),
        config.jira_token.clone(),
        config.jira_base_url.clone(),
    ));

    let context = AppContext::new(config, git, issue_tracker);
    let output = changelog::run(&context, args).await?;
    println!("{output}");

    Ok(())
}
