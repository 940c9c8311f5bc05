use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use tracing::debug;

use crate::context::AppContext;
use crate::domain::pattern::TicketPattern;
use crate::error::AppResult;
use crate::fetch::{FetchCache, RateLimiter};
use crate::render::{render_json, render_text};
use crate::services::CommitRange;
use crate::workflow::changelog::ChangelogGenerator;
use crate::workflow::correlate::CommitCorrelator;

#[derive(Args, Debug, Clone)]
pub struct ChangelogArgs {
    /// Ref the release is compared against (commits reachable from it are excluded).
    #[arg(short, long)]
    pub base: String,
    /// Release ref whose new commits are listed.
    #[arg(short, long)]
    pub release: String,
    /// Repository to read history from.
    #[arg(long)]
    pub repo: Option<PathBuf>,
    /// Ticket key pattern, e.g. '/([A-Z]+-\d+)/i'. Overrides JIRA_TICKET_ID_PATTERN.
    #[arg(long)]
    pub pattern: Option<String>,
    /// Maximum Jira requests started per second.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub rate: Option<u32>,
    /// Per-ticket fetch timeout in seconds; 0 disables it.
    #[arg(long)]
    pub timeout: Option<u64>,
    /// Print the annotated commits as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

pub async fn run(ctx: &AppContext, args: ChangelogArgs) -> AppResult<String> {
    let pattern = TicketPattern::parse(
        args.pattern
            .as_deref()
            .unwrap_or(&ctx.config.ticket_pattern),
    )?;
    let rate = args.rate.unwrap_or(ctx.config.requests_per_second);
    let timeout = match args.timeout {
        Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
        None => ctx.config.fetch_timeout,
    };

    let cache = Arc::new(
        FetchCache::new(Arc::new(RateLimiter::per_second(rate))).with_timeout(timeout),
    );
    let correlator =
        CommitCorrelator::new(pattern, Arc::clone(&ctx.issue_tracker), Arc::clone(&cache));
    let generator = ChangelogGenerator::new(correlator);

    let range = CommitRange {
        base: args.base,
        release: args.release,
    };
    let commits = ctx.version_control.commit_log(&range).await?;
    let changelog = generator.generate(commits).await?;
    debug!(requested = cache.len(), rate, "ticket lookups finished");

    if args.json {
        render_json(&changelog)
    } else {
        Ok(render_text(&changelog, ctx.issue_tracker.as_ref()))
    }
}
