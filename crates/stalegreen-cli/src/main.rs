mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use config::AppConfig;
use stalegreen_core::{Action, PullRequestView, StaleGreenRule};
use stalegreen_github::{GithubApiClient, GithubPullRequest, notification_from_comment};
use tracing::{error, info, warn};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "stalegreen")]
#[command(about = "Re-triggers stale green CI on approved pull requests")]
#[command(version = VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single evaluation pass over all open pull requests
    Scan,
    /// Run evaluation passes on a fixed interval
    Watch {
        /// Seconds between passes
        #[arg(short, long, default_value_t = 300)]
        interval: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let client = Arc::new(
        GithubApiClient::new(
            config.github.token.clone(),
            config.github.owner.clone(),
            config.github.repo.clone(),
        )
        .context("Failed to create GitHub API client")?,
    );
    let rule = StaleGreenRule::new(config.rule.clone());

    info!(
        repo = %format!("{}/{}", config.github.owner, config.github.repo),
        "stalegreen starting"
    );

    match cli.command {
        Commands::Scan => run_pass(&client, &rule).await?,
        Commands::Watch { interval } => {
            let mut ticker = tokio::time::interval(Duration::from_secs(interval));
            loop {
                ticker.tick().await;
                if let Err(err) = run_pass(&client, &rule).await {
                    error!(error = %err, "evaluation pass failed");
                }
            }
        }
    }

    Ok(())
}

/// One evaluation pass: process every open pull request, then retract the
/// rule's own notifications that fresh CI activity has superseded.
/// Per-PR failures are logged and never abort the pass.
async fn run_pass(client: &Arc<GithubApiClient>, rule: &StaleGreenRule) -> Result<()> {
    let prs = client
        .list_open_pull_requests()
        .await
        .context("Failed to list open pull requests")?;
    info!(count = prs.len(), "scanning open pull requests");

    for pr in &prs {
        // The list payload omits mergeability; fetch the full record
        let full = match client.get_pull_request(pr.number).await {
            Ok(full) => full,
            Err(err) => {
                warn!(pr = pr.number, error = %err, "skipping pull request, fetch failed");
                continue;
            }
        };
        let view = GithubPullRequest::from_data(Arc::clone(client), &full);

        match rule.process(&view, Utc::now()).await {
            Ok(Action::TriggerRetest) => info!(pr = pr.number, "triggered retest"),
            Ok(Action::NoOp) => {}
            Err(err) => {
                warn!(pr = pr.number, error = %err, "rule evaluation failed");
                continue;
            }
        }

        reconcile_notifications(client, rule, &view).await;
    }

    Ok(())
}

/// Delete notifications the reconciler classifies as stale
async fn reconcile_notifications(
    client: &Arc<GithubApiClient>,
    rule: &StaleGreenRule,
    view: &GithubPullRequest,
) {
    let number = view.number();
    let comments = match client.list_comments(number).await {
        Ok(comments) => comments,
        Err(err) => {
            warn!(pr = number, error = %err, "skipping reconciliation, comment listing failed");
            return;
        }
    };

    for comment in &comments {
        let note = notification_from_comment(comment);
        if !rule.is_stale_notification(view, &note).await {
            continue;
        }
        match client.delete_comment(comment.id).await {
            Ok(()) => info!(pr = number, comment = ?comment.id, "removed superseded notification"),
            Err(err) => {
                warn!(pr = number, comment = ?comment.id, error = %err, "failed to delete notification")
            }
        }
    }
}
