use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::models::issues::Comment;
use stalegreen_core::{Notification, PullRequestView, RuleError, RuleResult};
use tokio::sync::Mutex;
use tracing::debug;

use crate::api::GithubApiClient;
use crate::types::{CombinedStatus, PullRequestData};

const WAIT_POLL_INTERVAL: Duration = Duration::from_secs(10);
const WAIT_MAX_ATTEMPTS: u32 = 30;

/// A pull request as seen through the GitHub API.
///
/// The combined commit status is fetched lazily and cached so every status
/// question asked during one evaluation pass is answered from the same
/// snapshot. `wait_for_pending` is the exception: it refetches on every
/// poll, since it exists to observe the state changing.
pub struct GithubPullRequest {
    client: Arc<GithubApiClient>,
    number: u64,
    head_sha: String,
    labels: Vec<String>,
    mergeable: Option<bool>,
    status: Mutex<Option<CombinedStatus>>,
}

impl GithubPullRequest {
    pub fn new(
        client: Arc<GithubApiClient>,
        number: u64,
        head_sha: String,
        labels: Vec<String>,
        mergeable: Option<bool>,
    ) -> Self {
        Self {
            client,
            number,
            head_sha,
            labels,
            mergeable,
            status: Mutex::new(None),
        }
    }

    /// Build a view from a fetched pull request record
    pub fn from_data(client: Arc<GithubApiClient>, pr: &PullRequestData) -> Self {
        let labels = pr.labels.iter().map(|l| l.name.clone()).collect();
        Self::new(client, pr.number, pr.head.sha.clone(), labels, pr.mergeable)
    }

    async fn status_snapshot(&self) -> RuleResult<CombinedStatus> {
        let mut guard = self.status.lock().await;
        if let Some(status) = guard.as_ref() {
            return Ok(status.clone());
        }
        let fetched = self.client.combined_status(&self.head_sha).await?;
        *guard = Some(fetched.clone());
        Ok(fetched)
    }

    async fn invalidate_status(&self) {
        self.status.lock().await.take();
    }
}

#[async_trait]
impl PullRequestView for GithubPullRequest {
    fn number(&self) -> u64 {
        self.number
    }

    fn is_pull_request(&self) -> bool {
        // Views are only ever constructed from pull request records
        true
    }

    fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l.eq_ignore_ascii_case(name))
    }

    async fn is_mergeable(&self) -> RuleResult<bool> {
        // GitHub reports None while the merge commit is still being
        // computed; that is "unknown", not a yes or a no
        self.mergeable.ok_or(RuleError::MergeabilityUnknown)
    }

    async fn is_status_success(&self, contexts: &[String]) -> RuleResult<bool> {
        Ok(self.status_snapshot().await?.all_success(contexts))
    }

    async fn status_time(&self, context: &str) -> RuleResult<Option<DateTime<Utc>>> {
        Ok(self.status_snapshot().await?.success_time(context))
    }

    async fn write_comment(&self, body: &str) -> RuleResult<()> {
        self.client.add_comment(self.number, body).await?;
        Ok(())
    }

    async fn wait_for_pending(&self, contexts: &[String]) -> RuleResult<()> {
        for attempt in 1..=WAIT_MAX_ATTEMPTS {
            self.invalidate_status().await;
            let status = self.status_snapshot().await?;
            if status.all_pending(contexts) {
                debug!(
                    pr = self.number,
                    attempt, "required contexts started re-running"
                );
                return Ok(());
            }
            tokio::time::sleep(WAIT_POLL_INTERVAL).await;
        }
        Err(RuleError::WaitTimeout(contexts.join(", ")))
    }
}

/// Map a GitHub issue comment to the rule's notification record
pub fn notification_from_comment(comment: &Comment) -> Notification {
    Notification {
        author: comment.user.login.clone(),
        body: comment.body.clone().unwrap_or_default(),
        created_at: comment.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> Arc<GithubApiClient> {
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
        Arc::new(
            GithubApiClient::new(
                "test-token".to_string(),
                "acme".to_string(),
                "widgets".to_string(),
            )
            .expect("client should build"),
        )
    }

    fn view(mergeable: Option<bool>) -> GithubPullRequest {
        GithubPullRequest::new(
            test_client(),
            12,
            "abc123".to_string(),
            vec!["lgtm".to_string(), "size/S".to_string()],
            mergeable,
        )
    }

    #[tokio::test]
    async fn test_labels_case_insensitive() {
        let pr = view(Some(true));
        assert!(pr.has_label("LGTM"));
        assert!(pr.has_label("size/s"));
        assert!(!pr.has_label("do-not-merge"));
    }

    #[tokio::test]
    async fn test_mergeable_tri_state() {
        assert!(view(Some(true)).is_mergeable().await.unwrap());
        assert!(!view(Some(false)).is_mergeable().await.unwrap());
        assert!(matches!(
            view(None).is_mergeable().await,
            Err(RuleError::MergeabilityUnknown)
        ));
    }

    #[tokio::test]
    async fn test_always_a_pull_request() {
        assert!(view(Some(true)).is_pull_request());
        assert_eq!(view(Some(true)).number(), 12);
    }
}
