use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RuleResult;

/// The surface the rule needs from a pull request.
///
/// Implemented over a live GitHub client in `stalegreen-github` and by
/// [`crate::mock::MockPullRequest`] for tests. An implementation should
/// present one consistent status snapshot for the duration of an
/// evaluation pass.
#[async_trait]
pub trait PullRequestView: Send + Sync {
    /// Number of the underlying issue or pull request
    fn number(&self) -> u64;

    /// Whether the subject is a pull request at all (plain issues are ignored)
    fn is_pull_request(&self) -> bool;

    /// Whether the given label is currently applied
    fn has_label(&self, name: &str) -> bool;

    /// Whether the change is mergeable. `Err` means "unknown" and must not
    /// be treated as either true or false.
    async fn is_mergeable(&self) -> RuleResult<bool>;

    /// Aggregate success across the given named status contexts
    async fn is_status_success(&self, contexts: &[String]) -> RuleResult<bool>;

    /// Last time the named context transitioned to success; `None` if that
    /// cannot be determined or the context is not currently successful
    async fn status_time(&self, context: &str) -> RuleResult<Option<DateTime<Utc>>>;

    /// Post a comment on the pull request
    async fn write_comment(&self, body: &str) -> RuleResult<()>;

    /// Block until a re-run of the given contexts is observed started,
    /// or fail with a timeout/transport error
    async fn wait_for_pending(&self, contexts: &[String]) -> RuleResult<()>;
}

/// A previously posted automation comment, read back for reconciliation.
///
/// Owned by the host's comment store; the rule only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Login of the comment author
    pub author: String,
    /// Full comment body
    pub body: String,
    /// When the comment was posted
    pub created_at: DateTime<Utc>,
}
