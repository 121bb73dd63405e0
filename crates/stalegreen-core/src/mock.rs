use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{RuleError, RuleResult};
use crate::view::PullRequestView;

/// In-memory pull request for testing the rule without a live host.
///
/// Built with chained setters; records the comments written to it and the
/// number of wait calls so tests can assert on side effects.
#[derive(Debug, Default)]
pub struct MockPullRequest {
    number: u64,
    is_pr: bool,
    labels: Vec<String>,
    mergeable: Option<bool>,
    aggregate_success: bool,
    status_times: HashMap<String, Option<DateTime<Utc>>>,
    fail_comment: bool,
    fail_wait: bool,
    comments: Mutex<Vec<String>>,
    wait_calls: AtomicUsize,
}

impl MockPullRequest {
    pub fn new(number: u64) -> Self {
        Self {
            number,
            is_pr: true,
            ..Self::default()
        }
    }

    /// Mark the subject as a pull request (true) or a plain issue (false)
    pub fn pull_request(mut self, is_pr: bool) -> Self {
        self.is_pr = is_pr;
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.labels.push(label.to_string());
        self
    }

    /// `None` models the platform reporting mergeability as unknown
    pub fn mergeable(mut self, mergeable: Option<bool>) -> Self {
        self.mergeable = mergeable;
        self
    }

    /// Aggregate success reported for any context set
    pub fn all_green(mut self, green: bool) -> Self {
        self.aggregate_success = green;
        self
    }

    /// Record a success time for a context; `None` models an
    /// undeterminable timestamp
    pub fn status_time(mut self, context: &str, time: Option<DateTime<Utc>>) -> Self {
        self.status_times.insert(context.to_string(), time);
        self
    }

    /// Make `write_comment` fail
    pub fn fail_comment(mut self) -> Self {
        self.fail_comment = true;
        self
    }

    /// Make `wait_for_pending` fail
    pub fn fail_wait(mut self) -> Self {
        self.fail_wait = true;
        self
    }

    /// Comments written so far, in order
    pub fn comments(&self) -> Vec<String> {
        self.comments.lock().expect("comment log poisoned").clone()
    }

    /// How many times `wait_for_pending` was called
    pub fn wait_calls(&self) -> usize {
        self.wait_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PullRequestView for MockPullRequest {
    fn number(&self) -> u64 {
        self.number
    }

    fn is_pull_request(&self) -> bool {
        self.is_pr
    }

    fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l.eq_ignore_ascii_case(name))
    }

    async fn is_mergeable(&self) -> RuleResult<bool> {
        self.mergeable.ok_or(RuleError::MergeabilityUnknown)
    }

    async fn is_status_success(&self, _contexts: &[String]) -> RuleResult<bool> {
        Ok(self.aggregate_success)
    }

    async fn status_time(&self, context: &str) -> RuleResult<Option<DateTime<Utc>>> {
        Ok(self.status_times.get(context).copied().flatten())
    }

    async fn write_comment(&self, body: &str) -> RuleResult<()> {
        if self.fail_comment {
            return Err(RuleError::Api("comment rejected".to_string()));
        }
        self.comments
            .lock()
            .expect("comment log poisoned")
            .push(body.to_string());
        Ok(())
    }

    async fn wait_for_pending(&self, contexts: &[String]) -> RuleResult<()> {
        self.wait_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_wait {
            return Err(RuleError::WaitTimeout(contexts.join(", ")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_defaults() {
        let pr = MockPullRequest::new(42);
        assert_eq!(pr.number(), 42);
        assert!(pr.is_pull_request());
        assert!(!pr.has_label("lgtm"));
        assert!(pr.is_mergeable().await.is_err());
        assert_eq!(
            PullRequestView::status_time(&pr, "unit-test").await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_mock_records_comments() {
        let pr = MockPullRequest::new(42);
        pr.write_comment("first").await.unwrap();
        pr.write_comment("second").await.unwrap();
        assert_eq!(pr.comments(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_mock_label_case_insensitive() {
        let pr = MockPullRequest::new(42).with_label("LGTM");
        assert!(pr.has_label("lgtm"));
    }
}
