use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Configuration for the stale-green rule
///
/// Owned by the rule value rather than kept as process-wide state so tests
/// can run with alternate thresholds and context lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Label a reviewer applies to mark a change approved
    pub approval_label: String,

    /// Login of the account this automation posts comments as
    pub bot_login: String,

    /// Login of the CI-triggering identity addressed in retest requests
    pub ci_trigger_login: String,

    /// CI status contexts that must all be green before the approval counts.
    /// Iteration order is insertion order and carries no other meaning.
    pub required_contexts: Vec<String>,

    /// Age in hours beyond which a green status is considered stale
    pub stale_after_hours: i64,

    /// Slack in minutes added to a status timestamp when comparing it
    /// against a notification's posting time, absorbing recording latency
    pub grace_minutes: i64,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            approval_label: "lgtm".to_string(),
            bot_login: "stalegreen-bot".to_string(),
            ci_trigger_login: "ci-bot".to_string(),
            required_contexts: vec!["unit-test".to_string(), "e2e-test".to_string()],
            stale_after_hours: 96,
            grace_minutes: 30,
        }
    }
}

impl RuleConfig {
    /// Render the fixed retest notification body.
    ///
    /// The body is deterministic for a given configuration; the reconciler
    /// relies on exact equality with this string to recognize the rule's own
    /// notifications.
    pub fn retest_message(&self) -> String {
        format!(
            "@{} test this\n\nTests are more than {} hours old. Re-running tests.",
            self.ci_trigger_login, self.stale_after_hours
        )
    }

    /// Freshness threshold as a duration
    pub fn stale_after(&self) -> Duration {
        Duration::hours(self.stale_after_hours)
    }

    /// Grace window as a duration
    pub fn grace_window(&self) -> Duration {
        Duration::minutes(self.grace_minutes)
    }
}
