//! Recognizes the rule's own prior notifications so the host can retract
//! them once fresh CI activity has superseded them.

use tracing::{debug, error};

use crate::evaluate::StaleGreenRule;
use crate::view::{Notification, PullRequestView};

impl StaleGreenRule {
    /// Whether a notification is obsolete and eligible for removal.
    ///
    /// True iff the notification was authored by this automation's own
    /// identity, its body exactly equals the fixed retest message, and it
    /// predates the current CI evidence (see [`Self::posted_before_last_ci`]).
    /// Pure over its inputs: no side effects, safe to call concurrently
    /// for many notifications against the same snapshot.
    pub async fn is_stale_notification(
        &self,
        pr: &dyn PullRequestView,
        note: &Notification,
    ) -> bool {
        if !self.is_own_notification(note) {
            return false;
        }
        // The message is deterministic and constant, so exact comparison
        // is enough; a partial match could capture unrelated comments
        if note.body != self.config().retest_message() {
            return false;
        }
        let stale = self.posted_before_last_ci(pr, note).await;
        if stale {
            debug!(pr = pr.number(), "found stale retest notification");
        }
        stale
    }

    /// Whether a notification was authored by this rule's automation
    /// identity. GitHub logins are case-insensitive.
    pub fn is_own_notification(&self, note: &Notification) -> bool {
        note.author.eq_ignore_ascii_case(&self.config().bot_login)
    }

    /// Filter a candidate list down to the notifications eligible for
    /// removal.
    pub async fn stale_notifications(
        &self,
        pr: &dyn PullRequestView,
        notes: &[Notification],
    ) -> Vec<Notification> {
        let mut stale = Vec::new();
        for note in notes {
            if self.is_stale_notification(pr, note).await {
                stale.push(note.clone());
            }
        }
        stale
    }

    /// Whether the notification predates the rule's required CI evidence:
    /// every required context currently green, every success time
    /// determinable, and the notification no later than each success time
    /// plus the grace window. Missing evidence resolves to "not stale" --
    /// the notification may still be the most recent relevant record.
    async fn posted_before_last_ci(&self, pr: &dyn PullRequestView, note: &Notification) -> bool {
        let contexts = &self.config().required_contexts;

        match pr.is_status_success(contexts).await {
            Ok(true) => {}
            Ok(false) => return false,
            Err(err) => {
                error!(
                    pr = pr.number(),
                    error = %err,
                    "unable to determine aggregate status during reconciliation"
                );
                return false;
            }
        }

        for context in contexts {
            let status_time = match pr.status_time(context).await {
                Ok(Some(time)) => time,
                Ok(None) => return false,
                Err(err) => {
                    error!(
                        pr = pr.number(),
                        context = %context,
                        error = %err,
                        "unable to read status time during reconciliation"
                    );
                    return false;
                }
            };
            if note.created_at > status_time + self.config().grace_window() {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleConfig;
    use crate::mock::MockPullRequest;
    use chrono::{DateTime, Duration, Utc};

    fn rule() -> StaleGreenRule {
        StaleGreenRule::new(RuleConfig::default())
    }

    fn note(author: &str, body: &str, created_at: DateTime<Utc>) -> Notification {
        Notification {
            author: author.to_string(),
            body: body.to_string(),
            created_at,
        }
    }

    fn own_body() -> String {
        RuleConfig::default().retest_message()
    }

    fn green_pr(now: DateTime<Utc>) -> MockPullRequest {
        MockPullRequest::new(7)
            .all_green(true)
            .status_time("unit-test", Some(now - Duration::hours(2)))
            .status_time("e2e-test", Some(now - Duration::hours(1)))
    }

    #[tokio::test]
    async fn test_foreign_author_is_never_stale() {
        let now = Utc::now();
        let pr = green_pr(now);
        let note = note("some-human", &own_body(), now - Duration::hours(12));
        assert!(!rule().is_stale_notification(&pr, &note).await);
    }

    #[tokio::test]
    async fn test_body_mismatch_is_never_stale() {
        let now = Utc::now();
        let pr = green_pr(now);
        let note = note(
            "stalegreen-bot",
            "@ci-bot test this\n\nSomething else entirely.",
            now - Duration::hours(12),
        );
        assert!(!rule().is_stale_notification(&pr, &note).await);
    }

    #[tokio::test]
    async fn test_notification_before_evidence_is_stale() {
        // Worked example: posted 20 minutes after the earlier of the two
        // success times, well inside the grace window of both
        let now = Utc::now();
        let pr = green_pr(now);
        let earlier_success = now - Duration::hours(2);
        let note = note(
            "stalegreen-bot",
            &own_body(),
            earlier_success + Duration::minutes(20),
        );
        assert!(rule().is_stale_notification(&pr, &note).await);
    }

    #[tokio::test]
    async fn test_author_match_is_case_insensitive() {
        let now = Utc::now();
        let pr = green_pr(now);
        let note = note("Stalegreen-Bot", &own_body(), now - Duration::hours(12));
        assert!(rule().is_stale_notification(&pr, &note).await);
    }

    #[tokio::test]
    async fn test_one_second_past_grace_window_is_not_stale() {
        let now = Utc::now();
        let pr = green_pr(now);
        // One second past unit-test's grace window, even though still
        // inside e2e-test's; a single violated context keeps it fresh
        let note = note(
            "stalegreen-bot",
            &own_body(),
            now - Duration::hours(2) + Duration::minutes(30) + Duration::seconds(1),
        );
        assert!(!rule().is_stale_notification(&pr, &note).await);
    }

    #[tokio::test]
    async fn test_exactly_at_grace_window_is_stale() {
        let now = Utc::now();
        let pr = green_pr(now);
        // Right at the end of the earlier context's grace window
        let note = note(
            "stalegreen-bot",
            &own_body(),
            now - Duration::hours(2) + Duration::minutes(30),
        );
        assert!(rule().is_stale_notification(&pr, &note).await);
    }

    #[tokio::test]
    async fn test_not_green_is_not_stale() {
        let now = Utc::now();
        let pr = green_pr(now).all_green(false);
        let note = note("stalegreen-bot", &own_body(), now - Duration::hours(12));
        assert!(!rule().is_stale_notification(&pr, &note).await);
    }

    #[tokio::test]
    async fn test_missing_evidence_is_not_stale() {
        let now = Utc::now();
        let pr = green_pr(now).status_time("e2e-test", None);
        let note = note("stalegreen-bot", &own_body(), now - Duration::hours(12));
        assert!(!rule().is_stale_notification(&pr, &note).await);
    }

    #[tokio::test]
    async fn test_stale_notifications_filters_candidates() {
        let now = Utc::now();
        let pr = green_pr(now);
        let candidates = vec![
            note("stalegreen-bot", &own_body(), now - Duration::hours(12)),
            note("some-human", &own_body(), now - Duration::hours(12)),
            note("stalegreen-bot", "unrelated comment", now - Duration::hours(12)),
            note("stalegreen-bot", &own_body(), now),
        ];

        let stale = rule().stale_notifications(&pr, &candidates).await;
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0], candidates[0]);
    }
}
