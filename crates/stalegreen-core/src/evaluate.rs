use chrono::{DateTime, Utc};
use tracing::{error, warn};

use crate::config::RuleConfig;
use crate::error::RuleResult;
use crate::view::PullRequestView;

/// What the evaluator decided to do with a pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    NoOp,
    TriggerRetest,
}

/// Where a pull request stands relative to the freshness threshold.
///
/// Derived on every evaluation from current facts; never persisted, so the
/// same inputs always produce the same verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// A precondition failed or a required fact could not be determined
    NotApplicable,
    /// All required contexts are green and recent enough
    Fresh,
    /// The named context last succeeded longer ago than the threshold
    Stale { context: String },
}

/// The stale-green rule: an approved, mergeable, all-green pull request
/// whose CI evidence is older than the freshness threshold gets its tests
/// re-triggered, with a notification comment recording that it happened.
pub struct StaleGreenRule {
    config: RuleConfig,
}

impl StaleGreenRule {
    pub fn new(config: RuleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// Compute the staleness verdict for a pull request. Read-only.
    ///
    /// Preconditions are checked in order and short-circuit to
    /// `NotApplicable`: the subject must be a pull request, carry the
    /// approval label, be mergeable (unknown mergeability is never treated
    /// as mergeable), and report aggregate success across the required
    /// contexts. Contexts are then scanned in order; the first one older
    /// than the threshold decides `Stale`. A context whose success time
    /// cannot be determined aborts the whole scan rather than being
    /// skipped, since a verdict built on a missing fact could be wrong
    /// either way.
    pub async fn assess(&self, pr: &dyn PullRequestView, now: DateTime<Utc>) -> Verdict {
        if !pr.is_pull_request() {
            return Verdict::NotApplicable;
        }

        if !pr.has_label(&self.config.approval_label) {
            return Verdict::NotApplicable;
        }

        match pr.is_mergeable().await {
            Ok(true) => {}
            Ok(false) | Err(_) => return Verdict::NotApplicable,
        }

        match pr.is_status_success(&self.config.required_contexts).await {
            Ok(true) => {}
            Ok(false) => return Verdict::NotApplicable,
            Err(err) => {
                error!(
                    pr = pr.number(),
                    error = %err,
                    "unable to determine aggregate status"
                );
                return Verdict::NotApplicable;
            }
        }

        for context in &self.config.required_contexts {
            let status_time = match pr.status_time(context).await {
                Ok(Some(time)) => time,
                Ok(None) => {
                    error!(
                        pr = pr.number(),
                        context = %context,
                        "unable to determine time context was set"
                    );
                    return Verdict::NotApplicable;
                }
                Err(err) => {
                    error!(
                        pr = pr.number(),
                        context = %context,
                        error = %err,
                        "unable to read status time"
                    );
                    return Verdict::NotApplicable;
                }
            };
            if now - status_time > self.config.stale_after() {
                return Verdict::Stale {
                    context: context.clone(),
                };
            }
        }

        Verdict::Fresh
    }

    /// Decide which action to take for a pull request. Read-only.
    pub async fn evaluate(&self, pr: &dyn PullRequestView, now: DateTime<Utc>) -> Action {
        match self.assess(pr, now).await {
            Verdict::Stale { .. } => Action::TriggerRetest,
            Verdict::NotApplicable | Verdict::Fresh => Action::NoOp,
        }
    }

    /// Execute the side effects of an action.
    ///
    /// For `TriggerRetest`: post the notification comment first, then wait
    /// for the required contexts to be observed re-running. The comment
    /// must exist before the wait can fail, so a human is informed even
    /// when the automated wait does not succeed. A wait failure is a
    /// non-fatal diagnostic; the posted comment is not retracted and the
    /// next pass re-derives the verdict from fresh data.
    pub async fn apply(&self, pr: &dyn PullRequestView, action: Action) -> RuleResult<()> {
        if action != Action::TriggerRetest {
            return Ok(());
        }

        pr.write_comment(&self.config.retest_message()).await?;

        if let Err(err) = pr.wait_for_pending(&self.config.required_contexts).await {
            warn!(
                pr = pr.number(),
                error = %err,
                "failed waiting for pull request to start testing"
            );
        }

        Ok(())
    }

    /// Evaluate a pull request and execute the resulting action.
    ///
    /// The per-pull-request entry point a host calls on every pass.
    pub async fn process(&self, pr: &dyn PullRequestView, now: DateTime<Utc>) -> RuleResult<Action> {
        let action = self.evaluate(pr, now).await;
        self.apply(pr, action).await?;
        Ok(action)
    }
}
