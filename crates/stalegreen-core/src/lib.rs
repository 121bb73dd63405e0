pub mod config;
pub mod error;
pub mod evaluate;
pub mod mock;
pub mod reconcile;
pub mod view;

// Re-export commonly used types
pub use config::RuleConfig;
pub use error::{RuleError, RuleResult};
pub use evaluate::{Action, StaleGreenRule, Verdict};
pub use mock::MockPullRequest;
pub use view::{Notification, PullRequestView};
