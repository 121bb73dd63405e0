pub mod api;
pub mod error;
pub mod types;
pub mod view;

// Re-export commonly used types
pub use api::GithubApiClient;
pub use error::{GithubError, GithubResult};
pub use types::{CombinedStatus, HeadRef, Label, PullRequestData, StatusItem, StatusState};
pub use view::{GithubPullRequest, notification_from_comment};
