use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A label applied to an issue or pull request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

/// Head ref of a pull request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadRef {
    pub sha: String,
}

/// The slice of a pull request record this automation consumes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestData {
    pub number: u64,
    #[serde(default)]
    pub labels: Vec<Label>,
    /// `None` while GitHub is still computing the merge commit, and always
    /// `None` on the list endpoint
    #[serde(default)]
    pub mergeable: Option<bool>,
    pub head: HeadRef,
}

/// State reported for a commit status context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusState {
    Success,
    Pending,
    Failure,
    Error,
}

/// One entry in a combined commit status; GitHub keeps the latest status
/// per context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusItem {
    pub context: String,
    pub state: StatusState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Combined status for a ref, as returned by
/// `GET /repos/{owner}/{repo}/commits/{ref}/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedStatus {
    pub state: StatusState,
    pub total_count: u32,
    pub statuses: Vec<StatusItem>,
}

impl CombinedStatus {
    /// Latest status entry for the named context
    pub fn context(&self, name: &str) -> Option<&StatusItem> {
        self.statuses.iter().find(|s| s.context == name)
    }

    /// Whether every named context currently reports success
    pub fn all_success(&self, contexts: &[String]) -> bool {
        contexts
            .iter()
            .all(|c| matches!(self.context(c), Some(s) if s.state == StatusState::Success))
    }

    /// Whether every named context currently reports pending
    pub fn all_pending(&self, contexts: &[String]) -> bool {
        contexts
            .iter()
            .all(|c| matches!(self.context(c), Some(s) if s.state == StatusState::Pending))
    }

    /// When the named context last transitioned to success; `None` if the
    /// context is absent or not currently successful
    pub fn success_time(&self, name: &str) -> Option<DateTime<Utc>> {
        self.context(name)
            .filter(|s| s.state == StatusState::Success)
            .map(|s| s.updated_at)
    }
}
