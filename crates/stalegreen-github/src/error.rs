use thiserror::Error;

#[derive(Error, Debug)]
pub enum GithubError {
    #[error("GitHub API error: {0}")]
    ApiError(String),
}

pub type GithubResult<T> = Result<T, GithubError>;

impl From<GithubError> for stalegreen_core::RuleError {
    fn from(err: GithubError) -> Self {
        stalegreen_core::RuleError::Api(err.to_string())
    }
}
