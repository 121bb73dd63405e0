use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuleError {
    /// The hosting platform could not report whether the change is
    /// mergeable. Never resolved to true or false.
    #[error("mergeability could not be determined")]
    MergeabilityUnknown,

    #[error("API error: {0}")]
    Api(String),

    #[error("timed out waiting for contexts to start testing: {0}")]
    WaitTimeout(String),
}

pub type RuleResult<T> = Result<T, RuleError>;
