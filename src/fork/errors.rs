use thiserror::Error;

use crate::github::GitHubError;

#[derive(Error, Debug)]
pub enum ForkError {
    #[error("{0}")]
    Remote(#[from] GitHubError),

    #[error(
        "Too many branches found ({count}). \
         Max {max} for the unique sum of the repo and parent branches"
    )]
    TooManyBranches { count: usize, max: usize },

    #[error("Branch '{branch}' has neither a fork SHA nor a parent SHA")]
    BothShasEmpty { branch: String },

    #[error("Branch task did not complete: {0}")]
    TaskFailed(String),
}

impl ForkError {
    /// Whether the error was raised before any ref was touched.
    pub fn is_policy(&self) -> bool {
        matches!(self, ForkError::TooManyBranches { .. })
    }
}
