use super::errors::ForkError;
use super::status::ForkStatus;

/// Default cap on the union of fork and parent branches a reset will touch.
pub const MAX_BRANCH_COUNT: usize = 25;

/// Refuse to reset a fork whose combined branch set exceeds `max`.
pub fn check_branch_count(status: &ForkStatus, max: usize) -> Result<(), ForkError> {
    let count = status.branch_count();
    if count > max {
        return Err(ForkError::TooManyBranches { count, max });
    }
    Ok(())
}
