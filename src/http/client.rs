use governor::{
    RateLimiter,
    Quota,
    DefaultDirectRateLimiter,
    Jitter
};
use octocrab::Octocrab;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::config::RateLimitConfig;
use crate::github::GitHubError;

/// Octocrab handle shared behind a GitHub API rate limiter.
///
/// Every branch task of a reset phase goes through the same limiter, so a
/// fan-out over many branches is paced instead of tripping GitHub's
/// secondary rate limits.
#[derive(Debug, Clone)]
pub struct RateLimitedHttpClient {
    octocrab: Octocrab,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
}

impl RateLimitedHttpClient {
    pub fn new(octocrab: Octocrab, limits: &RateLimitConfig) -> Result<Self, GitHubError> {
        let per_second = NonZeroU32::new(limits.requests_per_second).ok_or_else(|| {
            GitHubError::ClientSetup(
                "rate_limit.requests_per_second must be at least 1".to_string(),
            )
        })?;
        let burst = NonZeroU32::new(limits.burst_capacity).ok_or_else(|| {
            GitHubError::ClientSetup("rate_limit.burst_capacity must be at least 1".to_string())
        })?;

        let quota = Quota::per_second(per_second).allow_burst(burst);

        Ok(Self {
            octocrab,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    /// Wait for rate limit permission before issuing a request
    pub async fn until_ready(&self) {
        self.rate_limiter
            .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(100)))
            .await;
        debug!("Rate limiter granted GitHub API request");
    }

    /// Get the underlying octocrab instance for direct API calls
    pub fn octocrab(&self) -> &Octocrab {
        &self.octocrab
    }
}
