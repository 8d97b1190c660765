use tracing::info;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// GitHub API usage metrics
#[derive(Debug, Default)]
pub struct GitHubApiMetrics {
    pub total_requests: AtomicU64,
    pub mutations: AtomicU64,
    pub errors: AtomicU64,
}

impl GitHubApiMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Ref create/update/delete calls, counted before they are sent
    pub fn record_mutation(&self) {
        self.mutations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> GitHubApiStats {
        GitHubApiStats {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            mutations: self.mutations.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            requests = stats.total_requests,
            mutations = stats.mutations,
            errors = stats.errors,
            "GitHub API usage"
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GitHubApiStats {
    pub total_requests: u64,
    pub mutations: u64,
    pub errors: u64,
}

/// Global metrics instance
static GITHUB_METRICS: std::sync::LazyLock<GitHubApiMetrics> =
    std::sync::LazyLock::new(GitHubApiMetrics::new);

pub fn api_metrics() -> &'static GitHubApiMetrics {
    &GITHUB_METRICS
}

/// Time an operation and log its duration when finished
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn finish(self) {
        let duration = self.start.elapsed();
        info!(
            operation = %self.operation,
            duration_ms = duration.as_millis() as u64,
            "Operation completed"
        );
    }
}
