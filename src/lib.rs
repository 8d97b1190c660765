// upstream-reset library - fork reconciliation against GitHub
// This exposes the core components for testing and integration

pub mod github;
pub mod fork;
pub mod telemetry;
pub mod http;
pub mod observability;
pub mod config;
pub mod cli;

// Re-export key types for easy access
pub use github::{GitHubClient, GitHubError, RemoteRepository};
pub use fork::{
    BranchAction, BranchOutcome, BranchStatus, Fork, ForkError, ForkStatus, ForkSummary,
    ResetReport, ResetSettings,
};
pub use telemetry::{init_telemetry, generate_correlation_id, create_fork_span};
pub use http::RateLimitedHttpClient;
pub use observability::{GitHubApiMetrics, api_metrics, OperationTimer};
pub use config::UpstreamResetConfig;
