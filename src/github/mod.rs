pub mod client;
pub mod types;
pub mod errors;

pub use client::{GitHubClient, RemoteRepository};
pub use errors::GitHubError;
pub use types::{GitRef, RepoIdentity, RepoPermissions, RepositoryMetadata, RepositorySummary};
