use serde::Serialize;

use super::errors::ForkError;
use crate::github::RemoteRepository;

/// A fork the authenticated user is allowed to reset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForkSummary {
    pub owner: String,
    pub name: String,
    pub url: String,
}

/// Forks among the user's repositories, minus those without push access.
///
/// A repository that reports no permissions at all is kept.
pub async fn list_forks<R>(client: &R) -> Result<Vec<ForkSummary>, ForkError>
where
    R: RemoteRepository + ?Sized,
{
    let repositories = client.list_user_repositories().await?;

    Ok(repositories
        .into_iter()
        .filter(|repo| repo.fork)
        .filter(|repo| repo.permissions.map_or(true, |p| p.push))
        .map(|repo| ForkSummary {
            owner: repo.identity.owner,
            name: repo.identity.name,
            url: repo.html_url,
        })
        .collect())
}
