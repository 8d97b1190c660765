use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use super::errors::ForkError;
use crate::github::{GitRef, RemoteRepository, RepoIdentity};

/// Head of one branch on each side of the fork relationship.
///
/// `None` means the branch does not exist on that side. A record is only
/// created when the branch was seen on at least one side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BranchStatus {
    pub sha: Option<String>,
    pub parent_sha: Option<String>,
}

impl BranchStatus {
    pub fn on_fork(sha: impl Into<String>) -> Self {
        Self {
            sha: Some(sha.into()),
            parent_sha: None,
        }
    }

    pub fn on_parent(parent_sha: impl Into<String>) -> Self {
        Self {
            sha: None,
            parent_sha: Some(parent_sha.into()),
        }
    }

    pub fn on_both(sha: impl Into<String>, parent_sha: impl Into<String>) -> Self {
        Self {
            sha: Some(sha.into()),
            parent_sha: Some(parent_sha.into()),
        }
    }

    pub fn is_in_sync(&self) -> bool {
        self.sha == self.parent_sha
    }
}

/// Branch heads of a fork and its parent, keyed by branch name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForkStatus {
    pub owner: String,
    pub repo: String,
    pub parent: Option<RepoIdentity>,
    pub branches: BTreeMap<String, BranchStatus>,
}

impl ForkStatus {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            parent: None,
            branches: BTreeMap::new(),
        }
    }

    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    /// Branches that exist on the fork, with their current head.
    pub fn fork_heads(&self) -> impl Iterator<Item = (&str, &str)> {
        self.branches
            .iter()
            .filter_map(|(name, branch)| branch.sha.as_deref().map(|sha| (name.as_str(), sha)))
    }

    pub fn in_sync(&self) -> bool {
        self.branches.values().all(BranchStatus::is_in_sync)
    }
}

fn commit_heads(refs: Vec<GitRef>) -> impl Iterator<Item = GitRef> {
    refs.into_iter().filter(|head| {
        let keep = head.points_at_commit();
        if !keep {
            debug!(
                reference = %head.name,
                kind = %head.object.kind,
                "Skipping non-commit reference"
            );
        }
        keep
    })
}

/// Read the branch heads of a fork and of its parent into one view.
///
/// The parent is only known once the fork's metadata is back, so the two
/// listings run one after the other. Any failure aborts the whole read.
pub async fn resolve_status<R>(
    client: &R,
    owner: &str,
    repo: &str,
) -> Result<ForkStatus, ForkError>
where
    R: RemoteRepository + ?Sized,
{
    let mut status = ForkStatus::new(owner, repo);

    let fork = client.get_repository(owner, repo).await?;

    for head in commit_heads(client.list_branch_heads(owner, repo).await?) {
        let name = head.branch_name().to_string();
        status.branches.insert(name, BranchStatus::on_fork(head.object.sha));
    }

    if let Some(parent) = fork.parent {
        for head in commit_heads(client.list_branch_heads(&parent.owner, &parent.name).await?) {
            let name = head.branch_name().to_string();
            status.branches.entry(name).or_default().parent_sha = Some(head.object.sha);
        }
        status.parent = Some(parent);
    }

    debug!(
        owner,
        repo,
        branches = status.branch_count(),
        has_parent = status.parent.is_some(),
        "Resolved fork status"
    );
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fork::mocks::{MockRemote, RemoteCall};
    use crate::github::GitHubError;

    #[tokio::test]
    async fn test_diverged_fork_view() {
        let remote = MockRemote::new()
            .with_fork("me", "app", "upstream", "app")
            .with_heads("me", "app", &[("main", "A"), ("feature", "B")])
            .with_heads("upstream", "app", &[("main", "C")]);

        let status = resolve_status(&remote, "me", "app").await.unwrap();

        assert_eq!(status.parent, Some(RepoIdentity::new("upstream", "app")));
        assert_eq!(status.branches.len(), 2);
        assert_eq!(status.branches["main"], BranchStatus::on_both("A", "C"));
        assert_eq!(status.branches["feature"], BranchStatus::on_fork("B"));
        assert!(!status.in_sync());
    }

    #[tokio::test]
    async fn test_parent_heads_merge_into_fork_records() {
        let remote = MockRemote::new()
            .with_fork("me", "app", "upstream", "app")
            .with_heads("me", "app", &[("release/1.0", "F1"), ("docs", "D")])
            .with_heads(
                "upstream",
                "app",
                &[("release/1.0", "P1"), ("docs", "D"), ("next", "N")],
            );

        let status = resolve_status(&remote, "me", "app").await.unwrap();

        assert_eq!(status.branch_count(), 3);
        assert_eq!(status.branches["release/1.0"], BranchStatus::on_both("F1", "P1"));
        assert!(status.branches["docs"].is_in_sync());
        assert_eq!(status.branches["next"], BranchStatus::on_parent("N"));
    }

    #[tokio::test]
    async fn test_parent_only_branch_has_no_fork_sha() {
        let remote = MockRemote::new()
            .with_fork("me", "app", "upstream", "app")
            .with_heads("upstream", "app", &[("main", "Z")]);

        let status = resolve_status(&remote, "me", "app").await.unwrap();

        assert_eq!(status.branches.len(), 1);
        assert_eq!(status.branches["main"], BranchStatus::on_parent("Z"));
        assert_eq!(status.fork_heads().count(), 0);
    }

    #[tokio::test]
    async fn test_repository_without_parent_lists_only_fork() {
        let remote = MockRemote::new()
            .with_repository("me", "standalone")
            .with_heads("me", "standalone", &[("main", "A"), ("dev", "B")]);

        let status = resolve_status(&remote, "me", "standalone").await.unwrap();

        assert!(status.parent.is_none());
        assert!(status.branches.values().all(|b| b.parent_sha.is_none()));
        assert_eq!(status.branches.len(), 2);
        assert_eq!(
            remote.calls(),
            vec![
                RemoteCall::GetRepository("me/standalone".to_string()),
                RemoteCall::ListHeads("me/standalone".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_non_commit_refs_are_skipped() {
        let remote = MockRemote::new()
            .with_fork("me", "app", "upstream", "app")
            .with_refs(
                "me",
                "app",
                vec![
                    GitRef::branch("main", "A"),
                    GitRef::new("refs/heads/tagged", "tag", "T1"),
                ],
            )
            .with_refs(
                "upstream",
                "app",
                vec![
                    GitRef::branch("main", "A"),
                    GitRef::new("refs/heads/annotated", "tag", "T2"),
                ],
            );

        let status = resolve_status(&remote, "me", "app").await.unwrap();

        assert_eq!(status.branches.len(), 1);
        assert!(status.in_sync());
    }

    #[tokio::test]
    async fn test_listing_failure_aborts_resolution() {
        let remote = MockRemote::new()
            .with_fork("me", "app", "upstream", "app")
            .with_heads("me", "app", &[("main", "A")])
            .failing_listing("upstream", "app");

        let result = resolve_status(&remote, "me", "app").await;

        assert!(matches!(
            result,
            Err(ForkError::Remote(GitHubError::NetworkError(_)))
        ));
    }

    #[tokio::test]
    async fn test_unknown_repository_fails() {
        let remote = MockRemote::new();
        assert!(resolve_status(&remote, "me", "missing").await.is_err());
    }
}
