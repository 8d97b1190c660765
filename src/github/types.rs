use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::GitHubError;

pub const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// A git reference as returned by the refs API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRef {
    #[serde(rename = "ref")]
    pub name: String,
    pub object: GitObject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitObject {
    #[serde(rename = "type")]
    pub kind: String,
    pub sha: String,
}

impl GitRef {
    pub fn new(name: impl Into<String>, kind: impl Into<String>, sha: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            object: GitObject {
                kind: kind.into(),
                sha: sha.into(),
            },
        }
    }

    /// Shorthand for a branch head pointing at a commit.
    pub fn branch(branch: &str, sha: impl Into<String>) -> Self {
        Self::new(branch_ref_path(branch), "commit", sha)
    }

    pub fn points_at_commit(&self) -> bool {
        self.object.kind == "commit"
    }

    /// Branch name with the `refs/heads/` prefix removed.
    pub fn branch_name(&self) -> &str {
        self.name
            .strip_prefix(BRANCH_REF_PREFIX)
            .unwrap_or(&self.name)
    }
}

pub fn branch_ref_path(branch: &str) -> String {
    format!("{BRANCH_REF_PREFIX}{branch}")
}

/// Owner and name of a repository
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoIdentity {
    pub owner: String,
    pub name: String,
}

impl RepoIdentity {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoIdentity {
    type Err = GitHubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(RepoIdentity::new(owner, name))
            }
            _ => Err(GitHubError::InvalidRepository(format!(
                "'{s}' is not of the form owner/repo"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoPermissions {
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub push: bool,
    #[serde(default)]
    pub pull: bool,
}

/// Repository metadata needed to locate a fork's parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryMetadata {
    pub identity: RepoIdentity,
    pub parent: Option<RepoIdentity>,
    pub permissions: Option<RepoPermissions>,
}

/// A repository entry from the authenticated user's repository list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySummary {
    pub identity: RepoIdentity,
    pub html_url: String,
    pub fork: bool,
    pub permissions: Option<RepoPermissions>,
}

// Wire shapes of the repository endpoints. Only the fields used here are
// declared; everything else in the payload is ignored.

#[derive(Debug, Deserialize)]
pub(crate) struct RawOwner {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawRepository {
    pub name: String,
    pub owner: RawOwner,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub permissions: Option<RepoPermissions>,
    #[serde(default)]
    pub parent: Option<Box<RawRepository>>,
}

impl RawRepository {
    fn identity(&self) -> RepoIdentity {
        RepoIdentity::new(self.owner.login.clone(), self.name.clone())
    }
}

impl From<RawRepository> for RepositoryMetadata {
    fn from(raw: RawRepository) -> Self {
        RepositoryMetadata {
            identity: raw.identity(),
            parent: raw.parent.as_ref().map(|parent| parent.identity()),
            permissions: raw.permissions,
        }
    }
}

impl From<RawRepository> for RepositorySummary {
    fn from(raw: RawRepository) -> Self {
        RepositorySummary {
            identity: raw.identity(),
            html_url: raw.html_url.clone().unwrap_or_default(),
            fork: raw.fork,
            permissions: raw.permissions,
        }
    }
}
