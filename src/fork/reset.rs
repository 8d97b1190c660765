use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::info;

use super::errors::ForkError;
use super::fanout::fan_out;
use super::status::{BranchStatus, ForkStatus};
use crate::github::types::branch_ref_path;
use crate::github::RemoteRepository;

/// What a reset does to one fork branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum BranchAction {
    Noop,
    Create { sha: String },
    Update { from: String, to: String },
    Delete { sha: String },
}

impl BranchAction {
    /// Choose the single ref operation that makes the fork branch equal
    /// to the parent branch.
    pub fn decide(branch: &str, status: &BranchStatus) -> Result<Self, ForkError> {
        match (&status.sha, &status.parent_sha) {
            (None, None) => Err(ForkError::BothShasEmpty {
                branch: branch.to_string(),
            }),
            (Some(current), Some(parent)) if current == parent => Ok(BranchAction::Noop),
            (None, Some(parent)) => Ok(BranchAction::Create { sha: parent.clone() }),
            (Some(current), Some(parent)) => Ok(BranchAction::Update {
                from: current.clone(),
                to: parent.clone(),
            }),
            (Some(current), None) => Ok(BranchAction::Delete { sha: current.clone() }),
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, BranchAction::Noop)
    }
}

impl fmt::Display for BranchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchAction::Noop => write!(f, "noop"),
            BranchAction::Create { sha } => write!(f, "create => {sha}"),
            BranchAction::Update { from, to } => write!(f, "update {from} => {to}"),
            BranchAction::Delete { sha } => write!(f, "delete {sha} =>"),
        }
    }
}

/// A branch and the action applied (or planned) for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchOutcome {
    pub branch: String,
    #[serde(flatten)]
    pub action: BranchAction,
}

/// Decide the action for every branch without touching the remote.
pub fn plan(status: &ForkStatus) -> Result<Vec<BranchOutcome>, ForkError> {
    status
        .branches
        .iter()
        .map(|(branch, record)| {
            Ok(BranchOutcome {
                branch: branch.clone(),
                action: BranchAction::decide(branch, record)?,
            })
        })
        .collect()
}

async fn apply<R>(
    client: &R,
    owner: &str,
    repo: &str,
    outcome: &BranchOutcome,
) -> Result<(), ForkError>
where
    R: RemoteRepository + ?Sized,
{
    let reference = branch_ref_path(&outcome.branch);
    match &outcome.action {
        BranchAction::Noop => {
            info!(branch = %outcome.branch, action = "noop", "Branch already matches parent");
        }
        BranchAction::Create { sha } => {
            info!(branch = %outcome.branch, action = "create", to = %sha, "Resetting branch");
            client.create_ref(owner, repo, &reference, sha).await?;
        }
        BranchAction::Update { from, to } => {
            info!(
                branch = %outcome.branch,
                action = "update",
                from = %from,
                to = %to,
                "Resetting branch"
            );
            client.update_ref(owner, repo, &reference, to, true).await?;
        }
        BranchAction::Delete { sha } => {
            info!(branch = %outcome.branch, action = "delete", from = %sha, "Resetting branch");
            client.delete_ref(owner, repo, &reference).await?;
        }
    }
    Ok(())
}

/// Make every fork branch match its parent, one concurrent task per branch.
///
/// Every branch is decided before any task starts, so a record with no
/// SHA on either side fails the phase without touching the remote.
pub async fn reset_branches<R>(
    client: Arc<R>,
    status: &ForkStatus,
) -> Result<Vec<BranchOutcome>, ForkError>
where
    R: RemoteRepository + ?Sized + 'static,
{
    let outcomes = plan(status)?;

    let owner = Arc::<str>::from(status.owner.as_str());
    let repo = Arc::<str>::from(status.repo.as_str());

    fan_out(outcomes, |outcome| {
        let client = client.clone();
        let (owner, repo) = (owner.clone(), repo.clone());
        async move {
            apply(client.as_ref(), &owner, &repo, &outcome).await?;
            Ok::<_, ForkError>(outcome)
        }
    })
    .await
}
