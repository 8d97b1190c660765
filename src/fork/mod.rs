//! Fork reconciliation: read the branch heads of a fork and its parent,
//! back up the fork's heads, then rewrite the fork's branches to match.

pub mod backup;
pub mod errors;
mod fanout;
pub mod guard;
#[cfg(test)]
pub(crate) mod mocks;
pub mod repos;
pub mod reset;
pub mod status;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, Instrument};

use crate::github::RemoteRepository;
use crate::observability::OperationTimer;
use crate::telemetry::{create_fork_span, generate_correlation_id};

pub use backup::{backup_branches, backup_prefix, BackupRecord, DEFAULT_BACKUP_NAMESPACE};
pub use errors::ForkError;
pub use guard::{check_branch_count, MAX_BRANCH_COUNT};
pub use repos::{list_forks, ForkSummary};
pub use reset::{plan, reset_branches, BranchAction, BranchOutcome};
pub use status::{resolve_status, BranchStatus, ForkStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetSettings {
    pub max_branches: usize,
    pub backup_namespace: String,
}

impl Default for ResetSettings {
    fn default() -> Self {
        Self {
            max_branches: MAX_BRANCH_COUNT,
            backup_namespace: DEFAULT_BACKUP_NAMESPACE.to_string(),
        }
    }
}

/// Result of a completed reset
#[derive(Debug, Clone, Serialize)]
pub struct ResetReport {
    pub owner: String,
    pub repo: String,
    pub backup_prefix: String,
    pub backups: Vec<BackupRecord>,
    pub branches: Vec<BranchOutcome>,
}

impl ResetReport {
    pub fn changed(&self) -> usize {
        self.branches.iter().filter(|b| !b.action.is_noop()).count()
    }
}

/// A fork repository bound to a remote client
pub struct Fork<R: ?Sized> {
    client: Arc<R>,
    owner: String,
    repo: String,
    settings: ResetSettings,
}

impl<R> Fork<R>
where
    R: RemoteRepository + ?Sized + 'static,
{
    pub fn new(client: Arc<R>, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            client,
            owner: owner.into(),
            repo: repo.into(),
            settings: ResetSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ResetSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Read-only view of fork and parent branch heads. No branch limit applies.
    pub async fn get_status(&self) -> Result<ForkStatus, ForkError> {
        let span = create_fork_span("status", &self.owner, &self.repo, &generate_correlation_id());
        resolve_status(self.client.as_ref(), &self.owner, &self.repo)
            .instrument(span)
            .await
    }

    /// Status plus the action each branch would get, without changing anything.
    pub async fn plan(&self) -> Result<(ForkStatus, Vec<BranchOutcome>), ForkError> {
        let status = self.get_status().await?;
        let outcomes = plan(&status)?;
        Ok((status, outcomes))
    }

    /// Back up every fork branch, then reset every branch to the parent.
    ///
    /// A failure in either phase stops the run; refs already written by the
    /// failed phase stay as they are.
    pub async fn reset(&self) -> Result<ResetReport, ForkError> {
        self.reset_at(Utc::now()).await
    }

    pub async fn reset_at(&self, started: DateTime<Utc>) -> Result<ResetReport, ForkError> {
        let span = create_fork_span("reset", &self.owner, &self.repo, &generate_correlation_id());
        async {
            let timer = OperationTimer::new("fork_reset");

            let status = resolve_status(self.client.as_ref(), &self.owner, &self.repo).await?;
            check_branch_count(&status, self.settings.max_branches)?;

            let prefix = backup_prefix(started);
            let backups = backup_branches(
                self.client.clone(),
                &status,
                &self.settings.backup_namespace,
                &prefix,
            )
            .await?;
            info!(count = backups.len(), prefix = %prefix, "Backed up fork branches");

            let mut branches = reset_branches(self.client.clone(), &status).await?;
            branches.sort_by(|a, b| a.branch.cmp(&b.branch));

            let report = ResetReport {
                owner: self.owner.clone(),
                repo: self.repo.clone(),
                backup_prefix: prefix,
                backups,
                branches,
            };
            info!(changed = report.changed(), total = report.branches.len(), "Fork reset complete");
            timer.finish();
            Ok::<_, ForkError>(report)
        }
        .instrument(span)
        .await
    }
}
