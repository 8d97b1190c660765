use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use super::errors::ForkError;
use super::fanout::fan_out;
use super::status::ForkStatus;
use crate::github::RemoteRepository;

pub const DEFAULT_BACKUP_NAMESPACE: &str = "refs/backups";

/// A fork branch head copied under the backup namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupRecord {
    pub branch: String,
    pub reference: String,
    pub sha: String,
}

/// Prefix shared by every backup of one run.
pub fn backup_prefix(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d%H%M%S").to_string()
}

pub fn backup_ref_path(namespace: &str, prefix: &str, branch: &str) -> String {
    format!("{namespace}/{prefix}/{branch}")
}

/// Copy every fork branch head to `<namespace>/<prefix>/<branch>`.
///
/// Branches that only exist on the parent have nothing to back up. Creates
/// already issued are kept when another one fails.
pub async fn backup_branches<R>(
    client: Arc<R>,
    status: &ForkStatus,
    namespace: &str,
    prefix: &str,
) -> Result<Vec<BackupRecord>, ForkError>
where
    R: RemoteRepository + ?Sized + 'static,
{
    let records: Vec<BackupRecord> = status
        .fork_heads()
        .map(|(branch, sha)| BackupRecord {
            branch: branch.to_string(),
            reference: backup_ref_path(namespace, prefix, branch),
            sha: sha.to_string(),
        })
        .collect();

    let owner = Arc::<str>::from(status.owner.as_str());
    let repo = Arc::<str>::from(status.repo.as_str());

    fan_out(records, |record| {
        let client = client.clone();
        let (owner, repo) = (owner.clone(), repo.clone());
        async move {
            info!(
                branch = %record.branch,
                reference = %record.reference,
                sha = %record.sha,
                "Backing up branch"
            );
            client
                .create_ref(&owner, &repo, &record.reference, &record.sha)
                .await?;
            Ok::<_, ForkError>(record)
        }
    })
    .await
}
