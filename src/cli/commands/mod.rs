use anyhow::Result;
use std::sync::Arc;

use crate::config::UpstreamResetConfig;
use crate::fork::Fork;
use crate::github::{GitHubClient, RepoIdentity};

pub mod repos;
pub mod reset;
pub mod status;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

pub fn connect(config: &UpstreamResetConfig) -> Result<Arc<GitHubClient>> {
    Ok(Arc::new(GitHubClient::new(&config.github)?))
}

/// Bind an `owner/repo` argument to a GitHub-backed fork.
pub fn open_fork(config: &UpstreamResetConfig, repository: &str) -> Result<Fork<GitHubClient>> {
    let target: RepoIdentity = repository.parse()?;
    let client = connect(config)?;
    Ok(Fork::new(client, target.owner, target.name).with_settings(config.reset.settings()))
}

pub async fn show_how_to_get_started() -> Result<()> {
    println!("🍴 upstream-reset - Reset a fork's branches to its parent");
    println!();
    println!("To get started:");
    println!("  📋 upstream-reset repos                 # List your forks");
    println!("  🔍 upstream-reset status owner/repo     # Compare fork and parent");
    println!("  🔄 upstream-reset reset owner/repo      # Preview the reset");
    println!("  ⚠️  upstream-reset reset owner/repo -y   # Back up and reset");
    println!();
    println!("💡 Backups are kept under refs/backups/<timestamp>/ in the fork.");
    Ok(())
}

pub(crate) fn short_sha(sha: Option<&str>) -> &str {
    match sha {
        Some(sha) if sha.len() > 7 => &sha[..7],
        Some(sha) => sha,
        None => "-",
    }
}
