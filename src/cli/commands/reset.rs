use anyhow::Result;
use chrono::Utc;

use super::status::{render_plan, render_status};
use super::{open_fork, Command};
use crate::config::UpstreamResetConfig;
use crate::fork::{backup_prefix, ResetReport};
use crate::observability::api_metrics;

pub struct ResetCommand {
    pub config: UpstreamResetConfig,
    pub repository: String,
    pub confirmed: bool,
    pub json: bool,
}

impl ResetCommand {
    pub fn new(config: UpstreamResetConfig, repository: impl Into<String>) -> Self {
        Self {
            config,
            repository: repository.into(),
            confirmed: false,
            json: false,
        }
    }

    pub fn with_confirmation(mut self, confirmed: bool) -> Self {
        self.confirmed = confirmed;
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}

pub fn render_report(report: &ResetReport) -> String {
    let mut out = format!(
        "✅ Reset {}/{}: {} branch(es) changed, {} unchanged\n",
        report.owner,
        report.repo,
        report.changed(),
        report.branches.len() - report.changed()
    );
    if let Some(backup) = report.backups.first() {
        let location = backup
            .reference
            .strip_suffix(&backup.branch)
            .map(|dir| dir.trim_end_matches('/'))
            .unwrap_or(&report.backup_prefix);
        out.push_str(&format!(
            "💾 {} backup(s) under {}\n",
            report.backups.len(),
            location
        ));
    }
    for outcome in report.branches.iter().filter(|b| !b.action.is_noop()) {
        out.push_str(&format!("   {}: {}\n", outcome.branch, outcome.action));
    }
    out
}

/// Where to look after a reset stopped part way.
pub fn render_partial_failure(namespace: &str, prefix: &str) -> String {
    format!(
        "⚠️  The reset stopped part way; some refs may already have been written.\n   \
         Backups created by this run are under {namespace}/{prefix}/"
    )
}

impl Command for ResetCommand {
    async fn execute(&self) -> Result<()> {
        let fork = open_fork(&self.config, &self.repository)?;

        if !self.confirmed {
            let (status, outcomes) = fork.plan().await?;
            print!("{}", render_status(&status));
            println!();
            print!("{}", render_plan(&outcomes));
            println!();
            println!("🛑 Nothing changed. Re-run with --yes to back up and reset the fork.");
            return Ok(());
        }

        let started = Utc::now();
        let report = fork.reset_at(started).await;
        api_metrics().log_stats();

        match report {
            Ok(report) if self.json => {
                println!("{}", serde_json::to_string_pretty(&report)?);
                Ok(())
            }
            Ok(report) => {
                print!("{}", render_report(&report));
                Ok(())
            }
            Err(e) => {
                if !e.is_policy() {
                    let namespace = self.config.reset.settings().backup_namespace;
                    eprintln!("{}", render_partial_failure(&namespace, &backup_prefix(started)));
                }
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fork::{BackupRecord, BranchAction, BranchOutcome};

    #[test]
    fn test_render_report_lists_changed_branches_only() {
        let report = ResetReport {
            owner: "me".into(),
            repo: "app".into(),
            backup_prefix: "20240101000000".into(),
            backups: vec![BackupRecord {
                branch: "main".into(),
                reference: "refs/backups/20240101000000/main".into(),
                sha: "A".into(),
            }],
            branches: vec![
                BranchOutcome {
                    branch: "docs".into(),
                    action: BranchAction::Noop,
                },
                BranchOutcome {
                    branch: "main".into(),
                    action: BranchAction::Update {
                        from: "A".into(),
                        to: "C".into(),
                    },
                },
            ],
        };

        let rendered = render_report(&report);

        assert!(rendered.contains("1 branch(es) changed, 1 unchanged"));
        assert!(rendered.contains("under refs/backups/20240101000000"));
        assert!(rendered.contains("main: update A => C"));
        assert!(!rendered.contains("docs"));
    }

    #[test]
    fn test_partial_failure_names_this_runs_backups() {
        let rendered = render_partial_failure("refs/backups", "20240501120000");

        assert!(rendered.contains("stopped part way"));
        assert!(rendered.contains("under refs/backups/20240501120000/"));
    }

    #[test]
    fn test_partial_failure_prefix_matches_backup_refs() {
        use chrono::TimeZone;

        let started = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let rendered = render_partial_failure("refs/snapshots", &backup_prefix(started));

        assert!(rendered.contains("refs/snapshots/20240501120000/"));
    }
}
