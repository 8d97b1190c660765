use anyhow::Result;
use serde_json::json;

use super::{open_fork, short_sha, Command};
use crate::config::UpstreamResetConfig;
use crate::fork::{BranchOutcome, ForkStatus};

pub struct StatusCommand {
    pub config: UpstreamResetConfig,
    pub repository: String,
    pub json: bool,
    pub plan: bool,
}

impl StatusCommand {
    pub fn new(config: UpstreamResetConfig, repository: impl Into<String>) -> Self {
        Self {
            config,
            repository: repository.into(),
            json: false,
            plan: false,
        }
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn with_plan(mut self, plan: bool) -> Self {
        self.plan = plan;
        self
    }
}

pub fn render_status(status: &ForkStatus) -> String {
    let mut out = format!("🍴 {}/{}\n", status.owner, status.repo);
    match &status.parent {
        Some(parent) => out.push_str(&format!("⬆️  parent: {parent}\n")),
        None => out.push_str("⬆️  parent: none (not a fork)\n"),
    }
    out.push('\n');

    if status.branches.is_empty() {
        out.push_str("   (no branches)\n");
        return out;
    }

    out.push_str(&format!("   {:<30} {:<8} {:<8}\n", "BRANCH", "FORK", "PARENT"));
    for (name, branch) in &status.branches {
        let marker = if branch.is_in_sync() { "✅" } else { "🔀" };
        out.push_str(&format!(
            "{marker} {:<30} {:<8} {:<8}\n",
            name,
            short_sha(branch.sha.as_deref()),
            short_sha(branch.parent_sha.as_deref()),
        ));
    }
    out
}

pub fn render_plan(outcomes: &[BranchOutcome]) -> String {
    let mut out = String::from("📋 RESET PLAN:\n");
    for outcome in outcomes {
        out.push_str(&format!("   {}: {}\n", outcome.branch, outcome.action));
    }
    out
}

impl Command for StatusCommand {
    async fn execute(&self) -> Result<()> {
        let fork = open_fork(&self.config, &self.repository)?;

        if self.plan {
            let (status, outcomes) = fork.plan().await?;
            if self.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({ "status": status, "plan": outcomes }))?
                );
            } else {
                print!("{}", render_status(&status));
                println!();
                print!("{}", render_plan(&outcomes));
            }
            return Ok(());
        }

        let status = fork.get_status().await?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&status)?);
        } else {
            print!("{}", render_status(&status));
        }
        Ok(())
    }
}
