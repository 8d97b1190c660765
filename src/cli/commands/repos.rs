use anyhow::Result;

use super::{connect, Command};
use crate::config::UpstreamResetConfig;
use crate::fork::{list_forks, ForkSummary};

pub struct ReposCommand {
    pub config: UpstreamResetConfig,
    pub json: bool,
}

impl ReposCommand {
    pub fn new(config: UpstreamResetConfig) -> Self {
        Self { config, json: false }
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}

pub fn render_forks(forks: &[ForkSummary]) -> String {
    if forks.is_empty() {
        return "📭 No forks with push access found".to_string();
    }
    let mut out = format!("🍴 {} fork(s) you can reset:\n", forks.len());
    for fork in forks {
        out.push_str(&format!("   {}/{}  {}\n", fork.owner, fork.name, fork.url));
    }
    out
}

impl Command for ReposCommand {
    async fn execute(&self) -> Result<()> {
        let client = connect(&self.config)?;
        let forks = list_forks(client.as_ref()).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&forks)?);
        } else {
            print!("{}", render_forks(&forks));
        }
        Ok(())
    }
}
