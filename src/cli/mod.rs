use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "upstream-reset")]
#[command(about = "Reset the branches of a GitHub fork to match its upstream parent")]
#[command(long_about = "upstream-reset compares every branch of a fork with its parent \
                       repository, backs up the fork's branch heads under \
                       refs/backups/<timestamp>/, and then creates, force-updates or deletes \
                       fork branches until they match the parent.")]
pub struct Cli {
    /// Path to a configuration file (defaults to ./upstream-reset.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List your forks that you can push to
    Repos {
        /// Print machine readable JSON
        #[arg(long)]
        json: bool,
    },
    /// Compare the branches of a fork with its parent (read-only)
    Status {
        /// Fork to inspect, as owner/repo
        repository: String,
        /// Print machine readable JSON
        #[arg(long)]
        json: bool,
        /// Also show the action a reset would take per branch
        #[arg(long, help = "Show what a reset would do to each branch")]
        plan: bool,
    },
    /// Back up the fork's branches, then reset them to the parent
    Reset {
        /// Fork to reset, as owner/repo
        repository: String,
        /// Apply the reset; without this flag only the plan is shown
        #[arg(short = 'y', long, help = "Skip the preview and rewrite the fork's branches")]
        yes: bool,
        /// Print machine readable JSON
        #[arg(long)]
        json: bool,
    },
}
