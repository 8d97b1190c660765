use anyhow::Result;
use clap::Parser;

use upstream_reset::cli::commands::{
    repos::ReposCommand, reset::ResetCommand, show_how_to_get_started, status::StatusCommand,
    Command,
};
use upstream_reset::cli::{Cli, Commands};
use upstream_reset::config::UpstreamResetConfig;
use upstream_reset::init_telemetry;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _ = UpstreamResetConfig::load_env_file();
    let config = UpstreamResetConfig::load(cli.config.as_deref())?;
    init_telemetry(&config.observability)?;

    tokio::runtime::Runtime::new()?.block_on(async {
        match cli.command {
            None => show_how_to_get_started().await,
            Some(Commands::Repos { json }) => {
                ReposCommand::new(config).with_json(json).execute().await
            }
            Some(Commands::Status { repository, json, plan }) => {
                StatusCommand::new(config, repository)
                    .with_json(json)
                    .with_plan(plan)
                    .execute()
                    .await
            }
            Some(Commands::Reset { repository, yes, json }) => {
                ResetCommand::new(config, repository)
                    .with_confirmation(yes)
                    .with_json(json)
                    .execute()
                    .await
            }
        }
    })
}
