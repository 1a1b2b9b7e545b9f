//! Group command - look up distribution groups

use clap::{Args, Subcommand};
use tracing::info;

use super::common::{open_app, AppArgs};
use crate::cli::{output, Cli, OutputFormat};

/// Distribution group operations
#[derive(Debug, Args)]
pub struct GroupCommand {
    #[command(flatten)]
    pub target: AppArgs,

    #[command(subcommand)]
    pub subcommand: GroupSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum GroupSubcommand {
    /// Show a distribution group
    Show {
        /// Group name
        name: String,
    },
}

impl GroupCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!("executing group command");
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<()> {
        let app = open_app(cli, &self.target)?;

        match &self.subcommand {
            GroupSubcommand::Show { name } => {
                let group = app.group(name).await?;
                if cli.format == OutputFormat::Json {
                    output::json(&group)?;
                } else if !cli.quiet {
                    output::print_group(&group);
                }
            }
        }

        Ok(())
    }
}
