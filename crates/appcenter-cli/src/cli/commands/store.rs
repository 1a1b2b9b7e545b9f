//! Store command - look up distribution stores

use clap::{Args, Subcommand};
use tracing::info;

use super::common::{open_app, AppArgs};
use crate::cli::{output, Cli, OutputFormat};

/// Distribution store operations
#[derive(Debug, Args)]
pub struct StoreCommand {
    #[command(flatten)]
    pub target: AppArgs,

    #[command(subcommand)]
    pub subcommand: StoreSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum StoreSubcommand {
    /// Show a distribution store
    Show {
        /// Store name
        name: String,
    },
}

impl StoreCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!("executing store command");
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<()> {
        let app = open_app(cli, &self.target)?;

        match &self.subcommand {
            StoreSubcommand::Show { name } => {
                let store = app.store(name).await?;
                if cli.format == OutputFormat::Json {
                    output::json(&store)?;
                } else if !cli.quiet {
                    output::print_store(&store);
                }
            }
        }

        Ok(())
    }
}
