//! CLI definition and command handling

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::{DeployCommand, GroupCommand, InitCommand, ReleaseCommand, StoreCommand};

/// appcenter-deploy - ship builds to App Center
#[derive(Debug, Parser)]
#[command(name = "appcenter-deploy")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Dump every HTTP request and response to the debug log
    #[arg(long, global = true)]
    pub debug_http: bool,

    /// Configuration file (default: search for appcenter.toml/.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write a starter configuration file
    Init(InitCommand),

    /// Upload a build and distribute it
    Deploy(DeployCommand),

    /// Inspect and update releases
    Release(ReleaseCommand),

    /// Distribution group operations
    Group(GroupCommand),

    /// Distribution store operations
    Store(StoreCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<()> {
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }

        match self.command {
            Commands::Init(ref cmd) => cmd.execute(&self),
            Commands::Deploy(ref cmd) => cmd.execute(&self),
            Commands::Release(ref cmd) => cmd.execute(&self),
            Commands::Group(ref cmd) => cmd.execute(&self),
            Commands::Store(ref cmd) => cmd.execute(&self),
        }
    }

    /// Whether human-readable progress should be printed
    pub fn show_text(&self) -> bool {
        !self.quiet && self.format == OutputFormat::Text
    }
}
