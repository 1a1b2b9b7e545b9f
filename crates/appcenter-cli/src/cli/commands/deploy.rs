//! Deploy command - upload a build and distribute it

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use appcenter::config::validate_config;
use appcenter::{deploy, DeployConfig, DeployReport, ProcessRunner, UploadMode};

use super::common::{resolve_config, AppArgs};
use crate::cli::{output, Cli, OutputFormat};

/// Upload a build, then share it with groups, stores and testers
#[derive(Debug, Args)]
pub struct DeployCommand {
    #[command(flatten)]
    pub target: AppArgs,

    /// Artifact to upload (APK, AAB, IPA, ...)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Upload through the REST API or the appcenter tool
    #[arg(long)]
    pub mode: Option<UploadMode>,

    /// Distribution groups (comma-separated, replaces configured groups)
    #[arg(short, long, value_delimiter = ',')]
    pub group: Vec<String>,

    /// Distribution stores (comma-separated, replaces configured stores)
    #[arg(short, long, value_delimiter = ',')]
    pub store: Vec<String>,

    /// Tester emails (comma-separated, replaces configured testers)
    #[arg(short, long, value_delimiter = ',')]
    pub tester: Vec<String>,

    /// Build number override
    #[arg(long)]
    pub build_number: Option<String>,

    /// Build version override
    #[arg(long)]
    pub build_version: Option<String>,

    /// Release notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Path to file containing release notes
    #[arg(long, conflicts_with = "notes")]
    pub notes_file: Option<PathBuf>,

    /// Symbol file to upload (dSYM zip or mapping.txt)
    #[arg(long)]
    pub symbols: Option<PathBuf>,

    /// Force testers to install the update
    #[arg(long)]
    pub mandatory: bool,

    /// Email testers about the release
    #[arg(long)]
    pub notify_testers: bool,
}

impl DeployCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!("executing deploy command");
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<()> {
        let mut config = resolve_config(cli, &self.target)?;
        self.apply(&mut config);
        validate_config(&config)?;

        if let Some(file) = &config.release.file {
            if !file.exists() {
                anyhow::bail!("Artifact not found: {}", file.display());
            }
        }

        if cli.show_text() {
            println!();
            println!("{}", style("Deploying to App Center...").bold());
            println!("  App: {}/{}", config.owner, config.app);
            if let Some(file) = &config.release.file {
                println!("  File: {}", style(file.display()).cyan());
            }
            println!("  Mode: {}", style(config.release.mode).dim());
            if !config.groups.is_empty() {
                println!("  Groups: {}", style(config.groups.join(", ")).dim());
            }
            println!();
        }

        let client = config.client(cli.debug_http)?;
        let report = deploy(&client, &config, &ProcessRunner).await?;

        if cli.format == OutputFormat::Json {
            output::json(&report)?;
        } else if !cli.quiet {
            print_report(&report);
        }

        Ok(())
    }

    /// Overlay command line values onto the configuration
    fn apply(&self, config: &mut DeployConfig) {
        let release = &mut config.release;
        if let Some(file) = &self.file {
            release.file = Some(file.clone());
        }
        if let Some(mode) = self.mode {
            release.mode = mode;
        }
        if self.build_number.is_some() {
            release.build_number = self.build_number.clone();
        }
        if self.build_version.is_some() {
            release.build_version = self.build_version.clone();
        }
        if self.notes.is_some() {
            release.notes = self.notes.clone();
        }
        if self.notes_file.is_some() {
            release.notes = None;
            release.notes_file = self.notes_file.clone();
        }
        if self.symbols.is_some() {
            release.symbols = self.symbols.clone();
        }
        release.mandatory |= self.mandatory;
        release.notify_testers |= self.notify_testers;

        if !self.group.is_empty() {
            config.groups = self.group.clone();
        }
        if !self.store.is_empty() {
            config.stores = self.store.clone();
        }
        if !self.tester.is_empty() {
            config.testers = self.tester.clone();
        }
    }
}

fn print_report(report: &DeployReport) {
    output::success(&format!(
        "Release {} deployed to {}",
        style(report.release.id).green().bold(),
        style(&report.app).cyan()
    ));
    println!(
        "{}",
        output::key_value(
            "Version",
            &format!("{} ({})", report.release.short_version, report.release.version)
        )
    );
    println!("{}", output::key_value("Groups", &report.groups.to_string()));
    println!("{}", output::key_value("Stores", &report.stores.to_string()));
    println!("{}", output::key_value("Testers", &report.testers.to_string()));
    if report.notes_updated {
        output::info("Release notes updated");
    }
    if report.symbols_uploaded {
        output::info("Symbols uploaded");
    }
    if let Some(url) = &report.release.install_url {
        println!("{}", output::key_value("Install", url));
    }
}
