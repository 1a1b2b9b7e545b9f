//! External command execution

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{AppCenterError, Result};

/// Name of the App Center command line tool
pub const APPCENTER_PROGRAM: &str = "appcenter";

/// Runs an external program and returns its output
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`, returning trimmed combined output on success
    async fn run(&self, program: &str, args: &[String]) -> Result<String>;

    /// Whether `program` can be run at all
    fn is_available(&self, _program: &str) -> bool {
        true
    }
}

/// Runs commands as local subprocesses
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    /// Looks `program` up on `PATH`
    fn is_available(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }

    async fn run(&self, program: &str, args: &[String]) -> Result<String> {
        let command = display_command(program, args);
        debug!(command = %command, "running command");

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| AppCenterError::CommandFailed {
                command: command.clone(),
                output: e.to_string(),
            })?;

        let combined = combine_output(&output.stdout, &output.stderr);

        debug!(status = ?output.status.code(), output = %combined, "command finished");

        if !output.status.success() {
            return Err(AppCenterError::CommandFailed {
                command,
                output: combined,
            });
        }

        Ok(combined)
    }
}

/// Trimmed stdout and stderr, newline-separated when both are present
fn combine_output(stdout: &[u8], stderr: &[u8]) -> String {
    let stdout = String::from_utf8_lossy(stdout);
    let stderr = String::from_utf8_lossy(stderr);
    [stdout.trim(), stderr.trim()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render a command line for messages, masking the value after `--token`
pub fn display_command(program: &str, args: &[String]) -> String {
    let mut parts = vec![program.to_string()];
    let mut mask_next = false;
    for arg in args {
        if mask_next {
            parts.push("<redacted>".to_string());
            mask_next = false;
            continue;
        }
        mask_next = arg == "--token";
        parts.push(arg.clone());
    }
    parts.join(" ")
}
