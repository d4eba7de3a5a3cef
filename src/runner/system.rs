use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::error::{CutsubError, Result};
use super::{CommandRunner, ToolCommand};

/// Runs commands as real child processes, one at a time
#[derive(Debug, Default)]
pub struct SystemRunner {
    show_progress: bool,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a spinner while a tool is running
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed_precise}]") {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(120));
        Some(spinner)
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, command: &ToolCommand) -> Result<String> {
        info!("Running {}: {}", command.description, command.command_line());

        let spinner = self.spinner(&command.description);
        let output = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .output()
            .await;
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }

        let output = output.map_err(|e| CutsubError::Spawn {
            program: command.program.clone(),
            source: e,
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!("{} failed: {}", command.description, stderr);
            return Err(CutsubError::Process {
                program: command.program.clone(),
                status: output.status.to_string(),
                stderr,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("{} finished, {} bytes of output", command.description, stdout.len());
        Ok(stdout)
    }
}
