use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::runner::CommandRunner;
use crate::tools::{ExternalTool, SubtitleMuxer, Transcriber, Trimmer};

/// Availability of one external tool
#[derive(Debug, Clone)]
pub struct ToolStatus {
    pub name: String,
    pub command: String,
    /// First line of the probe output, or the failure reason
    pub detail: String,
    pub available: bool,
}

/// Probe auto-editor, whisper and ffmpeg with cheap invocations
pub async fn check_tools(config: &Config, runner: Arc<dyn CommandRunner>) -> Vec<ToolStatus> {
    let trimmer = Trimmer::new(config.trimmer.clone(), runner.clone());
    let transcriber = Transcriber::new(config.transcriber.clone(), runner.clone());
    let muxer = SubtitleMuxer::new(config.media.clone(), runner.clone());
    let tools: [&dyn ExternalTool; 3] = [&trimmer, &transcriber, &muxer];

    let mut statuses = Vec::with_capacity(tools.len());
    for tool in tools {
        let command = tool.probe_command();
        let status = match runner.run(&command).await {
            Ok(stdout) => {
                info!("{} is available", tool.name());
                ToolStatus {
                    name: tool.name().to_string(),
                    command: command.program.clone(),
                    detail: stdout.lines().next().unwrap_or("").trim().to_string(),
                    available: true,
                }
            }
            Err(e) => {
                warn!("{} is not usable: {}", tool.name(), e);
                ToolStatus {
                    name: tool.name().to_string(),
                    command: command.program.clone(),
                    detail: e.to_string(),
                    available: false,
                }
            }
        };
        statuses.push(status);
    }
    statuses
}
