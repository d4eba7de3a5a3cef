use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::config::TranscriberConfig;
use crate::error::Result;
use crate::runner::{CommandRunner, ToolCommand};
use super::ExternalTool;

/// Speech to subtitle generation through the whisper command line
pub struct Transcriber {
    config: TranscriberConfig,
    runner: Arc<dyn CommandRunner>,
}

impl Transcriber {
    pub fn new(config: TranscriberConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    /// Extension of the subtitle file whisper writes
    pub fn output_format(&self) -> &str {
        &self.config.output_format
    }

    pub fn command(&self, input: &Path, output_dir: &Path) -> ToolCommand {
        ToolCommand::new(&self.config.binary_path, "Subtitle transcription")
            .path(input)
            .option("--model", &self.config.model)
            .option("--language", &self.config.language)
            .option("--task", self.config.task.as_arg())
            .option("--temperature", self.config.temperature.to_string())
            .option("--output_dir", output_dir.to_string_lossy())
            .option("--output_format", &self.config.output_format)
    }

    /// Writes `<output_dir>/<input stem>.<output_format>`
    pub async fn transcribe(&self, input: &Path, output_dir: &Path) -> Result<()> {
        info!(
            "Transcribing {} (model {}, language {}, task {})",
            input.display(),
            self.config.model,
            self.config.language,
            self.config.task.as_arg()
        );
        self.runner.run(&self.command(input, output_dir)).await?;
        Ok(())
    }
}

impl ExternalTool for Transcriber {
    fn name(&self) -> &'static str {
        "whisper"
    }

    fn probe_command(&self) -> ToolCommand {
        ToolCommand::new(&self.config.binary_path, "whisper help check").arg("--help")
    }
}
