use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::config::TrimmerConfig;
use crate::error::Result;
use crate::runner::{CommandRunner, ToolCommand};
use super::ExternalTool;

/// Cuts silent segments out of a video (auto-editor)
pub struct Trimmer {
    config: TrimmerConfig,
    runner: Arc<dyn CommandRunner>,
}

impl Trimmer {
    pub fn new(config: TrimmerConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    pub fn command(&self, input: &Path, output: &Path) -> ToolCommand {
        ToolCommand::new(&self.config.binary_path, "Silence trimming")
            .path(input)
            .option("--edit", &self.config.edit)
            .args(self.config.extra_args.iter().cloned())
            .arg(&self.config.output_flag)
            .path(output)
    }

    pub async fn trim(&self, input: &Path, output: &Path) -> Result<()> {
        info!("Trimming silence from {} -> {}", input.display(), output.display());
        self.runner.run(&self.command(input, output)).await?;
        Ok(())
    }
}

impl ExternalTool for Trimmer {
    fn name(&self) -> &'static str {
        "auto-editor"
    }

    fn probe_command(&self) -> ToolCommand {
        ToolCommand::new(&self.config.binary_path, "auto-editor version check").arg("--version")
    }
}
