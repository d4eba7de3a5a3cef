use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::config::MediaConfig;
use crate::error::Result;
use crate::runner::{CommandRunner, ToolCommand};
use crate::subtitle::SubtitleMode;
use super::ExternalTool;

/// Merges a subtitle file into a video with ffmpeg
pub struct SubtitleMuxer {
    config: MediaConfig,
    runner: Arc<dyn CommandRunner>,
}

impl SubtitleMuxer {
    pub fn new(config: MediaConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    pub fn command(&self, video: &Path, subtitles: &Path, output: &Path, mode: SubtitleMode) -> ToolCommand {
        match mode {
            SubtitleMode::BurnIn => self.burn_in_command(video, subtitles, output),
            SubtitleMode::Soft => self.soft_command(video, subtitles, output),
        }
    }

    /// Render subtitles into the picture, keep audio unchanged
    fn burn_in_command(&self, video: &Path, subtitles: &Path, output: &Path) -> ToolCommand {
        ToolCommand::new(&self.config.binary_path, "Subtitle burn-in")
            .overwrite()
            .input(video)
            .video_filter(format!("subtitles={}", escape_filter_path(subtitles)))
            .copy_audio()
            .args(self.config.subtitle_options.iter().cloned())
            .path(output)
    }

    /// Add the subtitles as a selectable track, copy audio and video unchanged
    fn soft_command(&self, video: &Path, subtitles: &Path, output: &Path) -> ToolCommand {
        ToolCommand::new(&self.config.binary_path, "Soft subtitle muxing")
            .overwrite()
            .input(video)
            .input(subtitles)
            .copy_all()
            .subtitle_codec(&self.config.subtitle_codec)
            .option("-metadata:s:s:0", format!("language={}", self.config.subtitle_language))
            .path(output)
    }

    pub async fn merge(&self, video: &Path, subtitles: &Path, output: &Path, mode: SubtitleMode) -> Result<()> {
        info!(
            "Merging {} into {} ({}) -> {}",
            subtitles.display(),
            video.display(),
            mode,
            output.display()
        );
        self.runner.run(&self.command(video, subtitles, output, mode)).await?;
        info!("Subtitle merge completed");
        Ok(())
    }
}

impl ExternalTool for SubtitleMuxer {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    fn probe_command(&self) -> ToolCommand {
        ToolCommand::new(&self.config.binary_path, "ffmpeg version check").arg("-version")
    }
}

/// Escape characters the ffmpeg filter option parser treats as separators
fn escape_filter_path(path: &Path) -> String {
    let mut escaped = String::new();
    for c in path.to_string_lossy().chars() {
        if matches!(c, '\\' | ':' | '\'') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
