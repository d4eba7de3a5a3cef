use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, CutsubError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub trimmer: TrimmerConfig,
    pub transcriber: TranscriberConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Folder searched for the newest source video; prompted for when unset
    pub input_dir: Option<PathBuf>,
    /// Directory holding the artifacts of the current run
    pub working_dir: PathBuf,
    /// Root under which `backup_<timestamp>` snapshots are created
    pub archive_dir: PathBuf,
    /// Extensions (without the dot) that identify a source video
    pub video_extensions: Vec<String>,
    /// File name of the trimmed video inside the working directory
    pub trimmed_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimmerConfig {
    /// Path to the silence trimming binary (auto-editor)
    pub binary_path: String,
    /// Edit strategy passed to `--edit`
    pub edit: String,
    /// Flag that introduces the output path
    pub output_flag: String,
    /// Additional arguments appended before the output flag
    pub extra_args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriberConfig {
    /// Path to the whisper command line binary
    pub binary_path: String,
    /// Model size
    pub model: String,
    /// Source language of the speech
    pub language: String,
    /// Transcribe in the source language or translate to English
    pub task: TranscribeTask,
    /// Sampling temperature; 0 keeps the output deterministic
    pub temperature: f32,
    /// Subtitle format written next to the trimmed video
    pub output_format: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscribeTask {
    Transcribe,
    Translate,
}

impl TranscribeTask {
    pub fn as_arg(&self) -> &'static str {
        match self {
            TranscribeTask::Transcribe => "transcribe",
            TranscribeTask::Translate => "translate",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Codec used for a soft subtitle track (mov_text fits mp4 containers)
    pub subtitle_codec: String,
    /// ISO 639-2 language tag written on the soft subtitle track
    pub subtitle_language: String,
    /// Additional encoding options for burn-in rendering
    /// Common options: ["-preset", "medium", "-crf", "23", "-pix_fmt", "yuv420p"]
    pub subtitle_options: Vec<String>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: None,
            working_dir: PathBuf::from("output"),
            archive_dir: PathBuf::from("archive"),
            video_extensions: vec!["mp4".to_string()],
            trimmed_name: "trimmed.mp4".to_string(),
        }
    }
}

impl Default for TrimmerConfig {
    fn default() -> Self {
        Self {
            binary_path: "auto-editor".to_string(),
            edit: "audio".to_string(),
            output_flag: "--export".to_string(),
            extra_args: Vec::new(),
        }
    }
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            binary_path: "whisper".to_string(),
            model: "medium".to_string(),
            language: "Chinese".to_string(),
            task: TranscribeTask::Translate,
            temperature: 0.0,
            output_format: "srt".to_string(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            binary_path: "ffmpeg".to_string(),
            subtitle_codec: "mov_text".to_string(),
            subtitle_language: "chi".to_string(),
            subtitle_options: vec![
                // Example encoding options users can customize:
                // "-preset".to_string(), "medium".to_string(),  // Encoding speed (ultrafast, fast, medium, slow, veryslow)
                // "-crf".to_string(), "23".to_string(),         // Quality (0-51, lower = better quality)
            ],
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CutsubError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| CutsubError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CutsubError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| CutsubError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Reject settings that would make a run destroy its own inputs or outputs
    pub fn validate(&self) -> Result<()> {
        if self.paths.video_extensions.iter().all(|ext| ext.trim_start_matches('.').is_empty()) {
            return Err(CutsubError::Config("At least one video extension is required".to_string()));
        }

        let trimmed = Path::new(&self.paths.trimmed_name);
        if trimmed.file_stem().is_none() || trimmed.extension().is_none() {
            return Err(CutsubError::Config(format!(
                "Trimmed file name '{}' needs a base name and an extension",
                self.paths.trimmed_name
            )));
        }
        if trimmed.components().count() != 1 {
            return Err(CutsubError::Config(format!(
                "Trimmed file name '{}' must not contain directories",
                self.paths.trimmed_name
            )));
        }

        let working = absolute(&self.paths.working_dir)?;
        let archive = absolute(&self.paths.archive_dir)?;
        if archive.starts_with(&working) {
            return Err(CutsubError::Config(format!(
                "Archive directory {} must not be inside the working directory {}",
                self.paths.archive_dir.display(),
                self.paths.working_dir.display()
            )));
        }

        Ok(())
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
