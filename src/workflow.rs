use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::archive::{ArchiveSnapshot, Archiver};
use crate::config::Config;
use crate::error::{CutsubError, Result};
use crate::files::{ensure_dir, expect_file, find_latest_video};
use crate::prompt::PromptProvider;
use crate::runner::CommandRunner;
use crate::subtitle::{select_subtitle_mode, SubtitleMode};
use crate::tools::{SubtitleMuxer, Transcriber, Trimmer};

const FOLDER_QUESTION: &str = "Video folder path (e.g. raw_videos): ";

/// Pipeline stages, executed strictly in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Setup,
    Locate,
    Trim,
    Transcribe,
    Merge,
}

impl Stage {
    pub const ALL: [Stage; 5] = [Stage::Setup, Stage::Locate, Stage::Trim, Stage::Transcribe, Stage::Merge];

    fn number(&self) -> usize {
        Stage::ALL.iter().position(|stage| stage == self).unwrap_or(0) + 1
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Setup => "setup",
            Stage::Locate => "locate source video",
            Stage::Trim => "trim silence",
            Stage::Transcribe => "transcribe subtitles",
            Stage::Merge => "merge subtitles",
        };
        write!(f, "{}/{} {}", self.number(), Stage::ALL.len(), name)
    }
}

/// Per-run choices that would otherwise be asked interactively
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub input_dir: Option<PathBuf>,
    pub mode: Option<SubtitleMode>,
}

/// Paths of every artifact, all derived from the trimmed video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub base: String,
    pub trimmed: PathBuf,
    pub subtitles: PathBuf,
}

impl ArtifactPaths {
    pub fn new(trimmed: PathBuf, subtitle_format: &str) -> Result<Self> {
        let base = trimmed
            .file_stem()
            .ok_or_else(|| CutsubError::Config(format!("Invalid trimmed file name: {}", trimmed.display())))?
            .to_string_lossy()
            .into_owned();
        let subtitles = trimmed.with_file_name(format!("{}.{}", base, subtitle_format));

        Ok(Self { base, trimmed, subtitles })
    }

    /// `<base>_<mode>.<ext>` next to the trimmed video
    pub fn final_video(&self, mode: SubtitleMode) -> PathBuf {
        let name = match self.trimmed.extension() {
            Some(ext) => format!("{}_{}.{}", self.base, mode.tag(), ext.to_string_lossy()),
            None => format!("{}_{}", self.base, mode.tag()),
        };
        self.trimmed.with_file_name(name)
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub source_video: PathBuf,
    pub archive: ArchiveSnapshot,
    pub trimmed_video: PathBuf,
    pub subtitle_file: PathBuf,
    pub mode: SubtitleMode,
    pub final_video: PathBuf,
}

pub struct Workflow {
    config: Config,
    archiver: Archiver,
    trimmer: Trimmer,
    transcriber: Transcriber,
    muxer: SubtitleMuxer,
    prompt: Box<dyn PromptProvider>,
}

impl Workflow {
    pub fn new(config: Config, runner: Arc<dyn CommandRunner>, prompt: Box<dyn PromptProvider>) -> Self {
        let archiver = Archiver::new(&config.paths.archive_dir);
        let trimmer = Trimmer::new(config.trimmer.clone(), runner.clone());
        let transcriber = Transcriber::new(config.transcriber.clone(), runner.clone());
        let muxer = SubtitleMuxer::new(config.media.clone(), runner);

        Self {
            config,
            archiver,
            trimmer,
            transcriber,
            muxer,
            prompt,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run every stage in order. The first failure aborts the run.
    pub async fn run(&mut self, options: RunOptions) -> Result<RunReport> {
        info!("Stage {}", Stage::Setup);
        let input_dir = self.resolve_input_dir(options.input_dir)?;
        let archive = self.prepare_working_dir(&input_dir)?;

        info!("Stage {}", Stage::Locate);
        let source_video = self.locate_source(&input_dir)?;
        info!("Found video: {}", source_video.display());

        let working_dir = &self.config.paths.working_dir;
        let artifacts = ArtifactPaths::new(
            working_dir.join(&self.config.paths.trimmed_name),
            self.transcriber.output_format(),
        )?;

        info!("Stage {}", Stage::Trim);
        self.trimmer.trim(&source_video, &artifacts.trimmed).await?;
        expect_file(&artifacts.trimmed)?;

        info!("Stage {}", Stage::Transcribe);
        self.transcriber.transcribe(&artifacts.trimmed, working_dir).await?;
        expect_file(&artifacts.subtitles)?;

        info!("Stage {}", Stage::Merge);
        let mode = match options.mode {
            Some(mode) => mode,
            None => select_subtitle_mode(self.prompt.as_mut())?,
        };
        let final_video = artifacts.final_video(mode);
        self.muxer
            .merge(&artifacts.trimmed, &artifacts.subtitles, &final_video, mode)
            .await?;

        debug!("Final video written to {}", final_video.display());

        Ok(RunReport {
            source_video,
            archive,
            trimmed_video: artifacts.trimmed,
            subtitle_file: artifacts.subtitles,
            mode,
            final_video,
        })
    }

    /// Input folder from the options, the configuration, or the operator, in that order
    pub fn resolve_input_dir(&mut self, input_dir: Option<PathBuf>) -> Result<PathBuf> {
        let input_dir = match input_dir.or_else(|| self.config.paths.input_dir.clone()) {
            Some(dir) => dir,
            None => {
                let answer = self.prompt.ask(FOLDER_QUESTION)?;
                if answer.is_empty() {
                    return Err(CutsubError::Config("No input folder given".to_string()));
                }
                PathBuf::from(answer)
            }
        };

        if !input_dir.is_dir() {
            return Err(CutsubError::Config(format!(
                "Input folder does not exist: {}",
                input_dir.display()
            )));
        }
        Ok(input_dir)
    }

    /// Create the working and archive directories, then empty the working directory
    pub fn prepare_working_dir(&self, input_dir: &Path) -> Result<ArchiveSnapshot> {
        let working_dir = &self.config.paths.working_dir;
        if same_dir(input_dir, working_dir) {
            return Err(CutsubError::Config(format!(
                "Input folder {} is the working directory; archiving would remove the source videos",
                input_dir.display()
            )));
        }

        ensure_dir(working_dir)?;
        ensure_dir(self.archiver.archive_root())?;
        self.archive_working_dir()
    }

    /// Move the previous run's artifacts into a fresh snapshot
    pub fn archive_working_dir(&self) -> Result<ArchiveSnapshot> {
        self.archiver.archive(&self.config.paths.working_dir)
    }

    /// Newest video in `input_dir`
    pub fn locate_source(&self, input_dir: &Path) -> Result<PathBuf> {
        find_latest_video(input_dir, &self.config.paths.video_extensions[..])
    }
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
