use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Working directory for run artifacts (overrides config)
    #[arg(long)]
    pub working_dir: Option<PathBuf>,

    /// Archive root for previous runs (overrides config)
    #[arg(long)]
    pub archive_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Trim, transcribe and subtitle the newest video in a folder (default)
    Run {
        /// Folder containing source videos; prompted for when omitted
        #[arg(short, long)]
        input_dir: Option<PathBuf>,

        /// Subtitle mode: burn-in or soft; prompted for when omitted
        #[arg(short, long)]
        mode: Option<String>,
    },

    /// Show which video a run would pick
    Locate {
        /// Folder containing source videos; prompted for when omitted
        #[arg(short, long)]
        input_dir: Option<PathBuf>,
    },

    /// Move the current working directory contents into a new archive snapshot
    Archive,

    /// Check that auto-editor, whisper and ffmpeg can be executed
    Check,

    /// Write the default configuration file
    InitConfig {
        /// Destination file
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Run {
            input_dir: None,
            mode: None,
        }
    }
}
