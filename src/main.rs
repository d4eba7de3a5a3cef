//! Cutsub - Silence Trimming and Subtitle Workflow
//!
//! Entry point: parses arguments, sets up logging and configuration, and runs
//! the requested command.

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cutsub::cli::{Args, Commands};
use cutsub::config::Config;
use cutsub::error::CutsubError;
use cutsub::prompt::StdinPrompt;
use cutsub::runner::{CommandRunner, SystemRunner};
use cutsub::setup::check_tools;
use cutsub::subtitle::SubtitleMode;
use cutsub::workflow::{RunOptions, Workflow};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging to both console and file
    let _guard = setup_logging(args.verbose)?;

    // Load configuration
    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    if let Some(dir) = args.working_dir {
        config.paths.working_dir = dir;
    }
    if let Some(dir) = args.archive_dir {
        config.paths.archive_dir = dir;
    }
    config.validate()?;

    let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner::new().with_progress(!args.verbose));

    match args.command.unwrap_or_default() {
        Commands::Run { input_dir, mode } => {
            let mode = mode.as_deref().map(str::parse::<SubtitleMode>).transpose()?;
            let started = Instant::now();

            let mut workflow = Workflow::new(config, runner, Box::new(StdinPrompt));
            let report = workflow.run(RunOptions { input_dir, mode }).await?;

            println!("\nPrevious output archived to: {}", report.archive.path.display());
            println!("Done! Output file: {}", report.final_video.display());
            println!("Completed in {}", format_duration(started.elapsed().as_secs()));
        }
        Commands::Locate { input_dir } => {
            let mut workflow = Workflow::new(config, runner, Box::new(StdinPrompt));
            let input_dir = workflow.resolve_input_dir(input_dir)?;
            let video = workflow.locate_source(&input_dir)?;
            println!("{}", video.display());
        }
        Commands::Archive => {
            let workflow = Workflow::new(config, runner, Box::new(StdinPrompt));
            let working_dir = &workflow.config().paths.working_dir;
            if !working_dir.is_dir() {
                return Err(CutsubError::FileNotFound(working_dir.display().to_string()).into());
            }
            let snapshot = workflow.archive_working_dir()?;
            println!("Archived {} file(s) to {}", snapshot.entries.len(), snapshot.path.display());
        }
        Commands::Check => {
            let statuses = check_tools(&config, runner).await;

            println!("\nExternal Tools:");
            println!("{:<12} {:<20} {:<10} {:<40}", "Tool", "Command", "Status", "Detail");
            println!("{}", "-".repeat(85));
            for status in &statuses {
                println!("{:<12} {:<20} {:<10} {:<40}",
                    status.name,
                    status.command,
                    if status.available { "OK" } else { "Missing" },
                    status.detail
                );
            }

            if statuses.iter().any(|status| !status.available) {
                return Err(CutsubError::Config("Some external tools are unavailable".to_string()).into());
            }
        }
        Commands::InitConfig { output, force } => {
            if output.exists() && !force {
                return Err(CutsubError::Config(format!(
                    "{} already exists; use --force to overwrite",
                    output.display()
                )).into());
            }
            Config::default().save_to_file(&output)?;
            println!("Wrote default configuration to {}", output.display());
        }
    }

    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<WorkerGuard> {
    let log_dir = std::env::current_dir()?.join(".cutsub").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "cutsub.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    let filter = log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(), log_level);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("cutsub.log").display());

    Ok(guard)
}

/// RUST_LOG directives win; `fallback` applies only when they are absent or invalid
fn log_filter(directives: Option<&str>, fallback: Level) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(fallback.to_string()))
}

/// Format duration in seconds to human readable string
fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    }
}
