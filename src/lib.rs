//! Cutsub - Silence Trimming and Subtitle Workflow
//!
//! Picks the newest video in a folder, cuts its silent parts with auto-editor,
//! generates subtitles with whisper, and merges them back with ffmpeg, archiving
//! the previous run's output first.

pub mod cli;
pub mod config;
pub mod workflow;
pub mod runner;
pub mod tools;
pub mod subtitle;
pub mod prompt;
pub mod files;
pub mod archive;
pub mod error;
pub mod setup;
