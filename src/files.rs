use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

use crate::error::{CutsubError, Result};

/// Create `path` and any missing parents. Succeeds when the directory already exists.
pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if path.is_dir() {
        return Ok(());
    }

    debug!("Creating directory {}", path.display());
    fs::create_dir_all(path).map_err(|e| CutsubError::filesystem(path, e))
}

/// Newest file in `folder` whose name ends with `.<extension>`.
pub fn find_latest_file<P: AsRef<Path>>(folder: P, extension: &str) -> Result<PathBuf> {
    find_latest_video(folder, &[extension])
}

/// Newest file in `folder` matching any of `extensions`.
///
/// Only direct children are considered; hidden files and directories are skipped.
/// Age is the birth time reported by the filesystem, or the modification time where
/// birth time is unavailable. Equal timestamps resolve to the lexically greatest path.
pub fn find_latest_video<P, S>(folder: P, extensions: &[S]) -> Result<PathBuf>
where
    P: AsRef<Path>,
    S: AsRef<str>,
{
    let folder = folder.as_ref();
    let suffixes: Vec<String> = extensions
        .iter()
        .map(|ext| ext.as_ref().trim_start_matches('.'))
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{}", ext))
        .collect();

    let entries = fs::read_dir(folder).map_err(|e| CutsubError::filesystem(folder, e))?;

    let mut latest: Option<(SystemTime, PathBuf)> = None;
    for entry in entries {
        let entry = entry.map_err(|e| CutsubError::filesystem(folder, e))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name.starts_with('.') || !suffixes.iter().any(|suffix| name.ends_with(suffix.as_str())) {
            continue;
        }

        // Follows symlinks; a dangling link is not a candidate.
        let path = entry.path();
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Skipping dangling link {}", path.display());
                continue;
            }
            Err(e) => return Err(CutsubError::filesystem(path, e)),
        };
        if !metadata.is_file() {
            continue;
        }

        let created = created_at(&metadata).map_err(|e| CutsubError::filesystem(&path, e))?;
        debug!("Candidate video {} created {:?}", path.display(), created);

        latest = Some(match latest {
            Some(current) => newer(current, (created, path)),
            None => (created, path),
        });
    }

    latest.map(|(_, path)| path).ok_or_else(|| {
        CutsubError::FileNotFound(format!(
            "no {} video files in {}",
            suffixes.join("/"),
            folder.display()
        ))
    })
}

/// Fail with a not-found error when an expected artifact is missing.
pub fn expect_file<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if path.is_file() {
        Ok(())
    } else {
        Err(CutsubError::FileNotFound(path.display().to_string()))
    }
}

/// Later timestamp wins; equal timestamps go to the lexically greater path
fn newer(a: (SystemTime, PathBuf), b: (SystemTime, PathBuf)) -> (SystemTime, PathBuf) {
    if b > a { b } else { a }
}

fn created_at(metadata: &fs::Metadata) -> std::io::Result<SystemTime> {
    metadata.created().or_else(|_| metadata.modified())
}
