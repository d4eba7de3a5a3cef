use chrono::{DateTime, Local};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{CutsubError, Result};
use crate::files::ensure_dir;

/// Result of moving a working directory into a fresh snapshot
#[derive(Debug, Clone)]
pub struct ArchiveSnapshot {
    pub path: PathBuf,
    /// Names of the entries moved out of the working directory
    pub entries: Vec<String>,
}

/// Moves previous run artifacts out of the working directory
pub struct Archiver {
    archive_root: PathBuf,
}

impl Archiver {
    pub fn new<P: Into<PathBuf>>(archive_root: P) -> Self {
        Self {
            archive_root: archive_root.into(),
        }
    }

    pub fn archive_root(&self) -> &Path {
        &self.archive_root
    }

    /// Move every direct child of `working_dir` into `<root>/backup_<timestamp>`.
    ///
    /// Either everything is moved or nothing is: on the first failure the entries
    /// already moved are put back and the snapshot directory is removed.
    pub fn archive<P: AsRef<Path>>(&self, working_dir: P) -> Result<ArchiveSnapshot> {
        self.archive_with(working_dir.as_ref(), Local::now(), move_entry)
    }

    fn archive_with<F>(&self, working_dir: &Path, now: DateTime<Local>, mut mover: F) -> Result<ArchiveSnapshot>
    where
        F: FnMut(&Path, &Path) -> io::Result<()>,
    {
        let mut names = Vec::new();
        for entry in fs::read_dir(working_dir).map_err(|e| CutsubError::filesystem(working_dir, e))? {
            let entry = entry.map_err(|e| CutsubError::filesystem(working_dir, e))?;
            names.push(entry.file_name());
        }
        names.sort();

        let snapshot = self.create_snapshot_dir(now)?;

        let mut moved = Vec::with_capacity(names.len());
        for name in &names {
            let from = working_dir.join(name);
            let to = snapshot.join(name);
            debug!("Archiving {} -> {}", from.display(), to.display());

            if let Err(e) = mover(&from, &to) {
                rollback(&moved, working_dir, &snapshot, &mut mover);
                return Err(CutsubError::Archive(format!(
                    "failed to move {} into {}: {}",
                    from.display(),
                    snapshot.display(),
                    e
                )));
            }
            moved.push(name);
        }

        info!("Archived {} old file(s) to {}", names.len(), snapshot.display());

        Ok(ArchiveSnapshot {
            path: snapshot,
            entries: names
                .iter()
                .map(|name| name.to_string_lossy().into_owned())
                .collect(),
        })
    }

    /// Claim a snapshot directory that did not exist before this call
    fn create_snapshot_dir(&self, now: DateTime<Local>) -> Result<PathBuf> {
        ensure_dir(&self.archive_root)?;

        let base = format!("backup_{}", now.format("%Y%m%d_%H%M%S"));
        let mut suffix = 0u32;
        loop {
            let name = if suffix == 0 {
                base.clone()
            } else {
                format!("{}_{}", base, suffix)
            };
            let candidate = self.archive_root.join(name);

            match fs::create_dir(&candidate) {
                Ok(()) => return Ok(candidate),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => suffix += 1,
                Err(e) => return Err(CutsubError::filesystem(candidate, e)),
            }
        }
    }
}

fn rollback<F>(moved: &[&std::ffi::OsString], working_dir: &Path, snapshot: &Path, mover: &mut F)
where
    F: FnMut(&Path, &Path) -> io::Result<()>,
{
    for name in moved.iter().rev() {
        let from = snapshot.join(name);
        let to = working_dir.join(name);
        if let Err(e) = mover(&from, &to) {
            warn!("Could not restore {} to {}: {}", from.display(), to.display(), e);
        }
    }

    if let Err(e) = fs::remove_dir(snapshot) {
        warn!("Could not remove incomplete snapshot {}: {}", snapshot.display(), e);
    }
}

/// Rename, falling back to copy and delete when the rename crosses filesystems
fn move_entry(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!("Rename across devices, copying {}", from.display());
            if let Err(copy_err) = copy_recursive(from, to) {
                remove_partial_copy(to);
                return Err(copy_err);
            }
            if from.is_dir() {
                fs::remove_dir_all(from)
            } else {
                fs::remove_file(from)
            }
        }
        Err(e) => Err(e),
    }
}

fn remove_partial_copy(to: &Path) {
    let removed = if to.is_dir() {
        fs::remove_dir_all(to)
    } else {
        fs::remove_file(to)
    };
    match removed {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove partial copy {}: {}", to.display(), e),
    }
}

fn copy_recursive(from: &Path, to: &Path) -> io::Result<()> {
    if !from.is_dir() {
        fs::copy(from, to)?;
        return Ok(());
    }

    for entry in WalkDir::new(from) {
        let entry = entry.map_err(io::Error::other)?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(io::Error::other)?;
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
