//! Run lock so that a manual run and a scheduled run never overlap.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::FeedCalResult;

/// Held for the duration of a run; the lock is released when dropped
#[derive(Debug)]
pub struct RunLock {
    _file: File,
    path: PathBuf,
}

impl RunLock {
    /// Lock file location. Kept inside `.git` when there is one so the
    /// working tree stays clean.
    pub fn path_for(repo: &Path) -> PathBuf {
        let git_dir = repo.join(".git");
        if git_dir.is_dir() {
            git_dir.join("feedcal.lock")
        } else {
            repo.join(".feedcal.lock")
        }
    }

    /// Try to take the lock. Returns None if another run holds it.
    pub fn try_acquire(repo: &Path) -> FeedCalResult<Option<RunLock>> {
        let path = Self::path_for(repo);
        let file = File::create(&path)?;
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(RunLock { _file: file, path })),
            Err(e) if is_contended(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Whether a failed lock attempt means another process holds the lock.
fn is_contended(err: &io::Error) -> bool {
    err.kind() == fs2::lock_contended_error().kind()
}
