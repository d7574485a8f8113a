//! Creation log of a generation run, and rollback of everything in it.
//!
//! The log is shared between the generating thread and the abort watcher.
//! Files are created and recorded under one mutex, so a rollback sees either
//! both or neither. A rollback also closes the log: creating a file through
//! it afterwards fails, which stops an interrupted run instead of letting it
//! leave untracked files behind.

use std::fs::File;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{info, warn};

#[derive(Debug, Default)]
struct LogState {
    paths: Vec<PathBuf>,
    closed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CreationLog {
    state: Arc<Mutex<LogState>>,
}

impl CreationLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LogState> {
        // A panic while holding the lock cannot leave the state half-updated.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Create (or truncate) `path` and record it.
    ///
    /// Fails with [`ErrorKind::Interrupted`] once the log has been rolled
    /// back. A path is only recorded when the file was actually created, so a
    /// rollback never deletes something this run did not make.
    pub fn create(&self, path: &Path) -> io::Result<File> {
        let mut state = self.lock();
        if state.closed {
            return Err(io::Error::new(
                ErrorKind::Interrupted,
                "generation run was rolled back",
            ));
        }
        let file = File::create(path)?;
        state.paths.push(path.to_path_buf());
        Ok(file)
    }

    /// Paths recorded so far, in creation order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.lock().paths.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().paths.is_empty()
    }

    /// Take the recorded paths, leaving the log empty and open.
    pub fn take(&self) -> Vec<PathBuf> {
        std::mem::take(&mut self.lock().paths)
    }

    /// Delete every recorded file, clear the log and close it.
    ///
    /// Missing files are skipped silently; other failures are logged and the
    /// sweep continues. Returns the number of files removed.
    pub fn rollback(&self) -> usize {
        let mut state = self.lock();
        state.closed = true;
        let mut removed = 0;
        for path in &state.paths {
            match std::fs::remove_file(path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "failed to roll back generated file"),
            }
        }
        if !state.paths.is_empty() {
            info!(removed, recorded = state.paths.len(), "rolled back generated files");
        }
        state.paths.clear();
        removed
    }
}
