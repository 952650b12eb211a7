use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use super::DraftBook;

/// A submit lock older than this is left over from a crashed process.
const STALE_LOCK_AFTER: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, thiserror::Error)]
pub enum ScratchError {
    #[error("Scratch file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scratch file is corrupt: {0}")]
    Json(#[from] serde_json::Error),
}

/// The draft list on disk: one JSON array in one file.
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty book.
    pub fn load(&self) -> Result<DraftBook, ScratchError> {
        if !self.path.exists() {
            return Ok(DraftBook::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(DraftBook::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write the book, or remove the file once the book is empty.
    pub fn save(&self, book: &DraftBook) -> Result<(), ScratchError> {
        if book.is_empty() {
            return self.remove();
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(book)?)?;
        std::fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), drafts = book.len(), "Scratch list saved");
        Ok(())
    }

    pub fn remove(&self) -> Result<(), ScratchError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Take the inter-process submit lock, a marker file beside the
    /// scratch file. `None` while another process holds it.
    pub fn lock_submit(&self) -> Result<Option<SubmitLock>, ScratchError> {
        let path = self.path.with_extension("json.lock");
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        match SubmitLock::create(&path) {
            Err(ScratchError::Io(e)) if e.kind() == ErrorKind::AlreadyExists => {}
            other => return other.map(Some),
        }

        let age = std::fs::metadata(&path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| SystemTime::now().duration_since(modified).ok())
            .unwrap_or_default();
        if age < STALE_LOCK_AFTER {
            tracing::warn!(path = %path.display(), "Submit already in progress");
            return Ok(None);
        }

        tracing::warn!(path = %path.display(), age_secs = age.as_secs(), "Removing stale submit lock");
        std::fs::remove_file(&path)?;
        match SubmitLock::create(&path) {
            Err(ScratchError::Io(e)) if e.kind() == ErrorKind::AlreadyExists => Ok(None),
            other => other.map(Some),
        }
    }
}

/// Held for the duration of one submit. Dropping it removes the marker.
#[derive(Debug)]
pub struct SubmitLock {
    path: PathBuf,
}

impl SubmitLock {
    fn create(path: &Path) -> Result<Self, ScratchError> {
        OpenOptions::new().write(true).create_new(true).open(path)?;
        tracing::debug!(path = %path.display(), "Submit lock acquired");
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SubmitLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::error!(path = %self.path.display(), error = %e, "Failed to release submit lock");
        }
    }
}
