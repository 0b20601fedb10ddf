use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Liveness check for an update run owned by another process.
pub trait Sentinel {
    fn is_running(&self) -> bool;
}

/// Pamac writes this file while a transaction is in progress.
#[derive(Debug, Clone)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn pid(&self) -> Option<u32> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        content.trim().parse().ok()
    }

    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        let modified = std::fs::metadata(&self.path).ok()?.modified().ok()?;
        Some(DateTime::<Utc>::from(modified))
    }
}

impl Sentinel for PidFile {
    fn is_running(&self) -> bool {
        let running = self.exists();
        tracing::debug!(path = %self.path.display(), running, "Checked pid file");
        running
    }
}
