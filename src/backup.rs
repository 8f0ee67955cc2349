//! Backed-up running configurations.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Source of the actual configuration a host is running.
pub trait BackupStore: Send + Sync {
    /// Read the backup of `host`, or `None` when there is none.
    fn read_backup(&self, host: &str) -> Result<Option<String>>;

    /// Where the backup of `host` is expected, for diagnostics.
    fn location(&self, host: &str) -> PathBuf;
}

/// Backups stored as `<dir>/<host>.<extension>`.
#[derive(Debug, Clone)]
pub struct DirBackupStore {
    dir: PathBuf,
    extension: String,
}

impl DirBackupStore {
    /// Create a store over `dir` with the `conf` extension.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extension: "conf".to_string(),
        }
    }

    /// Use a different file extension.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// The backups directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl BackupStore for DirBackupStore {
    fn read_backup(&self, host: &str) -> Result<Option<String>> {
        let path = self.location(host);
        if !path.is_file() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(path)?))
    }

    fn location(&self, host: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", host, self.extension))
    }
}
