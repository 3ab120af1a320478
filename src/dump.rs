//! Writing the fetched page to disk.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::ConfigError;
use crate::{Result, SearchError};

/// A request to save the response body to a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpRequest {
    /// Target file.
    pub path: PathBuf,
    /// Overwrite the target if it exists.
    pub force: bool,
}

impl DumpRequest {
    /// Creates a dump request.
    pub fn new(path: impl Into<PathBuf>, force: bool) -> Self {
        Self {
            path: path.into(),
            force,
        }
    }

    /// Checks that the dump can be written. Nothing is left behind.
    ///
    /// Must run before the query so that a bad target does not waste a fetch.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !self.force && self.path.exists() {
            return Err(ConfigError::DumpExists(self.path.clone()));
        }

        if !is_writable_dir(self.parent()) {
            return Err(ConfigError::DumpUnwritable(self.path.clone()));
        }

        if self.force && self.path.exists() && !is_writable_file(&self.path) {
            return Err(ConfigError::DumpUnwritable(self.path.clone()));
        }

        Ok(())
    }

    /// Writes `body` to the target.
    ///
    /// Without `force` the file is created exclusively, so a file that
    /// appeared after [`validate`](Self::validate) is never overwritten.
    pub fn write(&self, body: &str) -> Result<()> {
        let fail = |reason: String| SearchError::DumpWrite {
            path: self.path.clone(),
            reason,
        };

        if body.is_empty() {
            return Err(fail("nothing to write".to_string()));
        }

        let mut options = OpenOptions::new();
        options.write(true);
        if self.force {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }

        let mut file = options.open(&self.path).map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => fail("file already exists".to_string()),
            _ => fail(e.to_string()),
        })?;
        file.write_all(body.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| fail(e.to_string()))?;

        debug!("Dumped {} bytes to {}", body.len(), self.path.display());
        Ok(())
    }

    fn parent(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

/// Whether the current user can create files in `dir`.
///
/// Mode bits say nothing about who may write, so this creates (and drops) a
/// scratch file instead.
fn is_writable_dir(dir: &Path) -> bool {
    fs::metadata(dir).map(|meta| meta.is_dir()).unwrap_or(false)
        && NamedTempFile::new_in(dir).is_ok()
}

/// Whether an existing target can be opened for writing. Contents are left alone.
fn is_writable_file(path: &Path) -> bool {
    OpenOptions::new().write(true).open(path).is_ok()
}
