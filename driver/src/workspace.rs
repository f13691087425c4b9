//! Run-scoped artifact directory.
//!
//! Every run owns a private temporary directory holding its intermediate
//! artifacts. The directory is removed when the run ends (success, handled
//! error, or unwind) unless the caller asks to keep it.

use std::path::{Path, PathBuf};

use crate::error::*;

/// The artifact directory of one run.
///
/// Dropping removes the directory and everything in it.
#[derive(Debug)]
pub struct RunDir {
    dir: tempfile::TempDir,
}

impl RunDir {
    pub fn create() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("kiln-")
            .tempdir()
            .map_err(|source| Error::Io { doing: "creating run directory".into(), source })?;
        tracing::debug!(path = %dir.path().display(), "created run directory");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of a named artifact inside the run directory.
    pub fn artifact(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Persist the directory instead of removing it; returns its path.
    pub fn keep(self) -> PathBuf {
        self.dir.keep()
    }
}
