//! Writes output files under the project directory and hashes them.

use std::path::{Path, PathBuf};

use tracing::trace;

use crate::error::{Result, SplitError};
use crate::hashing::{self, HashAlgorithm};
use crate::paths;

pub struct AssetWriter {
    project_dir: PathBuf,
    algorithm: HashAlgorithm,
    files_written: usize,
}

impl AssetWriter {
    pub fn new(project_dir: &Path, algorithm: HashAlgorithm) -> Self {
        Self {
            project_dir: project_dir.to_path_buf(),
            algorithm,
            files_written: 0,
        }
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Absolute location of a project-relative path
    pub fn resolve(&self, rel: &Path) -> PathBuf {
        self.project_dir.join(rel)
    }

    pub fn create_dir(&self, rel: &Path) -> Result<()> {
        let dir = self.resolve(rel);
        std::fs::create_dir_all(&dir).map_err(|e| SplitError::io(dir, e))
    }

    /// Write `bytes` to a project-relative path, creating parent
    /// directories. Returns the content hash of what was written.
    pub fn write(&mut self, rel: &Path, bytes: &[u8]) -> Result<String> {
        let path = self.resolve(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SplitError::io(parent, e))?;
        }
        std::fs::write(&path, bytes).map_err(|e| SplitError::io(&path, e))?;
        self.files_written += 1;
        let hash = hashing::digest(self.algorithm, bytes);
        trace!(file = %paths::manifest_key(rel), size = bytes.len(), hash = %hash, "Wrote file");
        Ok(hash)
    }

    pub fn files_written(&self) -> usize {
        self.files_written
    }
}
