//! Bounded access to the source image file.
//!
//! The source executable is memory-mapped read-only and shared for the whole
//! run; nothing in the pipeline mutates it. Files above the configured size
//! limit are rejected before mapping.

pub mod error;

use crate::io::error::{IoError, Result};
use memmap2::Mmap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Defines the resource limits for reading the source image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IOLimits {
    /// The absolute maximum file size that can be opened.
    pub max_file_size: u64,
}

impl Default for IOLimits {
    fn default() -> Self {
        Self {
            max_file_size: 512 * 1024 * 1024, // 512MB
        }
    }
}

/// A memory-mapped, size-checked input file.
pub struct SourceFile {
    path: PathBuf,
    // None when the file size is zero; memmap cannot map empty files.
    mmap: Option<Mmap>,
    file_size: u64,
}

impl SourceFile {
    /// Opens a file and memory-maps it.
    ///
    /// Fails if the file size exceeds `limits.max_file_size`.
    pub fn open<P: AsRef<Path>>(path: P, limits: &IOLimits) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| IoError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let file_size = file.metadata()?.len();

        debug!(
            path = %path.display(),
            size = file_size,
            limits.max_file_size = limits.max_file_size,
            "Opening source image"
        );

        if file_size > limits.max_file_size {
            warn!(
                path = %path.display(),
                size = file_size,
                limit = limits.max_file_size,
                "Source image is too large"
            );
            return Err(IoError::FileTooLarge {
                limit: limits.max_file_size,
                found: file_size,
            });
        }

        let mmap = if file_size == 0 {
            None
        } else {
            // Safety: the map is read-only and lives no longer than this value.
            Some(unsafe { Mmap::map(&file)? })
        };

        Ok(Self {
            path: path.to_path_buf(),
            mmap,
            file_size,
        })
    }

    /// Path the file was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the total size of the underlying file in bytes.
    pub fn size(&self) -> u64 {
        self.file_size
    }

    /// The whole file contents.
    pub fn bytes(&self) -> &[u8] {
        match &self.mmap {
            Some(m) => &m[..],
            None => &[],
        }
    }
}
