//! Error types for the dllsplit extraction pipeline.
//!
//! Every failure aborts the whole run. The variants are grouped into the
//! kinds reported by [`SplitError::kind`] so callers and tests can tell a
//! corrupt image apart from a bad project file or a failed write.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::formats::ini::IniError;
use crate::formats::pe::PeError;
use crate::io::error::IoError;
use crate::ninja::DecodeError;

/// Main error type for split operations.
#[derive(Debug, Error)]
pub enum SplitError {
    /// Image headers or export directory are unusable
    #[error("Invalid image structure: {0}")]
    Structural(#[from] PeError),

    /// Project file could not be parsed
    #[error("Invalid project file: {0}")]
    Ini(#[from] IniError),

    /// Project file is well-formed but describes something unusable
    #[error("Configuration error: {0}")]
    Config(String),

    /// Directive names a symbol the image does not export
    #[error("Export not found: {0}")]
    UnknownExport(String),

    /// Directive lacks a custom property its type requires
    #[error("Directive '{export}' is missing required property '{property}'")]
    MissingProperty { export: String, property: String },

    /// Directive property holds a value that cannot be used
    #[error("Directive '{export}' has invalid '{property}' value '{value}'")]
    InvalidProperty {
        export: String,
        property: String,
        value: String,
    },

    /// Record bytes could not be interpreted
    #[error("Decode error in '{export}': {source}")]
    Decode {
        export: String,
        #[source]
        source: DecodeError,
    },

    /// Bounded input reading failed
    #[error("Input error: {0}")]
    Input(#[from] IoError),

    /// Output directory or file could not be written
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Asset payload could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Run stopped between directives
    #[error("Split cancelled after {completed} directives")]
    Cancelled { completed: usize },
}

/// Coarse classification of [`SplitError`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Structural,
    Configuration,
    Decode,
    Io,
    Cancelled,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Structural => "structural",
            ErrorKind::Configuration => "configuration",
            ErrorKind::Decode => "decode",
            ErrorKind::Io => "io",
            ErrorKind::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

impl SplitError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SplitError::Structural(_) => ErrorKind::Structural,
            SplitError::Ini(_)
            | SplitError::Config(_)
            | SplitError::UnknownExport(_)
            | SplitError::MissingProperty { .. }
            | SplitError::InvalidProperty { .. } => ErrorKind::Configuration,
            SplitError::Decode { .. } | SplitError::Serialization(_) => ErrorKind::Decode,
            SplitError::Input(_) | SplitError::Io { .. } => ErrorKind::Io,
            SplitError::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SplitError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn missing(export: &str, property: &str) -> Self {
        SplitError::MissingProperty {
            export: export.to_string(),
            property: property.to_string(),
        }
    }

    pub(crate) fn invalid(export: &str, property: &str, value: impl Into<String>) -> Self {
        SplitError::InvalidProperty {
            export: export.to_string(),
            property: property.to_string(),
            value: value.into(),
        }
    }
}

/// Result type alias for split operations
pub type Result<T> = std::result::Result<T, SplitError>;

/// Attach the export name to a decode failure.
pub(crate) trait DecodeContext<T> {
    fn in_export(self, export: &str) -> Result<T>;
}

impl<T> DecodeContext<T> for std::result::Result<T, DecodeError> {
    fn in_export(self, export: &str) -> Result<T> {
        self.map_err(|source| SplitError::Decode {
            export: export.to_string(),
            source,
        })
    }
}
