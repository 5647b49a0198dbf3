//! Decoders for the Ninja record graph stored in game executables.
//!
//! Every decoder reads through an [`ImageView`] and returns owned records.
//! Records carry deterministic labels derived from the offset they were
//! decoded at, so two directives reaching the same bytes agree on identity.

pub mod action;
pub mod attach;
pub mod camera;
pub mod labels;
pub mod landtable;
pub mod motion;
pub mod object;
pub mod tables;
pub mod texlist;
pub mod view;

use std::fmt;
use std::str::FromStr;

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use action::Action;
pub use attach::Attach;
pub use camera::Camera;
pub use labels::LabelSet;
pub use landtable::LandTable;
pub use motion::Motion;
pub use object::{Model, NodeId};
pub use texlist::TexnameArray;
pub use view::ImageView;

/// Record decoding failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("read of {len} bytes at offset {offset:#x} is outside the image")]
    OutOfBounds { offset: usize, len: usize },

    #[error("pointer {va:#010x} at offset {offset:#x} is below the image base")]
    BadPointer { offset: usize, va: u32 },

    #[error("required {what} pointer at offset {offset:#x} is null")]
    NullPointer { offset: usize, what: &'static str },

    #[error("string at offset {offset:#x} is not valid text")]
    BadString { offset: usize },

    #[error("{what} count {count} exceeds limit {limit}")]
    TooMany {
        what: &'static str,
        count: usize,
        limit: usize,
    },
}

pub type Result<T> = std::result::Result<T, DecodeError>;

/// Build the label for a record decoded at `offset`
pub fn label(prefix: &str, offset: usize) -> String {
    format!("{}_{:08X}", prefix, offset)
}

/// Geometry encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode, Serialize, Deserialize)]
pub enum ModelFormat {
    Basic,
    BasicDx,
    Chunk,
    Gc,
}

impl ModelFormat {
    /// Default file extension, including the dot
    pub fn extension(self) -> &'static str {
        match self {
            ModelFormat::Basic | ModelFormat::BasicDx => ".sa1mdl",
            ModelFormat::Chunk => ".sa2mdl",
            ModelFormat::Gc => ".sa2bmdl",
        }
    }

    /// Manifest type tag for a written model of this format
    pub fn type_tag(self) -> &'static str {
        match self {
            ModelFormat::Basic => "basicmodel",
            ModelFormat::BasicDx => "basicdxmodel",
            ModelFormat::Chunk => "chunkmodel",
            ModelFormat::Gc => "gcmodel",
        }
    }
}

/// Level table encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode, Serialize, Deserialize)]
pub enum LandTableFormat {
    Sa1,
    Sadx,
    Sa2,
    Sa2b,
}

impl LandTableFormat {
    pub fn extension(self) -> &'static str {
        match self {
            LandTableFormat::Sa1 | LandTableFormat::Sadx => ".sa1lvl",
            LandTableFormat::Sa2 => ".sa2lvl",
            LandTableFormat::Sa2b => ".sa2blvl",
        }
    }

    /// Model format of the visible geometry entries
    pub fn model_format(self) -> ModelFormat {
        match self {
            LandTableFormat::Sa1 => ModelFormat::Basic,
            LandTableFormat::Sadx => ModelFormat::BasicDx,
            LandTableFormat::Sa2 => ModelFormat::Chunk,
            LandTableFormat::Sa2b => ModelFormat::Gc,
        }
    }
}

/// Target game, selecting the default model and level encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Game {
    Sadx,
    Sa2b,
}

impl Game {
    pub fn model_format(self) -> ModelFormat {
        match self {
            Game::Sadx => ModelFormat::BasicDx,
            Game::Sa2b => ModelFormat::Chunk,
        }
    }

    pub fn land_format(self) -> LandTableFormat {
        match self {
            Game::Sadx => LandTableFormat::Sadx,
            Game::Sa2b => LandTableFormat::Sa2,
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Game::Sadx => f.write_str("SADX"),
            Game::Sa2b => f.write_str("SA2B"),
        }
    }
}

impl FromStr for Game {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SADX" => Ok(Game::Sadx),
            "SA2B" => Ok(Game::Sa2b),
            other => Err(format!("unsupported game '{}'", other)),
        }
    }
}
