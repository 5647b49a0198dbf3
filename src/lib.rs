//! Split model, animation and level data out of game executables.
//!
//! Given a PE32 image and a project file naming its exports and what they
//! hold, [`split::Splitter`] decodes each export's record graph, writes the
//! records as asset files under a project directory and produces a
//! manifest (`<image>_data.ini`) with every file's type and hash.

pub mod address;
pub mod assets;
pub mod cancel;
pub mod error;
pub mod formats;
pub mod hashing;
pub mod io;
pub mod logging;
pub mod manifest;
pub mod ninja;
pub mod paths;
pub mod project;
pub mod split;

pub use error::{ErrorKind, Result, SplitError};
pub use split::{SplitOptions, SplitSummary, Splitter};
