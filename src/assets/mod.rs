//! Asset files written by a split and read back by tools that load them.
//!
//! Models, motions and level tables are stored in the container format of
//! [`container`]; the file magic follows the record format so a loader can
//! pick the right decoder from the first eight bytes.

pub mod container;

use crate::error::{Result, SplitError};
use crate::ninja::{LandTable, LandTableFormat, Model, ModelFormat, Motion};

pub use container::{ContainerError, Metadata, ToolMetadata};

impl From<ContainerError> for SplitError {
    fn from(e: ContainerError) -> Self {
        SplitError::Serialization(e.to_string())
    }
}

pub fn model_magic(format: ModelFormat) -> [u8; 8] {
    match format {
        ModelFormat::Basic | ModelFormat::BasicDx => container::SA1MDL,
        ModelFormat::Chunk => container::SA2MDL,
        ModelFormat::Gc => container::SA2BMDL,
    }
}

pub fn land_magic(format: LandTableFormat) -> [u8; 8] {
    match format {
        LandTableFormat::Sa1 | LandTableFormat::Sadx => container::SA1LVL,
        LandTableFormat::Sa2 => container::SA2LVL,
        LandTableFormat::Sa2b => container::SA2BLVL,
    }
}

fn metadata(labels: Vec<String>, description: Option<String>) -> Metadata {
    Metadata {
        animations: Vec::new(),
        labels,
        description,
        tool: Some(ToolMetadata::current()),
    }
}

/// A model and the animation files that drive it
#[derive(Debug, Clone, PartialEq)]
pub struct ModelFile {
    pub model: Model,
    /// Paths relative to the model file's directory
    pub animations: Vec<String>,
    pub description: Option<String>,
}

impl ModelFile {
    pub fn new(model: Model, animations: Vec<String>, description: Option<String>) -> Self {
        Self {
            model,
            animations,
            description,
        }
    }

    pub fn to_bytes(&self, no_metadata: bool) -> Result<Vec<u8>> {
        let mut meta = metadata(self.model.label_set().to_vec(), self.description.clone());
        meta.animations = self.animations.clone();
        let bytes = container::write(model_magic(self.model.format), &self.model, &meta, no_metadata)?;
        Ok(bytes)
    }

    /// Read a model file of any model format
    pub fn read(data: &[u8]) -> Result<Self> {
        let magic = data.get(..8).unwrap_or_default();
        let format = [ModelFormat::Basic, ModelFormat::Chunk, ModelFormat::Gc]
            .into_iter()
            .find(|f| model_magic(*f) == magic)
            .unwrap_or(ModelFormat::Basic);
        let (model, meta): (Model, _) = container::read(model_magic(format), data)?;
        Ok(Self {
            model,
            animations: meta.animations,
            description: meta.description,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationFile {
    pub motion: Motion,
}

impl AnimationFile {
    pub fn new(motion: Motion) -> Self {
        Self { motion }
    }

    pub fn to_bytes(&self, no_metadata: bool) -> Result<Vec<u8>> {
        let meta = metadata(vec![self.motion.label.clone()], None);
        Ok(container::write(container::SAANIM, &self.motion, &meta, no_metadata)?)
    }

    pub fn read(data: &[u8]) -> Result<Self> {
        let (motion, _) = container::read(container::SAANIM, data)?;
        Ok(Self { motion })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LandTableFile {
    pub land: LandTable,
    pub description: Option<String>,
}

impl LandTableFile {
    pub fn new(land: LandTable, description: Option<String>) -> Self {
        Self { land, description }
    }

    pub fn to_bytes(&self, no_metadata: bool) -> Result<Vec<u8>> {
        let meta = metadata(self.land.label_set().to_vec(), self.description.clone());
        Ok(container::write(
            land_magic(self.land.format),
            &self.land,
            &meta,
            no_metadata,
        )?)
    }

    pub fn read(data: &[u8]) -> Result<Self> {
        let magic = data.get(..8).unwrap_or_default();
        let format = [
            LandTableFormat::Sa1,
            LandTableFormat::Sa2,
            LandTableFormat::Sa2b,
        ]
        .into_iter()
        .find(|f| land_magic(*f) == magic)
        .unwrap_or(LandTableFormat::Sa1);
        let (land, meta): (LandTable, _) = container::read(land_magic(format), data)?;
        Ok(Self {
            land,
            description: meta.description,
        })
    }
}
