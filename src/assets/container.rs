//! Binary asset container: magic, bincode payload, metadata chunks.
//!
//! ```text
//! magic[8] | payload_len u32 | payload | (tag u32, len u32, body)* | END
//! ```
//!
//! All integers are little-endian. Nothing time-dependent is stored, so the
//! same record always produces the same bytes.

use bincode::{Decode, Encode};
use thiserror::Error;

use crate::formats::pe::ReadExt;

pub const FORMAT_VERSION: u8 = 1;

const fn magic(name: &[u8]) -> [u8; 8] {
    let mut m = [0u8; 8];
    let mut i = 0;
    while i < name.len() && i < 7 {
        m[i] = name[i];
        i += 1;
    }
    m[7] = FORMAT_VERSION;
    m
}

pub const SA1MDL: [u8; 8] = magic(b"SA1MDL");
pub const SA2MDL: [u8; 8] = magic(b"SA2MDL");
pub const SA2BMDL: [u8; 8] = magic(b"SA2BMDL");
pub const SAANIM: [u8; 8] = magic(b"SAANIM");
pub const SA1LVL: [u8; 8] = magic(b"SA1LVL");
pub const SA2LVL: [u8; 8] = magic(b"SA2LVL");
pub const SA2BLVL: [u8; 8] = magic(b"SA2BLVL");

/// Metadata chunk tags
pub const CHUNK_LABEL: u32 = 0x4C42_414C; // "LABL"
pub const CHUNK_ANIMATION: u32 = 0x4D49_4E41; // "ANIM"
pub const CHUNK_DESCRIPTION: u32 = 0x4353_4544; // "DESC"
pub const CHUNK_TOOL: u32 = 0x4C4F_4F54; // "TOOL"
pub const CHUNK_END: u32 = 0x0044_4E45; // "END"

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("unexpected magic {found:02x?}")]
    BadMagic { found: Vec<u8> },

    #[error("container truncated at offset {offset}")]
    Truncated { offset: usize },

    #[error("payload encoding: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("payload decoding: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("metadata text is not UTF-8")]
    BadText,
}

pub type Result<T> = std::result::Result<T, ContainerError>;

/// Tool that wrote a container
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct ToolMetadata {
    pub name: String,
    pub version: String,
}

impl ToolMetadata {
    pub fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Metadata stored after the payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Relative paths of animations for a model; written even without metadata
    pub animations: Vec<String>,
    pub labels: Vec<String>,
    pub description: Option<String>,
    pub tool: Option<ToolMetadata>,
}

fn join(items: &[String]) -> Vec<u8> {
    let mut out = Vec::new();
    for s in items {
        out.extend_from_slice(s.as_bytes());
        out.push(0);
    }
    out
}

fn split(body: &[u8]) -> Result<Vec<String>> {
    body.split(|&b| b == 0)
        .filter(|s| !s.is_empty())
        .map(|s| {
            std::str::from_utf8(s)
                .map(str::to_string)
                .map_err(|_| ContainerError::BadText)
        })
        .collect()
}

fn push_chunk(out: &mut Vec<u8>, tag: u32, body: &[u8]) {
    out.extend_from_slice(&tag.to_le_bytes());
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(body);
}

/// Encode `record` into a container.
///
/// With `no_metadata` only the animation list is kept.
pub fn write<T: Encode>(
    magic: [u8; 8],
    record: &T,
    meta: &Metadata,
    no_metadata: bool,
) -> Result<Vec<u8>> {
    let cfg = bincode::config::standard();
    let payload = bincode::encode_to_vec(record, cfg)?;

    let mut out = Vec::with_capacity(payload.len() + 64);
    out.extend_from_slice(&magic);
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(&payload);

    if !meta.animations.is_empty() {
        push_chunk(&mut out, CHUNK_ANIMATION, &join(&meta.animations));
    }
    if !no_metadata {
        if !meta.labels.is_empty() {
            push_chunk(&mut out, CHUNK_LABEL, &join(&meta.labels));
        }
        if let Some(desc) = &meta.description {
            push_chunk(&mut out, CHUNK_DESCRIPTION, desc.as_bytes());
        }
        if let Some(tool) = &meta.tool {
            push_chunk(&mut out, CHUNK_TOOL, &bincode::encode_to_vec(tool, cfg)?);
        }
    }
    push_chunk(&mut out, CHUNK_END, &[]);
    Ok(out)
}

/// Decode a container written by [`write`], checking its magic
pub fn read<T: Decode<()>>(expected: [u8; 8], data: &[u8]) -> Result<(T, Metadata)> {
    let found = data
        .read_slice_at(0, 8)
        .ok_or(ContainerError::Truncated { offset: 0 })?;
    if found != expected {
        return Err(ContainerError::BadMagic {
            found: found.to_vec(),
        });
    }
    let len = data
        .read_u32_le_at(8)
        .ok_or(ContainerError::Truncated { offset: 8 })? as usize;
    let payload = data
        .read_slice_at(12, len)
        .ok_or(ContainerError::Truncated { offset: 12 })?;
    let cfg = bincode::config::standard();
    let (record, _): (T, _) = bincode::decode_from_slice(payload, cfg)?;

    let mut meta = Metadata::default();
    let mut p = 12 + len;
    loop {
        let tag = data
            .read_u32_le_at(p)
            .ok_or(ContainerError::Truncated { offset: p })?;
        let size = data
            .read_u32_le_at(p + 4)
            .ok_or(ContainerError::Truncated { offset: p + 4 })? as usize;
        let body = data
            .read_slice_at(p + 8, size)
            .ok_or(ContainerError::Truncated { offset: p + 8 })?;
        match tag {
            CHUNK_END => break,
            CHUNK_ANIMATION => meta.animations = split(body)?,
            CHUNK_LABEL => meta.labels = split(body)?,
            CHUNK_DESCRIPTION => {
                meta.description = Some(
                    std::str::from_utf8(body)
                        .map_err(|_| ContainerError::BadText)?
                        .to_string(),
                )
            }
            CHUNK_TOOL => {
                let (tool, _): (ToolMetadata, _) = bincode::decode_from_slice(body, cfg)?;
                meta.tool = Some(tool);
            }
            _ => {}
        }
        p += 8 + size;
    }
    Ok((record, meta))
}
