//! Texture name lists (NJS_TEXLIST).

use crate::ninja::{label, DecodeError, ImageView, Result};

const TEXNAME_SIZE: usize = 12;
const MAX_TEXTURES: usize = 0x1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TexnameArray {
    pub label: String,
    pub names: Vec<String>,
}

impl TexnameArray {
    pub fn decode(view: &ImageView, offset: usize) -> Result<Self> {
        let count = view.u32(offset + 4)? as usize;
        if count > MAX_TEXTURES {
            return Err(DecodeError::TooMany {
                what: "texture",
                count,
                limit: MAX_TEXTURES,
            });
        }

        let mut names = Vec::with_capacity(count);
        if let Some(list) = view.pointer(offset)? {
            for i in 0..count {
                let name = view.cstring_ptr(list + i * TEXNAME_SIZE)?;
                names.push(name.unwrap_or_default());
            }
        }
        Ok(Self {
            label: label("texlist", offset),
            names,
        })
    }

    /// One texture name per line
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for name in &self.names {
            out.push_str(name);
            out.push('\n');
        }
        out
    }
}
