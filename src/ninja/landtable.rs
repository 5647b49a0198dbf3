//! Level geometry tables (LandTable) and their COL / GeoAnim lists.

use bincode::{Decode, Encode};

use crate::ninja::attach::Bounds;
use crate::ninja::{
    label, DecodeError, ImageView, LabelSet, LandTableFormat, Model, ModelFormat, Motion, Result,
};

pub const LANDTABLE_SA1_SIZE: usize = 0x24;
pub const LANDTABLE_SA2_SIZE: usize = 0x20;
pub const COL_SA1_SIZE: usize = 0x24;
pub const COL_SA2_SIZE: usize = 0x20;
pub const GEOANIM_SIZE: usize = 0x18;

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct ColEntry {
    pub bounds: Bounds,
    pub model: Option<Model>,
    pub flags: i32,
    pub unknown: [i32; 3],
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct GeoAnim {
    pub unknown: i32,
    pub frame_rate: f32,
    pub max_frame: f32,
    pub model: Option<Model>,
    pub motion: Option<Motion>,
    pub texlist: u32,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct LandTable {
    pub label: String,
    pub format: LandTableFormat,
    pub col_label: Option<String>,
    pub anim_label: Option<String>,
    pub flags: i32,
    pub far_clip: f32,
    pub texture_file: Option<String>,
    pub texlist: u32,
    pub unknown: [i32; 2],
    /// Leading COL entries that are visible geometry (SA2 layouts)
    pub visible_count: u16,
    pub cols: Vec<ColEntry>,
    pub anims: Vec<GeoAnim>,
}

fn optional_model(view: &ImageView, at: usize, format: ModelFormat) -> Result<Option<Model>> {
    match view.pointer(at)? {
        Some(p) => Model::decode(view, p, format).map(Some),
        None => Ok(None),
    }
}

fn count(value: i16, what: &'static str) -> Result<usize> {
    let n = value.max(0) as usize;
    if n > crate::ninja::attach::MAX_ELEMENTS {
        return Err(DecodeError::TooMany {
            what,
            count: n,
            limit: crate::ninja::attach::MAX_ELEMENTS,
        });
    }
    Ok(n)
}

impl LandTable {
    pub fn decode(view: &ImageView, offset: usize, format: LandTableFormat) -> Result<Self> {
        match format {
            LandTableFormat::Sa1 | LandTableFormat::Sadx => Self::decode_sa1(view, offset, format),
            LandTableFormat::Sa2 | LandTableFormat::Sa2b => Self::decode_sa2(view, offset, format),
        }
    }

    fn decode_sa1(view: &ImageView, offset: usize, format: LandTableFormat) -> Result<Self> {
        view.bytes(offset, LANDTABLE_SA1_SIZE)?;
        let ncol = count(view.i16(offset)?, "COL entry")?;
        let nanim = count(view.i16(offset + 2)?, "GeoAnim entry")?;
        let col_ptr = view.pointer(offset + 0x0C)?;
        let anim_ptr = view.pointer(offset + 0x10)?;
        let model_format = format.model_format();

        let mut cols = Vec::new();
        if let Some(p) = col_ptr {
            for i in 0..ncol {
                let c = p + i * COL_SA1_SIZE;
                cols.push(ColEntry {
                    bounds: Bounds {
                        center: view.vec3(c)?,
                        radius: view.f32(c + 12)?,
                    },
                    model: optional_model(view, c + 24, model_format)?,
                    flags: view.i32(c + 32)?,
                    unknown: [view.i32(c + 16)?, view.i32(c + 20)?, view.i32(c + 28)?],
                });
            }
        }

        let mut anims = Vec::new();
        if let Some(p) = anim_ptr {
            for i in 0..nanim {
                anims.push(Self::decode_geo_anim(view, p + i * GEOANIM_SIZE, model_format)?);
            }
        }

        Ok(Self {
            label: label("landtable", offset),
            format,
            col_label: col_ptr.map(|p| label("collist", p)),
            anim_label: anim_ptr.map(|p| label("animlist", p)),
            flags: view.i32(offset + 4)?,
            far_clip: view.f32(offset + 8)?,
            texture_file: view.cstring_ptr(offset + 0x14)?,
            texlist: view.u32(offset + 0x18)?,
            unknown: [view.i32(offset + 0x1C)?, view.i32(offset + 0x20)?],
            visible_count: 0,
            cols,
            anims,
        })
    }

    fn decode_sa2(view: &ImageView, offset: usize, format: LandTableFormat) -> Result<Self> {
        view.bytes(offset, LANDTABLE_SA2_SIZE)?;
        let ncol = count(view.i16(offset)?, "COL entry")?;
        let visible = view.i16(offset + 2)?.max(0) as usize;
        let col_ptr = view.pointer(offset + 0x10)?;
        let anim_ptr = view.pointer(offset + 0x14)?;

        let mut cols = Vec::new();
        if let Some(p) = col_ptr {
            for i in 0..ncol {
                let c = p + i * COL_SA2_SIZE;
                let model_format = if i < visible {
                    format.model_format()
                } else {
                    ModelFormat::Basic
                };
                cols.push(ColEntry {
                    bounds: Bounds {
                        center: view.vec3(c)?,
                        radius: view.f32(c + 12)?,
                    },
                    model: optional_model(view, c + 16, model_format)?,
                    flags: view.i32(c + 28)?,
                    unknown: [view.i32(c + 20)?, view.i32(c + 24)?, 0],
                });
            }
        }

        // SA2 tables store no GeoAnim count; the pointer is kept for the label only.
        Ok(Self {
            label: label("landtable", offset),
            format,
            col_label: col_ptr.map(|p| label("collist", p)),
            anim_label: anim_ptr.map(|p| label("animlist", p)),
            flags: view.i32(offset + 8)?,
            far_clip: view.f32(offset + 0x0C)?,
            texture_file: view.cstring_ptr(offset + 0x18)?,
            texlist: view.u32(offset + 0x1C)?,
            unknown: [view.i16(offset + 4)? as i32, view.i16(offset + 6)? as i32],
            visible_count: visible.min(u16::MAX as usize) as u16,
            cols,
            anims: Vec::new(),
        })
    }

    fn decode_geo_anim(view: &ImageView, g: usize, format: ModelFormat) -> Result<GeoAnim> {
        let model = optional_model(view, g + 0x0C, format)?;
        let motion = match (view.pointer(g + 0x10)?, &model) {
            (Some(action), Some(m)) => match view.pointer(action + 4)? {
                Some(mp) => Some(Motion::decode(view, mp, m.count_animated(), false)?),
                None => None,
            },
            _ => None,
        };
        Ok(GeoAnim {
            unknown: view.i32(g)?,
            frame_rate: view.f32(g + 4)?,
            max_frame: view.f32(g + 8)?,
            model,
            motion,
            texlist: view.u32(g + 0x14)?,
        })
    }

    /// Table label, COL list and models, then GeoAnim list, models and motions
    pub fn label_set(&self) -> LabelSet {
        let mut set = LabelSet::new();
        set.insert(self.label.as_str());
        if let Some(l) = &self.col_label {
            set.insert(l.as_str());
            for model in self.cols.iter().filter_map(|c| c.model.as_ref()) {
                set.extend_from(&model.label_set());
            }
        }
        if let Some(l) = &self.anim_label {
            set.insert(l.as_str());
            for anim in &self.anims {
                if let Some(m) = &anim.model {
                    set.extend_from(&m.label_set());
                }
                if let Some(m) = &anim.motion {
                    set.insert(m.label.as_str());
                }
            }
        }
        set
    }
}
