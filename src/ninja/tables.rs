//! Fixed-size game tables that reference models and motions.

use crate::ninja::{label, DecodeError, ImageView, Model, ModelFormat, Motion, Result};

/// Character names for character object data entries, in table order
pub const CHARA_OBJECT_NAMES: [&str; 15] = [
    "Sonic",
    "Shadow",
    "Tails",
    "Eggman",
    "Knuckles",
    "Rouge",
    "Amy",
    "Metal Sonic",
    "Tikal",
    "Chaos",
    "Chao Walker",
    "Dark Chao Walker",
    "Neutral Chao",
    "Hero Chao",
    "Dark Chao",
];

pub const CHARA_OBJECT_SIZE: usize = 60;
pub const KART_SPECIAL_INFO_SIZE: usize = 0x1C;
pub const MOTION_TABLE_ENTRY_SIZE: usize = 0x1C;
pub const ANIM_INDEX_SIZE: usize = 8;

const MAX_ANIM_INDEX: usize = 0x1000;

fn motions(view: &ImageView, at: usize, node_count: usize) -> Result<[Option<Motion>; 3]> {
    let mut out: [Option<Motion>; 3] = [None, None, None];
    for (k, slot) in out.iter_mut().enumerate() {
        if let Some(p) = view.pointer(at + k * 4)? {
            *slot = Some(Motion::decode(view, p, node_count, false)?);
        }
    }
    Ok(out)
}

/// A model with up to three motions for it
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatedModel {
    pub model: Model,
    pub motions: [Option<Motion>; 3],
}

#[derive(Debug, Clone, PartialEq)]
pub struct Accessory {
    pub model: Model,
    /// Label of the node of the main model the accessory hangs from
    pub attach_node: String,
}

/// One character select entry
#[derive(Debug, Clone, PartialEq)]
pub struct CharaObjectData {
    pub main: AnimatedModel,
    pub accessory: Option<Accessory>,
    pub super_form: Option<AnimatedModel>,
    pub unknown1: i32,
    pub rating: i32,
    pub description_id: i32,
    pub text_back_texture: i32,
    pub selection_size: f32,
}

impl CharaObjectData {
    pub fn decode(view: &ImageView, offset: usize) -> Result<Self> {
        view.bytes(offset, CHARA_OBJECT_SIZE)?;
        let model_at = view.required_pointer(offset, "model")?;
        let model = Model::decode(view, model_at, ModelFormat::Chunk)?;
        let main_motions = motions(view, offset + 4, model.count_animated())?;

        let accessory = match view.pointer(offset + 16)? {
            Some(p) => {
                let node_va = view.u32(offset + 20)?;
                let node_at = view.translate(node_va, offset + 20)?.unwrap_or(0);
                Some(Accessory {
                    model: Model::decode(view, p, ModelFormat::Chunk)?,
                    attach_node: label("object", node_at),
                })
            }
            None => None,
        };

        let super_form = match view.pointer(offset + 24)? {
            Some(p) => {
                let model = Model::decode(view, p, ModelFormat::Chunk)?;
                let motions = motions(view, offset + 28, model.count_animated())?;
                Some(AnimatedModel { model, motions })
            }
            None => None,
        };

        Ok(Self {
            main: AnimatedModel {
                model,
                motions: main_motions,
            },
            accessory,
            super_form,
            unknown1: view.i32(offset + 40)?,
            rating: view.i32(offset + 44)?,
            description_id: view.i32(offset + 48)?,
            text_back_texture: view.i32(offset + 52)?,
            selection_size: view.f32(offset + 56)?,
        })
    }
}

/// Kart model entry
#[derive(Debug, Clone, PartialEq)]
pub struct KartSpecialInfo {
    pub id: i32,
    pub model: Model,
    pub low_model: Option<Model>,
    pub texlist: u32,
    pub unknown: [i32; 3],
}

impl KartSpecialInfo {
    pub fn decode(view: &ImageView, offset: usize) -> Result<Self> {
        view.bytes(offset, KART_SPECIAL_INFO_SIZE)?;
        let model_at = view.required_pointer(offset + 4, "model")?;
        let low_model = match view.pointer(offset + 8)? {
            Some(p) => Some(Model::decode(view, p, ModelFormat::Chunk)?),
            None => None,
        };
        Ok(Self {
            id: view.i32(offset)?,
            model: Model::decode(view, model_at, ModelFormat::Chunk)?,
            low_model,
            texlist: view.u32(offset + 12)?,
            unknown: [
                view.i32(offset + 16)?,
                view.i32(offset + 20)?,
                view.i32(offset + 24)?,
            ],
        })
    }
}

/// Motion table row; the motion itself is decoded by the caller so shared
/// motions are decoded once
#[derive(Debug, Clone, PartialEq)]
pub struct MotionTableEntry {
    pub motion: usize,
    pub loop_property: u16,
    pub pose: u16,
    pub next_animation: i32,
    pub transition_speed: u32,
    pub start_frame: f32,
    pub end_frame: f32,
    pub play_speed: f32,
}

impl MotionTableEntry {
    pub fn read(view: &ImageView, offset: usize) -> Result<Self> {
        view.bytes(offset, MOTION_TABLE_ENTRY_SIZE)?;
        Ok(Self {
            motion: view.required_pointer(offset, "motion")?,
            loop_property: view.u16(offset + 4)?,
            pose: view.u16(offset + 6)?,
            next_animation: view.i32(offset + 8)?,
            transition_speed: view.u32(offset + 12)?,
            start_frame: view.f32(offset + 16)?,
            end_frame: view.f32(offset + 20)?,
            play_speed: view.f32(offset + 24)?,
        })
    }
}

/// Entry of an index-terminated animation list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimIndex {
    pub index: i16,
    pub node_count: i16,
    pub motion: usize,
}

/// Read entries until one with index -1
pub fn read_anim_index_list(view: &ImageView, offset: usize) -> Result<Vec<AnimIndex>> {
    let mut out = Vec::new();
    let mut p = offset;
    loop {
        let index = view.i16(p)?;
        if index == -1 {
            return Ok(out);
        }
        if out.len() >= MAX_ANIM_INDEX {
            return Err(DecodeError::TooMany {
                what: "animation index",
                count: out.len() + 1,
                limit: MAX_ANIM_INDEX,
            });
        }
        out.push(AnimIndex {
            index,
            node_count: view.i16(p + 2)?,
            motion: view.required_pointer(p + 4, "motion")?,
        });
        p += ANIM_INDEX_SIZE;
    }
}
