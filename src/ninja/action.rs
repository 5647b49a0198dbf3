//! NJS_ACTION: a model paired with a motion for it.

use crate::ninja::{label, ImageView, Model, ModelFormat, Motion, Result};

pub const ACTION_SIZE: usize = 0x08;

#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub label: String,
    pub model: Model,
    pub motion: Motion,
}

impl Action {
    /// Decode the action at `offset`. The motion is decoded for the
    /// model's animated node count.
    pub fn decode(view: &ImageView, offset: usize, format: ModelFormat) -> Result<Self> {
        view.bytes(offset, ACTION_SIZE)?;
        let object = view.required_pointer(offset, "object")?;
        let motion = view.required_pointer(offset + 4, "motion")?;

        let model = Model::decode(view, object, format)?;
        let motion = Motion::decode(view, motion, model.count_animated(), false)?;
        Ok(Self {
            label: label("action", offset),
            model,
            motion,
        })
    }
}
