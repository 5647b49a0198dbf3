//! NJS_CAMERA.

use crate::formats::ini::IniDocument;
use crate::ninja::{ImageView, Result};

pub const CAMERA_SIZE: usize = 0x28;

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: [f32; 3],
    pub direction: [f32; 3],
    pub roll: i32,
    pub angle: i32,
    pub near_clip: f32,
    pub far_clip: f32,
}

fn vec_text(v: [f32; 3]) -> String {
    format!("{}, {}, {}", v[0], v[1], v[2])
}

impl Camera {
    pub fn decode(view: &ImageView, offset: usize) -> Result<Self> {
        view.bytes(offset, CAMERA_SIZE)?;
        Ok(Self {
            position: view.vec3(offset)?,
            direction: view.vec3(offset + 12)?,
            roll: view.i32(offset + 24)?,
            angle: view.i32(offset + 28)?,
            near_clip: view.f32(offset + 32)?,
            far_clip: view.f32(offset + 36)?,
        })
    }

    pub fn to_ini(&self) -> IniDocument {
        let mut doc = IniDocument::new();
        let g = doc.globals_mut();
        g.set("Position", vec_text(self.position));
        g.set("Direction", vec_text(self.direction));
        g.set("Roll", format!("{:08X}", self.roll));
        g.set("Angle", format!("{:08X}", self.angle));
        g.set("NearClip", self.near_clip.to_string());
        g.set("FarClip", self.far_clip.to_string());
        doc
    }
}
