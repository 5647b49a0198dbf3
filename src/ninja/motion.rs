//! NJS_MOTION keyframe animations.

use bincode::{Decode, Encode};
use bitflags::bitflags;

use crate::ninja::{label, DecodeError, ImageView, Result};

pub const MOTION_SIZE: usize = 0x0C;

/// Upper bound on keyframes in one channel
pub const MAX_KEYS: usize = 0x10000;

/// Upper bound on the node count a motion is decoded for
pub const MAX_MOTION_NODES: usize = 0x1000;

bitflags! {
    /// Channels present in each node's motion data, in storage order
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MotionChannels: u16 {
        const POSITION = 0x0001;
        const ROTATION = 0x0002;
        const SCALE = 0x0004;
        const VECTOR = 0x0008;
        const VERTEX = 0x0010;
        const NORMAL = 0x0020;
        const TARGET = 0x0040;
        const ROLL = 0x0080;
        const ANGLE = 0x0100;
        const COLOR = 0x0200;
        const INTENSITY = 0x0400;
        const SPOT = 0x0800;
        const POINT = 0x1000;
        const QUATERNION = 0x2000;
    }
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub enum KeyFrames {
    Position(Vec<(u32, [f32; 3])>),
    Rotation(Vec<(u32, [i32; 3])>),
    Scale(Vec<(u32, [f32; 3])>),
    Vector(Vec<(u32, [f32; 3])>),
    /// Frame numbers only; the vertex arrays depend on the target model
    Vertex(Vec<u32>),
    Normal(Vec<u32>),
    Target(Vec<(u32, [f32; 3])>),
    Roll(Vec<(u32, i32)>),
    Angle(Vec<(u32, i32)>),
    Color(Vec<(u32, u32)>),
    Intensity(Vec<(u32, f32)>),
    /// near, far, inner angle, outer angle
    Spot(Vec<(u32, [f32; 2], [i32; 2])>),
    Point(Vec<(u32, [f32; 2])>),
    Quaternion(Vec<(u32, [f32; 4])>),
}

impl KeyFrames {
    fn decode(
        view: &ImageView,
        channel: MotionChannels,
        p: usize,
        count: usize,
        short_rot: bool,
    ) -> Result<Self> {
        let vec3 = |size: usize| -> Result<Vec<(u32, [f32; 3])>> {
            (0..count)
                .map(|k| -> Result<(u32, [f32; 3])> {
                    Ok((view.u32(p + k * size)?, view.vec3(p + k * size + 4)?))
                })
                .collect()
        };
        let frames = |size: usize| -> Result<Vec<u32>> {
            (0..count).map(|k| view.u32(p + k * size)).collect()
        };

        let keys = if channel == MotionChannels::POSITION {
            KeyFrames::Position(vec3(16)?)
        } else if channel == MotionChannels::ROTATION {
            let keys = if short_rot {
                (0..count)
                    .map(|k| -> Result<(u32, [i32; 3])> {
                        let o = p + k * 8;
                        Ok((
                            view.u16(o)? as u32,
                            [
                                view.i16(o + 2)? as i32,
                                view.i16(o + 4)? as i32,
                                view.i16(o + 6)? as i32,
                            ],
                        ))
                    })
                    .collect::<Result<Vec<_>>>()?
            } else {
                (0..count)
                    .map(|k| -> Result<(u32, [i32; 3])> {
                        Ok((view.u32(p + k * 16)?, view.ivec3(p + k * 16 + 4)?))
                    })
                    .collect::<Result<Vec<_>>>()?
            };
            KeyFrames::Rotation(keys)
        } else if channel == MotionChannels::SCALE {
            KeyFrames::Scale(vec3(16)?)
        } else if channel == MotionChannels::VECTOR {
            KeyFrames::Vector(vec3(16)?)
        } else if channel == MotionChannels::VERTEX {
            KeyFrames::Vertex(frames(8)?)
        } else if channel == MotionChannels::NORMAL {
            KeyFrames::Normal(frames(8)?)
        } else if channel == MotionChannels::TARGET {
            KeyFrames::Target(vec3(16)?)
        } else if channel == MotionChannels::ROLL || channel == MotionChannels::ANGLE {
            let keys = (0..count)
                .map(|k| -> Result<(u32, i32)> {
                    Ok((view.u32(p + k * 8)?, view.i32(p + k * 8 + 4)?))
                })
                .collect::<Result<Vec<_>>>()?;
            if channel == MotionChannels::ROLL {
                KeyFrames::Roll(keys)
            } else {
                KeyFrames::Angle(keys)
            }
        } else if channel == MotionChannels::COLOR {
            KeyFrames::Color(
                (0..count)
                    .map(|k| -> Result<(u32, u32)> {
                        Ok((view.u32(p + k * 8)?, view.u32(p + k * 8 + 4)?))
                    })
                    .collect::<Result<Vec<_>>>()?,
            )
        } else if channel == MotionChannels::INTENSITY {
            KeyFrames::Intensity(
                (0..count)
                    .map(|k| -> Result<(u32, f32)> {
                        Ok((view.u32(p + k * 8)?, view.f32(p + k * 8 + 4)?))
                    })
                    .collect::<Result<Vec<_>>>()?,
            )
        } else if channel == MotionChannels::SPOT {
            KeyFrames::Spot(
                (0..count)
                    .map(|k| -> Result<(u32, [f32; 2], [i32; 2])> {
                        let o = p + k * 20;
                        Ok((
                            view.u32(o)?,
                            [view.f32(o + 4)?, view.f32(o + 8)?],
                            [view.i32(o + 12)?, view.i32(o + 16)?],
                        ))
                    })
                    .collect::<Result<Vec<_>>>()?,
            )
        } else if channel == MotionChannels::POINT {
            KeyFrames::Point(
                (0..count)
                    .map(|k| -> Result<(u32, [f32; 2])> {
                        let o = p + k * 12;
                        Ok((view.u32(o)?, [view.f32(o + 4)?, view.f32(o + 8)?]))
                    })
                    .collect::<Result<Vec<_>>>()?,
            )
        } else {
            KeyFrames::Quaternion(
                (0..count)
                    .map(|k| -> Result<(u32, [f32; 4])> {
                        let o = p + k * 20;
                        Ok((
                            view.u32(o)?,
                            [
                                view.f32(o + 4)?,
                                view.f32(o + 8)?,
                                view.f32(o + 12)?,
                                view.f32(o + 16)?,
                            ],
                        ))
                    })
                    .collect::<Result<Vec<_>>>()?,
            )
        };
        Ok(keys)
    }
}

/// Keyframes for one animated node
#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct NodeMotion {
    pub node: u32,
    pub tracks: Vec<KeyFrames>,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct Motion {
    /// Identity; may be renamed once to the export that first reached it
    pub label: String,
    pub frames: u32,
    pub channels: u16,
    pub interpolation: u16,
    pub node_count: u32,
    pub nodes: Vec<NodeMotion>,
}

impl Motion {
    /// Decode the motion at `offset` for a model with `node_count`
    /// animated nodes. `short_rot` selects the compact rotation keys used
    /// by chao motions.
    pub fn decode(view: &ImageView, offset: usize, node_count: usize, short_rot: bool) -> Result<Self> {
        if node_count > MAX_MOTION_NODES {
            return Err(DecodeError::TooMany {
                what: "motion node",
                count: node_count,
                limit: MAX_MOTION_NODES,
            });
        }
        view.bytes(offset, MOTION_SIZE)?;
        let frames = view.u32(offset + 4)?;
        let type_flags = view.u16(offset + 8)?;
        let interpolation = view.u16(offset + 10)?;

        let channels = MotionChannels::from_bits_truncate(type_flags);
        let channel_list: Vec<MotionChannels> = channels.iter().collect();
        let nch = channel_list.len();

        let mut nodes = Vec::new();
        if let Some(mdata) = view.pointer(offset)? {
            for node in 0..node_count {
                let entry = mdata + node * nch * 8;
                let mut tracks = Vec::new();
                for (c, &channel) in channel_list.iter().enumerate() {
                    let count = view.u32(entry + nch * 4 + c * 4)? as usize;
                    let Some(p) = view.pointer(entry + c * 4)? else {
                        continue;
                    };
                    if count == 0 {
                        continue;
                    }
                    if count > MAX_KEYS {
                        return Err(DecodeError::TooMany {
                            what: "keyframe",
                            count,
                            limit: MAX_KEYS,
                        });
                    }
                    tracks.push(KeyFrames::decode(view, channel, p, count, short_rot)?);
                }
                if !tracks.is_empty() {
                    nodes.push(NodeMotion {
                        node: node as u32,
                        tracks,
                    });
                }
            }
        }

        Ok(Self {
            label: label("animation", offset),
            frames,
            channels: channels.bits(),
            interpolation,
            node_count: node_count as u32,
            nodes,
        })
    }
}
