//! Geometry attached to model nodes.

use bincode::{Decode, Encode};

use crate::ninja::{label, DecodeError, ImageView, LabelSet, ModelFormat, Result};

/// Upper bound on any single element array
pub const MAX_ELEMENTS: usize = 0x10000;

/// Upper bound on the size of a raw chunk or GC blob
pub const MAX_BLOB: usize = 0x10_0000;

pub const BASIC_ATTACH_SIZE: usize = 0x28;
pub const BASIC_DX_ATTACH_SIZE: usize = 0x2C;
pub const MATERIAL_SIZE: usize = 0x14;
pub const MESHSET_SIZE: usize = 0x18;
pub const MESHSET_DX_SIZE: usize = 0x1C;
pub const CHUNK_ATTACH_SIZE: usize = 0x18;
pub const GC_ATTACH_SIZE: usize = 0x24;

fn check_count(what: &'static str, count: usize) -> Result<usize> {
    if count > MAX_ELEMENTS {
        return Err(DecodeError::TooMany {
            what,
            count,
            limit: MAX_ELEMENTS,
        });
    }
    Ok(count)
}

#[derive(Debug, Clone, Copy, PartialEq, Encode, Decode)]
pub struct Bounds {
    pub center: [f32; 3],
    pub radius: f32,
}

impl Bounds {
    fn read(view: &ImageView, offset: usize) -> Result<Self> {
        Ok(Self {
            center: view.vec3(offset)?,
            radius: view.f32(offset + 12)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub enum Attach {
    Basic(BasicAttach),
    Chunk(ChunkAttach),
    Gc(GcAttach),
}

impl Attach {
    /// Decode the attach at `offset` in the given geometry format
    pub fn decode(view: &ImageView, offset: usize, format: ModelFormat) -> Result<Self> {
        match format {
            ModelFormat::Basic => BasicAttach::decode(view, offset, false).map(Attach::Basic),
            ModelFormat::BasicDx => BasicAttach::decode(view, offset, true).map(Attach::Basic),
            ModelFormat::Chunk => ChunkAttach::decode(view, offset).map(Attach::Chunk),
            ModelFormat::Gc => GcAttach::decode(view, offset).map(Attach::Gc),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Attach::Basic(a) => &a.label,
            Attach::Chunk(a) => &a.label,
            Attach::Gc(a) => &a.label,
        }
    }

    /// Add this attach's label and its sub-block labels
    pub fn collect_labels(&self, set: &mut LabelSet) {
        set.insert(self.label());
        let subs = match self {
            Attach::Basic(a) => vec![
                &a.vertex_label,
                &a.normal_label,
                &a.material_label,
                &a.mesh_label,
            ],
            Attach::Chunk(a) => vec![&a.vertex_label, &a.poly_label],
            Attach::Gc(a) => vec![&a.vertex_label, &a.opaque_label, &a.translucent_label],
        };
        for l in subs.into_iter().flatten() {
            set.insert(l.as_str());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct Material {
    pub diffuse: u32,
    pub specular: u32,
    pub exponent: f32,
    pub texture_id: u32,
    pub flags: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum PolyType {
    Triangles,
    Quads,
    NPoly,
    Strips,
}

impl From<u16> for PolyType {
    fn from(type_matid: u16) -> Self {
        match type_matid >> 14 {
            0 => PolyType::Triangles,
            1 => PolyType::Quads,
            2 => PolyType::NPoly,
            _ => PolyType::Strips,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct Poly {
    /// Strip winding flag; only meaningful for strips
    pub reversed: bool,
    pub indices: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct Meshset {
    pub poly_type: PolyType,
    pub material_id: u16,
    pub polys: Vec<Poly>,
    pub poly_attrs: u32,
    pub normals: Option<Vec<[f32; 3]>>,
    pub colors: Option<Vec<u32>>,
    pub uvs: Option<Vec<[i16; 2]>>,
}

impl Meshset {
    fn decode(view: &ImageView, offset: usize) -> Result<Self> {
        let type_matid = view.u16(offset)?;
        let poly_type = PolyType::from(type_matid);
        let npoly = view.u16(offset + 2)? as usize;

        let mut polys = Vec::new();
        if let Some(mut p) = view.pointer(offset + 4)? {
            for _ in 0..npoly {
                let (reversed, count) = match poly_type {
                    PolyType::Triangles => (false, 3),
                    PolyType::Quads => (false, 4),
                    PolyType::NPoly | PolyType::Strips => {
                        let header = view.u16(p)?;
                        p += 2;
                        (header & 0x8000 != 0, (header & 0x7FFF) as usize)
                    }
                };
                let mut indices = Vec::with_capacity(count);
                for k in 0..count {
                    indices.push(view.u16(p + k * 2)?);
                }
                p += count * 2;
                polys.push(Poly { reversed, indices });
            }
        }

        let corners = polys.iter().map(|p| p.indices.len()).sum::<usize>();
        let corners = check_count("mesh corner", corners)?;

        let normals = match view.pointer(offset + 12)? {
            Some(p) => Some(
                (0..corners)
                    .map(|k| view.vec3(p + k * 12))
                    .collect::<Result<Vec<_>>>()?,
            ),
            None => None,
        };
        let colors = match view.pointer(offset + 16)? {
            Some(p) => Some(
                (0..corners)
                    .map(|k| view.u32(p + k * 4))
                    .collect::<Result<Vec<_>>>()?,
            ),
            None => None,
        };
        let uvs = match view.pointer(offset + 20)? {
            Some(p) => Some(
                (0..corners)
                    .map(|k| -> Result<[i16; 2]> {
                        Ok([view.i16(p + k * 4)?, view.i16(p + k * 4 + 2)?])
                    })
                    .collect::<Result<Vec<_>>>()?,
            ),
            None => None,
        };

        Ok(Self {
            poly_type,
            material_id: type_matid & 0x3FFF,
            polys,
            poly_attrs: view.u32(offset + 8)?,
            normals,
            colors,
            uvs,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct BasicAttach {
    pub label: String,
    pub vertex_label: Option<String>,
    pub normal_label: Option<String>,
    pub material_label: Option<String>,
    pub mesh_label: Option<String>,
    pub vertices: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub materials: Vec<Material>,
    pub meshes: Vec<Meshset>,
    pub bounds: Bounds,
    pub dx: bool,
}

impl BasicAttach {
    pub fn decode(view: &ImageView, offset: usize, dx: bool) -> Result<Self> {
        let size = if dx {
            BASIC_DX_ATTACH_SIZE
        } else {
            BASIC_ATTACH_SIZE
        };
        view.bytes(offset, size)?;

        let vcount = check_count("vertex", view.i32(offset + 8)?.max(0) as usize)?;
        let nmesh = view.u16(offset + 20)? as usize;
        let nmat = view.u16(offset + 22)? as usize;

        let vertex_ptr = view.pointer(offset)?;
        let normal_ptr = view.pointer(offset + 4)?;
        let mesh_ptr = view.pointer(offset + 12)?;
        let mat_ptr = view.pointer(offset + 16)?;

        let read_vecs = |ptr: Option<usize>| -> Result<Vec<[f32; 3]>> {
            match ptr {
                Some(p) => (0..vcount).map(|k| view.vec3(p + k * 12)).collect(),
                None => Ok(Vec::new()),
            }
        };
        let vertices = read_vecs(vertex_ptr)?;
        let normals = read_vecs(normal_ptr)?;

        let mut materials = Vec::new();
        if let Some(p) = mat_ptr {
            for k in 0..nmat {
                let m = p + k * MATERIAL_SIZE;
                materials.push(Material {
                    diffuse: view.u32(m)?,
                    specular: view.u32(m + 4)?,
                    exponent: view.f32(m + 8)?,
                    texture_id: view.u32(m + 12)?,
                    flags: view.u32(m + 16)?,
                });
            }
        }

        let stride = if dx { MESHSET_DX_SIZE } else { MESHSET_SIZE };
        let mut meshes = Vec::new();
        if let Some(p) = mesh_ptr {
            for k in 0..nmesh {
                meshes.push(Meshset::decode(view, p + k * stride)?);
            }
        }

        Ok(Self {
            label: label("attach", offset),
            vertex_label: vertex_ptr.map(|p| label("vertex", p)),
            normal_label: normal_ptr.map(|p| label("normal", p)),
            material_label: mat_ptr.map(|p| label("matlist", p)),
            mesh_label: mesh_ptr.map(|p| label("meshlist", p)),
            vertices,
            normals,
            materials,
            meshes,
            bounds: Bounds::read(view, offset + 24)?,
            dx,
        })
    }
}

/// Chunk geometry kept as the raw chunk streams
#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct ChunkAttach {
    pub label: String,
    pub vertex_label: Option<String>,
    pub poly_label: Option<String>,
    pub vertex_chunks: Vec<u8>,
    pub poly_chunks: Vec<u8>,
    pub bounds: Bounds,
}

const CHUNK_END: u8 = 0xFF;

fn blob_limit(len: usize) -> Result<()> {
    if len > MAX_BLOB {
        return Err(DecodeError::TooMany {
            what: "chunk byte",
            count: len,
            limit: MAX_BLOB,
        });
    }
    Ok(())
}

/// Length of a vertex chunk list including its end marker
fn vertex_chunks_len(view: &ImageView, start: usize) -> Result<usize> {
    let mut p = start;
    loop {
        let kind = view.u8(p)?;
        if kind == CHUNK_END {
            return Ok(p + 4 - start);
        }
        let size = view.u16(p + 2)? as usize;
        p += 4 + size * 4;
        blob_limit(p - start)?;
    }
}

/// Length of a poly chunk list including its end marker
fn poly_chunks_len(view: &ImageView, start: usize) -> Result<usize> {
    let mut p = start;
    loop {
        let kind = view.u8(p)?;
        p += match kind {
            CHUNK_END => return Ok(p + 2 - start),
            0..=7 => 2,
            8..=9 => 4,
            10..=15 => 2,
            _ => 4 + view.u16(p + 2)? as usize * 2,
        };
        blob_limit(p - start)?;
    }
}

impl ChunkAttach {
    pub fn decode(view: &ImageView, offset: usize) -> Result<Self> {
        view.bytes(offset, CHUNK_ATTACH_SIZE)?;
        let vertex_ptr = view.pointer(offset)?;
        let poly_ptr = view.pointer(offset + 4)?;

        let vertex_chunks = match vertex_ptr {
            Some(p) => view.bytes(p, vertex_chunks_len(view, p)?)?.to_vec(),
            None => Vec::new(),
        };
        let poly_chunks = match poly_ptr {
            Some(p) => view.bytes(p, poly_chunks_len(view, p)?)?.to_vec(),
            None => Vec::new(),
        };

        Ok(Self {
            label: label("attach", offset),
            vertex_label: vertex_ptr.map(|p| label("vertex", p)),
            poly_label: poly_ptr.map(|p| label("poly", p)),
            vertex_chunks,
            poly_chunks,
            bounds: Bounds::read(view, offset + 8)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct GcVertexAttribute {
    pub attribute: u8,
    pub fraction: u8,
    pub count: u16,
    pub data_type: u32,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct GcMesh {
    pub parameters: Vec<u8>,
    pub primitives: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct GcAttach {
    pub label: String,
    pub vertex_label: Option<String>,
    pub opaque_label: Option<String>,
    pub translucent_label: Option<String>,
    pub vertex_attributes: Vec<GcVertexAttribute>,
    pub opaque: Vec<GcMesh>,
    pub translucent: Vec<GcMesh>,
    pub bounds: Bounds,
}

const GC_ATTR_END: u8 = 0xFF;
const GC_ATTR_SIZE: usize = 16;
const GC_MESH_SIZE: usize = 16;

impl GcAttach {
    pub fn decode(view: &ImageView, offset: usize) -> Result<Self> {
        view.bytes(offset, GC_ATTACH_SIZE)?;
        let vertex_ptr = view.pointer(offset)?;
        let opaque_ptr = view.pointer(offset + 8)?;
        let translucent_ptr = view.pointer(offset + 12)?;
        let nopaque = view.u16(offset + 16)? as usize;
        let ntrans = view.u16(offset + 18)? as usize;

        let mut vertex_attributes = Vec::new();
        if let Some(mut p) = vertex_ptr {
            while view.u8(p)? != GC_ATTR_END {
                check_count("vertex attribute", vertex_attributes.len())?;
                let size = view.u32(p + 12)? as usize;
                blob_limit(size)?;
                let data = match view.pointer(p + 8)? {
                    Some(d) => view.bytes(d, size)?.to_vec(),
                    None => Vec::new(),
                };
                vertex_attributes.push(GcVertexAttribute {
                    attribute: view.u8(p)?,
                    fraction: view.u8(p + 1)?,
                    count: view.u16(p + 2)?,
                    data_type: view.u32(p + 4)?,
                    data,
                });
                p += GC_ATTR_SIZE;
            }
        }

        let read_meshes = |ptr: Option<usize>, count: usize| -> Result<Vec<GcMesh>> {
            let mut meshes = Vec::new();
            if let Some(p) = ptr {
                for k in 0..count {
                    let m = p + k * GC_MESH_SIZE;
                    let nparams = view.u32(m + 4)? as usize;
                    let prim_size = view.u32(m + 12)? as usize;
                    blob_limit(nparams.saturating_mul(8))?;
                    blob_limit(prim_size)?;
                    let parameters = match view.pointer(m)? {
                        Some(d) => view.bytes(d, nparams * 8)?.to_vec(),
                        None => Vec::new(),
                    };
                    let primitives = match view.pointer(m + 8)? {
                        Some(d) => view.bytes(d, prim_size)?.to_vec(),
                        None => Vec::new(),
                    };
                    meshes.push(GcMesh {
                        parameters,
                        primitives,
                    });
                }
            }
            Ok(meshes)
        };

        Ok(Self {
            label: label("attach", offset),
            vertex_label: vertex_ptr.map(|p| label("vertex", p)),
            opaque_label: opaque_ptr.map(|p| label("opoly", p)),
            translucent_label: translucent_ptr.map(|p| label("tpoly", p)),
            vertex_attributes,
            opaque: read_meshes(opaque_ptr, nopaque)?,
            translucent: read_meshes(translucent_ptr, ntrans)?,
            bounds: Bounds::read(view, offset + 20)?,
        })
    }
}
