//! Shared helpers for the integration tests.
//!
//! [`ImageBuilder`] lays out a minimal i386 PE32 DLL with one `.data`
//! section holding Ninja records and a named export directory, so the
//! split pipeline can be exercised without sample binaries.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use dllsplit::hashing::{digest, HashAlgorithm};
use dllsplit::manifest::OutputManifest;
use tempfile::TempDir;

pub const IMAGE_BASE: u32 = 0x1000_0000;
pub const DATA_RVA: u32 = 0x1000;
const RAW_OFFSET: usize = 0x200;
const FILE_ALIGN: usize = 0x200;
const SECTION_ALIGN: usize = 0x1000;

fn align(v: usize, to: usize) -> usize {
    v.div_ceil(to) * to
}

/// Builds the `.data` section record by record
pub struct ImageBuilder {
    data: Vec<u8>,
    exports: Vec<(String, u32)>,
}

impl Default for ImageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBuilder {
    pub fn new() -> Self {
        // Keep RVA 0x1000 itself unused so no record sits at the section start
        Self {
            data: vec![0u8; 0x10],
            exports: Vec::new(),
        }
    }

    /// Reserve `size` zeroed, 4-aligned bytes and return their RVA
    pub fn alloc(&mut self, size: usize) -> u32 {
        self.data.resize(align(self.data.len(), 4), 0);
        let rva = DATA_RVA + self.data.len() as u32;
        self.data.resize(self.data.len() + size, 0);
        rva
    }

    fn offset(rva: u32) -> usize {
        (rva - DATA_RVA) as usize
    }

    pub fn put_u16(&mut self, rva: u32, v: u16) {
        let o = Self::offset(rva);
        self.data[o..o + 2].copy_from_slice(&v.to_le_bytes());
    }

    pub fn put_u32(&mut self, rva: u32, v: u32) {
        let o = Self::offset(rva);
        self.data[o..o + 4].copy_from_slice(&v.to_le_bytes());
    }

    pub fn put_f32(&mut self, rva: u32, v: f32) {
        self.put_u32(rva, v.to_bits());
    }

    /// Store a pointer to `target` at `rva`
    pub fn put_ptr(&mut self, rva: u32, target: u32) {
        self.put_u32(rva, IMAGE_BASE + target);
    }

    pub fn cstring(&mut self, s: &str) -> u32 {
        let rva = self.alloc(s.len() + 1);
        let o = Self::offset(rva);
        self.data[o..o + s.len()].copy_from_slice(s.as_bytes());
        rva
    }

    pub fn export(&mut self, name: &str, rva: u32) {
        self.exports.push((name.to_string(), rva));
    }

    /// NJS_OBJECT with unit scale and no geometry
    pub fn object(&mut self, child: Option<u32>, sibling: Option<u32>) -> u32 {
        let rva = self.alloc(0x34);
        for k in 0..3 {
            self.put_f32(rva + 32 + k * 4, 1.0);
        }
        if let Some(c) = child {
            self.put_ptr(rva + 44, c);
        }
        if let Some(s) = sibling {
            self.put_ptr(rva + 48, s);
        }
        rva
    }

    /// NJS_MOTION with position and rotation channels and no key data
    pub fn motion(&mut self, frames: u32) -> u32 {
        let rva = self.alloc(0x0C);
        self.put_u32(rva + 4, frames);
        self.put_u16(rva + 8, 0x3);
        rva
    }

    /// NJS_ACTION pairing a model with a motion
    pub fn action(&mut self, object: u32, motion: u32) -> u32 {
        let rva = self.alloc(8);
        self.put_ptr(rva, object);
        self.put_ptr(rva + 4, motion);
        rva
    }

    /// Array of pointers; `None` entries stay null
    pub fn pointer_array(&mut self, targets: &[Option<u32>]) -> u32 {
        let rva = self.alloc(targets.len() * 4);
        for (i, t) in targets.iter().enumerate() {
            if let Some(t) = t {
                self.put_ptr(rva + i as u32 * 4, *t);
            }
        }
        rva
    }

    /// NJS_TEXLIST over freshly allocated NJS_TEXNAME entries
    pub fn texlist(&mut self, names: &[&str]) -> u32 {
        let strings: Vec<u32> = names.iter().map(|n| self.cstring(n)).collect();
        let entries = self.alloc(names.len() * 12);
        for (i, s) in strings.iter().enumerate() {
            self.put_ptr(entries + i as u32 * 12, *s);
        }
        let rva = self.alloc(8);
        self.put_ptr(rva, entries);
        self.put_u32(rva + 4, names.len() as u32);
        rva
    }

    /// Set the attach pointer of an NJS_OBJECT built by [`Self::object`]
    pub fn set_attach(&mut self, object: u32, attach: u32) {
        self.put_ptr(object + 4, attach);
    }

    /// Empty basic attach; `dx` selects the SADX layout
    pub fn basic_attach(&mut self, dx: bool) -> u32 {
        self.alloc(if dx { 0x2C } else { 0x28 })
    }

    /// Empty chunk attach with no vertex or poly chunks
    pub fn chunk_attach(&mut self) -> u32 {
        self.alloc(0x18)
    }

    /// Level table with no COL or GeoAnim entries; `sa2` picks the
    /// SA2 layout
    pub fn landtable(&mut self, sa2: bool) -> u32 {
        let rva = self.alloc(if sa2 { 0x20 } else { 0x24 });
        let far_clip = if sa2 { 0x0C } else { 0x08 };
        self.put_f32(rva + far_clip, -3000.0);
        rva
    }

    /// NJS_CAMERA at `position` looking down -Z
    pub fn camera(&mut self, position: [f32; 3]) -> u32 {
        let rva = self.alloc(0x28);
        for (k, v) in position.iter().enumerate() {
            self.put_f32(rva + k as u32 * 4, *v);
        }
        self.put_f32(rva + 20, -1.0);
        self.put_u32(rva + 28, 0x2000);
        self.put_f32(rva + 32, 1.0);
        self.put_f32(rva + 36, 1000.0);
        rva
    }

    /// Camera action element: a camera and a motion, either may be null
    pub fn camera_action(&mut self, camera: Option<u32>, motion: Option<u32>) -> u32 {
        let rva = self.alloc(8);
        if let Some(c) = camera {
            self.put_ptr(rva, c);
        }
        if let Some(m) = motion {
            self.put_ptr(rva + 4, m);
        }
        rva
    }

    /// Append the export directory and wrap the section in PE headers
    pub fn build(mut self) -> Vec<u8> {
        let mut exports = std::mem::take(&mut self.exports);
        exports.sort_by(|a, b| a.0.cmp(&b.0));
        let n = exports.len();

        let dir = self.alloc(40);
        let functions = self.alloc(n * 4);
        let names = self.alloc(n * 4);
        let ordinals = self.alloc(n * 2);
        for (i, (name, rva)) in exports.iter().enumerate() {
            let k = i as u32;
            self.put_u32(functions + k * 4, *rva);
            let s = self.cstring(name);
            self.put_u32(names + k * 4, s);
            self.put_u16(ordinals + k * 2, i as u16);
        }
        self.put_u32(dir + 20, n as u32);
        self.put_u32(dir + 24, n as u32);
        self.put_u32(dir + 28, functions);
        self.put_u32(dir + 32, names);
        self.put_u32(dir + 36, ordinals);
        let dir_size = DATA_RVA + self.data.len() as u32 - dir;

        let raw_size = align(self.data.len(), FILE_ALIGN);
        let virtual_size = align(self.data.len(), SECTION_ALIGN);
        let mut file = vec![0u8; RAW_OFFSET + raw_size];
        let w16 = |f: &mut Vec<u8>, o: usize, v: u16| f[o..o + 2].copy_from_slice(&v.to_le_bytes());
        let w32 = |f: &mut Vec<u8>, o: usize, v: u32| f[o..o + 4].copy_from_slice(&v.to_le_bytes());

        w16(&mut file, 0, 0x5A4D);
        w32(&mut file, 60, 0x40);
        file[0x40..0x44].copy_from_slice(b"PE\0\0");
        w16(&mut file, 0x44, 0x014c);
        w16(&mut file, 0x46, 1);
        w16(&mut file, 0x54, 0xE0);
        let opt = 0x58;
        w16(&mut file, opt, 0x10b);
        w32(&mut file, opt + 28, IMAGE_BASE);
        w32(&mut file, opt + 56, DATA_RVA + virtual_size as u32);
        w32(&mut file, opt + 60, RAW_OFFSET as u32);
        w32(&mut file, opt + 92, 16);
        w32(&mut file, opt + 96, dir);
        w32(&mut file, opt + 100, dir_size);

        let sec = opt + 0xE0;
        file[sec..sec + 5].copy_from_slice(b".data");
        w32(&mut file, sec + 8, self.data.len() as u32);
        w32(&mut file, sec + 12, DATA_RVA);
        w32(&mut file, sec + 16, raw_size as u32);
        w32(&mut file, sec + 20, RAW_OFFSET as u32);

        file[RAW_OFFSET..RAW_OFFSET + self.data.len()].copy_from_slice(&self.data);
        file
    }
}

/// Label of a model node decoded at `rva`
pub fn object_label(rva: u32) -> String {
    format!("object_{:08X}", rva)
}

/// Label of a record decoded at `rva`
pub fn label(prefix: &str, rva: u32) -> String {
    format!("{}_{:08X}", prefix, rva)
}

pub fn md5_of(path: &Path) -> String {
    digest(HashAlgorithm::Md5, &fs::read(path).expect("output written"))
}

/// An image and project file on disk plus an empty output directory
pub struct Fixture {
    pub dir: TempDir,
    pub image: PathBuf,
    pub project: PathBuf,
    pub out: PathBuf,
}

impl Fixture {
    pub fn new(image: Vec<u8>, project: &str) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let image_path = dir.path().join("chr.dll");
        let project_path = dir.path().join("chr.ini");
        fs::write(&image_path, image).expect("write image");
        fs::write(&project_path, project).expect("write project");
        let out = dir.path().join("out");
        Self {
            dir,
            image: image_path,
            project: project_path,
            out,
        }
    }

    /// A second output directory next to the first
    pub fn other_out(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn output(&self, rel: &str) -> PathBuf {
        self.out.join(rel)
    }
}

pub fn read_manifest(path: &Path) -> OutputManifest {
    let text = fs::read_to_string(path).expect("manifest written");
    OutputManifest::parse(&text).expect("manifest parses")
}
