//! Bounds-checked reads over the loaded image.

use crate::address;
use crate::formats::pe::ReadExt;
use crate::ninja::{DecodeError, Result};

/// Longest string read through a pointer
const MAX_STRING: usize = 256;

/// A loaded image plus the base its pointers are relative to
#[derive(Debug, Clone, Copy)]
pub struct ImageView<'a> {
    data: &'a [u8],
    image_base: u32,
}

impl<'a> ImageView<'a> {
    pub fn new(data: &'a [u8], image_base: u32) -> Self {
        Self { data, image_base }
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn image_base(&self) -> u32 {
        self.image_base
    }

    fn oob(offset: usize, len: usize) -> DecodeError {
        DecodeError::OutOfBounds { offset, len }
    }

    pub fn u8(&self, offset: usize) -> Result<u8> {
        self.data.read_u8_at(offset).ok_or(Self::oob(offset, 1))
    }

    pub fn u16(&self, offset: usize) -> Result<u16> {
        self.data.read_u16_le_at(offset).ok_or(Self::oob(offset, 2))
    }

    pub fn i16(&self, offset: usize) -> Result<i16> {
        self.data.read_i16_le_at(offset).ok_or(Self::oob(offset, 2))
    }

    pub fn u32(&self, offset: usize) -> Result<u32> {
        self.data.read_u32_le_at(offset).ok_or(Self::oob(offset, 4))
    }

    pub fn i32(&self, offset: usize) -> Result<i32> {
        self.data.read_i32_le_at(offset).ok_or(Self::oob(offset, 4))
    }

    pub fn f32(&self, offset: usize) -> Result<f32> {
        self.data.read_f32_le_at(offset).ok_or(Self::oob(offset, 4))
    }

    pub fn vec3(&self, offset: usize) -> Result<[f32; 3]> {
        Ok([
            self.f32(offset)?,
            self.f32(offset + 4)?,
            self.f32(offset + 8)?,
        ])
    }

    pub fn ivec3(&self, offset: usize) -> Result<[i32; 3]> {
        Ok([
            self.i32(offset)?,
            self.i32(offset + 4)?,
            self.i32(offset + 8)?,
        ])
    }

    pub fn bytes(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        self.data
            .read_slice_at(offset, len)
            .ok_or(Self::oob(offset, len))
    }

    /// Read a stored pointer and translate it to an image offset.
    ///
    /// A stored zero is a null pointer and yields `None`.
    pub fn pointer(&self, offset: usize) -> Result<Option<usize>> {
        let va = self.u32(offset)?;
        self.translate(va, offset)
    }

    /// Translate an already-read pointer value; `at` is where it was stored.
    pub fn translate(&self, va: u32, at: usize) -> Result<Option<usize>> {
        if va == 0 {
            return Ok(None);
        }
        match address::translate(va, self.image_base) {
            Some(off) if off < self.data.len() => Ok(Some(off)),
            Some(off) => Err(Self::oob(off, 1)),
            None => Err(DecodeError::BadPointer { offset: at, va }),
        }
    }

    /// Like [`pointer`](Self::pointer), but null is an error
    pub fn required_pointer(&self, offset: usize, what: &'static str) -> Result<usize> {
        self.pointer(offset)?
            .ok_or(DecodeError::NullPointer { offset, what })
    }

    /// NUL-terminated string at an image offset
    pub fn cstring(&self, offset: usize) -> Result<String> {
        if offset >= self.data.len() {
            return Err(Self::oob(offset, 1));
        }
        self.data
            .read_cstring_at(offset, MAX_STRING)
            .map(str::to_string)
            .ok_or(DecodeError::BadString { offset })
    }

    /// String reached through a pointer stored at `offset`
    pub fn cstring_ptr(&self, offset: usize) -> Result<Option<String>> {
        match self.pointer(offset)? {
            Some(target) => self.cstring(target).map(Some),
            None => Ok(None),
        }
    }
}
