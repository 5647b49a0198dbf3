//! Bounds-checked little-endian reads over byte slices

use crate::formats::pe::types::{PeError, Result};

/// Extension trait for reading primitive types from byte slices
pub trait ReadExt {
    fn read_u8_at(&self, offset: usize) -> Option<u8>;
    fn read_u16_le_at(&self, offset: usize) -> Option<u16>;
    fn read_i16_le_at(&self, offset: usize) -> Option<i16>;
    fn read_u32_le_at(&self, offset: usize) -> Option<u32>;
    fn read_i32_le_at(&self, offset: usize) -> Option<i32>;
    fn read_f32_le_at(&self, offset: usize) -> Option<f32>;
    fn read_cstring_at(&self, offset: usize, max_len: usize) -> Option<&str>;
    fn read_slice_at(&self, offset: usize, len: usize) -> Option<&[u8]>;
}

impl ReadExt for [u8] {
    #[inline(always)]
    fn read_u8_at(&self, offset: usize) -> Option<u8> {
        self.get(offset).copied()
    }

    #[inline(always)]
    fn read_u16_le_at(&self, offset: usize) -> Option<u16> {
        self.get(offset..offset.checked_add(2)?)
            .and_then(|b| b.try_into().ok())
            .map(u16::from_le_bytes)
    }

    #[inline(always)]
    fn read_i16_le_at(&self, offset: usize) -> Option<i16> {
        self.read_u16_le_at(offset).map(|v| v as i16)
    }

    #[inline(always)]
    fn read_u32_le_at(&self, offset: usize) -> Option<u32> {
        self.get(offset..offset.checked_add(4)?)
            .and_then(|b| b.try_into().ok())
            .map(u32::from_le_bytes)
    }

    #[inline(always)]
    fn read_i32_le_at(&self, offset: usize) -> Option<i32> {
        self.read_u32_le_at(offset).map(|v| v as i32)
    }

    #[inline(always)]
    fn read_f32_le_at(&self, offset: usize) -> Option<f32> {
        self.read_u32_le_at(offset).map(f32::from_bits)
    }

    fn read_cstring_at(&self, offset: usize, max_len: usize) -> Option<&str> {
        let end = offset.saturating_add(max_len).min(self.len());
        let slice = self.get(offset..end)?;

        let len = memchr::memchr(0, slice).unwrap_or(slice.len());
        std::str::from_utf8(&slice[..len]).ok()
    }

    #[inline(always)]
    fn read_slice_at(&self, offset: usize, len: usize) -> Option<&[u8]> {
        self.get(offset..offset.checked_add(len)?)
    }
}

/// Helper to read a null-terminated string from a buffer
pub fn read_cstring(data: &[u8], offset: usize, max_len: usize) -> Result<&str> {
    data.read_cstring_at(offset, max_len)
        .ok_or(PeError::InvalidString)
}

/// Read a u32 or fail with the offending offset
#[inline]
pub fn require_u32(data: &[u8], offset: usize) -> Result<u32> {
    data.read_u32_le_at(offset)
        .ok_or(PeError::InvalidOffset { offset })
}

/// Read a u16 or fail with the offending offset
#[inline]
pub fn require_u16(data: &[u8], offset: usize) -> Result<u16> {
    data.read_u16_le_at(offset)
        .ok_or(PeError::InvalidOffset { offset })
}

/// Check if a range is within bounds
#[inline(always)]
pub fn check_bounds(offset: usize, size: usize, data_len: usize) -> Result<()> {
    match offset.checked_add(size) {
        Some(end) if end <= data_len => Ok(()),
        _ => Err(PeError::InvalidOffset { offset }),
    }
}
