//! Section table parsing and mapping into a loaded image

use crate::formats::pe::types::*;
use crate::formats::pe::utils::{require_u32, ReadExt};

/// Size of one IMAGE_SECTION_HEADER
pub const SECTION_HEADER_SIZE: usize = 40;

/// Sections ordered by virtual address
#[derive(Debug, Clone, Default)]
pub struct SectionTable {
    sections: Vec<Section>,
}

impl SectionTable {
    /// Create a new section table
    pub fn new(sections: Vec<Section>) -> Self {
        let mut sections = sections;
        sections.sort_by_key(|s| s.header.virtual_address);
        Self { sections }
    }

    /// Get all sections
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Find section containing RVA
    pub fn section_containing_rva(&self, rva: u32) -> Option<&Section> {
        self.sections.iter().find(|s| s.header.contains_rva(rva))
    }

    /// Copy each section's raw data to its virtual address in `image`.
    ///
    /// Data that would land past the end of the image is clipped; raw data
    /// past the end of the file is an error.
    pub fn map_into(&self, file: &[u8], image: &mut [u8]) -> Result<()> {
        for section in &self.sections {
            let dest = section.header.virtual_address as usize;
            if dest >= image.len() {
                continue;
            }
            let len = section.data.len().min(image.len() - dest);
            let src = file
                .read_slice_at(section.data.start, len)
                .ok_or(PeError::InvalidOffset {
                    offset: section.data.start,
                })?;
            image[dest..dest + len].copy_from_slice(src);
        }
        Ok(())
    }
}

/// Parse section headers
pub fn parse_section_headers(data: &[u8], offset: usize, count: u16) -> Result<Vec<SectionHeader>> {
    let total = count as usize * SECTION_HEADER_SIZE;
    if offset + total > data.len() {
        return Err(PeError::TruncatedHeader {
            expected: offset + total,
            actual: data.len(),
        });
    }

    let mut headers = Vec::with_capacity(count as usize);
    for i in 0..count as usize {
        let base = offset + i * SECTION_HEADER_SIZE;

        let mut name = [0u8; 8];
        name.copy_from_slice(
            data.read_slice_at(base, 8)
                .ok_or(PeError::InvalidOffset { offset: base })?,
        );

        headers.push(SectionHeader {
            name,
            virtual_size: require_u32(data, base + 8)?,
            virtual_address: require_u32(data, base + 12)?,
            size_of_raw_data: require_u32(data, base + 16)?,
            pointer_to_raw_data: require_u32(data, base + 20)?,
            characteristics: require_u32(data, base + 36)?,
        });
    }

    Ok(headers)
}

/// Pair headers with the file range of their loadable raw data
pub fn create_sections(headers: Vec<SectionHeader>, file_len: usize) -> Result<Vec<Section>> {
    let mut sections = Vec::with_capacity(headers.len());
    for header in headers {
        let start = header.pointer_to_raw_data as usize;
        let len = header.loaded_raw_size() as usize;
        let data = if len == 0 {
            start..start
        } else {
            if start.checked_add(len).map_or(true, |end| end > file_len) {
                return Err(PeError::InvalidOffset { offset: start });
            }
            start..start + len
        };
        sections.push(Section { header, data });
    }
    Ok(sections)
}
