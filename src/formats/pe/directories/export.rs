//! Export table parsing over a loaded image
//!
//! The image is already laid out at its virtual addresses, so every RVA in
//! the directory is used directly as a buffer offset.

use std::collections::HashMap;

use crate::formats::pe::types::*;
use crate::formats::pe::utils::{check_bounds, read_cstring, require_u16, require_u32};

/// Longest export name accepted
const MAX_NAME_LEN: usize = 512;

/// Named exports in name-table order
#[derive(Debug, Clone, Default)]
pub struct ExportTable {
    image_base: u32,
    exports: Vec<ExportEntry>,
    by_name: HashMap<String, usize>,
}

impl ExportTable {
    /// Get export by name
    pub fn get_by_name(&self, name: &str) -> Option<&ExportEntry> {
        self.by_name
            .get(name)
            .and_then(|&idx| self.exports.get(idx))
    }

    /// RVA of a named export
    pub fn rva(&self, name: &str) -> Option<u32> {
        self.get_by_name(name).map(|e| e.rva)
    }

    /// Virtual address of a named export
    pub fn va(&self, name: &str) -> Option<u32> {
        self.rva(name).map(|rva| rva.wrapping_add(self.image_base))
    }

    pub fn image_base(&self) -> u32 {
        self.image_base
    }

    pub fn entries(&self) -> &[ExportEntry] {
        &self.exports
    }

    /// Count of exports
    pub fn count(&self) -> usize {
        self.exports.len()
    }
}

/// Parse the export directory of a loaded image
pub fn parse_exports(image: &[u8], image_base: u32, export_dir: &DataDirectory) -> Result<ExportTable> {
    if export_dir.virtual_address == 0 {
        return Err(PeError::MissingExportDirectory);
    }

    let dir = export_dir.virtual_address as usize;
    if dir + EXPORT_DIRECTORY_SIZE > image.len() {
        return Err(PeError::TruncatedHeader {
            expected: dir + EXPORT_DIRECTORY_SIZE,
            actual: image.len(),
        });
    }

    let number_of_functions = require_u32(image, dir + 20)? as usize;
    let number_of_names = require_u32(image, dir + 24)? as usize;
    let address_table = require_u32(image, dir + 28)? as usize;
    let name_table = require_u32(image, dir + 32)? as usize;
    let ordinal_table = require_u32(image, dir + 36)? as usize;

    // Whole arrays must be in bounds before any entry is read
    check_bounds(name_table, number_of_names.saturating_mul(4), image.len())?;
    check_bounds(ordinal_table, number_of_names.saturating_mul(2), image.len())?;
    check_bounds(address_table, number_of_functions.saturating_mul(4), image.len())?;

    let mut exports = Vec::with_capacity(number_of_names);
    let mut by_name = HashMap::with_capacity(number_of_names);

    for i in 0..number_of_names {
        let name_rva = require_u32(image, name_table + i * 4)?;
        let ordinal_index = require_u16(image, ordinal_table + i * 2)?;

        if ordinal_index as usize >= number_of_functions {
            return Err(PeError::InvalidOffset {
                offset: address_table + ordinal_index as usize * 4,
            });
        }
        let rva = require_u32(image, address_table + ordinal_index as usize * 4)?;

        if name_rva as usize >= image.len() {
            return Err(PeError::InvalidRva { rva: name_rva });
        }
        let name = read_cstring(image, name_rva as usize, MAX_NAME_LEN)?.to_string();

        if by_name.contains_key(&name) {
            return Err(PeError::DuplicateExport { name });
        }
        by_name.insert(name.clone(), exports.len());
        exports.push(ExportEntry {
            name,
            ordinal_index,
            rva,
        });
    }

    Ok(ExportTable {
        image_base,
        exports,
        by_name,
    })
}
