//! PE header parsing

use crate::formats::pe::types::*;
use crate::formats::pe::utils::{check_bounds, require_u16, require_u32, ReadExt};

/// Size of the fixed part of a PE32 optional header, before the data directories
const OPTIONAL_HEADER32_FIXED: usize = 96;

/// Parse DOS header from data
pub fn parse_dos_header(data: &[u8]) -> Result<DosHeader> {
    if data.len() < 64 {
        return Err(PeError::TruncatedHeader {
            expected: 64,
            actual: data.len(),
        });
    }

    let e_magic = require_u16(data, 0)?;
    if e_magic != DOS_SIGNATURE {
        return Err(PeError::InvalidDosSignature);
    }

    Ok(DosHeader {
        e_magic,
        e_lfanew: require_u32(data, 60)?,
    })
}

/// Parse COFF header from data at offset
pub fn parse_coff_header(data: &[u8], offset: usize) -> Result<CoffHeader> {
    if offset + 20 > data.len() {
        return Err(PeError::TruncatedHeader {
            expected: offset + 20,
            actual: data.len(),
        });
    }

    Ok(CoffHeader {
        machine: Machine::from(require_u16(data, offset)?),
        number_of_sections: require_u16(data, offset + 2)?,
        time_date_stamp: require_u32(data, offset + 4)?,
        size_of_optional_header: require_u16(data, offset + 16)?,
        characteristics: require_u16(data, offset + 18)?,
    })
}

/// Parse a PE32 optional header. PE32+ images are rejected.
pub fn parse_optional_header(data: &[u8], offset: usize, size: u16) -> Result<OptionalHeader32> {
    if offset + size as usize > data.len() || size < 2 {
        return Err(PeError::TruncatedHeader {
            expected: offset + (size as usize).max(2),
            actual: data.len(),
        });
    }

    let magic = require_u16(data, offset)?;
    match magic {
        PE32_MAGIC => {}
        PE32PLUS_MAGIC => return Err(PeError::UnsupportedLayout("PE32+")),
        _ => return Err(PeError::InvalidMagic(magic)),
    }

    if (size as usize) < OPTIONAL_HEADER32_FIXED {
        return Err(PeError::TruncatedHeader {
            expected: offset + OPTIONAL_HEADER32_FIXED,
            actual: offset + size as usize,
        });
    }

    Ok(OptionalHeader32 {
        magic,
        address_of_entry_point: require_u32(data, offset + 16)?,
        image_base: require_u32(data, offset + 28)?,
        section_alignment: require_u32(data, offset + 32)?,
        file_alignment: require_u32(data, offset + 36)?,
        size_of_image: require_u32(data, offset + 56)?,
        size_of_headers: require_u32(data, offset + 60)?,
        number_of_rva_and_sizes: require_u32(data, offset + 92)?,
    })
}

/// Read the data directory at `index`, or an empty one when the header
/// declares fewer directories.
pub fn data_directory(
    data: &[u8],
    optional_offset: usize,
    header: &OptionalHeader32,
    index: usize,
) -> Result<DataDirectory> {
    if index >= header.number_of_rva_and_sizes as usize {
        return Ok(DataDirectory::default());
    }
    let offset = optional_offset + OPTIONAL_HEADER32_FIXED + index * 8;
    check_bounds(offset, 8, data.len())?;
    Ok(DataDirectory {
        virtual_address: require_u32(data, offset)?,
        size: require_u32(data, offset + 4)?,
    })
}

/// Parse NT headers (signature, COFF and optional header)
pub fn parse_nt_headers(data: &[u8], offset: usize) -> Result<NtHeaders> {
    let sig = data
        .read_slice_at(offset, 4)
        .ok_or(PeError::TruncatedHeader {
            expected: offset + 4,
            actual: data.len(),
        })?;
    if sig != PE_SIGNATURE {
        return Err(PeError::InvalidPeSignature);
    }

    let file_header = parse_coff_header(data, offset + 4)?;
    if file_header.machine != Machine::I386 {
        return Err(PeError::UnsupportedLayout("non-i386 machine"));
    }

    let optional_header =
        parse_optional_header(data, offset + 24, file_header.size_of_optional_header)?;

    Ok(NtHeaders {
        signature: PE_SIGNATURE,
        file_header,
        optional_header,
    })
}
