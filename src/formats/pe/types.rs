//! Core PE data types and structures

use std::fmt;
use std::ops::Range;

// PE constants
pub const DOS_SIGNATURE: u16 = 0x5A4D; // MZ
pub const PE_SIGNATURE: [u8; 4] = *b"PE\0\0";
pub const PE32_MAGIC: u16 = 0x10B;
pub const PE32PLUS_MAGIC: u16 = 0x20B;

// Data directory indices
pub const IMAGE_DIRECTORY_ENTRY_EXPORT: usize = 0;

/// Size of IMAGE_EXPORT_DIRECTORY
pub const EXPORT_DIRECTORY_SIZE: usize = 40;

// Section characteristics
pub const IMAGE_SCN_CNT_INITIALIZED_DATA: u32 = 0x00000040;
pub const IMAGE_SCN_MEM_READ: u32 = 0x40000000;

/// PE parsing error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeError {
    InvalidDosSignature,
    InvalidPeSignature,
    InvalidMagic(u16),
    UnsupportedLayout(&'static str),
    TruncatedHeader { expected: usize, actual: usize },
    InvalidRva { rva: u32 },
    InvalidOffset { offset: usize },
    MissingExportDirectory,
    DuplicateExport { name: String },
    InvalidString,
}

impl fmt::Display for PeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDosSignature => write!(f, "Invalid DOS signature"),
            Self::InvalidPeSignature => write!(f, "Invalid PE signature"),
            Self::InvalidMagic(m) => write!(f, "Invalid optional header magic: 0x{:04x}", m),
            Self::UnsupportedLayout(what) => write!(f, "Unsupported image layout: {}", what),
            Self::TruncatedHeader { expected, actual } => {
                write!(
                    f,
                    "Truncated header: expected {} bytes, got {}",
                    expected, actual
                )
            }
            Self::InvalidRva { rva } => write!(f, "Invalid RVA: 0x{:08x}", rva),
            Self::InvalidOffset { offset } => write!(f, "Invalid image offset: 0x{:x}", offset),
            Self::MissingExportDirectory => write!(f, "Image has no export directory"),
            Self::DuplicateExport { name } => write!(f, "Duplicate export name: {}", name),
            Self::InvalidString => write!(f, "Invalid string encoding"),
        }
    }
}

impl std::error::Error for PeError {}

pub type Result<T> = std::result::Result<T, PeError>;

/// Machine types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Machine {
    Unknown,
    I386,   // 0x014c
    X86_64, // 0x8664
    Other(u16),
}

impl From<u16> for Machine {
    fn from(value: u16) -> Self {
        match value {
            0x014c => Self::I386,
            0x8664 => Self::X86_64,
            0 => Self::Unknown,
            other => Self::Other(other),
        }
    }
}

/// DOS header fields the loader needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DosHeader {
    pub e_magic: u16,  // Magic number (MZ)
    pub e_lfanew: u32, // File address of PE header
}

/// COFF header (20 bytes)
#[derive(Debug, Clone, Copy)]
pub struct CoffHeader {
    pub machine: Machine,
    pub number_of_sections: u16,
    pub time_date_stamp: u32,
    pub size_of_optional_header: u16,
    pub characteristics: u16,
}

/// Data directory entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataDirectory {
    pub virtual_address: u32,
    pub size: u32,
}

/// 32-bit optional header
#[derive(Debug, Clone)]
pub struct OptionalHeader32 {
    pub magic: u16,
    pub address_of_entry_point: u32,
    pub image_base: u32,
    pub section_alignment: u32,
    pub file_alignment: u32,
    pub size_of_image: u32,
    pub size_of_headers: u32,
    pub number_of_rva_and_sizes: u32,
}

/// NT headers (PE signature + COFF + Optional)
#[derive(Debug, Clone)]
pub struct NtHeaders {
    pub signature: [u8; 4],
    pub file_header: CoffHeader,
    pub optional_header: OptionalHeader32,
}

/// Section header
#[derive(Debug, Clone)]
pub struct SectionHeader {
    pub name: [u8; 8],
    pub virtual_size: u32,
    pub virtual_address: u32,
    pub size_of_raw_data: u32,
    pub pointer_to_raw_data: u32,
    pub characteristics: u32,
}

impl SectionHeader {
    pub fn name(&self) -> String {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(8);
        String::from_utf8_lossy(&self.name[..end]).to_string()
    }

    pub fn contains_rva(&self, rva: u32) -> bool {
        let size = self.virtual_size.max(self.size_of_raw_data);
        rva >= self.virtual_address && rva < self.virtual_address.saturating_add(size)
    }

    /// Bytes of raw data that belong in the loaded image
    pub fn loaded_raw_size(&self) -> u32 {
        if self.virtual_size == 0 {
            self.size_of_raw_data
        } else {
            self.size_of_raw_data.min(self.virtual_size)
        }
    }
}

/// Section with data reference
#[derive(Debug, Clone)]
pub struct Section {
    pub header: SectionHeader,
    pub data: Range<usize>, // Range in file
}

/// Export entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportEntry {
    pub name: String,
    pub ordinal_index: u16,
    pub rva: u32,
}
