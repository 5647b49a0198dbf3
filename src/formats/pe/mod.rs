//! PE32 image loading and export resolution
//!
//! [`LoadedImage::load`] lays the file out the way the Windows loader would
//! (headers at 0, each section at its virtual address) without applying
//! relocations. Offsets into the loaded buffer are RVAs, and pointers stored
//! in data translate with `va - image_base`.

pub mod directories;
pub mod headers;
pub mod sections;
pub mod types;
pub mod utils;

use tracing::debug;

pub use directories::ExportTable;
use headers::*;
use sections::*;
pub use types::*;
pub use utils::ReadExt;

/// Largest SizeOfImage accepted when building the loaded buffer
pub const MAX_IMAGE_SIZE: u32 = 0x4000_0000;

/// An executable laid out at its virtual addresses
#[derive(Debug, Clone)]
pub struct LoadedImage {
    data: Vec<u8>,
    image_base: u32,
    nt_headers: NtHeaders,
    export_directory: DataDirectory,
    section_table: SectionTable,
}

impl LoadedImage {
    /// Parse headers and build the loaded buffer from raw file bytes
    pub fn load(file: &[u8]) -> Result<Self> {
        let dos_header = parse_dos_header(file)?;
        let nt_offset = dos_header.e_lfanew as usize;
        let nt_headers = parse_nt_headers(file, nt_offset)?;

        let optional_offset = nt_offset + 24;
        let export_directory = data_directory(
            file,
            optional_offset,
            &nt_headers.optional_header,
            IMAGE_DIRECTORY_ENTRY_EXPORT,
        )?;

        let section_offset =
            optional_offset + nt_headers.file_header.size_of_optional_header as usize;
        let headers = parse_section_headers(
            file,
            section_offset,
            nt_headers.file_header.number_of_sections,
        )?;
        let section_table = SectionTable::new(create_sections(headers, file.len())?);

        let opt = &nt_headers.optional_header;
        if opt.size_of_image == 0 || opt.size_of_image > MAX_IMAGE_SIZE {
            return Err(PeError::UnsupportedLayout("SizeOfImage out of range"));
        }
        let mut data = vec![0u8; opt.size_of_image as usize];

        let header_len = (opt.size_of_headers as usize)
            .min(file.len())
            .min(data.len());
        data[..header_len].copy_from_slice(&file[..header_len]);
        section_table.map_into(file, &mut data)?;

        debug!(
            image_base = format_args!("{:#x}", opt.image_base),
            size_of_image = opt.size_of_image,
            sections = section_table.sections().len(),
            "Loaded image"
        );

        Ok(Self {
            data,
            image_base: opt.image_base,
            nt_headers,
            export_directory,
            section_table,
        })
    }

    /// The loaded buffer
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn image_base(&self) -> u32 {
        self.image_base
    }

    pub fn nt_headers(&self) -> &NtHeaders {
        &self.nt_headers
    }

    pub fn export_directory(&self) -> DataDirectory {
        self.export_directory
    }

    /// Name of the section holding `rva`, for diagnostics
    pub fn section_name(&self, rva: u32) -> Option<String> {
        self.section_table
            .section_containing_rva(rva)
            .map(|s| s.header.name())
    }
}

/// Resolve every named export of a loaded image
pub fn resolve_exports(image: &LoadedImage) -> Result<ExportTable> {
    let table = directories::parse_exports(
        image.data(),
        image.image_base(),
        &image.export_directory(),
    )?;
    debug!(count = table.count(), "Resolved exports");
    Ok(table)
}
