//! Level tables and texture lists.

use std::path::PathBuf;

use tracing::debug;

use super::Session;
use crate::assets::LandTableFile;
use crate::error::{DecodeContext, Result, SplitError};
use crate::manifest::ItemInfo;
use crate::ninja::{LandTable, LandTableFormat, TexnameArray};
use crate::paths;
use crate::project::Directive;

impl Session<'_> {
    /// Write a level table if its label is new; returns whether it was
    fn emit_land_table(&mut self, land: LandTable, file: PathBuf, description: String) -> Result<bool> {
        if !self.labels.admit(&land.label_set()) {
            debug!(label = %land.label, "Level table already emitted");
            return Ok(false);
        }
        let bytes = LandTableFile::new(land, Some(description)).to_bytes(self.no_metadata)?;
        self.emit(&file, "landtable", &bytes)?;
        Ok(true)
    }

    pub(super) fn land_table(&mut self, d: &Directive, address: usize, format: LandTableFormat) -> Result<()> {
        let land = LandTable::decode(&self.view, address, format).in_export(&d.export)?;
        self.manifest
            .add_item(ItemInfo::new(&d.export, land.label.as_str()));
        if self.labels.contains(&land.label) {
            return Ok(());
        }
        let file = PathBuf::from(d.require_filename()?);
        self.emit_land_table(land, file, d.export.clone())?;
        Ok(())
    }

    pub(super) fn land_table_array(&mut self, d: &Directive, address: usize, format: LandTableFormat) -> Result<()> {
        let base = Self::base_dir(d);
        for (i, offset) in self.elements(d, address)? {
            let land = LandTable::decode(&self.view, offset, format).in_export(&d.export)?;
            self.manifest
                .add_item(ItemInfo::new(&d.export, land.label.as_str()).at(i));
            let stem = d
                .element_name(i)
                .map_or_else(|| i.to_string(), str::to_string);
            let file = paths::join_with_ext(&base, &stem, format.extension());
            self.emit_land_table(land, file, format!("{}[{}]", d.export, i))?;
        }
        Ok(())
    }

    /// Register the list's address and, with a filename, write its names
    pub(super) fn texlist(&mut self, d: &Directive, address: usize) -> Result<()> {
        let va = self
            .exports
            .va(&d.export)
            .ok_or_else(|| SplitError::UnknownExport(d.export.clone()))?;
        if !self.manifest.register_texlist(va, &d.export, None) {
            debug!(export = %d.export, va, "Texture list address already registered");
        }
        if let Some(filename) = &d.filename {
            let list = TexnameArray::decode(&self.view, address).in_export(&d.export)?;
            let file = PathBuf::from(format!("{}.txt", filename));
            self.emit(&file, "texlist", list.to_text().as_bytes())?;
        }
        Ok(())
    }

    /// Every non-null element is registered, including lists already
    /// written by an earlier directive
    pub(super) fn texlist_array(&mut self, d: &Directive, address: usize) -> Result<()> {
        let base = Self::base_dir(d);
        for i in 0..d.length {
            let at = address + i * 4;
            let va = self.view.u32(at).in_export(&d.export)?;
            let Some(offset) = self.view.translate(va, at).in_export(&d.export)? else {
                continue;
            };
            self.manifest.register_texlist(va, &d.export, Some(i));
            if d.filename.is_some() {
                let list = TexnameArray::decode(&self.view, offset).in_export(&d.export)?;
                let stem = d
                    .element_name(i)
                    .map_or_else(|| paths::indexed(i), str::to_string);
                let file = paths::join_with_ext(&base, &stem, ".txt");
                self.emit(&file, "texlist", list.to_text().as_bytes())?;
            }
        }
        Ok(())
    }
}
