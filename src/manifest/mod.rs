//! The `<image>_data.ini` manifest describing everything a split produced.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SplitError};
use crate::formats::ini::{self, IniDocument, IniSection};

/// Type tag and content hash of one written file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub file_type: String,
    pub hash: String,
}

/// Which label an export (or one element or field of it) resolved to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemInfo {
    pub export: String,
    pub index: Option<usize>,
    pub field: Option<String>,
    pub label: String,
}

impl ItemInfo {
    pub fn new(export: &str, label: impl Into<String>) -> Self {
        Self {
            export: export.to_string(),
            index: None,
            field: None,
            label: label.into(),
        }
    }

    pub fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn field(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }
}

/// A batch of files written for one export, hashed as a unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataItem {
    pub data_type: String,
    pub export: String,
    pub filename: String,
    /// `file:hash` pairs joined with `|`
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TexListEntry {
    pub export: String,
    pub index: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputManifest {
    pub name: String,
    pub game: String,
    /// Export name to declared type, in directive order
    pub exports: Vec<(String, String)>,
    pub files: BTreeMap<String, FileEntry>,
    pub items: Vec<ItemInfo>,
    pub data_items: Vec<DataItem>,
    pub texlists: BTreeMap<u32, TexListEntry>,
}

fn parse_index(value: &str) -> Result<usize> {
    value
        .parse()
        .map_err(|_| SplitError::Config(format!("bad manifest index '{}'", value)))
}

impl OutputManifest {
    pub fn new(name: impl Into<String>, game: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            game: game.into(),
            ..Default::default()
        }
    }

    pub fn add_export(&mut self, export: &str, type_tag: &str) {
        match self.exports.iter_mut().find(|(e, _)| e == export) {
            Some(slot) => slot.1 = type_tag.to_string(),
            None => self.exports.push((export.to_string(), type_tag.to_string())),
        }
    }

    pub fn add_file(&mut self, path: impl Into<String>, file_type: &str, hash: impl Into<String>) {
        self.files.insert(
            path.into(),
            FileEntry {
                file_type: file_type.to_string(),
                hash: hash.into(),
            },
        );
    }

    pub fn add_item(&mut self, item: ItemInfo) {
        self.items.push(item);
    }

    pub fn add_data_item(&mut self, item: DataItem) {
        self.data_items.push(item);
    }

    /// Record a texture list address. The first export to claim an
    /// address keeps it; returns whether this call claimed it.
    pub fn register_texlist(&mut self, va: u32, export: &str, index: Option<usize>) -> bool {
        if self.texlists.contains_key(&va) {
            return false;
        }
        self.texlists.insert(
            va,
            TexListEntry {
                export: export.to_string(),
                index,
            },
        );
        true
    }

    pub fn to_ini(&self) -> IniDocument {
        let mut doc = IniDocument::new();
        let g = doc.globals_mut();
        g.set("name", self.name.as_str());
        g.set("game", self.game.as_str());

        let mut exports = IniSection::new("Exports");
        for (e, t) in &self.exports {
            exports.set(e.as_str(), t.as_str());
        }
        doc.push_section(exports);

        let mut files = IniSection::new("Files");
        for (path, entry) in &self.files {
            files.set(path.as_str(), format!("{}|{}", entry.file_type, entry.hash));
        }
        doc.push_section(files);

        for (n, item) in self.items.iter().enumerate() {
            let mut s = IniSection::new(format!("Item{}", n));
            s.set("Export", item.export.as_str());
            if let Some(i) = item.index {
                s.set("Index", i.to_string());
            }
            if let Some(f) = &item.field {
                s.set("Field", f.as_str());
            }
            s.set("Label", item.label.as_str());
            doc.push_section(s);
        }

        for (n, item) in self.data_items.iter().enumerate() {
            let mut s = IniSection::new(format!("DataItem{}", n));
            s.set("Type", item.data_type.as_str());
            s.set("Export", item.export.as_str());
            s.set("Filename", item.filename.as_str());
            s.set("MD5Hash", item.hash.as_str());
            doc.push_section(s);
        }

        let mut tex = IniSection::new("TexLists");
        for (va, entry) in &self.texlists {
            let value = match entry.index {
                Some(i) => format!("{},{}", entry.export, i),
                None => entry.export.clone(),
            };
            tex.set(format!("{:08X}", va), value);
        }
        doc.push_section(tex);
        doc
    }

    /// Read a manifest back from its ini text
    pub fn parse(text: &str) -> Result<Self> {
        let doc = ini::parse(text)?;
        let g = doc.globals();
        let mut out = Self::new(
            g.get("name").unwrap_or_default(),
            g.get("game").unwrap_or_default(),
        );

        for section in doc.sections() {
            let name = section.name();
            if name.eq_ignore_ascii_case("Exports") {
                for (e, t) in section.entries() {
                    out.add_export(e, t);
                }
            } else if name.eq_ignore_ascii_case("Files") {
                for (path, value) in section.entries() {
                    let (t, h) = value.split_once('|').unwrap_or((value, ""));
                    out.add_file(path, t, h);
                }
            } else if name.eq_ignore_ascii_case("TexLists") {
                for (addr, value) in section.entries() {
                    let va = u32::from_str_radix(addr, 16).map_err(|_| {
                        SplitError::Config(format!("bad texlist address '{}'", addr))
                    })?;
                    let (export, index) = match value.split_once(',') {
                        Some((e, i)) => (e, Some(parse_index(i)?)),
                        None => (value, None),
                    };
                    out.register_texlist(va, export, index);
                }
            } else if name.starts_with("DataItem") {
                out.add_data_item(DataItem {
                    data_type: section.get("Type").unwrap_or_default().to_string(),
                    export: section.get("Export").unwrap_or_default().to_string(),
                    filename: section.get("Filename").unwrap_or_default().to_string(),
                    hash: section.get("MD5Hash").unwrap_or_default().to_string(),
                });
            } else if name.starts_with("Item") {
                out.add_item(ItemInfo {
                    export: section.get("Export").unwrap_or_default().to_string(),
                    index: section.get("Index").map(parse_index).transpose()?,
                    field: section.get("Field").map(str::to_string),
                    label: section.get("Label").unwrap_or_default().to_string(),
                });
            }
        }
        Ok(out)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_ini().to_string()).map_err(|e| SplitError::io(path, e))
    }
}
