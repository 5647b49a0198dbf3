//! Ordered ini documents.
//!
//! Used both for the project file that drives a split and for every text
//! artifact the split writes (manifest, info tables, cameras). Order of
//! sections and keys is preserved on parse and on write so output is
//! reproducible.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IniError {
    #[error("line {line}: expected 'key=value', got '{content}'")]
    MalformedLine { line: usize, content: String },

    #[error("line {line}: unterminated section header")]
    UnterminatedSection { line: usize },

    #[error("line {line}: duplicate section [{name}]")]
    DuplicateSection { line: usize, name: String },
}

pub type Result<T> = std::result::Result<T, IniError>;

/// One `[name]` block with its keys in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniSection {
    name: String,
    entries: Vec<(String, String)>,
}

impl IniSection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Case-insensitive lookup
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Set a key, replacing an existing value in place
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&key))
        {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Global keys followed by ordered sections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    globals: IniSection,
    sections: Vec<IniSection>,
}

impl IniDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn globals(&self) -> &IniSection {
        &self.globals
    }

    pub fn globals_mut(&mut self) -> &mut IniSection {
        &mut self.globals
    }

    pub fn sections(&self) -> &[IniSection] {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&IniSection> {
        self.sections
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Get a section, appending an empty one if it does not exist yet
    pub fn section_mut(&mut self, name: &str) -> &mut IniSection {
        let idx = match self
            .sections
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(name))
        {
            Some(idx) => idx,
            None => {
                self.sections.push(IniSection::new(name));
                self.sections.len() - 1
            }
        };
        &mut self.sections[idx]
    }

    pub fn push_section(&mut self, section: IniSection) {
        self.sections.push(section);
    }
}

/// Parse ini text.
///
/// Lines starting with `;` or `#` are comments. Keys before the first
/// section header are globals. Whitespace around keys and values is
/// trimmed.
pub fn parse(text: &str) -> Result<IniDocument> {
    let mut doc = IniDocument::new();
    let mut current: Option<IniSection> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if let Some(rest) = line.strip_prefix('[') {
            let name = rest
                .strip_suffix(']')
                .ok_or(IniError::UnterminatedSection { line: line_no })?
                .trim();
            if let Some(done) = current.take() {
                doc.sections.push(done);
            }
            if doc.section(name).is_some() {
                return Err(IniError::DuplicateSection {
                    line: line_no,
                    name: name.to_string(),
                });
            }
            current = Some(IniSection::new(name));
            continue;
        }

        let (key, value) = line.split_once('=').ok_or_else(|| IniError::MalformedLine {
            line: line_no,
            content: line.to_string(),
        })?;
        let target = match current.as_mut() {
            Some(section) => section,
            None => &mut doc.globals,
        };
        target.set(key.trim(), value.trim());
    }

    if let Some(done) = current {
        doc.sections.push(done);
    }
    Ok(doc)
}

impl fmt::Display for IniDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (k, v) in self.globals.entries() {
            writeln!(f, "{}={}", k, v)?;
        }
        let mut first = self.globals.is_empty();
        for section in &self.sections {
            if !first {
                writeln!(f)?;
            }
            first = false;
            writeln!(f, "[{}]", section.name)?;
            for (k, v) in section.entries() {
                writeln!(f, "{}={}", k, v)?;
            }
        }
        Ok(())
    }
}
