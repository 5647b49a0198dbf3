//! Queued models and the animations that reference them.
//!
//! Models are not written while directives run. They are queued here so
//! later action arrays can attach animation paths, then consolidated once
//! all directives are done: a queued model whose root label appears inside
//! another queued model's label set is dropped, since that model already
//! carries it.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::debug;

use crate::ninja::{LabelSet, Model, ModelFormat};

/// A queued model file
#[derive(Debug, Clone)]
pub struct ModelAnimations {
    /// Output path relative to the project directory
    pub filename: PathBuf,
    /// Description written into the model file
    pub name: String,
    pub model: Model,
    pub format: ModelFormat,
    /// Animation paths relative to the model file's directory
    pub animations: Vec<String>,
    labels: LabelSet,
}

impl ModelAnimations {
    pub fn new(filename: PathBuf, name: impl Into<String>, model: Model, format: ModelFormat) -> Self {
        let labels = model.label_set();
        Self {
            filename,
            name: name.into(),
            model,
            format,
            animations: Vec::new(),
            labels,
        }
    }

    pub fn label(&self) -> &str {
        self.labels.primary().unwrap_or("")
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }
}

/// Queue keyed by model label; the first model queued under a label wins
#[derive(Debug, Default)]
pub struct ModelQueue {
    entries: Vec<ModelAnimations>,
    by_label: HashMap<String, usize>,
}

impl ModelQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a model; returns false if one with the same label is queued
    pub fn push(&mut self, entry: ModelAnimations) -> bool {
        if self.by_label.contains_key(entry.label()) {
            debug!(label = entry.label(), file = %entry.filename.display(), "Model already queued");
            return false;
        }
        self.by_label.insert(entry.label().to_string(), self.entries.len());
        self.entries.push(entry);
        true
    }

    pub fn get(&self, label: &str) -> Option<&ModelAnimations> {
        self.by_label.get(label).map(|&i| &self.entries[i])
    }

    pub fn get_mut(&mut self, label: &str) -> Option<&mut ModelAnimations> {
        match self.by_label.get(label) {
            Some(&i) => self.entries.get_mut(i),
            None => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every queued model embedded in another one.
    ///
    /// Walks from the most recently queued entry back to the second; each
    /// such entry removes every other entry whose root label it contains.
    /// Removed entries still take part as containers. Returns the
    /// survivors in queue order and the number removed.
    pub fn consolidate(self) -> (Vec<ModelAnimations>, usize) {
        let n = self.entries.len();
        let mut removed = vec![false; n];
        for u in (1..n).rev() {
            let container = self.entries[u].labels();
            for (j, other) in self.entries.iter().enumerate() {
                if j != u && !removed[j] && container.contains(other.label()) {
                    debug!(
                        removed = other.label(),
                        file = %other.filename.display(),
                        container = self.entries[u].label(),
                        "Model is embedded in a later model"
                    );
                    removed[j] = true;
                }
            }
        }

        let dropped = removed.iter().filter(|r| **r).count();
        let survivors = self
            .entries
            .into_iter()
            .zip(removed)
            .filter_map(|(e, r)| (!r).then_some(e))
            .collect();
        (survivors, dropped)
    }
}
