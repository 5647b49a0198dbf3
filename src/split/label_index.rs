//! Labels already emitted during a run.

use std::collections::HashSet;

use crate::ninja::LabelSet;

/// Growing set of emitted labels. The first directive to reach a label owns
/// its emission; later directives see it here and skip writing.
#[derive(Debug, Default)]
pub struct LabelIndex {
    seen: HashSet<String>,
}

impl LabelIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.seen.contains(label)
    }

    /// True when the record's own label has not been emitted yet
    pub fn should_emit(&self, set: &LabelSet) -> bool {
        set.primary().is_some_and(|p| !self.seen.contains(p))
    }

    /// Mark every label of `set` as emitted
    pub fn claim(&mut self, set: &LabelSet) {
        for l in set.iter() {
            if !self.seen.contains(l) {
                self.seen.insert(l.to_string());
            }
        }
    }

    /// Claim `set` if its primary label is new; returns whether it was
    pub fn admit(&mut self, set: &LabelSet) -> bool {
        if !self.should_emit(set) {
            return false;
        }
        self.claim(set);
        true
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
