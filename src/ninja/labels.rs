//! Ordered label closures.

use std::collections::HashSet;

/// Labels reachable from a record, in discovery order, without repeats.
///
/// The first label is the record's own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSet {
    order: Vec<String>,
    members: HashSet<String>,
}

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a label; returns false if it was already present
    pub fn insert(&mut self, label: impl Into<String>) -> bool {
        let label = label.into();
        if self.members.contains(&label) {
            return false;
        }
        self.members.insert(label.clone());
        self.order.push(label);
        true
    }

    pub fn extend_from(&mut self, other: &LabelSet) {
        for l in other.iter() {
            self.insert(l);
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.members.contains(label)
    }

    /// The record's own label
    pub fn primary(&self) -> Option<&str> {
        self.order.first().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.order.clone()
    }
}

impl<S: Into<String>> FromIterator<S> for LabelSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = LabelSet::new();
        for l in iter {
            set.insert(l);
        }
        set
    }
}
