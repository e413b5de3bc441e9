//! Run summary reported at the end of an indexing run.

use std::fmt;

/// Ordered list of human-readable labels and result strings.
///
/// Produced once per run and only printed; entries keep insertion order and a
/// label that is pushed again replaces the earlier value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    entries: Vec<(String, String)>,
}

impl RunSummary {
    /// Create an empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry.
    pub fn push(&mut self, label: impl Into<String>, value: impl Into<String>) {
        let label = label.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((label, value)),
        }
    }

    /// Look up the value recorded under a label.
    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(l, v)| (l.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, value) in &self.entries {
            writeln!(f, "{}={}", label, value)?;
        }
        Ok(())
    }
}
