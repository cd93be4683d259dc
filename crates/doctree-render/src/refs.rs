//! Ordered, key-deduplicated reference accumulators.

use std::collections::HashMap;

/// An insertion-ordered sequence with by-key dedup.
///
/// The first occurrence of a key fixes its position (and therefore
/// its number/index); later occurrences reuse it. Backs footnote
/// numbering, markdown link references and abbreviation collection.
#[derive(Debug)]
pub struct RefList<T> {
    entries: Vec<(String, T)>,
    index: HashMap<String, usize>,
}

impl<T> Default for RefList<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> RefList<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reference. Returns the zero-based position of the key;
    /// `make` is only called for the first occurrence.
    pub fn insert_with(&mut self, key: &str, make: impl FnOnce() -> T) -> usize {
        if let Some(&idx) = self.index.get(key) {
            return idx;
        }
        let idx = self.entries.len();
        self.entries.push((key.to_owned(), make()));
        self.index.insert(key.to_owned(), idx);
        idx
    }

    /// Position of a key, if it was recorded.
    #[must_use]
    pub fn position(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_first_occurrence_fixes_position() {
        let mut refs = RefList::new();
        assert_eq!(refs.insert_with("a", || 1), 0);
        assert_eq!(refs.insert_with("b", || 2), 1);
        assert_eq!(refs.insert_with("a", || 99), 0);
        assert_eq!(refs.len(), 2);

        let entries: Vec<(&str, &i32)> = refs.iter().collect();
        assert_eq!(entries, vec![("a", &1), ("b", &2)]);
    }

    #[test]
    fn test_make_called_once() {
        let mut calls = 0;
        let mut refs = RefList::new();
        refs.insert_with("x", || {
            calls += 1;
        });
        refs.insert_with("x", || {
            calls += 1;
        });
        assert_eq!(calls, 1);
    }
}
