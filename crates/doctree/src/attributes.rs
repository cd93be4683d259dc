//! Insertion-ordered element attributes.

/// Attribute map that preserves insertion order.
///
/// Keys are unique: inserting an existing key replaces its value in
/// place instead of moving it to the end. Lookups are linear, which is
/// fine for the handful of attributes real elements carry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    /// Create an empty attribute map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an attribute value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Check whether a key is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert an attribute. An existing key keeps its position and
    /// gets the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Remove an attribute, returning its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    /// Iterate over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (k, v) in iter {
            attrs.insert(k, v);
        }
        attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insertion_order_preserved() {
        let mut attrs = Attributes::new();
        attrs.insert("href", "https://example.com");
        attrs.insert("title", "Example");
        attrs.insert("class", "external");

        let keys: Vec<&str> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["href", "title", "class"]);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut attrs = Attributes::new();
        attrs.insert("class", "a");
        attrs.insert("id", "x");
        attrs.insert("class", "b");

        let entries: Vec<(&str, &str)> = attrs.iter().collect();
        assert_eq!(entries, vec![("class", "b"), ("id", "x")]);
    }

    #[test]
    fn test_remove() {
        let mut attrs = Attributes::new();
        attrs.insert("lang", "rust");
        assert_eq!(attrs.remove("lang"), Some("rust".to_owned()));
        assert_eq!(attrs.remove("lang"), None);
        assert!(attrs.is_empty());
    }
}
