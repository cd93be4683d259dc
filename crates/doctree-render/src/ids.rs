//! Heading id generation.

use std::collections::HashSet;

/// Convert heading text to an anchor id.
///
/// Lowercases the text, collapses every run of non-alphanumeric
/// characters to a single dash and trims leading/trailing dashes.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut pending_dash = false;
    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            if pending_dash && !result.is_empty() {
                result.push('-');
            }
            pending_dash = false;
            result.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    result
}

/// Per-call unique id allocator.
///
/// Seeded with the ids assigned explicitly in the source so generated
/// ids never collide with them. Lives for one render call; the shared
/// document is never mutated.
#[derive(Debug)]
pub struct IdGenerator {
    used: HashSet<String>,
}

impl IdGenerator {
    /// Create a generator seeded with already-taken ids.
    #[must_use]
    pub fn new(taken: &HashSet<String>) -> Self {
        Self {
            used: taken.clone(),
        }
    }

    /// Generate a unique id for the given heading text and register it.
    pub fn generate(&mut self, text: &str) -> String {
        let base = slugify(text);
        let base = if base.is_empty() {
            "section".to_owned()
        } else {
            base
        };
        let mut id = base.clone();
        let mut n = 0usize;
        while self.used.contains(&id) {
            n += 1;
            id = format!("{base}-{n}");
        }
        self.used.insert(id.clone());
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("What's New?"), "what-s-new");
        assert_eq!(slugify("  Spaces  "), "spaces");
        assert_eq!(slugify("Multiple   Spaces"), "multiple-spaces");
        assert_eq!(slugify("kebab-case"), "kebab-case");
        assert_eq!(slugify("Ünïcode"), "ünïcode");
    }

    #[test]
    fn test_duplicate_ids_get_suffixes() {
        let mut idgen = IdGenerator::new(&HashSet::new());
        assert_eq!(idgen.generate("Foo"), "foo");
        assert_eq!(idgen.generate("Foo"), "foo-1");
        assert_eq!(idgen.generate("Foo"), "foo-2");
    }

    #[test]
    fn test_seeded_ids_are_taken() {
        let mut taken = HashSet::new();
        taken.insert("intro".to_owned());
        let mut idgen = IdGenerator::new(&taken);
        assert_eq!(idgen.generate("Intro"), "intro-1");
    }

    #[test]
    fn test_empty_text_falls_back() {
        let mut idgen = IdGenerator::new(&HashSet::new());
        assert_eq!(idgen.generate("!!!"), "section");
        assert_eq!(idgen.generate(""), "section-1");
    }
}
