//! The document wrapper around one element tree.

use std::collections::{HashMap, HashSet};

use crate::element::Element;
use crate::options::Options;

/// A link definition collected by the parser.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkDef {
    pub url: String,
    pub title: Option<String>,
}

/// Parser-populated lookup tables consumed by the renderers.
///
/// Duplicate definitions are a parser concern: the tables hold one
/// entry per name, first definition wins.
#[derive(Clone, Debug, Default)]
pub struct ParseInfos {
    /// Footnote name to definition content.
    pub footnotes: HashMap<String, Element>,
    /// Link name to definition.
    pub links: HashMap<String, LinkDef>,
    /// Abbreviation text to title.
    pub abbreviations: HashMap<String, String>,
    /// Heading ids assigned explicitly in the source. Generated ids
    /// must not collide with these.
    pub heading_ids: HashSet<String>,
    /// Encoding tag of the source text, when known.
    pub encoding: Option<String>,
}

/// One parsed document: the element tree plus everything renderers
/// need around it.
///
/// The tree is built once by a parser and is read-only afterwards.
/// Renderers may append to `warnings`; they never touch `tree`,
/// `options` or `parse_infos`.
#[derive(Clone, Debug)]
pub struct Document {
    /// Root element of the tree.
    pub tree: Element,
    /// Rendering options.
    pub options: Options,
    /// Warning log, filled during parsing and rendering. Append-only,
    /// persists across render calls.
    pub warnings: Vec<String>,
    /// Parser lookup tables.
    pub parse_infos: ParseInfos,
}

impl Document {
    /// Wrap a parsed tree with default options.
    #[must_use]
    pub fn new(tree: Element) -> Self {
        Self::with_options(tree, Options::default())
    }

    /// Wrap a parsed tree with the given options.
    #[must_use]
    pub fn with_options(tree: Element, options: Options) -> Self {
        Self {
            tree,
            options,
            warnings: Vec::new(),
            parse_infos: ParseInfos::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Category, ElementKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_warnings_persist() {
        let root = Element::new(ElementKind::Root).with_category(Category::Block);
        let mut doc = Document::new(root);
        doc.warnings.push("first".to_owned());
        doc.warnings.push("second".to_owned());
        assert_eq!(doc.warnings, vec!["first", "second"]);
    }
}
