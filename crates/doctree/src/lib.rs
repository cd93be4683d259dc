//! Generic document tree model.
//!
//! One [`Element`] type represents every node a parser can produce;
//! a [`Document`] bundles the tree with options, parser lookup tables
//! and the warning log. Rendering lives in the `doctree-render`
//! crate.
//!
//! # Example
//!
//! ```
//! use doctree::{Category, Document, Element, ElementKind};
//!
//! let tree = Element::new(ElementKind::Root)
//!     .with_category(Category::Block)
//!     .with_child(
//!         Element::new(ElementKind::P)
//!             .with_category(Category::Block)
//!             .with_child(Element::text("Hello")),
//!     );
//! let doc = Document::new(tree);
//! assert!(doc.warnings.is_empty());
//! ```

mod attributes;
mod document;
mod element;
mod options;

pub use attributes::Attributes;
pub use document::{Document, LinkDef, ParseInfos};
pub use element::{
    Alignment, Category, Element, ElementKind, ElementOpts, ParseMode, QuoteKind, TypographicSym,
    Value,
};
pub use options::{HighlightSettings, Options};
