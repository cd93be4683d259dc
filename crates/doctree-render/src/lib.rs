//! Rendering engine for [`doctree`] documents.
//!
//! One parsed [`Document`] renders to either of two formats: an HTML
//! fragment via [`to_html`], or markdown that parses back to an
//! equivalent tree via [`to_markdown`]. Both renderers walk the same
//! element tree through the [`Render`] trait and never mutate it, so
//! a document can be rendered repeatedly, to several formats, with
//! identical results.
//!
//! ```
//! use doctree::{Category, Document, Element, ElementKind};
//!
//! let tree = Element::new(ElementKind::Root)
//!     .with_category(Category::Block)
//!     .with_child(
//!         Element::new(ElementKind::P)
//!             .with_category(Category::Block)
//!             .with_child(Element::text("Hello!")),
//!     );
//! let mut doc = Document::new(tree);
//! let html = doctree_render::to_html(&mut doc)?;
//! assert_eq!(html, "<p>Hello!</p>\n");
//! # Ok::<(), doctree_render::RenderError>(())
//! ```

mod error;
mod highlight;
mod html;
mod ids;
mod markdown;
mod refs;
mod render;
mod toc;
mod util;

pub use error::RenderError;
pub use highlight::Highlighter;
pub use html::HtmlRenderer;
pub use ids::{IdGenerator, slugify};
pub use markdown::MarkdownRenderer;
pub use render::{Render, Scope};
pub use toc::TocEntry;
pub use util::{escape_attr, escape_text, html_attributes};

use doctree::Document;

/// Render a document to an HTML fragment.
///
/// Warnings raised during the render are appended to the document's
/// warning log.
///
/// # Errors
///
/// Returns [`RenderError::StructuralViolation`] when a span element
/// holds block-level children.
pub fn to_html(doc: &mut Document) -> Result<String, RenderError> {
    to_html_with(doc, None)
}

/// Render a document to HTML with an optional syntax highlighter for
/// code blocks and code spans.
///
/// # Errors
///
/// Returns [`RenderError::StructuralViolation`] when a span element
/// holds block-level children.
pub fn to_html_with(
    doc: &mut Document,
    highlighter: Option<&dyn Highlighter>,
) -> Result<String, RenderError> {
    let (output, warnings) =
        HtmlRenderer::new(&doc.options, &doc.parse_infos, highlighter).render(&doc.tree)?;
    doc.warnings.extend(warnings);
    Ok(output)
}

/// Render a document back to markdown.
///
/// Warnings raised during the render are appended to the document's
/// warning log.
///
/// # Errors
///
/// Returns [`RenderError::StructuralViolation`] when a span element
/// holds block-level children.
pub fn to_markdown(doc: &mut Document) -> Result<String, RenderError> {
    let (output, warnings) =
        MarkdownRenderer::new(&doc.options, &doc.parse_infos).render(&doc.tree)?;
    doc.warnings.extend(warnings);
    Ok(output)
}
