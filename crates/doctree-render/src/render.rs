//! The dispatch contract shared by every renderer.

use doctree::{Alignment, Element, ElementKind};

use crate::error::RenderError;

/// Read-only view of a node's surroundings during the walk.
///
/// `inner` rebuilds this for every child so handlers can look at their
/// parent and up to two following siblings when deciding on blank
/// lines, list tightness and separators. The raw-text flags carry the
/// markdown renderer's HTML passthrough state down the tree.
#[derive(Clone, Copy, Debug, Default)]
pub struct Scope<'a> {
    /// Current indentation column.
    pub indent: usize,
    /// Index of the element within its parent.
    pub index: usize,
    pub parent: Option<&'a Element>,
    pub prev: Option<&'a Element>,
    pub next: Option<&'a Element>,
    pub next_next: Option<&'a Element>,
    /// Column alignments of the enclosing table.
    pub alignment: &'a [Alignment],
    /// Render text children verbatim (inside raw HTML).
    pub raw_text: bool,
    /// Forced verbatim text (script/pre/code contents).
    pub force_raw_text: bool,
    /// Verbatim text inherited from an enclosing raw HTML block.
    pub block_raw_text: bool,
}

impl<'a> Scope<'a> {
    /// Scope for a tree root or a synthesized subtree.
    #[must_use]
    pub fn with_indent(indent: usize) -> Self {
        Self {
            indent,
            ..Self::default()
        }
    }
}

/// Contract implemented by every renderer.
///
/// `render_element` dispatches on the element kind; the provided
/// `inner` walks the children in order, updating the scope's sibling
/// lookahead and indent before each child. `inner` also enforces the
/// block-under-span invariant, the only condition that aborts a walk.
pub trait Render {
    /// Indentation unit added per nesting level.
    const INDENT: usize;

    /// Render one element to an output fragment.
    fn render_element(&mut self, el: &Element, scope: Scope<'_>) -> Result<String, RenderError>;

    /// Render the children of `el` in order.
    fn inner(&mut self, el: &Element, scope: Scope<'_>) -> Result<String, RenderError> {
        let child_indent = if el.kind == ElementKind::Root {
            scope.indent
        } else {
            scope.indent + Self::INDENT
        };
        let mut out = String::new();
        for (index, child) in el.children.iter().enumerate() {
            if child.is_block()
                && !el.is_block()
                && !el.opts.transparent
                && el.kind != ElementKind::HtmlElement
            {
                return Err(RenderError::StructuralViolation(el.kind.name().to_owned()));
            }
            let child_scope = Scope {
                indent: child_indent,
                index,
                parent: Some(el),
                prev: if index == 0 {
                    None
                } else {
                    el.children.get(index - 1)
                },
                next: el.children.get(index + 1),
                next_next: el.children.get(index + 2),
                alignment: scope.alignment,
                raw_text: scope.raw_text,
                force_raw_text: scope.force_raw_text,
                block_raw_text: scope.block_raw_text,
            };
            out.push_str(&self.render_element(child, child_scope)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doctree::Category;
    use pretty_assertions::assert_eq;

    struct NameWalker;

    impl Render for NameWalker {
        const INDENT: usize = 1;

        fn render_element(&mut self, el: &Element, scope: Scope<'_>) -> Result<String, RenderError> {
            let mut out = format!("{}:{};", el.kind.name(), scope.indent);
            out.push_str(&self.inner(el, scope)?);
            Ok(out)
        }
    }

    #[test]
    fn test_inner_indents_below_root() {
        let tree = Element::new(ElementKind::Root)
            .with_category(Category::Block)
            .with_child(
                Element::new(ElementKind::P)
                    .with_category(Category::Block)
                    .with_child(Element::text("x")),
            );
        let out = NameWalker.render_element(&tree, Scope::default()).unwrap();
        // Root children stay at the root indent, grandchildren get one unit.
        assert_eq!(out, "root:0;p:0;text:1;");
    }

    #[test]
    fn test_block_under_span_is_fatal() {
        let tree = Element::new(ElementKind::Em)
            .with_child(Element::new(ElementKind::P).with_category(Category::Block));
        let err = NameWalker.render_element(&tree, Scope::default());
        assert!(matches!(err, Err(RenderError::StructuralViolation(_))));
    }

    #[test]
    fn test_transparent_wrapper_may_hold_blocks() {
        let tree = Element::new(ElementKind::P)
            .transparent()
            .with_child(Element::new(ElementKind::P).with_category(Category::Block));
        assert!(NameWalker.render_element(&tree, Scope::default()).is_ok());
    }
}
