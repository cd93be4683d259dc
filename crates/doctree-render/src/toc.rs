//! Table-of-contents synthesis.

use doctree::{Attributes, Element, ElementKind};

/// One heading registered during the walk.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TocEntry {
    /// Heading level (1-6).
    pub level: u8,
    /// Anchor id of the heading.
    pub id: String,
    /// The heading's inline content.
    pub content: Vec<Element>,
}

/// Build a nested outline from a flat, document-ordered heading list.
///
/// Each entry becomes a list item holding a transparent paragraph
/// (a link to `#id` wrapping the heading's inline content) plus a
/// nested list placeholder. The stack-based build handles skipped
/// levels, and placeholders that never gain a child are dropped so
/// the result never contains an empty list container.
#[must_use]
pub fn synthesize(entries: &[TocEntry], kind: &ElementKind, attrs: Attributes) -> Element {
    let mut sections = Element::new(kind.clone());
    sections.attrs = attrs;
    if !sections.attrs.contains("id") {
        sections.attrs.insert("id", "markdown-toc");
    }

    // Stack of open list items, one per level currently on the path.
    // Items attach to their parent when popped, so earlier siblings
    // are already in place by the time their parent closes.
    let mut stack: Vec<Element> = Vec::new();
    for entry in entries {
        let link = Element::new(ElementKind::A)
            .with_attr("href", format!("#{}", entry.id))
            .with_children(entry.content.iter().cloned());
        let mut item = Element::new(ElementKind::Li)
            .with_child(Element::new(ElementKind::P).transparent().with_child(link))
            .with_child(Element::new(kind.clone()));
        item.opts.level = Some(entry.level);

        while stack
            .last()
            .is_some_and(|top| top.opts.level >= Some(entry.level))
        {
            close_item(&mut stack, &mut sections);
        }
        stack.push(item);
    }
    while !stack.is_empty() {
        close_item(&mut stack, &mut sections);
    }
    sections
}

/// Pop the top item, trim its unused nested-list placeholder and
/// attach it to the new stack top (or the root container).
fn close_item(stack: &mut Vec<Element>, sections: &mut Element) {
    let Some(mut item) = stack.pop() else {
        return;
    };
    if item.children.last().is_some_and(|l| l.children.is_empty()) {
        item.children.pop();
    }
    match stack.last_mut() {
        Some(top) => {
            if let Some(nested) = top.children.last_mut() {
                nested.children.push(item);
            }
        }
        None => sections.children.push(item),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doctree::Value;
    use pretty_assertions::assert_eq;

    fn text_entry(level: u8, id: &str, text: &str) -> TocEntry {
        TocEntry {
            level,
            id: id.to_owned(),
            content: vec![Element::new(ElementKind::Text).with_value(Value::Text(text.to_owned()))],
        }
    }

    fn assert_no_empty_lists(el: &Element) {
        if el.kind.is_list() {
            assert!(!el.children.is_empty(), "empty list container in TOC");
        }
        for child in &el.children {
            assert_no_empty_lists(child);
        }
    }

    #[test]
    fn test_levels_1_2_2_1() {
        let entries = vec![
            text_entry(1, "a", "A"),
            text_entry(2, "b", "B"),
            text_entry(2, "c", "C"),
            text_entry(1, "d", "D"),
        ];
        let toc = synthesize(&entries, &ElementKind::Ul, Attributes::new());

        // Two top-level items; the first has one nested list with two items.
        assert_eq!(toc.children.len(), 2);
        let first = &toc.children[0];
        assert_eq!(first.children.len(), 2);
        assert_eq!(first.children[1].kind, ElementKind::Ul);
        assert_eq!(first.children[1].children.len(), 2);
        let second = &toc.children[1];
        assert_eq!(second.children.len(), 1);
        assert_no_empty_lists(&toc);
    }

    #[test]
    fn test_skipped_levels() {
        let entries = vec![
            text_entry(1, "a", "A"),
            text_entry(3, "b", "B"),
            text_entry(2, "c", "C"),
        ];
        let toc = synthesize(&entries, &ElementKind::Ul, Attributes::new());
        assert_eq!(toc.children.len(), 1);
        let top = &toc.children[0];
        // Both deeper headings nest under the level-1 item.
        assert_eq!(top.children[1].children.len(), 2);
        assert_no_empty_lists(&toc);
    }

    #[test]
    fn test_default_id() {
        let toc = synthesize(&[], &ElementKind::Ol, Attributes::new());
        assert_eq!(toc.attr("id"), Some("markdown-toc"));
        assert!(toc.children.is_empty());

        let mut attrs = Attributes::new();
        attrs.insert("id", "outline");
        let toc = synthesize(&[], &ElementKind::Ol, attrs);
        assert_eq!(toc.attr("id"), Some("outline"));
    }

    #[test]
    fn test_item_wraps_transparent_paragraph_link() {
        let entries = vec![text_entry(2, "sec", "Sec")];
        let toc = synthesize(&entries, &ElementKind::Ul, Attributes::new());
        let item = &toc.children[0];
        let para = &item.children[0];
        assert_eq!(para.kind, ElementKind::P);
        assert!(para.opts.transparent);
        let link = &para.children[0];
        assert_eq!(link.kind, ElementKind::A);
        assert_eq!(link.attr("href"), Some("#sec"));
    }
}
