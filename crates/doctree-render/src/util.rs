//! Shared text helpers used by both renderers.

use std::fmt::Write;

use doctree::{Element, Value};

/// Check whether the text after a `&` spells a character reference
/// (`#?\w+;`), in which case the ampersand is left alone.
fn starts_entity(rest: &str) -> bool {
    let rest = rest.strip_prefix('#').unwrap_or(rest);
    let mut seen_word = false;
    for c in rest.chars() {
        if c == ';' {
            return seen_word;
        }
        if c.is_ascii_alphanumeric() || c == '_' {
            seen_word = true;
        } else {
            return false;
        }
    }
    false
}

fn escape(s: &str, quotes: bool) -> String {
    let mut result = String::with_capacity(s.len());
    for (i, c) in s.char_indices() {
        match c {
            '&' if !starts_entity(&s[i + 1..]) => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' if quotes => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape HTML text content (`&`, `<`, `>`). Existing character
/// references are not escaped twice.
#[must_use]
pub fn escape_text(s: &str) -> String {
    escape(s, false)
}

/// Escape an HTML attribute value (adds `"` to the text escapes).
#[must_use]
pub fn escape_attr(s: &str) -> String {
    escape(s, true)
}

/// Serialize an element's attributes as ` key="value"` pairs in
/// insertion order.
#[must_use]
pub fn html_attributes(el: &Element) -> String {
    let mut out = String::new();
    for (key, value) in el.attrs.iter() {
        let _ = write!(out, " {key}=\"{}\"", escape_attr(value));
    }
    out
}

/// Resolve an entity to output text: the original source spelling when
/// the parser recorded one, otherwise a numeric character reference.
#[must_use]
pub fn entity_to_str(codepoint: u32, original: Option<&str>) -> String {
    match original {
        Some(orig) => orig.to_owned(),
        None => format!("&#{codepoint};"),
    }
}

/// Obfuscate a mail address (or any text) by turning every ASCII
/// character into a decimal entity. Non-ASCII characters pass through
/// unchanged, so the original encoding is preserved.
#[must_use]
pub fn obfuscate(text: &str) -> String {
    let mut result = String::new();
    for c in text.chars() {
        if c.is_ascii() {
            let _ = write!(result, "&#{:03};", c as u32);
        } else {
            result.push(c);
        }
    }
    result
}

/// Collect the plain text of an element subtree.
///
/// Used for heading ids when the parser did not record a raw-text
/// option.
#[must_use]
pub fn plain_text(el: &Element) -> String {
    let mut out = String::new();
    collect_text(el, &mut out);
    out
}

fn collect_text(el: &Element, out: &mut String) {
    if let Some(Value::Text(s)) = &el.value {
        out.push_str(s);
    }
    for child in &el.children {
        collect_text(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doctree::ElementKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a < b & c > d"), "a &lt; b &amp; c &gt; d");
        assert_eq!(escape_text(r#"say "hi""#), r#"say "hi""#);
    }

    #[test]
    fn test_escape_attr() {
        assert_eq!(escape_attr(r#"a "b" & c"#), "a &quot;b&quot; &amp; c");
    }

    #[test]
    fn test_html_attributes_order() {
        let el = Element::new(ElementKind::A)
            .with_attr("href", "https://example.com?a=1&b=2")
            .with_attr("title", r#"An "example""#);
        assert_eq!(
            html_attributes(&el),
            r#" href="https://example.com?a=1&amp;b=2" title="An &quot;example&quot;""#
        );
    }

    #[test]
    fn test_entity_to_str() {
        assert_eq!(entity_to_str(8212, None), "&#8212;");
        assert_eq!(entity_to_str(228, Some("&auml;")), "&auml;");
    }

    #[test]
    fn test_obfuscate_encodes_ascii_only() {
        assert_eq!(obfuscate("ab"), "&#097;&#098;");
        assert_eq!(obfuscate("ä"), "ä");
        assert_eq!(obfuscate("a@ä"), "&#097;&#064;ä");
    }

    #[test]
    fn test_plain_text() {
        let el = Element::new(ElementKind::Header)
            .with_child(Element::text("Install "))
            .with_child(Element::new(ElementKind::Em).with_child(Element::text("now")));
        assert_eq!(plain_text(&el), "Install now");
    }
}
