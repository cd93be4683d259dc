//! The generic element tree.
//!
//! A single [`Element`] type represents every node in a parsed
//! document: paragraphs, headers, emphasis, raw markup and so on. The
//! node kind is a closed enum, so renderers dispatch with an
//! exhaustive `match` and adding a kind forces every renderer to
//! address it at build time. [`ElementKind::Other`] is the escape
//! hatch for parsers that emit kinds this crate does not know; the
//! renderers skip such nodes with a warning.

use crate::attributes::Attributes;

/// Closed set of element kinds.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ElementKind {
    Root,
    Text,
    Blank,
    P,
    Header,
    Hr,
    Blockquote,
    Ul,
    Ol,
    Dl,
    Li,
    Dt,
    Dd,
    CodeBlock,
    Table,
    Thead,
    Tbody,
    Tfoot,
    Tr,
    Td,
    Th,
    A,
    Img,
    Em,
    Strong,
    CodeSpan,
    Footnote,
    Raw,
    Entity,
    TypographicSym,
    SmartQuote,
    Math,
    Abbreviation,
    Comment,
    Br,
    HtmlElement,
    XmlComment,
    XmlPi,
    HtmlDoctype,
    Summary,
    /// A kind outside the closed set. Renderers emit nothing for it
    /// and log a warning.
    Other(String),
}

impl ElementKind {
    /// Stable lowercase name, used in warnings and error messages.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Root => "root",
            Self::Text => "text",
            Self::Blank => "blank",
            Self::P => "p",
            Self::Header => "header",
            Self::Hr => "hr",
            Self::Blockquote => "blockquote",
            Self::Ul => "ul",
            Self::Ol => "ol",
            Self::Dl => "dl",
            Self::Li => "li",
            Self::Dt => "dt",
            Self::Dd => "dd",
            Self::CodeBlock => "codeblock",
            Self::Table => "table",
            Self::Thead => "thead",
            Self::Tbody => "tbody",
            Self::Tfoot => "tfoot",
            Self::Tr => "tr",
            Self::Td => "td",
            Self::Th => "th",
            Self::A => "a",
            Self::Img => "img",
            Self::Em => "em",
            Self::Strong => "strong",
            Self::CodeSpan => "codespan",
            Self::Footnote => "footnote",
            Self::Raw => "raw",
            Self::Entity => "entity",
            Self::TypographicSym => "typographic_sym",
            Self::SmartQuote => "smart_quote",
            Self::Math => "math",
            Self::Abbreviation => "abbreviation",
            Self::Comment => "comment",
            Self::Br => "br",
            Self::HtmlElement => "html_element",
            Self::XmlComment => "xml_comment",
            Self::XmlPi => "xml_pi",
            Self::HtmlDoctype => "html_doctype",
            Self::Summary => "summary",
            Self::Other(name) => name,
        }
    }

    /// Whether this kind is one of the list containers.
    #[must_use]
    pub fn is_list(&self) -> bool {
        matches!(self, Self::Ul | Self::Ol | Self::Dl)
    }
}

/// Block/span classification governing layout and whitespace handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Category {
    Block,
    Span,
}

/// Table column alignment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Alignment {
    #[default]
    Default,
    Left,
    Center,
    Right,
}

/// Parse mode recorded on HTML elements by the parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParseMode {
    Block,
    Span,
    Raw,
}

/// Typographic symbols recognized by the parsers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypographicSym {
    Mdash,
    Ndash,
    Hellip,
    Laquo,
    LaquoSpace,
    Raquo,
    RaquoSpace,
    Qdash,
    QdashSpace,
}

/// Smart quote variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QuoteKind {
    Lsquo,
    Rsquo,
    Ldquo,
    Rdquo,
}

impl QuoteKind {
    /// Entity name of the quote character.
    #[must_use]
    pub fn entity_name(self) -> &'static str {
        match self {
            Self::Lsquo => "lsquo",
            Self::Rsquo => "rsquo",
            Self::Ldquo => "ldquo",
            Self::Rdquo => "rdquo",
        }
    }

    /// Whether this is one of the double-quote variants.
    #[must_use]
    pub fn is_double(self) -> bool {
        matches!(self, Self::Ldquo | Self::Rdquo)
    }
}

/// Type-dependent element payload.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// Literal text, raw markup, a tag name, math source or similar.
    Text(String),
    /// A typographic symbol code.
    Symbol(TypographicSym),
    /// A smart quote code.
    Quote(QuoteKind),
    /// A character entity. `original` keeps the source spelling (for
    /// example `&amp;auml;` vs a numeric reference) when known.
    Entity {
        codepoint: u32,
        original: Option<String>,
    },
}

/// Open options attached to an element by the parser.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementOpts {
    /// Block/span category. Absent means span.
    pub category: Option<Category>,
    /// Heading level for `header` elements.
    pub level: Option<u8>,
    /// Column alignments for `table` elements.
    pub alignment: Vec<Alignment>,
    /// Footnote or abbreviation name.
    pub name: Option<String>,
    /// Parse mode for `html_element` nodes.
    pub parse_mode: Option<ParseMode>,
    /// Paragraphs that must not introduce their own block wrapping.
    pub transparent: bool,
    /// Plain text of a heading, used for id generation.
    pub raw_text: Option<String>,
    /// Attribute-list references attached to the element (the `toc`
    /// marker travels here).
    pub ial_refs: Vec<String>,
    /// Target-format filters on `raw` elements (empty = all formats).
    pub raw_kinds: Vec<String>,
}

/// A node of the document tree.
///
/// Children are exclusively owned by their parent, so the tree is
/// acyclic and finite by construction. The tree is read-only during
/// rendering; a renderer that needs to alter an element first takes a
/// deep copy via `clone()`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Element {
    pub kind: ElementKind,
    pub value: Option<Value>,
    pub attrs: Attributes,
    pub opts: ElementOpts,
    pub children: Vec<Element>,
}

impl Element {
    /// Create an element of the given kind with no payload.
    #[must_use]
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            value: None,
            attrs: Attributes::new(),
            opts: ElementOpts::default(),
            children: Vec::new(),
        }
    }

    /// Create a text node.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(ElementKind::Text).with_value(Value::Text(text.into()))
    }

    /// Set the payload.
    #[must_use]
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    /// Add an attribute.
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key, value);
        self
    }

    /// Append a child.
    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Append several children.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    /// Set the block/span category.
    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        self.opts.category = Some(category);
        self
    }

    /// Mark the element as a transparent wrapper.
    #[must_use]
    pub fn transparent(mut self) -> Self {
        self.opts.transparent = true;
        self
    }

    /// Effective category: absent means span.
    #[must_use]
    pub fn category(&self) -> Category {
        self.opts.category.unwrap_or(Category::Span)
    }

    /// Whether the element is in the block category.
    #[must_use]
    pub fn is_block(&self) -> bool {
        self.category() == Category::Block
    }

    /// Attribute lookup shorthand.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key)
    }

    /// Text payload, if the payload is textual.
    #[must_use]
    pub fn value_text(&self) -> Option<&str> {
        match &self.value {
            Some(Value::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Whether an attribute-list reference with the given name is
    /// attached to this element.
    #[must_use]
    pub fn has_ial_ref(&self, name: &str) -> bool {
        self.opts.ial_refs.iter().any(|r| r == name)
    }
}
