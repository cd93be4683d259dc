//! The markdown renderer.
//!
//! Produces markdown that parses back to an equivalent tree: residual
//! attributes become inline attribute lists, adjacent lists get an
//! explicit end marker and paragraph text is escaped so it cannot be
//! mistaken for structure.

use std::fmt::Write as _;
use std::sync::LazyLock;

use doctree::{
    Category, Element, ElementKind, Options, ParseInfos, ParseMode, TypographicSym, Value,
};
use regex::Regex;

use crate::error::RenderError;
use crate::refs::RefList;
use crate::render::{Render, Scope};
use crate::util::{entity_to_str, html_attributes};

/// Characters that would be parsed as markup when read back.
static ESCAPED_CHAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(\$\$|[\\*_`\[\]\{"'])|^[ ]{0,3}(:)"#).unwrap());

static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Line-start sequences a paragraph must not open with.
static FIRST_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:(#)|(\d+)\.|([+-]\s))").unwrap());

/// A second line of only `=` or `-` would turn the first into a
/// setext heading.
static SETEXT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[=-]+\s*$").unwrap());

const HTML_TAGS_WITH_BODY: [&str; 4] = ["div", "script", "iframe", "textarea"];

/// Renders one element tree back to markdown.
///
/// Link references, used footnotes and used abbreviations are
/// collected during the walk and flushed as definition blocks at the
/// end of the root.
pub struct MarkdownRenderer<'a> {
    options: &'a Options,
    infos: &'a ParseInfos,
    warnings: Vec<String>,
    linkrefs: RefList<Option<String>>,
    footnotes: RefList<Element>,
    abbrevs: RefList<()>,
}

impl<'a> MarkdownRenderer<'a> {
    #[must_use]
    pub fn new(options: &'a Options, infos: &'a ParseInfos) -> Self {
        Self {
            options,
            infos,
            warnings: Vec::new(),
            linkrefs: RefList::new(),
            footnotes: RefList::new(),
            abbrevs: RefList::new(),
        }
    }

    /// Render the tree, returning the output and the warnings raised
    /// along the way.
    pub fn render(mut self, tree: &Element) -> Result<(String, Vec<String>), RenderError> {
        let output = self.render_element(tree, Scope::default())?;
        Ok((output, self.warnings))
    }

    fn warn(&mut self, message: String) {
        tracing::warn!("{message}");
        self.warnings.push(message);
    }

    fn convert(&mut self, el: &Element, scope: Scope<'_>) -> Result<String, RenderError> {
        match &el.kind {
            ElementKind::Root => self.convert_root(el, scope),
            ElementKind::Text => Ok(convert_text(el, scope)),
            ElementKind::Blank => Ok(String::new()),
            ElementKind::P => self.convert_p(el, scope),
            ElementKind::Header => self.convert_header(el, scope),
            ElementKind::Hr => Ok("* * *\n".to_owned()),
            ElementKind::Blockquote => self.convert_blockquote(el, scope),
            ElementKind::Ul | ElementKind::Ol | ElementKind::Dl => self.convert_list(el, scope),
            ElementKind::Li => self.convert_li(el, scope),
            ElementKind::Dd => self.convert_dd(el, scope),
            ElementKind::Dt => Ok(self.inner(el, scope)? + "\n"),
            ElementKind::CodeBlock => Ok(convert_codeblock(el)),
            ElementKind::Table => self.convert_table(el, scope),
            ElementKind::Thead => self.convert_thead(el, scope),
            ElementKind::Tbody => self.convert_tbody(el, scope),
            ElementKind::Tfoot => Ok(format!("|{}\n{}", "=".repeat(10), self.inner(el, scope)?)),
            ElementKind::Tr => self.convert_tr(el, scope),
            ElementKind::Td | ElementKind::Th => {
                Ok(self.inner(el, scope)?.replace('|', "\\|"))
            }
            ElementKind::A => self.convert_a(el, scope),
            ElementKind::Img => Ok(convert_img(el)),
            ElementKind::Em => Ok(format!("*{}*", self.inner(el, scope)?)),
            ElementKind::Strong => Ok(format!("**{}**", self.inner(el, scope)?)),
            ElementKind::CodeSpan => Ok(convert_codespan(el)),
            ElementKind::Footnote => Ok(self.convert_footnote(el)),
            ElementKind::Raw => Ok(convert_raw(el, scope)),
            ElementKind::Entity => Ok(match &el.value {
                Some(Value::Entity {
                    codepoint,
                    original,
                }) => entity_to_str(*codepoint, original.as_deref()),
                _ => String::new(),
            }),
            ElementKind::TypographicSym => {
                let text = match &el.value {
                    Some(Value::Symbol(sym)) => typographic_sym_text(*sym),
                    _ => "",
                };
                Ok(text.to_owned())
            }
            ElementKind::SmartQuote => Ok(match &el.value {
                Some(Value::Quote(quote)) if quote.is_double() => "\"".to_owned(),
                _ => "'".to_owned(),
            }),
            ElementKind::Math => Ok(convert_math(el, scope)),
            ElementKind::Abbreviation => Ok(self.convert_abbreviation(el)),
            ElementKind::Comment => Ok(convert_comment(el)),
            ElementKind::Br => Ok("  \n".to_owned()),
            ElementKind::HtmlElement => self.convert_html_element(el, scope),
            ElementKind::XmlComment | ElementKind::XmlPi | ElementKind::HtmlDoctype => {
                Ok(convert_xml_comment(el, scope))
            }
            ElementKind::Summary | ElementKind::Other(_) => {
                self.warn(format!(
                    "element kind '{}' cannot be expressed in markdown, skipping",
                    el.kind.name()
                ));
                Ok(String::new())
            }
        }
    }

    fn convert_root(&mut self, el: &Element, scope: Scope<'_>) -> Result<String, RenderError> {
        let mut res = self.inner(el, scope)?;
        res.push_str(&self.create_link_defs());
        res.push_str(&self.create_footnote_defs()?);
        res.push_str(&self.create_abbrev_defs());
        Ok(res)
    }

    fn convert_p(&mut self, el: &Element, scope: Scope<'_>) -> Result<String, RenderError> {
        let width = self.options.line_width.saturating_sub(scope.indent).max(1);
        let text = self.inner(el, scope)?;
        let mut lines = reflow(text.trim(), width);
        if let Some(first) = lines.first_mut() {
            let escaped = FIRST_LINE_RE
                .replace(first, |caps: &regex::Captures<'_>| {
                    if let Some(m) = caps.get(1).or_else(|| caps.get(3)) {
                        format!("\\{}", m.as_str())
                    } else {
                        format!("{}\\.", &caps[2])
                    }
                })
                .into_owned();
            *first = escaped.replace('|', "\\|");
        }
        if let Some(second) = lines.get_mut(1)
            && SETEXT_RE.is_match(second)
        {
            second.insert(0, '\\');
        }
        Ok(lines.join("\n") + "\n")
    }

    fn convert_header(&mut self, el: &Element, scope: Scope<'_>) -> Result<String, RenderError> {
        let level = usize::from(el.opts.level.unwrap_or(1));
        let mut res = format!("{} {}", "#".repeat(level), self.inner(el, scope)?);
        if let Some(id) = el.attr("id") {
            let _ = write!(res, "   {{#{id}}}");
        }
        res.push('\n');
        Ok(res)
    }

    fn convert_blockquote(&mut self, el: &Element, scope: Scope<'_>) -> Result<String, RenderError> {
        let scope = Scope {
            indent: scope.indent + 2,
            ..scope
        };
        let text = self.inner(el, scope)?;
        let mut res = text
            .trim_end_matches('\n')
            .split('\n')
            .map(|line| format!("> {line}"))
            .collect::<Vec<_>>()
            .join("\n");
        res.push('\n');
        Ok(res)
    }

    fn convert_list(&mut self, el: &Element, scope: Scope<'_>) -> Result<String, RenderError> {
        let mut text = self.inner(el, scope)?;
        // Collapse the trailing blank run to a single newline.
        let trimmed = text.trim_end_matches('\n').len();
        if trimmed < text.len() {
            text.truncate(trimmed);
            text.push('\n');
        }
        Ok(text)
    }

    fn convert_li(&mut self, el: &Element, scope: Scope<'_>) -> Result<String, RenderError> {
        let first_is_codeblock = el
            .children
            .first()
            .is_some_and(|c| c.kind == ElementKind::CodeBlock);
        let (mut sym, width) = if scope.parent.is_some_and(|p| p.kind == ElementKind::Ul) {
            ("* ".to_owned(), if first_is_codeblock { 4 } else { 2 })
        } else {
            (format!("{:<4}", format!("{}.", scope.index + 1)), 4)
        };
        if let Some(ial) = self.ial_for_element(el) {
            sym.push_str(&ial);
            sym.push(' ');
        }
        let text = self.item_text(el, scope, width)?;

        if el
            .children
            .first()
            .is_some_and(|c| c.kind == ElementKind::P && !c.opts.transparent)
        {
            let mut res = format!("{sym}{text}");
            // A loose single-paragraph item closing a list that also
            // holds non-paragraph items needs an explicit end marker.
            if el.children.len() == 1
                && scope.next.is_none()
                && scope.parent.is_some_and(|p| {
                    p.children.len() == 1
                        || p.children
                            .iter()
                            .any(|c| c.children.first().is_none_or(|f| f.kind != ElementKind::P))
                })
            {
                res.push_str("^\n");
            }
            Ok(res)
        } else if first_is_codeblock {
            Ok(format!("{sym}\n    {text}"))
        } else {
            Ok(format!("{sym}{text}"))
        }
    }

    fn convert_dd(&mut self, el: &Element, scope: Scope<'_>) -> Result<String, RenderError> {
        let first_is_codeblock = el
            .children
            .first()
            .is_some_and(|c| c.kind == ElementKind::CodeBlock);
        let width = if first_is_codeblock { 4 } else { 2 };
        let mut sym = ": ".to_owned();
        if let Some(ial) = self.ial_for_element(el) {
            sym.push_str(&ial);
            sym.push(' ');
        }
        let mut text = self.item_text(el, scope, width)?;
        if text.ends_with("\n\n") && scope.next.is_some_and(|n| n.kind == ElementKind::Dd) {
            text.pop();
        }
        if !text.ends_with("\n\n") && scope.next.is_some_and(|n| n.kind == ElementKind::Dt) {
            text.push('\n');
        }

        if el
            .children
            .first()
            .is_some_and(|c| c.kind == ElementKind::P && !c.opts.transparent)
        {
            Ok(format!("\n{sym}{text}"))
        } else if first_is_codeblock {
            Ok(format!("{sym}\n    {text}"))
        } else {
            Ok(format!("{sym}{text}"))
        }
    }

    /// Render an item's children and indent every continuation line by
    /// the marker width.
    fn item_text(
        &mut self,
        el: &Element,
        scope: Scope<'_>,
        width: usize,
    ) -> Result<String, RenderError> {
        let scope = Scope {
            indent: scope.indent + width,
            ..scope
        };
        let text = self.inner(el, scope)?;
        let trailing: String = text.chars().rev().take_while(|c| *c == '\n').collect();
        let body = text.trim_end_matches('\n');
        let mut lines = body.split('\n');
        let first = lines.next().unwrap_or("");
        let mut out = first.to_owned();
        for line in lines {
            out.push('\n');
            out.push_str(&" ".repeat(width));
            out.push_str(line);
        }
        out.push_str(&trailing);
        Ok(out)
    }

    fn convert_html_element(
        &mut self,
        el: &Element,
        scope: Scope<'_>,
    ) -> Result<String, RenderError> {
        let tag = el.value_text().unwrap_or("").to_owned();
        // Block children that are not raw HTML force markdown
        // processing inside the element when read back.
        let markdown_attr = el.is_block()
            && el.children.iter().any(|c| {
                c.kind != ElementKind::HtmlElement
                    && (c.kind != ElementKind::P || !c.opts.transparent)
                    && c.is_block()
            });
        let mut inner_scope = scope;
        if matches!(tag.as_str(), "script" | "pre" | "code") {
            inner_scope.force_raw_text = true;
        }
        inner_scope.raw_text = inner_scope.force_raw_text
            || inner_scope.block_raw_text
            || (el.category() != Category::Span && !markdown_attr);
        if el.is_block() && inner_scope.raw_text {
            inner_scope.block_raw_text = true;
        }
        let res = self.inner(el, inner_scope)?;

        if el.category() == Category::Span {
            if !res.is_empty() || HTML_TAGS_WITH_BODY.contains(&tag.as_str()) {
                Ok(format!("<{tag}{}>{res}</{tag}>", html_attributes(el)))
            } else {
                Ok(format!("<{tag}{} />", html_attributes(el)))
            }
        } else {
            let mut output = format!("<{tag}{}", html_attributes(el));
            if markdown_attr {
                output.push_str(" markdown=\"1\"");
            }
            if !res.is_empty() && el.opts.parse_mode != Some(ParseMode::Block) {
                let _ = write!(output, ">{res}</{tag}>");
            } else if !res.is_empty() {
                let _ = write!(output, ">\n{res}</{tag}>");
            } else if HTML_TAGS_WITH_BODY.contains(&tag.as_str()) {
                let _ = write!(output, "></{tag}>");
            } else {
                output.push_str(" />");
            }
            if !inside_raw_html(scope) {
                output.push('\n');
            }
            Ok(output)
        }
    }

    fn convert_table(&mut self, el: &Element, scope: Scope<'_>) -> Result<String, RenderError> {
        let scope = Scope {
            alignment: &el.opts.alignment,
            ..scope
        };
        self.inner(el, scope)
    }

    fn convert_thead(&mut self, el: &Element, scope: Scope<'_>) -> Result<String, RenderError> {
        let rows = self.inner(el, scope)?;
        if scope
            .alignment
            .iter()
            .all(|a| *a == doctree::Alignment::Default)
        {
            return Ok(format!("{rows}|{}\n", "-".repeat(10)));
        }
        let markers: Vec<&str> = scope
            .alignment
            .iter()
            .map(|a| match a {
                doctree::Alignment::Left => ":-",
                doctree::Alignment::Right => "-:",
                doctree::Alignment::Center => ":-:",
                doctree::Alignment::Default => "-",
            })
            .collect();
        Ok(format!("{rows}| {}\n", markers.join(" ")))
    }

    fn convert_tbody(&mut self, el: &Element, scope: Scope<'_>) -> Result<String, RenderError> {
        let mut res = self.inner(el, scope)?;
        if scope.next.is_some_and(|n| n.kind == ElementKind::Tbody) {
            let _ = writeln!(res, "|{}", "-".repeat(10));
        }
        Ok(res)
    }

    fn convert_tr(&mut self, el: &Element, scope: Scope<'_>) -> Result<String, RenderError> {
        let mut cells = Vec::with_capacity(el.children.len());
        for child in &el.children {
            let child_scope = Scope {
                parent: Some(el),
                ..scope
            };
            cells.push(self.render_element(child, child_scope)?);
        }
        Ok(format!("| {} |\n", cells.join(" | ")))
    }

    fn convert_a(&mut self, el: &Element, scope: Scope<'_>) -> Result<String, RenderError> {
        let href = el.attr("href").unwrap_or("").to_owned();
        if href.is_empty() {
            return Ok(format!("[{}]()", self.inner(el, scope)?));
        }
        if href.starts_with("http") || href.starts_with("ftp") || href.contains(['(', ')']) {
            let title = el.attr("title").map(str::to_owned);
            let text = self.inner(el, scope)?;
            let index = self.linkrefs.insert_with(&href, || title) + 1;
            return Ok(format!("[{text}][{index}]"));
        }
        let title = match el.attr("title") {
            Some(title) if !title.is_empty() => {
                format!(" \"{}\"", title.replace('"', "&quot;"))
            }
            _ => String::new(),
        };
        Ok(format!("[{}]({href}{title})", self.inner(el, scope)?))
    }

    fn convert_footnote(&mut self, el: &Element) -> String {
        let Some(name) = el.opts.name.clone() else {
            self.warn("footnote marker without a name, skipping".to_owned());
            return String::new();
        };
        let infos = self.infos;
        match infos.footnotes.get(&name) {
            Some(definition) => {
                self.footnotes.insert_with(&name, || definition.clone());
            }
            None => self.warn(format!("footnote '{name}' has no definition")),
        }
        format!("[^{name}]")
    }

    fn convert_abbreviation(&mut self, el: &Element) -> String {
        let text = el.value_text().unwrap_or("").to_owned();
        if self.infos.abbreviations.contains_key(&text) {
            self.abbrevs.insert_with(&text, || ());
        } else {
            self.warn(format!("abbreviation '{text}' has no definition"));
        }
        text
    }

    fn create_link_defs(&self) -> String {
        let mut res = String::new();
        if self.linkrefs.is_empty() {
            return res;
        }
        res.push_str("\n\n");
        for (i, (href, title)) in self.linkrefs.iter().enumerate() {
            let title = match title {
                Some(title) => format!("\"{}\"", title.replace('"', "&quot;")),
                None => String::new(),
            };
            let _ = writeln!(res, "[{}]: {href} {title}", i + 1);
        }
        res
    }

    fn create_footnote_defs(&mut self) -> Result<String, RenderError> {
        let entries: Vec<(String, Element)> = self
            .footnotes
            .iter()
            .map(|(name, definition)| (name.to_owned(), definition.clone()))
            .collect();
        let mut res = String::new();
        for (name, definition) in entries {
            let _ = writeln!(res, "[^{name}]:");
            let content = self.inner(&definition, Scope::default())?;
            let lines: Vec<String> = content
                .trim_end_matches('\n')
                .split('\n')
                .map(|line| format!("    {line}"))
                .collect();
            res.push_str(&lines.join("\n"));
            res.push_str("\n\n");
        }
        Ok(res)
    }

    fn create_abbrev_defs(&self) -> String {
        let mut res = String::new();
        for (name, ()) in self.abbrevs.iter() {
            if let Some(text) = self.infos.abbreviations.get(name) {
                let _ = writeln!(res, "*[{name}]: {text}");
            }
        }
        res
    }

    /// Inline attribute list for the element's residual attributes,
    /// or `None` when there is nothing to carry over.
    fn ial_for_element(&self, el: &Element) -> Option<String> {
        if !self.options.attribute_lists {
            return None;
        }
        let mut res = String::new();
        for (key, value) in el.attrs.iter() {
            if matches!(el.kind, ElementKind::A | ElementKind::Img)
                && matches!(key, "href" | "src" | "alt" | "title")
            {
                continue;
            }
            if el.kind == ElementKind::Header && key == "id" {
                continue;
            }
            if key == "class" {
                for word in value.split_whitespace() {
                    let _ = write!(res, " .{word}");
                }
            } else if key == "id" {
                let _ = write!(res, " #{value}");
            } else {
                let _ = write!(res, " {key}=\"{value}\"");
            }
        }
        if matches!(el.kind, ElementKind::Ul | ElementKind::Ol) && el.has_ial_ref("toc") {
            res = if res.trim().is_empty() {
                "toc".to_owned()
            } else {
                format!("toc {res}")
            };
        }
        if res.trim().is_empty() {
            None
        } else {
            Some(format!("{{:{res}}}"))
        }
    }
}

impl Render for MarkdownRenderer<'_> {
    const INDENT: usize = 0;

    fn render_element(&mut self, el: &Element, scope: Scope<'_>) -> Result<String, RenderError> {
        let mut res = self.convert(el, scope)?;
        let ial = if matches!(
            el.kind,
            ElementKind::HtmlElement | ElementKind::Li | ElementKind::Dd
        ) {
            None
        } else {
            self.ial_for_element(el)
        };
        if let Some(ial) = ial {
            res.push_str(&ial);
            if el.is_block() {
                res.push_str("\n\n");
            }
        } else if matches!(
            el.kind,
            ElementKind::Ul | ElementKind::Ol | ElementKind::Dl | ElementKind::CodeBlock
        ) && followed_by_same_kind(el, scope)
        {
            // End-of-list marker keeps adjacent lists separate.
            res.push_str("^\n\n");
        } else if el.is_block()
            && !matches!(
                el.kind,
                ElementKind::Root
                    | ElementKind::Li
                    | ElementKind::Dd
                    | ElementKind::Dt
                    | ElementKind::Td
                    | ElementKind::Th
                    | ElementKind::Tr
                    | ElementKind::Thead
                    | ElementKind::Tbody
                    | ElementKind::Tfoot
                    | ElementKind::Blank
            )
            && !(el.kind == ElementKind::P && el.opts.transparent)
        {
            res.push('\n');
        }
        Ok(res)
    }
}

fn followed_by_same_kind(el: &Element, scope: Scope<'_>) -> bool {
    let same = |other: &Element| other.kind == el.kind || other.kind == ElementKind::CodeBlock;
    match scope.next {
        Some(next) if same(next) => true,
        Some(next) if next.kind == ElementKind::Blank => scope.next_next.is_some_and(same),
        _ => false,
    }
}

fn inside_raw_html(scope: Scope<'_>) -> bool {
    scope.parent.is_some_and(|p| {
        p.kind == ElementKind::HtmlElement && p.opts.parse_mode == Some(ParseMode::Raw)
    })
}

fn convert_text(el: &Element, scope: Scope<'_>) -> String {
    let value = el.value_text().unwrap_or("");
    if scope.raw_text {
        return value.to_owned();
    }
    let mut text = value.to_owned();
    // A hard break already ends the line; drop the newline it would
    // otherwise double.
    if text.starts_with('\n') && scope.prev.is_some_and(|p| p.kind == ElementKind::Br) {
        text.remove(0);
    }
    let text = WS_RE.replace_all(&text, " ");
    ESCAPED_CHAR_RE
        .replace_all(&text, |caps: &regex::Captures<'_>| {
            let m = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map_or("", |m| m.as_str());
            format!("\\{m}")
        })
        .into_owned()
}

fn convert_codeblock(el: &Element) -> String {
    let value = el.value_text().unwrap_or("");
    let lines: Vec<String> = value
        .trim_end_matches('\n')
        .split('\n')
        .map(|line| format!("    {line}"))
        .collect();
    lines.join("\n") + "\n"
}

fn convert_img(el: &Element) -> String {
    let alt = el.attr("alt").unwrap_or("");
    let src = el.attr("src").unwrap_or("");
    if src.is_empty() {
        return format!("![{alt}]()");
    }
    let title = match el.attr("title") {
        Some(title) => format!(" \"{}\"", title.replace('"', "&quot;")),
        None => String::new(),
    };
    let link = if src.contains(['(', ')']) {
        format!("<{src}>")
    } else {
        src.to_owned()
    };
    format!("![{alt}]({link}{title})")
}

fn convert_codespan(el: &Element) -> String {
    let value = el.value_text().unwrap_or("");
    let mut longest_run = 0;
    let mut run = 0;
    for c in value.chars() {
        if c == '`' {
            run += 1;
            longest_run = longest_run.max(run);
        } else {
            run = 0;
        }
    }
    let delim = "`".repeat(longest_run + 1);
    let pad = if delim.len() > 1 { " " } else { "" };
    format!("{delim}{pad}{value}{pad}{delim}")
}

fn convert_raw(el: &Element, scope: Scope<'_>) -> String {
    let value = el.value_text().unwrap_or("");
    let attr = if el.opts.raw_kinds.is_empty() {
        String::new()
    } else {
        format!(" type=\"{}\"", el.opts.raw_kinds.join(" "))
    };
    if scope
        .parent
        .is_some_and(|p| p.kind == ElementKind::HtmlElement)
    {
        value.to_owned()
    } else if el.is_block() {
        format!("{{::nomarkdown{attr}}}\n{value}\n{{:/}}\n")
    } else {
        format!("{{::nomarkdown{attr}}}{value}{{:/}}")
    }
}

fn convert_math(el: &Element, scope: Scope<'_>) -> String {
    // A math span opening a paragraph would read back as display math.
    let guard = if scope.parent.is_some_and(|p| p.kind == ElementKind::P) && scope.prev.is_none() {
        "\\"
    } else {
        ""
    };
    let newline = if el.is_block() { "\n" } else { "" };
    format!("{guard}$${}$${newline}", el.value_text().unwrap_or(""))
}

fn convert_comment(el: &Element) -> String {
    let value = el.value_text().unwrap_or("");
    if el.is_block() {
        format!("{{::comment}}\n{value}\n{{:/}}\n")
    } else {
        format!("{{::comment}}{value}{{:/}}")
    }
}

fn convert_xml_comment(el: &Element, scope: Scope<'_>) -> String {
    let value = el.value_text().unwrap_or("");
    if el.is_block() && !inside_raw_html(scope) {
        format!("{value}\n")
    } else {
        value.to_owned()
    }
}

fn typographic_sym_text(sym: TypographicSym) -> &'static str {
    match sym {
        TypographicSym::Mdash => "---",
        TypographicSym::Ndash => "--",
        TypographicSym::Hellip => "...",
        TypographicSym::Laquo => "<<",
        TypographicSym::LaquoSpace => "<< ",
        TypographicSym::Raquo => ">>",
        TypographicSym::RaquoSpace => " >>",
        TypographicSym::Qdash => "--",
        TypographicSym::QdashSpace => "-- ",
    }
}

/// Wrap text at the given width. Breaks happen at spaces only; a word
/// longer than the width overflows its line. Hard-break markers (the
/// trailing spaces before a newline) survive the rewrap.
fn reflow(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for raw in text.split('\n') {
        let content = raw.trim_end_matches(' ');
        let hard_break = &raw[content.len()..];
        let mut current = String::new();
        for word in content.split(' ').filter(|w| !w.is_empty()) {
            if current.is_empty() {
                current.push_str(word);
            } else if current.chars().count() + 1 + word.chars().count() <= width {
                current.push(' ');
                current.push_str(word);
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
            }
        }
        current.push_str(hard_break);
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use doctree::{Alignment, QuoteKind};
    use pretty_assertions::assert_eq;

    fn block(kind: ElementKind) -> Element {
        Element::new(kind).with_category(Category::Block)
    }

    fn root(children: Vec<Element>) -> Element {
        block(ElementKind::Root).with_children(children)
    }

    fn para(text: &str) -> Element {
        block(ElementKind::P).with_child(Element::text(text))
    }

    fn tight_item(text: &str) -> Element {
        block(ElementKind::Li).with_child(
            block(ElementKind::P)
                .transparent()
                .with_child(Element::text(text)),
        )
    }

    fn render(tree: &Element) -> (String, Vec<String>) {
        render_with(tree, &Options::default(), &ParseInfos::default())
    }

    fn render_with(tree: &Element, options: &Options, infos: &ParseInfos) -> (String, Vec<String>) {
        MarkdownRenderer::new(options, infos).render(tree).unwrap()
    }

    #[test]
    fn test_text_escaping() {
        let tree = root(vec![para("a * b [c] {d}")]);
        let (out, _) = render(&tree);
        assert_eq!(out, "a \\* b \\[c\\] \\{d\\}\n\n");
    }

    #[test]
    fn test_first_line_marker_escaping() {
        let (out, _) = render(&root(vec![para("# not a heading")]));
        assert_eq!(out, "\\# not a heading\n\n");

        let (out, _) = render(&root(vec![para("1984. A year")]));
        assert_eq!(out, "1984\\. A year\n\n");

        let (out, _) = render(&root(vec![para("- not an item")]));
        assert_eq!(out, "\\- not an item\n\n");
    }

    #[test]
    fn test_paragraph_reflow() {
        let options = Options {
            line_width: 20,
            ..Options::default()
        };
        let tree = root(vec![para("aaa bbb ccc ddd eee fff")]);
        let (out, _) = render_with(&tree, &options, &ParseInfos::default());
        assert_eq!(out, "aaa bbb ccc ddd eee\nfff\n\n");
    }

    #[test]
    fn test_hard_break_survives_reflow() {
        let tree = root(vec![block(ElementKind::P)
            .with_child(Element::text("a"))
            .with_child(Element::new(ElementKind::Br))
            .with_child(Element::text("\nb"))]);
        let (out, _) = render(&tree);
        assert_eq!(out, "a  \nb\n\n");
    }

    #[test]
    fn test_header_with_id() {
        let mut header = block(ElementKind::Header)
            .with_attr("id", "custom")
            .with_child(Element::text("Title"));
        header.opts.level = Some(2);
        let (out, _) = render(&root(vec![header]));
        assert_eq!(out, "## Title   {#custom}\n\n");
    }

    #[test]
    fn test_unordered_list() {
        let tree = root(vec![block(ElementKind::Ul)
            .with_child(tight_item("a"))
            .with_child(tight_item("b"))]);
        let (out, _) = render(&tree);
        assert_eq!(out, "* a\n* b\n\n");
    }

    #[test]
    fn test_ordered_list_markers() {
        let tree = root(vec![block(ElementKind::Ol)
            .with_child(tight_item("a"))
            .with_child(tight_item("b"))]);
        let (out, _) = render(&tree);
        assert_eq!(out, "1.  a\n2.  b\n\n");
    }

    #[test]
    fn test_adjacent_lists_get_end_marker() {
        let tree = root(vec![
            block(ElementKind::Ul).with_child(tight_item("a")),
            block(ElementKind::Blank),
            block(ElementKind::Ul).with_child(tight_item("b")),
        ]);
        let (out, _) = render(&tree);
        assert_eq!(out, "* a\n^\n\n* b\n\n");
    }

    #[test]
    fn test_blockquote() {
        let tree = root(vec![block(ElementKind::Blockquote).with_child(para("quoted"))]);
        let (out, _) = render(&tree);
        assert_eq!(out, "> quoted\n\n");
    }

    #[test]
    fn test_codeblock_indents_lines() {
        let code = block(ElementKind::CodeBlock).with_value(Value::Text("a\nb\n".to_owned()));
        let (out, _) = render(&root(vec![code]));
        assert_eq!(out, "    a\n    b\n\n");
    }

    #[test]
    fn test_definition_list() {
        let dt = block(ElementKind::Dt).with_child(Element::text("term"));
        let dd = block(ElementKind::Dd).with_child(
            block(ElementKind::P)
                .transparent()
                .with_child(Element::text("definition")),
        );
        let tree = root(vec![block(ElementKind::Dl).with_child(dt).with_child(dd)]);
        let (out, _) = render(&tree);
        assert_eq!(out, "term\n: definition\n\n");
    }

    #[test]
    fn test_table_with_alignment() {
        let mut table = block(ElementKind::Table);
        table.opts.alignment = vec![Alignment::Left, Alignment::Default];
        let head = block(ElementKind::Thead).with_child(
            block(ElementKind::Tr)
                .with_child(block(ElementKind::Th).with_child(Element::text("a")))
                .with_child(block(ElementKind::Th).with_child(Element::text("b"))),
        );
        let body = block(ElementKind::Tbody).with_child(
            block(ElementKind::Tr)
                .with_child(block(ElementKind::Td).with_child(Element::text("1")))
                .with_child(block(ElementKind::Td).with_child(Element::text("x|y"))),
        );
        table.children.push(head);
        table.children.push(body);
        let (out, _) = render(&root(vec![table]));
        assert_eq!(out, "| a | b |\n| :- -\n| 1 | x\\|y |\n\n");
    }

    #[test]
    fn test_links_become_references() {
        let link = |text: &str| {
            Element::new(ElementKind::A)
                .with_attr("href", "http://example.com/")
                .with_child(Element::text(text))
        };
        let tree = root(vec![block(ElementKind::P)
            .with_child(link("one"))
            .with_child(Element::text(" "))
            .with_child(link("two"))]);
        let (out, _) = render(&tree);
        assert_eq!(
            out,
            "[one][1] [two][1]\n\n\n\n[1]: http://example.com/ \n"
        );
    }

    #[test]
    fn test_inline_link_with_title() {
        let link = Element::new(ElementKind::A)
            .with_attr("href", "/local")
            .with_attr("title", "A \"quote\"")
            .with_child(Element::text("x"));
        let tree = root(vec![block(ElementKind::P).with_child(link)]);
        let (out, _) = render(&tree);
        assert_eq!(out, "[x](/local \"A &quot;quote&quot;\")\n\n");
    }

    #[test]
    fn test_footnote_definition_flushed_once() {
        let mut infos = ParseInfos::default();
        infos.footnotes.insert(
            "x".to_owned(),
            block(ElementKind::Footnote).with_child(para("note text")),
        );
        let marker = || {
            let mut el = Element::new(ElementKind::Footnote);
            el.opts.name = Some("x".to_owned());
            el
        };
        let tree = root(vec![block(ElementKind::P)
            .with_child(Element::text("body"))
            .with_child(marker())
            .with_child(marker())]);
        let (out, warnings) = render_with(&tree, &Options::default(), &infos);
        assert!(warnings.is_empty());
        assert_eq!(out, "body[^x][^x]\n\n[^x]:\n    note text\n\n");
    }

    #[test]
    fn test_abbreviation_defs_only_for_used() {
        let mut infos = ParseInfos::default();
        infos
            .abbreviations
            .insert("CSS".to_owned(), "Cascading Style Sheets".to_owned());
        infos
            .abbreviations
            .insert("XML".to_owned(), "Extensible Markup Language".to_owned());
        let abbr =
            Element::new(ElementKind::Abbreviation).with_value(Value::Text("CSS".to_owned()));
        let tree = root(vec![block(ElementKind::P)
            .with_child(Element::text("styled with "))
            .with_child(abbr)]);
        let (out, _) = render_with(&tree, &Options::default(), &infos);
        assert_eq!(
            out,
            "styled with CSS\n\n*[CSS]: Cascading Style Sheets\n"
        );
    }

    #[test]
    fn test_codespan_delimiter_grows() {
        let span = Element::new(ElementKind::CodeSpan).with_value(Value::Text("a`b".to_owned()));
        let tree = root(vec![block(ElementKind::P).with_child(span)]);
        let (out, _) = render(&tree);
        assert_eq!(out, "`` a`b ``\n\n");
    }

    #[test]
    fn test_math_guard_at_paragraph_start() {
        let math = Element::new(ElementKind::Math).with_value(Value::Text("x".to_owned()));
        let tree = root(vec![block(ElementKind::P).with_child(math)]);
        let (out, _) = render(&tree);
        assert_eq!(out, "\\$$x$$\n\n");

        let math = Element::new(ElementKind::Math).with_value(Value::Text("x".to_owned()));
        let tree = root(vec![block(ElementKind::P)
            .with_child(Element::text("sum "))
            .with_child(math)]);
        let (out, _) = render(&tree);
        assert_eq!(out, "sum $$x$$\n\n");
    }

    #[test]
    fn test_ial_for_residual_attributes() {
        let tree = root(vec![para("text").with_attr("class", "note warn")]);
        let (out, _) = render(&tree);
        assert_eq!(out, "text\n{: .note .warn}\n\n");
    }

    #[test]
    fn test_ial_suppressed_when_disabled() {
        let options = Options {
            attribute_lists: false,
            ..Options::default()
        };
        let tree = root(vec![para("text").with_attr("class", "note")]);
        let (out, _) = render_with(&tree, &options, &ParseInfos::default());
        assert_eq!(out, "text\n\n");
    }

    #[test]
    fn test_toc_marker_round_trips() {
        let mut list = block(ElementKind::Ul);
        list.opts.ial_refs.push("toc".to_owned());
        let (out, _) = render(&root(vec![list]));
        assert_eq!(out, "{:toc}\n\n");
    }

    #[test]
    fn test_inline_markup() {
        let tree = root(vec![block(ElementKind::P)
            .with_child(Element::new(ElementKind::Em).with_child(Element::text("a")))
            .with_child(Element::text(" "))
            .with_child(Element::new(ElementKind::Strong).with_child(Element::text("b")))
            .with_child(
                Element::new(ElementKind::SmartQuote).with_value(Value::Quote(QuoteKind::Ldquo)),
            )
            .with_child(
                Element::new(ElementKind::TypographicSym)
                    .with_value(Value::Symbol(TypographicSym::Mdash)),
            )]);
        let (out, _) = render(&tree);
        assert_eq!(out, "*a* **b**\"---\n\n");
    }

    #[test]
    fn test_hr() {
        let (out, _) = render(&root(vec![block(ElementKind::Hr)]));
        assert_eq!(out, "* * *\n\n");
    }

    #[test]
    fn test_raw_wrapped_in_nomarkdown() {
        let mut raw = block(ElementKind::Raw).with_value(Value::Text("<b>x</b>".to_owned()));
        raw.opts.raw_kinds = vec!["html".to_owned()];
        let (out, _) = render(&root(vec![raw]));
        assert_eq!(out, "{::nomarkdown type=\"html\"}\n<b>x</b>\n{:/}\n\n");
    }

    #[test]
    fn test_summary_warns_and_skips() {
        let tree = root(vec![
            block(ElementKind::Summary).with_child(Element::text("tl;dr")),
            para("body"),
        ]);
        let (out, warnings) = render(&tree);
        assert_eq!(out, "\nbody\n\n");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("summary"));
    }

    #[test]
    fn test_html_element_block_raw() {
        let mut div = block(ElementKind::HtmlElement)
            .with_value(Value::Text("div".to_owned()))
            .with_child(Element::text("raw <content>"));
        div.opts.parse_mode = Some(ParseMode::Raw);
        let (out, _) = render(&root(vec![div]));
        assert_eq!(out, "<div>raw <content></div>\n\n");
    }
}
