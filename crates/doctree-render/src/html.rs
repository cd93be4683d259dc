//! The HTML renderer.

use std::fmt::Write as _;

use doctree::{
    Alignment, Attributes, Category, Element, ElementKind, Options, ParseInfos, ParseMode,
    TypographicSym, Value,
};

use crate::error::RenderError;
use crate::highlight::Highlighter;
use crate::ids::IdGenerator;
use crate::refs::RefList;
use crate::render::{Render, Scope};
use crate::toc::{self, TocEntry};
use crate::util::{
    entity_to_str, escape_attr, escape_text, html_attributes, obfuscate, plain_text,
};

/// Placeholder emitted where a TOC list was requested; substituted
/// with the rendered outline once the walk is done. Control characters
/// cannot appear in rendered output, so the marker is unambiguous.
const TOC_SLOT: &str = "\u{1}doctree-toc\u{1}";

/// Tags that get an explicit closing tag even when empty.
const HTML_TAGS_WITH_BODY: [&str; 4] = ["div", "script", "iframe", "textarea"];

/// Renders one element tree to an HTML fragment.
///
/// All per-render state (footnote numbering, collected headings, the
/// id allocator) lives on this struct, so every call starts from a
/// clean slate and repeated calls on the same document produce
/// identical output.
pub struct HtmlRenderer<'a> {
    options: &'a Options,
    infos: &'a ParseInfos,
    highlighter: Option<&'a dyn Highlighter>,
    warnings: Vec<String>,
    footnotes: RefList<Element>,
    toc: Vec<TocEntry>,
    toc_slot: Option<(ElementKind, Attributes)>,
    ids: IdGenerator,
}

impl<'a> HtmlRenderer<'a> {
    #[must_use]
    pub fn new(
        options: &'a Options,
        infos: &'a ParseInfos,
        highlighter: Option<&'a dyn Highlighter>,
    ) -> Self {
        Self {
            options,
            infos,
            highlighter,
            warnings: Vec::new(),
            footnotes: RefList::new(),
            toc: Vec::new(),
            toc_slot: None,
            ids: IdGenerator::new(&infos.heading_ids),
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

    fn convert_root(&mut self, el: &Element, scope: Scope<'_>) -> Result<String, RenderError> {
        let mut result = self.inner(el, scope)?;
        result.push_str(&self.footnote_content()?);
        if let Some((kind, attrs)) = self.toc_slot.take() {
            let tree = toc::synthesize(&self.toc, &kind, attrs);
            let text = if tree.children.is_empty() {
                String::new()
            } else {
                self.render_element(&tree, Scope::with_indent(0))?
            };
            result = result.replacen(TOC_SLOT, &text, 1);
        }
        Ok(result)
    }

    fn convert_p(&mut self, el: &Element, scope: Scope<'_>) -> Result<String, RenderError> {
        if el.opts.transparent {
            self.inner(el, scope)
        } else {
            Ok(format!(
                "{}<p{}>{}</p>\n",
                " ".repeat(scope.indent),
                html_attributes(el),
                self.inner(el, scope)?
            ))
        }
    }

    fn convert_header(&mut self, el: &Element, scope: Scope<'_>) -> Result<String, RenderError> {
        let assigned;
        let el = if self.options.auto_ids && el.attr("id").is_none() {
            let text = match &el.opts.raw_text {
                Some(text) => text.clone(),
                None => plain_text(el),
            };
            let id = self.ids.generate(&text);
            assigned = el.clone().with_attr("id", id);
            &assigned
        } else {
            el
        };
        let level = el.opts.level.unwrap_or(1);
        if let Some(id) = el.attr("id")
            && self.within_toc_depth(level)
        {
            self.toc.push(TocEntry {
                level,
                id: id.to_owned(),
                content: el.children.clone(),
            });
        }
        Ok(format!(
            "{}<h{level}{}>{}</h{level}>\n",
            " ".repeat(scope.indent),
            html_attributes(el),
            self.inner(el, scope)?
        ))
    }

    fn within_toc_depth(&self, level: u8) -> bool {
        self.options.toc_depth == 0 || level <= self.options.toc_depth
    }

    fn convert_list(&mut self, el: &Element, scope: Scope<'_>) -> Result<String, RenderError> {
        if self.toc_slot.is_none()
            && el.has_ial_ref("toc")
            && matches!(el.kind, ElementKind::Ul | ElementKind::Ol)
        {
            self.toc_slot = Some((el.kind.clone(), el.attrs.clone()));
            return Ok(TOC_SLOT.to_owned());
        }
        self.convert_block_container(el, scope)
    }

    /// Shared shape for lists, blockquotes and table sections: opening
    /// tag on its own line, indented children, closing tag.
    fn convert_block_container(
        &mut self,
        el: &Element,
        scope: Scope<'_>,
    ) -> Result<String, RenderError> {
        let ind = " ".repeat(scope.indent);
        let tag = el.kind.name();
        Ok(format!(
            "{ind}<{tag}{}>\n{}{ind}</{tag}>\n",
            html_attributes(el),
            self.inner(el, scope)?
        ))
    }

    fn convert_li(&mut self, el: &Element, scope: Scope<'_>) -> Result<String, RenderError> {
        let ind = " ".repeat(scope.indent);
        let tag = el.kind.name();
        let res = self.inner(el, scope)?;
        let mut output = format!("{ind}<{tag}{}>", html_attributes(el));
        let first_is_transparent = el
            .children
            .first()
            .is_some_and(|c| c.kind == ElementKind::P && c.opts.transparent);
        if el.children.is_empty() || first_is_transparent {
            output.push_str(&res);
            if res.ends_with('\n') {
                output.push_str(&ind);
            }
        } else {
            output.push('\n');
            output.push_str(&res);
            output.push_str(&ind);
        }
        let _ = writeln!(output, "</{tag}>");
        Ok(output)
    }

    fn convert_codeblock(&mut self, el: &Element, scope: Scope<'_>) -> Result<String, RenderError> {
        let mut el = el.clone();
        let lang = el.attrs.remove("lang");
        let ind = " ".repeat(scope.indent);
        let source = el.value_text().unwrap_or("").to_owned();
        if let (Some(lang), Some(highlighter)) = (&lang, self.highlighter)
            && let Some(html) = highlighter.block(&source, lang, &self.options.highlight)
        {
            let html = html.trim_end_matches('\n');
            return Ok(format!(
                "{ind}<div{}>{html}\n{ind}</div>\n",
                html_attributes(&el)
            ));
        }
        if let Some(lang) = &lang {
            tracing::debug!(lang = %lang, "no highlighter output, rendering code block as plain text");
        }
        let mut result = escape_text(&source);
        if el
            .attr("class")
            .is_some_and(|c| c.split_whitespace().any(|word| word == "show-whitespaces"))
        {
            result = mark_whitespace(&result);
        }
        let newline = if result.ends_with('\n') { "" } else { "\n" };
        Ok(format!(
            "{ind}<pre{}><code>{result}{newline}</code></pre>\n",
            html_attributes(&el)
        ))
    }

    fn convert_table(&mut self, el: &Element, scope: Scope<'_>) -> Result<String, RenderError> {
        let ind = " ".repeat(scope.indent);
        let mut cols = String::new();
        if !el.opts.alignment.iter().all(|a| *a == Alignment::Default) {
            let col_ind = " ".repeat(scope.indent + Self::INDENT);
            for alignment in &el.opts.alignment {
                match alignment {
                    Alignment::Default => {
                        let _ = writeln!(cols, "{col_ind}<col />");
                    }
                    Alignment::Left => {
                        let _ = writeln!(cols, "{col_ind}<col align=\"left\" />");
                    }
                    Alignment::Center => {
                        let _ = writeln!(cols, "{col_ind}<col align=\"center\" />");
                    }
                    Alignment::Right => {
                        let _ = writeln!(cols, "{col_ind}<col align=\"right\" />");
                    }
                }
            }
        }
        Ok(format!(
            "{ind}<table{}>\n{cols}{}{ind}</table>\n",
            html_attributes(el),
            self.inner(el, scope)?
        ))
    }

    fn convert_cell(&mut self, el: &Element, scope: Scope<'_>) -> Result<String, RenderError> {
        let res = self.inner(el, scope)?;
        Ok(format!(
            "{}<{tag}{}>{}</{tag}>\n",
            " ".repeat(scope.indent),
            html_attributes(el),
            if res.is_empty() { "&nbsp;" } else { res.as_str() },
            tag = el.kind.name()
        ))
    }

    fn convert_a(&mut self, el: &Element, scope: Scope<'_>) -> Result<String, RenderError> {
        if el.attr("href").is_some_and(|h| h.starts_with("mailto:")) {
            let mut el = el.clone();
            let address = el
                .attr("href")
                .and_then(|h| h.strip_prefix("mailto:"))
                .unwrap_or("")
                .to_owned();
            el.attrs
                .insert("href", format!("{}:{}", obfuscate("mailto"), obfuscate(&address)));
            let res = obfuscate(&self.inner(&el, scope)?);
            Ok(format!("<a{}>{res}</a>", html_attributes(&el)))
        } else {
            Ok(format!(
                "<a{}>{}</a>",
                html_attributes(el),
                self.inner(el, scope)?
            ))
        }
    }

    fn convert_span(&mut self, el: &Element, scope: Scope<'_>) -> Result<String, RenderError> {
        Ok(format!(
            "<{tag}{}>{}</{tag}>",
            html_attributes(el),
            self.inner(el, scope)?,
            tag = el.kind.name()
        ))
    }

    fn convert_codespan(&mut self, el: &Element) -> String {
        let mut el = el.clone();
        let lang = el.attrs.remove("lang");
        let source = el.value_text().unwrap_or("").to_owned();
        if let (Some(lang), Some(highlighter)) = (&lang, self.highlighter)
            && let Some(html) = highlighter.span(&source, lang, &self.options.highlight)
        {
            return format!(
                "<code{}>{}</code>",
                html_attributes(&el),
                html.trim_end_matches('\n')
            );
        }
        if let Some(lang) = &lang {
            tracing::debug!(lang = %lang, "no highlighter output, rendering code span as plain text");
        }
        format!("<code{}>{}</code>", html_attributes(&el), escape_text(&source))
    }

    fn convert_footnote(&mut self, el: &Element) -> String {
        let Some(name) = el.opts.name.clone() else {
            self.warn("footnote marker without a name, skipping".to_owned());
            return String::new();
        };
        let infos = self.infos;
        match infos.footnotes.get(&name) {
            Some(definition) => {
                let index = self.footnotes.insert_with(&name, || definition.clone());
                let number = self.options.footnote_start + index;
                format!(
                    "<sup id=\"fnref:{name}\"><a href=\"#fn:{name}\" rel=\"footnote\">{number}</a></sup>"
                )
            }
            None => {
                self.warn(format!("footnote '{name}' has no definition"));
                format!("<sup id=\"fnref:{name}\">{}</sup>", escape_text(&name))
            }
        }
    }

    /// Build and render the footnote list for the used footnotes.
    fn footnote_content(&mut self) -> Result<String, RenderError> {
        if self.footnotes.is_empty() {
            return Ok(String::new());
        }
        let mut ol = Element::new(ElementKind::Ol).with_category(Category::Block);
        if self.options.footnote_start != 1 {
            ol.attrs
                .insert("start", self.options.footnote_start.to_string());
        }
        let entries: Vec<(String, Element)> = self
            .footnotes
            .iter()
            .map(|(name, definition)| (name.to_owned(), definition.clone()))
            .collect();
        for (name, definition) in entries {
            let mut li = Element::new(ElementKind::Li)
                .with_category(Category::Block)
                .with_attr("id", format!("fn:{name}"));
            li.children = definition.children.clone();
            let backlink = Element::new(ElementKind::Raw).with_value(Value::Text(format!(
                "<a href=\"#fnref:{name}\" rev=\"footnote\">&#8617;</a>"
            )));
            match li.children.last_mut() {
                Some(last) if last.kind == ElementKind::P => last.children.push(backlink),
                _ => li.children.push(
                    Element::new(ElementKind::P)
                        .with_category(Category::Block)
                        .with_child(backlink),
                ),
            }
            ol.children.push(li);
        }
        let list = self.render_element(&ol, Scope::with_indent(Self::INDENT))?;
        Ok(format!("<div class=\"footnotes\">\n{list}</div>\n"))
    }

    fn convert_entity(&mut self, el: &Element) -> String {
        match &el.value {
            Some(Value::Entity {
                codepoint,
                original,
            }) => entity_to_str(*codepoint, original.as_deref()),
            _ => {
                self.warn("entity element without a codepoint, skipping".to_owned());
                String::new()
            }
        }
    }

    fn convert_abbreviation(&mut self, el: &Element) -> String {
        let text = el.value_text().unwrap_or("").to_owned();
        let infos = self.infos;
        match infos.abbreviations.get(&text) {
            Some(title) if !title.is_empty() => {
                format!("<abbr title=\"{}\">{}</abbr>", escape_attr(title), escape_text(&text))
            }
            Some(_) => format!("<abbr>{}</abbr>", escape_text(&text)),
            None => {
                self.warn(format!("abbreviation '{text}' has no definition"));
                format!("<abbr>{}</abbr>", escape_text(&text))
            }
        }
    }

    fn convert_html_element(
        &mut self,
        el: &Element,
        scope: Scope<'_>,
    ) -> Result<String, RenderError> {
        let tag = el.value_text().unwrap_or("").to_owned();
        let res = self.inner(el, scope)?;
        if el.category() == Category::Span {
            if !res.is_empty() || HTML_TAGS_WITH_BODY.contains(&tag.as_str()) {
                Ok(format!("<{tag}{}>{res}</{tag}>", html_attributes(el)))
            } else {
                Ok(format!("<{tag}{} />", html_attributes(el)))
            }
        } else {
            let inside_raw = scope.parent.is_some_and(|p| {
                p.kind == ElementKind::HtmlElement && p.opts.parse_mode == Some(ParseMode::Raw)
            });
            let mut output = String::new();
            if !inside_raw {
                output.push_str(&" ".repeat(scope.indent));
            }
            let _ = write!(output, "<{tag}{}", html_attributes(el));
            if !res.is_empty() && el.opts.parse_mode != Some(ParseMode::Block) {
                let _ = write!(output, ">{res}</{tag}>");
            } else if !res.is_empty() {
                let body = res.strip_suffix('\n').unwrap_or(&res);
                let _ = write!(output, ">\n{body}\n{}</{tag}>", " ".repeat(scope.indent));
            } else if HTML_TAGS_WITH_BODY.contains(&tag.as_str()) {
                let _ = write!(output, "></{tag}>");
            } else {
                output.push_str(" />");
            }
            if !inside_raw {
                output.push('\n');
            }
            Ok(output)
        }
    }

    fn convert_summary(&mut self, el: &Element, scope: Scope<'_>) -> Result<String, RenderError> {
        let ind = " ".repeat(scope.indent);
        Ok(format!(
            "{ind}<p{}><b>{}{ind}</b></p>\n",
            html_attributes(el),
            self.inner(el, scope)?
        ))
    }
}

impl Render for HtmlRenderer<'_> {
    const INDENT: usize = 2;

    fn render_element(&mut self, el: &Element, scope: Scope<'_>) -> Result<String, RenderError> {
        match &el.kind {
            ElementKind::Root => self.convert_root(el, scope),
            ElementKind::Text => Ok(escape_text(el.value_text().unwrap_or(""))),
            ElementKind::Blank => Ok("\n".to_owned()),
            ElementKind::P => self.convert_p(el, scope),
            ElementKind::Header => self.convert_header(el, scope),
            ElementKind::Hr => Ok(format!("{}<hr />\n", " ".repeat(scope.indent))),
            ElementKind::Blockquote
            | ElementKind::Dl
            | ElementKind::Thead
            | ElementKind::Tbody
            | ElementKind::Tfoot
            | ElementKind::Tr => self.convert_block_container(el, scope),
            ElementKind::Ul | ElementKind::Ol => self.convert_list(el, scope),
            ElementKind::Li | ElementKind::Dd => self.convert_li(el, scope),
            ElementKind::Dt => Ok(format!(
                "{}<dt{}>{}</dt>\n",
                " ".repeat(scope.indent),
                html_attributes(el),
                self.inner(el, scope)?
            )),
            ElementKind::CodeBlock => self.convert_codeblock(el, scope),
            ElementKind::Table => self.convert_table(el, scope),
            ElementKind::Td | ElementKind::Th => self.convert_cell(el, scope),
            ElementKind::A => self.convert_a(el, scope),
            ElementKind::Img => Ok(format!("<img{} />", html_attributes(el))),
            ElementKind::Em | ElementKind::Strong => self.convert_span(el, scope),
            ElementKind::CodeSpan => Ok(self.convert_codespan(el)),
            ElementKind::Footnote => Ok(self.convert_footnote(el)),
            ElementKind::Raw => Ok(convert_raw(el)),
            ElementKind::Entity => Ok(self.convert_entity(el)),
            ElementKind::TypographicSym => {
                let text = match &el.value {
                    Some(Value::Symbol(sym)) => typographic_sym_text(*sym),
                    _ => "",
                };
                Ok(text.to_owned())
            }
            ElementKind::SmartQuote => {
                let text = match &el.value {
                    Some(Value::Quote(quote)) => format!("&{};", quote.entity_name()),
                    _ => String::new(),
                };
                Ok(text)
            }
            ElementKind::Math => Ok(convert_math(el)),
            ElementKind::Abbreviation => Ok(self.convert_abbreviation(el)),
            ElementKind::Comment => Ok(convert_comment(el, scope)),
            ElementKind::Br => Ok("<br />".to_owned()),
            ElementKind::HtmlElement => self.convert_html_element(el, scope),
            ElementKind::XmlComment | ElementKind::XmlPi | ElementKind::HtmlDoctype => {
                Ok(convert_xml_comment(el, scope))
            }
            ElementKind::Summary => self.convert_summary(el, scope),
            ElementKind::Other(name) => {
                self.warn(format!("element kind '{name}' is not supported, skipping"));
                Ok(String::new())
            }
        }
    }
}

fn convert_raw(el: &Element) -> String {
    let for_html = el.opts.raw_kinds.is_empty() || el.opts.raw_kinds.iter().any(|k| k == "html");
    if for_html {
        let mut out = el.value_text().unwrap_or("").to_owned();
        if el.is_block() {
            out.push('\n');
        }
        out
    } else {
        String::new()
    }
}

fn convert_math(el: &Element) -> String {
    let mut el = el.clone();
    let class = match el.attr("class") {
        Some(c) if !c.is_empty() => format!("{c} math"),
        _ => "math".to_owned(),
    };
    el.attrs.insert("class", class);
    let tag = if el.is_block() { "div" } else { "span" };
    format!(
        "<{tag}{}>{}</{tag}>{}",
        html_attributes(&el),
        escape_text(el.value_text().unwrap_or("")),
        if el.is_block() { "\n" } else { "" }
    )
}

fn convert_comment(el: &Element, scope: Scope<'_>) -> String {
    let value = el.value_text().unwrap_or("");
    if el.is_block() {
        format!("{}<!-- {value} -->\n", " ".repeat(scope.indent))
    } else {
        format!("<!-- {value} -->")
    }
}

fn convert_xml_comment(el: &Element, scope: Scope<'_>) -> String {
    let value = el.value_text().unwrap_or("");
    let inside_raw = scope.parent.is_some_and(|p| {
        p.kind == ElementKind::HtmlElement && p.opts.parse_mode == Some(ParseMode::Raw)
    });
    if el.is_block() && !inside_raw {
        format!("{}{value}\n", " ".repeat(scope.indent))
    } else {
        value.to_owned()
    }
}

fn typographic_sym_text(sym: TypographicSym) -> &'static str {
    match sym {
        TypographicSym::Mdash => "&mdash;",
        TypographicSym::Ndash => "&ndash;",
        TypographicSym::Hellip => "&hellip;",
        TypographicSym::Laquo => "&laquo;",
        TypographicSym::LaquoSpace => "&laquo;&nbsp;",
        TypographicSym::Raquo => "&raquo;",
        TypographicSym::RaquoSpace => "&nbsp;&raquo;",
        TypographicSym::Qdash => "&#8213;",
        TypographicSym::QdashSpace => "&#8213;&nbsp;",
    }
}

/// Wrap the whitespace runs of already-escaped code in marker spans.
/// Leading and trailing runs get `-l`/`-r` class suffixes.
fn mark_whitespace(text: &str) -> String {
    let mut out = String::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let lead_end = line.len() - line.trim_start_matches([' ', '\t']).len();
        let trail_start = line.trim_end_matches([' ', '\t']).len().max(lead_end);
        mark_run(&line[..lead_end], "-l", &mut out);
        for c in line[lead_end..trail_start].chars() {
            match c {
                ' ' | '\t' => {
                    let mut buf = [0u8; 4];
                    mark_run(c.encode_utf8(&mut buf), "", &mut out);
                }
                _ => out.push(c),
            }
        }
        mark_run(&line[trail_start..], "-r", &mut out);
    }
    out
}

fn mark_run(run: &str, suffix: &str, out: &mut String) {
    for c in run.chars() {
        match c {
            '\t' => {
                let _ = write!(out, "<span class=\"ws-tab{suffix}\">\t</span>");
            }
            ' ' => {
                let _ = write!(out, "<span class=\"ws-space{suffix}\">&#8901;</span>");
            }
            _ => out.push(c),
        }
    }
}
