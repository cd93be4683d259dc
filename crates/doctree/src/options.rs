//! Rendering options recognized by the engine.

/// Options controlling the renderers.
///
/// Unknown concerns simply have no field here; parsers and renderers
/// read the options they recognize and ignore the rest.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Options {
    /// Number assigned to the first footnote.
    pub footnote_start: usize,
    /// Line width used when reflowing markdown paragraphs.
    pub line_width: usize,
    /// Derive heading ids from the heading text when none is set.
    pub auto_ids: bool,
    /// Maximum heading level included in a generated TOC. Zero means
    /// unlimited.
    pub toc_depth: u8,
    /// Emit inline attribute lists for residual attributes (markdown).
    pub attribute_lists: bool,
    /// Settings forwarded to a syntax highlighter, if one is supplied.
    pub highlight: HighlightSettings,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            footnote_start: 1,
            line_width: 72,
            auto_ids: true,
            toc_depth: 0,
            attribute_lists: true,
            highlight: HighlightSettings::default(),
        }
    }
}

/// Pass-through settings for an external syntax highlighter.
///
/// Ignored when no highlighter is installed.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HighlightSettings {
    /// Wrapper element requested from the highlighter (e.g. "div").
    pub wrap: Option<String>,
    /// Emit line numbers.
    pub line_numbers: bool,
    /// First line number.
    pub line_number_start: usize,
    /// Tab width used when expanding tabs.
    pub tab_width: u8,
    /// CSS mode hint ("class" or "style").
    pub css: Option<String>,
}

impl Default for HighlightSettings {
    fn default() -> Self {
        Self {
            wrap: None,
            line_numbers: false,
            line_number_start: 1,
            tab_width: 8,
            css: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert_eq!(options.footnote_start, 1);
        assert_eq!(options.line_width, 72);
        assert!(options.auto_ids);
        assert_eq!(options.toc_depth, 0);
        assert!(options.attribute_lists);
        assert_eq!(options.highlight.tab_width, 8);
    }
}
