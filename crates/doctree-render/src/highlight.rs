//! Optional syntax highlighting hook.

use doctree::HighlightSettings;

/// External syntax highlighter.
///
/// The engine never depends on a concrete highlighter; callers may
/// pass an implementation to the HTML entry point. Returning `None`
/// from either method falls back to the escaped plain-text path.
pub trait Highlighter {
    /// Highlight a code block. The returned fragment is emitted
    /// verbatim inside the block wrapper.
    fn block(&self, source: &str, lang: &str, settings: &HighlightSettings) -> Option<String>;

    /// Highlight an inline code span.
    fn span(&self, source: &str, lang: &str, settings: &HighlightSettings) -> Option<String>;
}
