//! Render error types.

/// Fatal rendering errors.
///
/// Content irregularities (missing attributes, empty containers,
/// unresolved references) never abort a render; they degrade to safe
/// defaults and append to the document's warning log. The only fatal
/// class is a tree that breaks the block/span nesting invariant,
/// since no well-formed output exists for it.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("span element '{0}' contains block-level children")]
    StructuralViolation(String),
}
