//! Rendering error types.

use thiserror::Error;

use crate::template::TemplateError;

/// Result type for rendering.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Errors raised while turning a view context into HTML.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Template error.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// A key the view needs is not in the context.
    #[error("view context is missing {0:?}")]
    MissingKey(String),

    /// A key holds a list where a document was expected, or the reverse.
    #[error("view context key {key:?} is not {expected}")]
    WrongShape { key: String, expected: &'static str },
}
