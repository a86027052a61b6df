//! Template error types.

/// Failure to render a commit message or PR body.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Failed to render template: {0}")]
    RenderError(#[from] handlebars::RenderError),
}
