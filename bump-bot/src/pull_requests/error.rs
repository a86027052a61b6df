//! Pull request error types.

use crate::github::GitHostError;
use crate::templates::TemplateError;
use thiserror::Error;

/// Errors that can occur while publishing a pull request.
#[derive(Debug, Error)]
pub enum PrError {
    /// Hosting platform error.
    #[error(transparent)]
    Host(#[from] GitHostError),

    /// Body rendering failed.
    #[error(transparent)]
    Template(#[from] TemplateError),
}
