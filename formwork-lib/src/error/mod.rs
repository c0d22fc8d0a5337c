//! Error types
//!
//! Validation failures are not errors: they live in a node's
//! [`ErrorSet`](crate::validation::ErrorSet). The types here describe a form
//! that is wired incorrectly ([`ConfigError`]) or an operation addressing a
//! node that is not there ([`PathError`]).

mod config;
mod path;

pub use config::*;
pub use path::*;

/// Any error returned by a form operation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    /// The form definition is broken.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The addressed node does not exist in the current tree shape.
    #[error(transparent)]
    Path(#[from] PathError),
}

impl FormError {
    /// Returns `true` if this is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns `true` if this is a state consistency error.
    pub fn is_consistency(&self) -> bool {
        matches!(self, Self::Path(_))
    }
}

/// Result alias for form operations.
pub type FormResult<T> = Result<T, FormError>;
