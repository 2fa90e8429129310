//! Error types for the transform crate.

use folio_model::{ModelError, ModelErrorKind};

/// Errors raised while applying steps to a transaction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    /// A step could not be applied to the current snapshot.
    #[error("step failed: {0}")]
    Model(#[from] ModelError),
}

impl TransformError {
    /// The underlying model error kind.
    pub fn kind(&self) -> &ModelErrorKind {
        match self {
            Self::Model(err) => &err.kind,
        }
    }
}

/// Convenience alias for transform results.
pub type TransformResult<T> = Result<T, TransformError>;
