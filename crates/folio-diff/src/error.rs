//! Error types for the diff crate.

use folio_model::ModelError;

use crate::change::ChangeKind;

/// Errors that can occur while replaying a diff.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    /// Reconstruction does not know how to replay this kind of change.
    #[error("cannot reconstruct a `{0}` change")]
    UnsupportedChange(ChangeKind),

    /// A change referenced a node that is not part of the boundary.
    #[error("model error: {0}")]
    Model(#[from] ModelError),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
