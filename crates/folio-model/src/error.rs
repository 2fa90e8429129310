//! Error types for the model crate.

use folio_schema::SchemaError;
use folio_types::Trace;

/// What went wrong in a recoverable model operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelErrorKind {
    /// A child index outside `[0, len)` (or `[0, len]` for insertion).
    #[error("index {index} out of range for {len} children")]
    IndexOutOfRange { index: isize, len: usize },

    /// An offset outside `[0, size]`.
    #[error("offset {offset} out of range 0..={size}")]
    OffsetOutOfRange { offset: usize, size: usize },

    /// A range whose start lies after its end.
    #[error("invalid range {from}..{to}")]
    InvalidRange { from: usize, to: usize },

    /// An absolute position outside the boundary's content.
    #[error("position {pos} out of range 0..={size}")]
    PositionOutOfRange { pos: usize, size: usize },

    /// An offset that lands inside an inline leaf.
    #[error("offset {offset} points inside inline leaf `{name}`")]
    InsideLeaf { name: String, offset: usize },

    /// A depth outside `[0, max]` (after resolving negative depths).
    #[error("depth {depth} out of range 0..={max}")]
    DepthOutOfRange { depth: isize, max: usize },

    /// The node to remove, replace, or anchor on is not in the tree.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// Two positions were resolved against different boundaries.
    #[error("positions were resolved against different boundaries")]
    IncomparablePositions,

    /// The replace algorithm does not handle this combination.
    #[error("unsupported replace: {0}")]
    UnsupportedReplace(String),

    /// A text edit targeted a position outside any text node.
    #[error("position {0} is not inside a text node")]
    NotInText(usize),

    /// A structural edit targeted a position inside a text node.
    #[error("position {0} lies inside a text node")]
    InsideText(usize),

    /// A type name the schema does not know.
    #[error("unknown node type: {0}")]
    UnknownType(String),

    /// The schema's content oracle rejected a child sequence.
    #[error("content rejected by schema for `{0}`")]
    InvalidContent(String),

    /// A JSON document that does not describe a node tree.
    #[error("malformed node json: {0}")]
    Json(String),
}

/// A recoverable model error with the operation trace it was raised in.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} (in {trace})")]
pub struct ModelError {
    pub kind: ModelErrorKind,
    pub trace: Trace,
}

impl ModelError {
    /// Build an error, capturing the current operation trace.
    pub fn new(kind: ModelErrorKind) -> Self {
        Self {
            kind,
            trace: Trace::capture(),
        }
    }
}

impl From<ModelErrorKind> for ModelError {
    fn from(kind: ModelErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<SchemaError> for ModelError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::UnknownType(name) => Self::new(ModelErrorKind::UnknownType(name)),
        }
    }
}

/// Convenience alias for model results.
pub type ModelResult<T> = Result<T, ModelError>;
