//! Error types for the schema crate.

/// Errors that can occur during type lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// No type is registered under the given name.
    #[error("unknown node type: {0}")]
    UnknownType(String),
}

/// Convenience alias for schema results.
pub type SchemaResult<T> = Result<T, SchemaError>;
