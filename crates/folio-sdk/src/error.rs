use folio_model::ModelError;
use folio_transform::TransformError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("transaction was started on a different document")]
    StaleTransaction,

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("transform error: {0}")]
    Transform(#[from] TransformError),
}

pub type SdkResult<T> = Result<T, SdkError>;
