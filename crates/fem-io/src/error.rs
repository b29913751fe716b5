//! Error types for fem-io

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImportError>;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("payload is missing {0}")]
    MissingField(&'static str),

    #[error("unsupported element type: {0}")]
    UnsupportedElementType(String),

    #[error("invalid connectivity: {0}")]
    InvalidConnectivity(String),

    #[error("mesh model error: {0}")]
    Model(#[from] fem_model::ModelError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
