//! Error types for fem-model

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ModelError>;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("missing mesh parameter: {0}")]
    MissingParameter(&'static str),

    #[error("invalid mesh parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("invalid nodal numbering: {0}")]
    InvalidNumbering(String),

    #[error("unknown boundary side code {code} for {dimension:?} mesh")]
    UnknownSideCode {
        code: usize,
        dimension: crate::config::Dimension,
    },
}
