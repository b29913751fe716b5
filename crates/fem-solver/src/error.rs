//! Error taxonomy for the solver pipeline.
//!
//! Assembly routines fail fast and carry the originating element index;
//! boundary application fails fast on malformed specifications and skips
//! inapplicable kinds with a warning; the Newton loop treats an exhausted
//! iteration budget as a soft outcome and only the linear layer turns it
//! into [`SolverError::DidNotConverge`].

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SolverError>;

#[derive(Error, Debug)]
pub enum SolverError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("degenerate element {element}: |det J| = {det:e}")]
    DegenerateElement { element: usize, det: f64 },

    #[error("singular matrix: {0}")]
    SingularMatrix(String),

    #[error("pivot too small at front row {row}, column {col}: {value:e}")]
    PivotTooSmall { row: usize, col: usize, value: f64 },

    #[error("did not converge in {iterations} iterations (last change {residual:e})")]
    DidNotConverge { iterations: usize, residual: f64 },

    #[error("Newton iteration diverged at step {iteration} (increment norm {norm:e})")]
    Diverged { iteration: usize, norm: f64 },

    #[error("active front width {width} exceeds configured maximum {max}")]
    FrontExceeded { width: usize, max: usize },

    #[error("no fully summed row available while eliminating element {element}")]
    NoSummedRows { element: usize },

    #[error(transparent)]
    Model(#[from] fem_model::ModelError),

    #[error("mesh import failed: {0}")]
    MeshImport(#[from] fem_io::ImportError),
}
