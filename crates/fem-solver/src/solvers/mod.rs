//! Linear solver layer.
//!
//! Dispatches a closed set of methods: dense LU with partial pivoting
//! (nalgebra), serial Jacobi, parallel Jacobi behind the same iterative
//! contract, and the frontal path. String forms are converted once at the
//! configuration boundary via `FromStr`. The frontal method interleaves
//! assembly and elimination, so it never receives an assembled system here;
//! the model facade routes it through the frontal pipeline instead.

pub mod iterative;

use std::fmt;
use std::str::FromStr;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};
use crate::prep::GlobalSystem;
use self::iterative::{IterativeEngine, ParallelJacobi, SerialJacobi, csr_from_dense};

/// Linear solver selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverMethod {
    /// Dense LU with partial pivoting
    LuSolve,
    /// Serial Jacobi iteration
    Jacobi,
    /// Parallel Jacobi iteration (external-engine contract)
    JacobiParallel,
    /// Frontal elimination interleaved with assembly
    Frontal,
}

impl FromStr for SolverMethod {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "lusolve" => Ok(SolverMethod::LuSolve),
            "jacobi" => Ok(SolverMethod::Jacobi),
            "jacobi-parallel" => Ok(SolverMethod::JacobiParallel),
            "frontal" => Ok(SolverMethod::Frontal),
            other => Err(SolverError::Configuration(format!(
                "unknown solver method \"{other}\""
            ))),
        }
    }
}

impl fmt::Display for SolverMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SolverMethod::LuSolve => "lusolve",
            SolverMethod::Jacobi => "jacobi",
            SolverMethod::JacobiParallel => "jacobi-parallel",
            SolverMethod::Frontal => "frontal",
        };
        f.write_str(name)
    }
}

/// Iteration budget and tolerance for the iterative engines
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearSolveOptions {
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for LinearSolveOptions {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
            tolerance: 1e-3,
        }
    }
}

/// How a linear solve went
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveInfo {
    pub iterations: usize,
    pub solver: &'static str,
}

/// Solve the assembled system with the chosen method.
pub fn solve_linear_system(
    method: SolverMethod,
    system: &GlobalSystem,
    options: &LinearSolveOptions,
) -> Result<(DVector<f64>, SolveInfo)> {
    match method {
        SolverMethod::LuSolve => {
            let solution = system
                .jacobian
                .clone()
                .lu()
                .solve(&system.residual)
                .ok_or_else(|| {
                    SolverError::SingularMatrix("dense LU factorization failed".to_string())
                })?;
            Ok((
                solution,
                SolveInfo {
                    iterations: 1,
                    solver: "nalgebra-LU",
                },
            ))
        }
        SolverMethod::Jacobi => run_iterative(&SerialJacobi, system, options),
        SolverMethod::JacobiParallel => run_iterative(&ParallelJacobi, system, options),
        SolverMethod::Frontal => Err(SolverError::Configuration(
            "the frontal method interleaves assembly and elimination; \
             it cannot solve a pre-assembled system"
                .to_string(),
        )),
    }
}

fn run_iterative(
    engine: &dyn IterativeEngine,
    system: &GlobalSystem,
    options: &LinearSolveOptions,
) -> Result<(DVector<f64>, SolveInfo)> {
    let matrix = csr_from_dense(&system.jacobian);
    let guess = DVector::zeros(system.num_dofs());
    let outcome = engine.solve(
        &matrix,
        &system.residual,
        &guess,
        options.max_iterations,
        options.tolerance,
    )?;
    if !outcome.converged {
        return Err(SolverError::DidNotConverge {
            iterations: outcome.iterations,
            residual: outcome.error,
        });
    }
    Ok((
        outcome.solution,
        SolveInfo {
            iterations: outcome.iterations,
            solver: engine.name(),
        },
    ))
}
