//! Jacobi iteration engines over CSR storage.
//!
//! Both engines implement the same contract an external compute engine
//! (worker- or GPU-backed) would: take (A, b, x₀, max_iter, tol), return the
//! iterate, the iteration count, and whether the tolerance was met. No
//! partial results cross the boundary.
//!
//! The serial engine stops on the maximum componentwise change between
//! iterates; the parallel engine follows the external variant's rule and
//! stops on the residual ∞-norm. Each sweep reads only the previous iterate,
//! so the parallel row sweep needs no synchronization beyond the collect.

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::{CooMatrix, CsrMatrix};
use rayon::prelude::*;

use crate::error::{Result, SolverError};

/// Result of an iterative solve
#[derive(Debug, Clone)]
pub struct IterativeOutcome {
    pub solution: DVector<f64>,
    pub iterations: usize,
    pub converged: bool,
    /// Last measured convergence quantity (change or residual norm)
    pub error: f64,
}

/// Contract shared by in-process and external iterative engines
pub trait IterativeEngine: Sync {
    fn name(&self) -> &'static str;

    fn solve(
        &self,
        matrix: &CsrMatrix<f64>,
        rhs: &DVector<f64>,
        guess: &DVector<f64>,
        max_iterations: usize,
        tolerance: f64,
    ) -> Result<IterativeOutcome>;
}

/// Convert the dense global Jacobian into CSR storage, dropping exact zeros.
pub fn csr_from_dense(matrix: &DMatrix<f64>) -> CsrMatrix<f64> {
    let mut coo = CooMatrix::new(matrix.nrows(), matrix.ncols());
    for i in 0..matrix.nrows() {
        for j in 0..matrix.ncols() {
            let v = matrix[(i, j)];
            if v != 0.0 {
                coo.push(i, j, v);
            }
        }
    }
    CsrMatrix::from(&coo)
}

/// One Jacobi row sweep: x'_i = (b_i − Σ_{j≠i} a_ij x_j) / a_ii.
fn sweep_row(
    row: usize,
    offsets: &[usize],
    cols: &[usize],
    values: &[f64],
    rhs: &DVector<f64>,
    x: &DVector<f64>,
) -> Result<f64> {
    let mut sum = rhs[row];
    let mut diagonal = 0.0;
    for idx in offsets[row]..offsets[row + 1] {
        let col = cols[idx];
        if col == row {
            diagonal = values[idx];
        } else {
            sum -= values[idx] * x[col];
        }
    }
    if diagonal == 0.0 {
        return Err(SolverError::SingularMatrix(format!(
            "zero diagonal entry at row {row}"
        )));
    }
    Ok(sum / diagonal)
}

/// Serial Jacobi iteration
pub struct SerialJacobi;

impl IterativeEngine for SerialJacobi {
    fn name(&self) -> &'static str {
        "jacobi"
    }

    fn solve(
        &self,
        matrix: &CsrMatrix<f64>,
        rhs: &DVector<f64>,
        guess: &DVector<f64>,
        max_iterations: usize,
        tolerance: f64,
    ) -> Result<IterativeOutcome> {
        let n = rhs.len();
        let offsets = matrix.row_offsets();
        let cols = matrix.col_indices();
        let values = matrix.values();

        let mut x = guess.clone();
        let mut change = f64::INFINITY;
        for iteration in 1..=max_iterations {
            let mut next = DVector::zeros(n);
            change = 0.0;
            for row in 0..n {
                next[row] = sweep_row(row, offsets, cols, values, rhs, &x)?;
                change = change.max((next[row] - x[row]).abs());
            }
            x = next;
            if change < tolerance {
                return Ok(IterativeOutcome {
                    solution: x,
                    iterations: iteration,
                    converged: true,
                    error: change,
                });
            }
        }
        Ok(IterativeOutcome {
            solution: x,
            iterations: max_iterations,
            converged: false,
            error: change,
        })
    }
}

/// Parallel Jacobi iteration (rayon row sweep, residual-norm stopping)
pub struct ParallelJacobi;

impl IterativeEngine for ParallelJacobi {
    fn name(&self) -> &'static str {
        "jacobi-parallel"
    }

    fn solve(
        &self,
        matrix: &CsrMatrix<f64>,
        rhs: &DVector<f64>,
        guess: &DVector<f64>,
        max_iterations: usize,
        tolerance: f64,
    ) -> Result<IterativeOutcome> {
        let n = rhs.len();
        let offsets = matrix.row_offsets();
        let cols = matrix.col_indices();
        let values = matrix.values();

        let mut x = guess.clone();
        let mut residual_norm = f64::INFINITY;
        for iteration in 1..=max_iterations {
            let next: Vec<f64> = (0..n)
                .into_par_iter()
                .map(|row| sweep_row(row, offsets, cols, values, rhs, &x))
                .collect::<Result<_>>()?;
            x = DVector::from_vec(next);

            residual_norm = (0..n)
                .into_par_iter()
                .map(|row| {
                    let mut r = rhs[row];
                    for idx in offsets[row]..offsets[row + 1] {
                        r -= values[idx] * x[cols[idx]];
                    }
                    r.abs()
                })
                .reduce(|| 0.0, f64::max);

            if residual_norm < tolerance {
                return Ok(IterativeOutcome {
                    solution: x,
                    iterations: iteration,
                    converged: true,
                    error: residual_norm,
                });
            }
        }
        Ok(IterativeOutcome {
            solution: x,
            iterations: max_iterations,
            converged: false,
            error: residual_norm,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dominant_matrix() -> DMatrix<f64> {
        DMatrix::from_row_slice(3, 3, &[4.0, -1.0, 0.0, -1.0, 4.0, -1.0, 0.0, -1.0, 4.0])
    }

    #[test]
    fn csr_conversion_drops_zeros() {
        let csr = csr_from_dense(&dominant_matrix());
        assert_eq!(csr.nnz(), 7);
    }

    #[test]
    fn serial_jacobi_converges_on_a_dominant_system() {
        let csr = csr_from_dense(&dominant_matrix());
        let rhs = DVector::from_vec(vec![2.0, 4.0, 10.0]);
        let outcome = SerialJacobi
            .solve(&csr, &rhs, &DVector::zeros(3), 1000, 1e-12)
            .unwrap();

        assert!(outcome.converged);
        let exact = dominant_matrix().lu().solve(&rhs).unwrap();
        assert!((&outcome.solution - exact).abs().max() < 1e-9);
    }

    #[test]
    fn changes_shrink_monotonically_under_diagonal_dominance() {
        // Run the sweep by hand and watch max |x^{k+1} - x^k| decrease.
        let matrix = dominant_matrix();
        let csr = csr_from_dense(&matrix);
        let offsets = csr.row_offsets();
        let cols = csr.col_indices();
        let values = csr.values();
        let rhs = DVector::from_vec(vec![1.0, -3.0, 7.0]);

        let mut x = DVector::zeros(3);
        let mut previous_change = f64::INFINITY;
        for _ in 0..50 {
            let mut next = DVector::zeros(3);
            let mut change: f64 = 0.0;
            for row in 0..3 {
                next[row] = sweep_row(row, offsets, cols, values, &rhs, &x).unwrap();
                change = change.max((next[row] - x[row]).abs());
            }
            assert!(
                change <= previous_change + 1e-15,
                "change grew: {change} > {previous_change}"
            );
            previous_change = change;
            x = next;
        }
    }

    #[test]
    fn parallel_engine_matches_the_serial_one() {
        let csr = csr_from_dense(&dominant_matrix());
        let rhs = DVector::from_vec(vec![2.0, 4.0, 10.0]);
        let serial = SerialJacobi
            .solve(&csr, &rhs, &DVector::zeros(3), 1000, 1e-12)
            .unwrap();
        let parallel = ParallelJacobi
            .solve(&csr, &rhs, &DVector::zeros(3), 1000, 1e-12)
            .unwrap();

        assert!(parallel.converged);
        assert!((&serial.solution - &parallel.solution).abs().max() < 1e-9);
    }

    #[test]
    fn zero_diagonal_is_singular() {
        let mut matrix = dominant_matrix();
        matrix[(1, 1)] = 0.0;
        let csr = csr_from_dense(&matrix);
        let rhs = DVector::zeros(3);
        assert!(matches!(
            SerialJacobi.solve(&csr, &rhs, &DVector::zeros(3), 10, 1e-6),
            Err(SolverError::SingularMatrix(_))
        ));
    }
}
