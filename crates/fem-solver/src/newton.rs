//! Newton iteration with continuation over an activation parameter.
//!
//! The caller supplies a step closure that assembles the system at the
//! current iterate (boundary conditions included) and returns the solved
//! increment. The loop owns the iterate and the increment; nothing escapes
//! the solve call. Convergence is measured on the Euclidean norm of the
//! increment. An exhausted iteration budget is a soft outcome — the last
//! iterate is returned with `converged = false` — while a blown-up increment
//! aborts with [`SolverError::Diverged`].

use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SolverError};

/// Increment norm beyond which the iteration counts as diverged.
pub const DIVERGENCE_LIMIT: f64 = 1e2;

/// Newton loop and continuation configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NewtonConfig {
    /// Iteration cap per continuation step
    pub max_iterations: usize,
    /// Convergence tolerance on the increment norm
    pub tolerance: f64,
    /// Number of continuation increments from α = 0 to α = 1
    pub continuation_steps: usize,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-4,
            continuation_steps: 5,
        }
    }
}

/// Summary of one continuation step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContinuationStep {
    /// Activation parameter of this step
    pub activation: f64,
    /// Newton iterations spent
    pub iterations: usize,
    /// Whether the tolerance was met
    pub converged: bool,
    /// Final increment norm
    pub increment_norm: f64,
    /// Largest solution component after this step
    pub solution_max: f64,
}

/// Final iterate and per-step history
#[derive(Debug, Clone)]
pub struct NewtonResults {
    pub solution: DVector<f64>,
    /// True only if every continuation step converged
    pub converged: bool,
    pub steps: Vec<ContinuationStep>,
}

impl NewtonResults {
    /// Total Newton iterations across all continuation steps.
    pub fn total_iterations(&self) -> usize {
        self.steps.iter().map(|s| s.iterations).sum()
    }
}

/// Run Newton under continuation: α sweeps {0, 1/N, …, 1} and each step
/// starts from the previous step's iterate.
///
/// `step(x, α)` must return the increment solved from the system linearized
/// at `x`.
pub fn solve_with_continuation<F>(
    num_dofs: usize,
    config: &NewtonConfig,
    mut step: F,
) -> Result<NewtonResults>
where
    F: FnMut(&DVector<f64>, f64) -> Result<DVector<f64>>,
{
    let mut solution = DVector::zeros(num_dofs);
    let mut steps = Vec::with_capacity(config.continuation_steps + 1);
    let mut converged = true;

    for k in 0..=config.continuation_steps {
        let activation = k as f64 / config.continuation_steps as f64;
        let outcome = newton_loop(&mut solution, activation, config, &mut step)?;
        debug!(
            activation,
            iterations = outcome.iterations,
            converged = outcome.converged,
            "continuation step finished"
        );
        converged &= outcome.converged;
        steps.push(outcome);
    }

    Ok(NewtonResults {
        solution,
        converged,
        steps,
    })
}

/// Run a single Newton loop at fixed activation, updating `solution` in
/// place.
pub fn newton_loop<F>(
    solution: &mut DVector<f64>,
    activation: f64,
    config: &NewtonConfig,
    step: &mut F,
) -> Result<ContinuationStep>
where
    F: FnMut(&DVector<f64>, f64) -> Result<DVector<f64>>,
{
    let mut increment = DVector::zeros(solution.len());
    let mut norm = f64::INFINITY;

    for iteration in 1..=config.max_iterations {
        *solution += &increment;
        increment = step(solution, activation)?;
        norm = increment.norm();

        if norm <= config.tolerance {
            *solution += &increment;
            return Ok(ContinuationStep {
                activation,
                iterations: iteration,
                converged: true,
                increment_norm: norm,
                solution_max: solution.max(),
            });
        }
        if norm > DIVERGENCE_LIMIT {
            return Err(SolverError::Diverged {
                iteration,
                norm,
            });
        }
    }

    Ok(ContinuationStep {
        activation,
        iterations: config.max_iterations,
        converged: false,
        increment_norm: norm,
        solution_max: solution.max(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converges_on_a_scalar_root() {
        // Solve x^2 = 4 by Newton: dx = -(x^2 - 4) / (2x).
        let config = NewtonConfig {
            max_iterations: 50,
            tolerance: 1e-12,
            continuation_steps: 1,
        };
        let mut x = DVector::from_vec(vec![3.0]);
        let outcome = newton_loop(&mut x, 1.0, &config, &mut |x, _| {
            Ok(DVector::from_vec(vec![-(x[0] * x[0] - 4.0) / (2.0 * x[0])]))
        })
        .unwrap();

        assert!(outcome.converged);
        assert!((x[0] - 2.0).abs() < 1e-10);
    }

    #[test]
    fn divergence_guard_aborts() {
        let config = NewtonConfig::default();
        let mut x = DVector::from_vec(vec![0.0]);
        let result = newton_loop(&mut x, 1.0, &config, &mut |_, _| {
            Ok(DVector::from_vec(vec![1e3]))
        });
        assert!(matches!(result, Err(SolverError::Diverged { .. })));
    }

    #[test]
    fn exhausted_budget_is_soft() {
        let config = NewtonConfig {
            max_iterations: 3,
            tolerance: 1e-12,
            continuation_steps: 1,
        };
        let mut x = DVector::from_vec(vec![0.0]);
        // A fixed increment never meets the tolerance but never diverges.
        let outcome = newton_loop(&mut x, 1.0, &config, &mut |_, _| {
            Ok(DVector::from_vec(vec![0.5]))
        })
        .unwrap();

        assert!(!outcome.converged);
        assert_eq!(outcome.iterations, 3);
    }

    #[test]
    fn continuation_sweeps_the_activation_range() {
        let config = NewtonConfig {
            max_iterations: 10,
            tolerance: 1e-10,
            continuation_steps: 5,
        };
        let mut seen = Vec::new();
        let results = solve_with_continuation(1, &config, |_, alpha| {
            seen.push(alpha);
            Ok(DVector::zeros(1))
        })
        .unwrap();

        assert!(results.converged);
        assert_eq!(results.steps.len(), 6);
        assert_eq!(results.steps[0].activation, 0.0);
        assert_eq!(results.steps[5].activation, 1.0);
        assert!(seen.contains(&0.4));
    }

    #[test]
    fn iterate_carries_across_continuation_steps() {
        // Each step solves x = alpha exactly in one iteration; the iterate
        // entering step k is the converged value of step k-1.
        let config = NewtonConfig {
            max_iterations: 10,
            tolerance: 1e-12,
            continuation_steps: 4,
        };
        let results = solve_with_continuation(1, &config, |x, alpha| {
            Ok(DVector::from_vec(vec![alpha - x[0]]))
        })
        .unwrap();

        assert!(results.converged);
        assert!((results.solution[0] - 1.0).abs() < 1e-10);
        assert!(results.total_iterations() >= results.steps.len());
    }
}
