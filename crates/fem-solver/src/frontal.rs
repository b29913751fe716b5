//! Frontal elimination solver (Irons' method).
//!
//! Instead of assembling the full global matrix, the solver interleaves
//! element assembly with Gaussian elimination, keeping only an active
//! *front* of rows and columns wide enough to cover the elements assembled
//! so far. Node indices are 1-based throughout, matching the nodal
//! numbering.
//!
//! The "last appearance" of each node in the element stream is sign-encoded
//! in a working copy of the nodal numbering: a prefront pass scans elements
//! in reverse and negates the first occurrence it sees. A negative tag in
//! the active front therefore means the row/column is fully summed and
//! eligible for elimination.
//!
//! Eliminated rows stream onto a tape that is written forward and read
//! backward during back-substitution; the tape is pre-sized from the
//! element count and peak front width, and overflowing it is an explicit
//! error, never a resize.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::assembly::LocalSystem;
use crate::boundary::NodalConstraints;
use crate::error::{Result, SolverError};
use crate::prep::FeSpace;

/// Frontal solver configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrontalConfig {
    /// Upper bound on the active front width; `None` accepts whatever the
    /// prefront pass computes
    pub max_front_width: Option<usize>,
    /// Below this pivot magnitude the fully-summed submatrix is searched for
    /// a better candidate
    pub pivot_search_threshold: f64,
    /// Below this magnitude the pivot counts as singular
    pub pivot_minimum: f64,
}

impl Default for FrontalConfig {
    fn default() -> Self {
        Self {
            max_front_width: None,
            pivot_search_threshold: 1e-4,
            pivot_minimum: 1e-10,
        }
    }
}

/// One eliminated row on the tape: the equation node, the pivot position,
/// the divided multipliers (pivot slot zeroed), and the column tags at
/// elimination time.
#[derive(Debug, Clone)]
struct EliminatedRow {
    equation_node: usize,
    pivot_column: usize,
    multipliers: Vec<f64>,
    tags: Vec<i64>,
}

/// Working state of one frontal solve
struct Front {
    /// Dense front matrix, `width × width`
    eq: DMatrix<f64>,
    /// Column tags (signed node indices)
    lhed: Vec<i64>,
    /// Row tags (signed node indices)
    khed: Vec<i64>,
    /// Global right-hand side, indexed by node
    rhs: DVector<f64>,
    /// Per-node constraint codes (0 free, 1 pending, 2 applied)
    ncod: Vec<u8>,
    /// Prescribed values for constrained nodes
    values: Vec<f64>,
    /// Elimination tape
    tape: Vec<EliminatedRow>,
    tape_capacity: usize,
    width: usize,
}

/// Frontal elimination solver bound to one FE space
pub struct FrontalSolver<'a> {
    space: &'a FeSpace,
    config: FrontalConfig,
}

impl<'a> FrontalSolver<'a> {
    pub fn new(space: &'a FeSpace, config: FrontalConfig) -> Self {
        Self { space, config }
    }

    /// Solve the system whose element contributions come from
    /// `element_system(e)`, under the given Dirichlet constraint table.
    ///
    /// The closure must fold any Robin side contributions into the local
    /// matrices; Dirichlet constraints are handled here when their rows
    /// become fully summed.
    pub fn solve<F>(
        &self,
        constraints: &NodalConstraints,
        mut element_system: F,
    ) -> Result<DVector<f64>>
    where
        F: FnMut(usize) -> Result<LocalSystem>,
    {
        let mesh = &self.space.mesh;
        let total_nodes = mesh.total_nodes();
        let total_elements = mesh.total_elements();

        let (signed_nop, peak_width) = prefront(mesh.nop.as_slice(), total_nodes);
        if let Some(max) = self.config.max_front_width
            && peak_width > max
        {
            return Err(SolverError::FrontExceeded {
                width: peak_width,
                max,
            });
        }
        debug!(peak_width, total_elements, "prefront finished");

        let mut front = Front {
            eq: DMatrix::zeros(peak_width, peak_width),
            lhed: Vec::with_capacity(peak_width),
            khed: Vec::with_capacity(peak_width),
            rhs: DVector::zeros(total_nodes),
            ncod: constraints.code.clone(),
            values: constraints.value.clone(),
            tape: Vec::new(),
            tape_capacity: total_elements * peak_width * 2,
            width: peak_width,
        };

        for element in 0..total_elements {
            let local = element_system(element)?;
            let tags = &signed_nop[element];

            // Find or allocate front positions for every local node.
            let mut row_dest = Vec::with_capacity(tags.len());
            let mut col_dest = Vec::with_capacity(tags.len());
            for &tag in tags {
                col_dest.push(front_position(&mut front.lhed, tag, front.width)?);
                row_dest.push(front_position(&mut front.khed, tag, front.width)?);
            }

            // Scatter the local matrix into the front and the local residual
            // into the global right-hand side.
            for (a, &ra) in row_dest.iter().enumerate() {
                let node = tags[a].unsigned_abs() as usize;
                front.rhs[node - 1] += local.residual[a];
                for (b, &cb) in col_dest.iter().enumerate() {
                    front.eq[(ra, cb)] += local.matrix[(a, b)];
                }
            }

            self.apply_ready_constraints(&mut front);
            self.eliminate_ready(&mut front)?;
        }

        if !front.khed.is_empty() {
            return Err(SolverError::NoSummedRows {
                element: total_elements - 1,
            });
        }

        Ok(back_substitute(&front, total_nodes))
    }

    /// Replace fully-summed Dirichlet rows by their constraint equation:
    /// zero row, unit entry in the node's own column, prescribed value on
    /// the right-hand side.
    fn apply_ready_constraints(&self, front: &mut Front) {
        for row in 0..front.khed.len() {
            let tag = front.khed[row];
            if tag >= 0 {
                continue;
            }
            let node = tag.unsigned_abs() as usize;
            if front.ncod[node - 1] != 1 {
                continue;
            }
            let col = front
                .lhed
                .iter()
                .position(|t| t.unsigned_abs() as usize == node)
                .expect("a fully summed row keeps its column in the front");
            for c in 0..front.lhed.len() {
                front.eq[(row, c)] = 0.0;
            }
            front.eq[(row, col)] = 1.0;
            front.rhs[node - 1] = front.values[node - 1];
            front.ncod[node - 1] = 2;
        }
    }

    /// Eliminate every fully-summed row/column pair currently in the front.
    fn eliminate_ready(&self, front: &mut Front) -> Result<()> {
        loop {
            // First fully-summed row, paired with the same node's column.
            let Some(mut pivot_row) = front.khed.iter().position(|&t| t < 0) else {
                break;
            };
            let node = front.khed[pivot_row].unsigned_abs() as usize;
            let mut pivot_col = front
                .lhed
                .iter()
                .position(|t| t.unsigned_abs() as usize == node)
                .expect("a fully summed row keeps its column in the front");
            let mut pivot = front.eq[(pivot_row, pivot_col)];

            // Small pivot: search the fully-summed submatrix for the
            // largest-magnitude candidate.
            if pivot.abs() < self.config.pivot_search_threshold {
                for (r, &rt) in front.khed.iter().enumerate() {
                    if rt >= 0 {
                        continue;
                    }
                    for (c, &ct) in front.lhed.iter().enumerate() {
                        if ct >= 0 {
                            continue;
                        }
                        if front.eq[(r, c)].abs() > pivot.abs() {
                            pivot = front.eq[(r, c)];
                            pivot_row = r;
                            pivot_col = c;
                        }
                    }
                }
            }
            if pivot.abs() < self.config.pivot_minimum {
                return Err(SolverError::PivotTooSmall {
                    row: front.khed[pivot_row].unsigned_abs() as usize,
                    col: front.lhed[pivot_col].unsigned_abs() as usize,
                    value: pivot,
                });
            }

            self.eliminate(front, pivot_row, pivot_col, pivot)?;
        }
        Ok(())
    }

    /// One elimination step: divide, update, record, compact.
    fn eliminate(
        &self,
        front: &mut Front,
        pivot_row: usize,
        pivot_col: usize,
        pivot: f64,
    ) -> Result<()> {
        let width = front.lhed.len();
        let rows = front.khed.len();
        let equation_node = front.khed[pivot_row].unsigned_abs() as usize;

        for c in 0..width {
            front.eq[(pivot_row, c)] /= pivot;
        }
        front.rhs[equation_node - 1] /= pivot;

        for r in 0..rows {
            if r == pivot_row {
                continue;
            }
            let factor = front.eq[(r, pivot_col)];
            if factor == 0.0 {
                continue;
            }
            for c in 0..width {
                front.eq[(r, c)] -= factor * front.eq[(pivot_row, c)];
            }
            let row_node = front.khed[r].unsigned_abs() as usize;
            front.rhs[row_node - 1] -= factor * front.rhs[equation_node - 1];
        }

        if front.tape.len() >= front.tape_capacity {
            return Err(SolverError::FrontExceeded {
                width: front.tape.len() + 1,
                max: front.tape_capacity,
            });
        }
        let mut multipliers: Vec<f64> = (0..width).map(|c| front.eq[(pivot_row, c)]).collect();
        multipliers[pivot_col] = 0.0;
        front.tape.push(EliminatedRow {
            equation_node,
            pivot_column: pivot_col,
            multipliers,
            tags: front.lhed.clone(),
        });

        // Compact the front: close the pivot row and column.
        for r in pivot_row..rows - 1 {
            for c in 0..width {
                front.eq[(r, c)] = front.eq[(r + 1, c)];
            }
        }
        for c in 0..width {
            front.eq[(rows - 1, c)] = 0.0;
        }
        front.khed.remove(pivot_row);

        let rows_after = rows - 1;
        for c in pivot_col..width - 1 {
            for r in 0..rows_after {
                front.eq[(r, c)] = front.eq[(r, c + 1)];
            }
        }
        for r in 0..rows_after {
            front.eq[(r, width - 1)] = 0.0;
        }
        front.lhed.remove(pivot_col);

        Ok(())
    }
}

/// Reverse-scan the element stream and negate each node's last appearance;
/// also computes the exact peak front width.
fn prefront(nop: &[Vec<usize>], total_nodes: usize) -> (Vec<Vec<i64>>, usize) {
    let mut signed: Vec<Vec<i64>> = nop
        .iter()
        .map(|nodes| nodes.iter().map(|&n| n as i64).collect())
        .collect();

    let mut seen = vec![false; total_nodes];
    for element in signed.iter_mut().rev() {
        for tag in element.iter_mut() {
            let node = *tag as usize;
            if !seen[node - 1] {
                seen[node - 1] = true;
                *tag = -*tag;
            }
        }
    }

    let mut active = vec![false; total_nodes];
    let mut width = 0usize;
    let mut peak = 0usize;
    for element in &signed {
        for &tag in element {
            let node = tag.unsigned_abs() as usize;
            if !active[node - 1] {
                active[node - 1] = true;
                width += 1;
            }
        }
        peak = peak.max(width);
        for &tag in element {
            if tag < 0 {
                width -= 1;
            }
        }
    }
    (signed, peak)
}

/// Find a tag's position in a front, or append it. A negative incoming tag
/// marks the position fully summed.
fn front_position(front: &mut Vec<i64>, tag: i64, capacity: usize) -> Result<usize> {
    let node = tag.unsigned_abs();
    if let Some(pos) = front.iter().position(|t| t.unsigned_abs() == node) {
        if tag < 0 {
            front[pos] = tag;
        }
        Ok(pos)
    } else {
        if front.len() >= capacity {
            return Err(SolverError::FrontExceeded {
                width: front.len() + 1,
                max: capacity,
            });
        }
        front.push(tag);
        Ok(front.len() - 1)
    }
}

/// Unwind the tape in reverse. Constrained nodes take their prescribed
/// values outright and are never recomputed.
fn back_substitute(front: &Front, total_nodes: usize) -> DVector<f64> {
    let mut solution = DVector::zeros(total_nodes);
    let mut solved = vec![false; total_nodes];
    for i in 0..total_nodes {
        if front.ncod[i] > 0 {
            solution[i] = front.values[i];
            solved[i] = true;
        }
    }

    for record in front.tape.iter().rev() {
        let released = record.tags[record.pivot_column].unsigned_abs() as usize;
        if solved[released - 1] {
            continue;
        }
        let mut value = front.rhs[record.equation_node - 1];
        for (l, &tag) in record.tags.iter().enumerate() {
            let node = tag.unsigned_abs() as usize;
            value -= record.multipliers[l] * solution[node - 1];
        }
        solution[released - 1] = value;
        solved[released - 1] = true;
    }
    solution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::heat::HeatAssembler;
    use crate::boundary::dirichlet_constraints;
    use crate::prep::FeSpace;
    use fem_model::{BoundaryCondition, ElementOrder, MeshConfig, StructuredMesh};
    use std::collections::BTreeMap;

    fn heat_space_1d(elements: usize) -> FeSpace {
        let config = MeshConfig::one_dimensional(ElementOrder::Linear, elements, 1.0);
        FeSpace::new(StructuredMesh::generate(&config).unwrap()).unwrap()
    }

    #[test]
    fn prefront_negates_last_appearances() {
        // Two 1D elements sharing node 2: nodes 1 and 2 last appear where
        // they last occur in the forward stream.
        let nop = vec![vec![1, 2], vec![2, 3]];
        let (signed, peak) = prefront(&nop, 3);

        assert_eq!(signed[0], vec![-1, 2]);
        assert_eq!(signed[1], vec![-2, -3]);
        assert_eq!(peak, 2);
    }

    #[test]
    fn peak_width_tracks_the_2d_column_band() {
        let config = MeshConfig::two_dimensional(ElementOrder::Linear, 3, 3, 1.0, 1.0);
        let mesh = StructuredMesh::generate(&config).unwrap();
        let (_, peak) = prefront(&mesh.nop, mesh.total_nodes());

        // The active front never exceeds two node columns of the grid.
        assert!(peak <= 2 * 4, "peak width {peak}");
        assert!(peak >= 5);
    }

    #[test]
    fn solves_the_1d_conduction_problem() {
        let space = heat_space_1d(10);
        let mut conditions = BTreeMap::new();
        conditions.insert(0, BoundaryCondition::ConstantTemp(100.0));
        conditions.insert(1, BoundaryCondition::ConstantTemp(0.0));
        let constraints = dirichlet_constraints(&space, &conditions, None).unwrap();

        let solver = FrontalSolver::new(&space, FrontalConfig::default());
        let solution = solver
            .solve(&constraints, |e| HeatAssembler.assemble_element(&space, e))
            .unwrap();

        for (i, &x) in space.mesh.nodes_x.iter().enumerate() {
            let expected = 100.0 * (1.0 - x);
            assert!(
                (solution[i] - expected).abs() < 1e-10,
                "node {i}: {} vs {expected}",
                solution[i]
            );
        }
    }

    #[test]
    fn pure_neumann_system_hits_a_tiny_pivot() {
        // Without any Dirichlet row the conduction matrix is singular; the
        // last elimination cannot find a usable pivot.
        let space = heat_space_1d(4);
        let constraints = NodalConstraints {
            code: vec![0; space.mesh.total_nodes()],
            value: vec![0.0; space.mesh.total_nodes()],
        };

        let solver = FrontalSolver::new(&space, FrontalConfig::default());
        let result = solver.solve(&constraints, |e| HeatAssembler.assemble_element(&space, e));
        assert!(matches!(result, Err(SolverError::PivotTooSmall { .. })));
    }

    #[test]
    fn configured_front_bound_is_enforced() {
        let config = MeshConfig::two_dimensional(ElementOrder::Quadratic, 4, 4, 1.0, 1.0);
        let space = FeSpace::new(StructuredMesh::generate(&config).unwrap()).unwrap();
        let constraints = NodalConstraints {
            code: vec![0; space.mesh.total_nodes()],
            value: vec![0.0; space.mesh.total_nodes()],
        };

        let solver = FrontalSolver::new(
            &space,
            FrontalConfig {
                max_front_width: Some(4),
                ..FrontalConfig::default()
            },
        );
        let result = solver.solve(&constraints, |e| HeatAssembler.assemble_element(&space, e));
        assert!(matches!(result, Err(SolverError::FrontExceeded { .. })));
    }

    #[test]
    fn dirichlet_values_pass_through_unchanged() {
        let space = heat_space_1d(6);
        let mut conditions = BTreeMap::new();
        conditions.insert(0, BoundaryCondition::ConstantValue(-2.5));
        conditions.insert(1, BoundaryCondition::ConstantValue(7.25));
        let constraints = dirichlet_constraints(&space, &conditions, None).unwrap();

        let solver = FrontalSolver::new(&space, FrontalConfig::default());
        let solution = solver
            .solve(&constraints, |e| HeatAssembler.assemble_element(&space, e))
            .unwrap();

        let n = space.mesh.total_nodes();
        assert_eq!(solution[0], -2.5);
        assert_eq!(solution[n - 1], 7.25);
        // Interior follows the linear profile between the two ends.
        for i in 1..n - 1 {
            let x = space.mesh.nodes_x[i];
            assert!((solution[i] - (-2.5 + 9.75 * x)).abs() < 1e-10);
        }
    }
}
