//! Boundary-condition application.
//!
//! Applied after volume assembly and before the linear solve. Robin
//! (convection) sides are integrated first, then Dirichlet rows are
//! eliminated — Dirichlet wins when both land on the same row. Dirichlet
//! sides apply in ascending tag order, so the last tag wins on shared corner
//! nodes; both the matrix path and the frontal constraint table use the same
//! traversal to keep corners identical across solvers.
//!
//! After Dirichlet application every constrained row r satisfies
//! J[r][j] = δ_rj with the prescribed value on the right-hand side.

use std::collections::BTreeMap;

use nalgebra::DVector;
use tracing::warn;

use fem_model::{BoundaryCondition, Dimension, ElementSide};

use crate::assembly::stokes::FlowLayout;
use crate::assembly::{LocalSystem, scatter};
use crate::error::{Result, SolverError};
use crate::prep::{FeSpace, GlobalSystem};
use crate::quadrature::line_rule;

/// Unknown layout the conditions apply to
#[derive(Debug, Clone, Copy)]
pub enum DofLayout<'a> {
    /// One scalar unknown per node
    Scalar,
    /// Mixed velocity/pressure layout of the flow models
    VelocityPressure(&'a FlowLayout),
}

/// Per-node Dirichlet table used by the frontal solver: `code` is 0 (free),
/// 1 (constrained, pending) or 2 (applied); `value` holds the prescribed
/// values for constrained nodes.
#[derive(Debug, Clone)]
pub struct NodalConstraints {
    pub code: Vec<u8>,
    pub value: Vec<f64>,
}

/// Apply all boundary conditions to an assembled system.
///
/// `current` carries the Newton iterate on the nonlinear path; constrained
/// rows then prescribe `value − current[r]` so the converged iterate meets
/// the constraint.
pub fn apply_boundary_conditions(
    space: &FeSpace,
    conditions: &BTreeMap<usize, BoundaryCondition>,
    layout: DofLayout,
    system: &mut GlobalSystem,
    current: Option<&DVector<f64>>,
) -> Result<()> {
    // Robin first.
    for (&tag, condition) in conditions {
        if let BoundaryCondition::Convection { h, t_inf } = condition {
            if matches!(layout, DofLayout::VelocityPressure(_)) {
                warn!(tag, "convection condition on a flow boundary, skipped");
                continue;
            }
            for entry in boundary_entries(space, tag)? {
                let local = robin_side_contribution(space, entry.element, entry.side, *h, *t_inf)?;
                scatter(system, space.mesh.element_nodes(entry.element), &local);
            }
        }
    }

    // Then Dirichlet, ascending tag order.
    for (&tag, condition) in conditions {
        match condition {
            BoundaryCondition::ConstantValue(value) | BoundaryCondition::ConstantTemp(value) => {
                if matches!(layout, DofLayout::VelocityPressure(_)) {
                    warn!(tag, "scalar Dirichlet condition on a flow boundary, skipped");
                    continue;
                }
                for node in boundary_nodes(space, tag)? {
                    let row = node - 1;
                    apply_dirichlet_row(system, row, *value, current);
                }
            }
            BoundaryCondition::ConstantVelocity(u, v) => {
                let DofLayout::VelocityPressure(flow) = layout else {
                    warn!(tag, "velocity condition on a scalar problem, skipped");
                    continue;
                };
                for node in boundary_nodes(space, tag)? {
                    apply_dirichlet_row(system, flow.ux(node), *u, current);
                    apply_dirichlet_row(system, flow.uy(node), *v, current);
                }
            }
            BoundaryCondition::Convection { .. }
            | BoundaryCondition::StressFree
            | BoundaryCondition::ZeroGradient => {}
        }
    }

    // A flow problem with no natural boundary has a pressure null space;
    // pin pressure DOF 0 to remove it.
    if let DofLayout::VelocityPressure(flow) = layout {
        let has_natural = conditions.values().any(BoundaryCondition::is_natural);
        if !has_natural {
            apply_dirichlet_row(system, flow.pressure_pin_row(), 0.0, current);
        }
    }

    Ok(())
}

/// Eliminate one Dirichlet row: zero it, unit diagonal, prescribed value on
/// the right-hand side (incremental against `current` when given).
pub fn apply_dirichlet_row(
    system: &mut GlobalSystem,
    row: usize,
    value: f64,
    current: Option<&DVector<f64>>,
) {
    let n = system.num_dofs();
    for col in 0..n {
        system.jacobian[(row, col)] = 0.0;
    }
    system.jacobian[(row, row)] = 1.0;
    system.residual[row] = match current {
        Some(x) => value - x[row],
        None => value,
    };
}

/// Robin (convection) contribution of one element side, as a local system
/// shaped like the volume kernels so both assembly paths can share it.
pub fn robin_side_contribution(
    space: &FeSpace,
    element: usize,
    side: ElementSide,
    h: f64,
    t_inf: f64,
) -> Result<LocalSystem> {
    let nodes = space.reference.node_count();
    let mut local = LocalSystem::zeros(nodes);
    let order = space.mesh.element_order;

    match space.mesh.dimension {
        Dimension::OneD => {
            // Point contribution at the boundary node.
            let l = side.local_nodes(Dimension::OneD, order)[0];
            local.matrix[(l, l)] += h;
            local.residual[l] += -h * t_inf;
        }
        Dimension::TwoD => {
            let (xs, ys) = space.mesh.element_coordinates(element);
            let side_locals = side.local_nodes(Dimension::TwoD, order);
            let (points, weights) = line_rule(order);

            for (&g, &wg) in points.iter().zip(&weights) {
                let (xi, eta) = side.natural_point(g);
                let basis = space.reference.eval(xi, eta);

                // Tangent length along the side: ξ-derivatives on horizontal
                // sides, η-derivatives on vertical ones.
                let (mut tx, mut ty) = (0.0, 0.0);
                for n in 0..nodes {
                    let d = if side.is_horizontal() {
                        basis.d_xi[n]
                    } else {
                        basis.d_eta[n]
                    };
                    tx += xs[n] * d;
                    ty += ys[n] * d;
                }
                let tangent = (tx * tx + ty * ty).sqrt();

                for &i in side_locals {
                    local.residual[i] += -wg * tangent * basis.n[i] * h * t_inf;
                    for &j in side_locals {
                        local.matrix[(i, j)] += -wg * tangent * basis.n[i] * basis.n[j] * h;
                    }
                }
            }
        }
    }
    Ok(local)
}

/// Dirichlet table for the frontal path (scalar layout only). Ascending tag
/// order, last write wins — identical to the matrix path.
pub fn dirichlet_constraints(
    space: &FeSpace,
    conditions: &BTreeMap<usize, BoundaryCondition>,
    current: Option<&DVector<f64>>,
) -> Result<NodalConstraints> {
    let n = space.mesh.total_nodes();
    let mut constraints = NodalConstraints {
        code: vec![0; n],
        value: vec![0.0; n],
    };
    for (&tag, condition) in conditions {
        let Some(value) = condition.scalar_value() else {
            continue;
        };
        for node in boundary_nodes(space, tag)? {
            constraints.code[node - 1] = 1;
            constraints.value[node - 1] = match current {
                Some(x) => value - x[node - 1],
                None => value,
            };
        }
    }
    Ok(constraints)
}

/// Robin sides grouped per element, for folding into the frontal path's
/// local matrices.
pub fn robin_element_table(
    space: &FeSpace,
    conditions: &BTreeMap<usize, BoundaryCondition>,
) -> Result<BTreeMap<usize, Vec<(ElementSide, f64, f64)>>> {
    let mut table: BTreeMap<usize, Vec<(ElementSide, f64, f64)>> = BTreeMap::new();
    for (&tag, condition) in conditions {
        if let BoundaryCondition::Convection { h, t_inf } = condition {
            for entry in boundary_entries(space, tag)? {
                table
                    .entry(entry.element)
                    .or_default()
                    .push((entry.side, *h, *t_inf));
            }
        }
    }
    Ok(table)
}

fn boundary_entries<'a>(
    space: &'a FeSpace,
    tag: usize,
) -> Result<&'a [fem_model::BoundaryElement]> {
    space
        .mesh
        .boundary_elements
        .get(&tag)
        .map(Vec::as_slice)
        .ok_or_else(|| {
            SolverError::Configuration(format!("boundary tag {tag} does not exist in the mesh"))
        })
}

/// All 1-based nodes on a boundary tag, in side-table order.
fn boundary_nodes(space: &FeSpace, tag: usize) -> Result<Vec<usize>> {
    let mut nodes = Vec::new();
    for entry in boundary_entries(space, tag)? {
        let locals = entry
            .side
            .local_nodes(space.mesh.dimension, space.mesh.element_order);
        for &l in locals {
            nodes.push(space.mesh.element_nodes(entry.element)[l]);
        }
    }
    Ok(nodes)
}
