//! Lid-driven cavity scenario for the creeping-flow model.

use fem_model::{BoundaryCondition, ElementOrder, MeshConfig};
use fem_solver::{FeaModel, MeshSource, ModelKind, Solution, SolveOptions};

const NEX: usize = 12;
const NEY: usize = 6;
const NX: usize = 2 * NEX + 1;
const NY: usize = 2 * NEY + 1;
const NV: usize = NX * NY;

/// Velocity nodes of a 12x6 quadratic cavity on [0,4] x [0,2]: all walls at
/// rest, the lid moving with (1, 0). Conditions apply in ascending tag
/// order, so the top-left corner follows the lid (tag 2 after tag 1) and
/// the top-right corner follows the right wall (tag 3 after tag 2).
fn cavity() -> Solution {
    let mut model = FeaModel::new();
    model
        .set_model(ModelKind::CreepingFlow)
        .set_mesh(MeshSource::Structured(MeshConfig::two_dimensional(
            ElementOrder::Quadratic,
            NEX,
            NEY,
            4.0,
            2.0,
        )));
    for key in ["0", "1", "3"] {
        model
            .add_boundary_condition(key, BoundaryCondition::ConstantVelocity(0.0, 0.0))
            .unwrap();
    }
    model
        .add_boundary_condition("2", BoundaryCondition::ConstantVelocity(1.0, 0.0))
        .unwrap();
    model.solve(SolveOptions::default()).unwrap()
}

#[test]
fn pinned_pressure_dof_is_zero() {
    // No natural boundary anywhere: the solver must remove the pressure
    // null space by pinning pressure DOF 0.
    let solution = cavity();
    assert_eq!(solution.values.len(), 2 * NV + (NEX + 1) * (NEY + 1));
    assert!(
        solution.values[2 * NV].abs() < 1e-9,
        "pinned pressure = {}",
        solution.values[2 * NV]
    );
}

#[test]
fn lid_and_wall_velocities_are_prescribed() {
    let solution = cavity();

    for node in 0..NV {
        let x = solution.nodes_x[node];
        let y = solution.nodes_y[node];
        let ux = solution.values[node];
        let uy = solution.values[NV + node];

        let on_lid = (y - 2.0).abs() < 1e-12 && x < 4.0 - 1e-12;
        let on_wall = y.abs() < 1e-12 || (x - 4.0).abs() < 1e-12 || (x.abs() < 1e-12 && !on_lid);

        if on_lid {
            assert!(
                (ux - 1.0).abs() < 1e-9 && uy.abs() < 1e-9,
                "lid node at ({x}, {y}): ({ux}, {uy})"
            );
        } else if on_wall {
            assert!(
                ux.abs() < 1e-9 && uy.abs() < 1e-9,
                "wall node at ({x}, {y}): ({ux}, {uy})"
            );
        }
    }
}

#[test]
fn interior_flow_is_bounded_and_active() {
    let solution = cavity();

    for (i, &v) in solution.values.iter().enumerate() {
        assert!(v.is_finite(), "DOF {i} is not finite");
    }
    // Velocities stay on the order of the lid speed.
    let max_velocity = solution
        .values
        .rows(0, 2 * NV)
        .abs()
        .max();
    assert!(max_velocity <= 2.0, "velocity magnitude {max_velocity}");

    // The lid drags the fluid: somewhere strictly inside the cavity the
    // horizontal velocity is clearly nonzero.
    let mut interior_max: f64 = 0.0;
    for node in 0..NV {
        let x = solution.nodes_x[node];
        let y = solution.nodes_y[node];
        if x > 0.5 && x < 3.5 && y > 0.5 && y < 1.9 {
            interior_max = interior_max.max(solution.values[node].abs());
        }
    }
    assert!(
        interior_max > 1e-3,
        "interior stayed at rest (max |ux| = {interior_max})"
    );
}
