//! Steady heat conduction (Poisson-type) assembly.
//!
//! The weak form of ∇·(∇u) = 0 is assembled with a *negated* stiffness:
//!
//! J[gi][gj] += −w · det · (∂Ni/∂x · ∂Nj/∂x [+ ∂Ni/∂y · ∂Nj/∂y])
//!
//! The residual stays zero until boundary work; the convection (Robin)
//! contributions of the boundary module are signed to match.

use fem_model::Dimension;

use crate::assembly::{LocalSystem, scatter};
use crate::error::Result;
use crate::mapping::physical_gradients;
use crate::prep::{FeSpace, GlobalSystem};

/// Heat conduction assembly kernel
pub struct HeatAssembler;

impl HeatAssembler {
    /// Assemble the full global system.
    pub fn assemble(&self, space: &FeSpace, system: &mut GlobalSystem) -> Result<()> {
        for element in 0..space.mesh.total_elements() {
            let local = self.assemble_element(space, element)?;
            scatter(system, space.mesh.element_nodes(element), &local);
        }
        Ok(())
    }

    /// Local matrix and residual of one element.
    pub fn assemble_element(&self, space: &FeSpace, element: usize) -> Result<LocalSystem> {
        let (xs, ys) = space.mesh.element_coordinates(element);
        let nodes = space.reference.node_count();
        let two_d = space.mesh.dimension == Dimension::TwoD;
        let mut local = LocalSystem::zeros(nodes);

        for gp in &space.rule {
            let basis = space.reference.eval(gp.xi, gp.eta);
            let mapped = physical_gradients(element, space.mesh.dimension, &xs, &ys, &basis)?;
            for i in 0..nodes {
                for j in 0..nodes {
                    let mut flux = mapped.dn_dx[i] * mapped.dn_dx[j];
                    if two_d {
                        flux += mapped.dn_dy[i] * mapped.dn_dy[j];
                    }
                    local.matrix[(i, j)] -= gp.weight * mapped.det * flux;
                }
            }
        }
        Ok(local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fem_model::{ElementOrder, MeshConfig, StructuredMesh};

    fn space_1d(elements: usize) -> FeSpace {
        let config = MeshConfig::one_dimensional(ElementOrder::Linear, elements, 1.0);
        FeSpace::new(StructuredMesh::generate(&config).unwrap()).unwrap()
    }

    #[test]
    fn one_dimensional_element_matches_the_analytic_stiffness() {
        // A linear element of length h contributes -1/h * [[1,-1],[-1,1]].
        let space = space_1d(4);
        let local = HeatAssembler.assemble_element(&space, 0).unwrap();

        let h = 0.25;
        assert!((local.matrix[(0, 0)] + 1.0 / h).abs() < 1e-12);
        assert!((local.matrix[(0, 1)] - 1.0 / h).abs() < 1e-12);
        assert!((local.matrix[(1, 0)] - 1.0 / h).abs() < 1e-12);
        assert!((local.matrix[(1, 1)] + 1.0 / h).abs() < 1e-12);
        assert!(local.residual.iter().all(|&r| r == 0.0));
    }

    #[test]
    fn global_rows_of_interior_nodes_sum_to_zero() {
        // The stiffness of a Laplacian annihilates constant fields.
        let config = MeshConfig::two_dimensional(ElementOrder::Quadratic, 3, 2, 3.0, 2.0);
        let space = FeSpace::new(StructuredMesh::generate(&config).unwrap()).unwrap();
        let mut system = space.allocate_system(space.mesh.total_nodes());
        HeatAssembler.assemble(&space, &mut system).unwrap();

        for row in 0..system.num_dofs() {
            let sum: f64 = (0..system.num_dofs())
                .map(|col| system.jacobian[(row, col)])
                .sum();
            assert!(sum.abs() < 1e-10, "row {row} sums to {sum}");
        }
    }

    #[test]
    fn assembled_matrix_is_symmetric() {
        let config = MeshConfig::two_dimensional(ElementOrder::Quadratic, 2, 2, 1.0, 1.0);
        let space = FeSpace::new(StructuredMesh::generate(&config).unwrap()).unwrap();
        let mut system = space.allocate_system(space.mesh.total_nodes());
        HeatAssembler.assemble(&space, &mut system).unwrap();

        let n = system.num_dofs();
        for i in 0..n {
            for j in (i + 1)..n {
                let diff = (system.jacobian[(i, j)] - system.jacobian[(j, i)]).abs();
                assert!(diff < 1e-12, "asymmetry at ({i}, {j}): {diff}");
            }
        }
    }

    #[test]
    fn diagonal_is_negative_by_convention() {
        let space = space_1d(4);
        let mut system = space.allocate_system(space.mesh.total_nodes());
        HeatAssembler.assemble(&space, &mut system).unwrap();
        for i in 0..system.num_dofs() {
            assert!(system.jacobian[(i, i)] < 0.0);
        }
    }
}
