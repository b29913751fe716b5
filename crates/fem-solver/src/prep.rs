//! FE preparation: mesh, basis, and quadrature bundled for assembly.
//!
//! `FeSpace` owns the generated mesh together with the matching reference
//! element and volume quadrature rule, and hands out the per-solve global
//! system allocation. The global Jacobian and residual live exactly as long
//! as one solve call.

use nalgebra::{DMatrix, DVector};

use fem_model::MeshData;

use crate::basis::ReferenceElement;
use crate::error::Result;
use crate::quadrature::{GaussPoint, volume_rule};

/// Mesh data combined with the reference element and quadrature rule
#[derive(Debug, Clone)]
pub struct FeSpace {
    /// Generated or imported mesh
    pub mesh: MeshData,
    /// Reference element matching the mesh dimension and order
    pub reference: ReferenceElement,
    /// Volume quadrature rule
    pub rule: Vec<GaussPoint>,
}

impl FeSpace {
    /// Bundle a validated mesh with its reference machinery.
    pub fn new(mesh: MeshData) -> Result<Self> {
        mesh.validate()?;
        let reference = ReferenceElement::new(mesh.dimension, mesh.element_order);
        let rule = volume_rule(mesh.dimension, mesh.element_order);
        Ok(Self {
            mesh,
            reference,
            rule,
        })
    }

    /// Allocate a zeroed global system of `num_dofs` unknowns.
    pub fn allocate_system(&self, num_dofs: usize) -> GlobalSystem {
        GlobalSystem::new(num_dofs)
    }
}

/// Dense global Jacobian matrix and residual vector
#[derive(Debug, Clone)]
pub struct GlobalSystem {
    /// System Jacobian (stiffness matrix for linear problems)
    pub jacobian: DMatrix<f64>,
    /// Residual vector (right-hand side for linear problems)
    pub residual: DVector<f64>,
}

impl GlobalSystem {
    /// Create a zeroed system.
    pub fn new(num_dofs: usize) -> Self {
        Self {
            jacobian: DMatrix::zeros(num_dofs, num_dofs),
            residual: DVector::zeros(num_dofs),
        }
    }

    /// Number of unknowns.
    pub fn num_dofs(&self) -> usize {
        self.residual.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fem_model::{ElementOrder, MeshConfig, StructuredMesh};

    #[test]
    fn space_matches_mesh_order() {
        let config = MeshConfig::two_dimensional(ElementOrder::Quadratic, 2, 2, 1.0, 1.0);
        let mesh = StructuredMesh::generate(&config).unwrap();
        let space = FeSpace::new(mesh).unwrap();

        assert_eq!(space.reference.node_count(), 9);
        assert_eq!(space.rule.len(), 9);
    }

    #[test]
    fn allocated_system_is_zeroed() {
        let config = MeshConfig::one_dimensional(ElementOrder::Linear, 4, 1.0);
        let mesh = StructuredMesh::generate(&config).unwrap();
        let space = FeSpace::new(mesh).unwrap();

        let system = space.allocate_system(space.mesh.total_nodes());
        assert_eq!(system.num_dofs(), 5);
        assert_eq!(system.jacobian.nrows(), 5);
        assert!(system.jacobian.iter().all(|&v| v == 0.0));
        assert!(system.residual.iter().all(|&v| v == 0.0));
    }
}
