//! Element assembly kernels, one module per physics model.
//!
//! Every kernel offers the same two shapes of work:
//! - a *matrix* form that loops all elements and scatter-adds local
//!   contributions into the dense global system, and
//! - an *element* form producing one element's local matrix and residual,
//!   which the frontal solver interleaves with elimination.
//!
//! Element order is deterministic (index 0 upward); each element writes its
//! local system first and scatters afterwards, so no global state is shared
//! mid-element.

pub mod eikonal;
pub mod general_pde;
pub mod heat;
pub mod stokes;

use nalgebra::{DMatrix, DVector};

use crate::prep::GlobalSystem;

/// One element's local matrix and residual
#[derive(Debug, Clone)]
pub struct LocalSystem {
    pub matrix: DMatrix<f64>,
    pub residual: DVector<f64>,
}

impl LocalSystem {
    /// Zeroed local system for an element with `nodes` nodes.
    pub fn zeros(nodes: usize) -> Self {
        Self {
            matrix: DMatrix::zeros(nodes, nodes),
            residual: DVector::zeros(nodes),
        }
    }
}

/// Scatter-add a local system into the global one, using the element's
/// 1-based nodal numbering for scalar problems (global row = node − 1).
pub fn scatter(system: &mut GlobalSystem, nodes: &[usize], local: &LocalSystem) {
    for (a, &node_a) in nodes.iter().enumerate() {
        let ga = node_a - 1;
        system.residual[ga] += local.residual[a];
        for (b, &node_b) in nodes.iter().enumerate() {
            let gb = node_b - 1;
            system.jacobian[(ga, gb)] += local.matrix[(a, b)];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scatter_accumulates_shared_nodes() {
        let mut system = GlobalSystem::new(3);
        let mut local = LocalSystem::zeros(2);
        local.matrix[(0, 0)] = 1.0;
        local.matrix[(1, 1)] = 1.0;
        local.residual[0] = 2.0;

        // Two elements sharing node 2 (1-based).
        scatter(&mut system, &[1, 2], &local);
        scatter(&mut system, &[2, 3], &local);

        assert_eq!(system.jacobian[(0, 0)], 1.0);
        assert_eq!(system.jacobian[(1, 1)], 2.0); // shared node accumulates
        assert_eq!(system.jacobian[(2, 2)], 1.0);
        assert_eq!(system.residual[1], 2.0);
    }
}
