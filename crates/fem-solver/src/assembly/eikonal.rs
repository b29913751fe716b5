//! Viscous eikonal (front propagation) assembly.
//!
//! Solves −ν(α)·∇²u + α·(‖∇u‖ − 1) = 0 with ν(α) = 1 − α + ν₀. At α = 0 the
//! problem is pure viscous diffusion; at α = 1 the full eikonal equation. The
//! kernel linearizes around the current iterate, whose gradient (sx, sy) is
//! interpolated at every Gauss point. One-dimensional fronts are reserved.

use fem_model::Dimension;
use nalgebra::DVector;

use crate::assembly::{LocalSystem, scatter};
use crate::error::{Result, SolverError};
use crate::mapping::physical_gradients;
use crate::prep::{FeSpace, GlobalSystem};

/// Baseline viscosity ν₀ kept at full activation
pub const VISCOSITY_FLOOR: f64 = 1e-2;

/// Regularization under the gradient-norm root in the Jacobian
const GRADIENT_EPSILON: f64 = 1e-8;

/// Viscosity at activation α.
pub fn viscosity(activation: f64) -> f64 {
    1.0 - activation + VISCOSITY_FLOOR
}

/// Front propagation assembly kernel, linearized at `solution`
pub struct EikonalAssembler<'a> {
    /// Current Newton iterate
    pub solution: &'a DVector<f64>,
    /// Continuation activation parameter α in [0, 1]
    pub activation: f64,
}

impl EikonalAssembler<'_> {
    /// Assemble the full global system.
    pub fn assemble(&self, space: &FeSpace, system: &mut GlobalSystem) -> Result<()> {
        if space.mesh.dimension == Dimension::OneD {
            return Err(SolverError::NotImplemented("1D front propagation"));
        }
        for element in 0..space.mesh.total_elements() {
            let local = self.assemble_element(space, element)?;
            scatter(system, space.mesh.element_nodes(element), &local);
        }
        Ok(())
    }

    /// Local matrix and residual of one element.
    pub fn assemble_element(&self, space: &FeSpace, element: usize) -> Result<LocalSystem> {
        if space.mesh.dimension == Dimension::OneD {
            return Err(SolverError::NotImplemented("1D front propagation"));
        }
        let (xs, ys) = space.mesh.element_coordinates(element);
        let numbering = space.mesh.element_nodes(element);
        let nodes = space.reference.node_count();
        let nu = viscosity(self.activation);
        let alpha = self.activation;
        let mut local = LocalSystem::zeros(nodes);

        for gp in &space.rule {
            let basis = space.reference.eval(gp.xi, gp.eta);
            let mapped = physical_gradients(element, Dimension::TwoD, &xs, &ys, &basis)?;
            let scale = gp.weight * mapped.det;

            // Gradient of the current iterate at this Gauss point.
            let mut sx = 0.0;
            let mut sy = 0.0;
            for (n, &node) in numbering.iter().enumerate() {
                let u = self.solution[node - 1];
                sx += u * mapped.dn_dx[n];
                sy += u * mapped.dn_dy[n];
            }
            let grad_norm = (sx * sx + sy * sy).sqrt();
            let grad_reg = (sx * sx + sy * sy + GRADIENT_EPSILON).sqrt();

            for i in 0..nodes {
                local.residual[i] += nu * scale * (mapped.dn_dx[i] * sx + mapped.dn_dy[i] * sy);
                if alpha != 0.0 {
                    local.residual[i] += alpha * scale * basis.n[i] * (grad_norm - 1.0);
                }
                for j in 0..nodes {
                    local.matrix[(i, j)] -= nu
                        * scale
                        * (mapped.dn_dx[i] * mapped.dn_dx[j] + mapped.dn_dy[i] * mapped.dn_dy[j]);
                    local.matrix[(i, j)] -= alpha * scale * basis.n[i]
                        * (sx * mapped.dn_dx[j] + sy * mapped.dn_dy[j])
                        / grad_reg;
                }
            }
        }
        Ok(local)
    }
}
