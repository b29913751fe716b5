//! General linear 1D PDE assembly: A(x)·u″ + B(x)·u′ + C(x)·u = D(x).
//!
//! The coefficients are user-supplied functions of the physical coordinate,
//! evaluated at each Gauss point through the isoparametric interpolation
//! x = Σₙ xₙ·Nₙ. The two-dimensional general form is reserved.

use std::fmt;
use std::sync::Arc;

use fem_model::Dimension;

use crate::assembly::{LocalSystem, scatter};
use crate::error::{Result, SolverError};
use crate::mapping::physical_gradients;
use crate::prep::{FeSpace, GlobalSystem};

/// A PDE coefficient as a pure function of x
pub type Coefficient = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// The four coefficient functions of the general form
#[derive(Clone)]
pub struct CoefficientFunctions {
    /// Diffusion coefficient A(x)
    pub a: Coefficient,
    /// Advection coefficient B(x)
    pub b: Coefficient,
    /// Reaction coefficient C(x)
    pub c: Coefficient,
    /// Source term D(x)
    pub d: Coefficient,
}

impl CoefficientFunctions {
    pub fn new(
        a: impl Fn(f64) -> f64 + Send + Sync + 'static,
        b: impl Fn(f64) -> f64 + Send + Sync + 'static,
        c: impl Fn(f64) -> f64 + Send + Sync + 'static,
        d: impl Fn(f64) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self {
            a: Arc::new(a),
            b: Arc::new(b),
            c: Arc::new(c),
            d: Arc::new(d),
        }
    }
}

impl fmt::Debug for CoefficientFunctions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CoefficientFunctions { a, b, c, d }")
    }
}

/// General-form PDE assembly kernel
pub struct GeneralPdeAssembler<'a> {
    pub coefficients: &'a CoefficientFunctions,
}

impl GeneralPdeAssembler<'_> {
    /// Assemble the full global system.
    pub fn assemble(&self, space: &FeSpace, system: &mut GlobalSystem) -> Result<()> {
        if space.mesh.dimension == Dimension::TwoD {
            return Err(SolverError::NotImplemented("general-form PDE in 2D"));
        }
        for element in 0..space.mesh.total_elements() {
            let local = self.assemble_element(space, element)?;
            scatter(system, space.mesh.element_nodes(element), &local);
        }
        Ok(())
    }

    /// Local matrix and residual of one element.
    pub fn assemble_element(&self, space: &FeSpace, element: usize) -> Result<LocalSystem> {
        if space.mesh.dimension == Dimension::TwoD {
            return Err(SolverError::NotImplemented("general-form PDE in 2D"));
        }
        let (xs, _) = space.mesh.element_coordinates(element);
        let nodes = space.reference.node_count();
        let mut local = LocalSystem::zeros(nodes);

        for gp in &space.rule {
            let basis = space.reference.eval(gp.xi, gp.eta);
            let mapped = physical_gradients(element, Dimension::OneD, &xs, &[], &basis)?;

            let x: f64 = xs.iter().zip(&basis.n).map(|(x, n)| x * n).sum();
            let a = (self.coefficients.a)(x);
            let b = (self.coefficients.b)(x);
            let c = (self.coefficients.c)(x);
            let d = (self.coefficients.d)(x);
            let scale = gp.weight * mapped.det;

            for i in 0..nodes {
                for j in 0..nodes {
                    local.matrix[(i, j)] += scale * a * mapped.dn_dx[i] * mapped.dn_dx[j];
                    local.matrix[(i, j)] -= scale * b * mapped.dn_dx[j] * basis.n[i];
                    local.matrix[(i, j)] += scale * c * basis.n[i] * basis.n[j];
                }
                local.residual[i] -= scale * d * basis.n[i];
            }
        }
        Ok(local)
    }
}
