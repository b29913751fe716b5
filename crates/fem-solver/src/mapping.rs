//! Isoparametric mapping from the reference element to physical space.
//!
//! The basis functions themselves interpolate the geometry, so the Jacobian
//! of the mapping is built from the nodal coordinates and the
//! natural-coordinate derivatives. The determinant keeps its sign: it scales
//! oriented integrals and must not be folded to an absolute value.

use fem_model::Dimension;

use crate::basis::BasisEval;
use crate::error::{Result, SolverError};

/// Determinant magnitude below which an element counts as degenerate.
pub const DET_THRESHOLD: f64 = 1e-12;

/// Jacobian determinant and physical-coordinate basis gradients at one
/// quadrature point
#[derive(Debug, Clone)]
pub struct MappedGradients {
    /// Determinant of the mapping Jacobian (signed)
    pub det: f64,
    /// ∂N_i/∂x
    pub dn_dx: Vec<f64>,
    /// ∂N_i/∂y; empty for 1D elements
    pub dn_dy: Vec<f64>,
}

/// Map the basis derivatives of `element` to physical coordinates.
///
/// `xs`/`ys` are the element's nodal coordinates (`ys` empty in 1D).
pub fn physical_gradients(
    element: usize,
    dimension: Dimension,
    xs: &[f64],
    ys: &[f64],
    basis: &BasisEval,
) -> Result<MappedGradients> {
    match dimension {
        Dimension::OneD => {
            let det: f64 = xs.iter().zip(&basis.d_xi).map(|(x, d)| x * d).sum();
            if det.abs() < DET_THRESHOLD {
                return Err(SolverError::DegenerateElement { element, det });
            }
            let dn_dx = basis.d_xi.iter().map(|d| d / det).collect();
            Ok(MappedGradients {
                det,
                dn_dx,
                dn_dy: Vec::new(),
            })
        }
        Dimension::TwoD => {
            let mut x_xi = 0.0;
            let mut x_eta = 0.0;
            let mut y_xi = 0.0;
            let mut y_eta = 0.0;
            for n in 0..xs.len() {
                x_xi += xs[n] * basis.d_xi[n];
                x_eta += xs[n] * basis.d_eta[n];
                y_xi += ys[n] * basis.d_xi[n];
                y_eta += ys[n] * basis.d_eta[n];
            }
            let det = x_xi * y_eta - x_eta * y_xi;
            if det.abs() < DET_THRESHOLD {
                return Err(SolverError::DegenerateElement { element, det });
            }
            let mut dn_dx = Vec::with_capacity(xs.len());
            let mut dn_dy = Vec::with_capacity(xs.len());
            for n in 0..xs.len() {
                dn_dx.push((y_eta * basis.d_xi[n] - y_xi * basis.d_eta[n]) / det);
                dn_dy.push((x_xi * basis.d_eta[n] - x_eta * basis.d_xi[n]) / det);
            }
            Ok(MappedGradients { det, dn_dx, dn_dy })
        }
    }
}
