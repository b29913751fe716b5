//! Reference element basis functions.
//!
//! Natural coordinates live on [0, 1] in every direction. The quadratic 1D
//! shapes are the Lagrange interpolants on {0, ½, 1}; 2D quads are tensor
//! products with local index = column · 3 + row (column along ξ, row along
//! η), matching the mesh numbering contract.

use fem_model::{Dimension, ElementOrder};

/// Basis values and natural-coordinate derivatives at one evaluation point
#[derive(Debug, Clone)]
pub struct BasisEval {
    /// Shape function values N_i
    pub n: Vec<f64>,
    /// ∂N_i/∂ξ
    pub d_xi: Vec<f64>,
    /// ∂N_i/∂η; empty for 1D elements
    pub d_eta: Vec<f64>,
}

/// Reference element for one (dimension, order) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceElement {
    pub dimension: Dimension,
    pub order: ElementOrder,
}

impl ReferenceElement {
    pub fn new(dimension: Dimension, order: ElementOrder) -> Self {
        Self { dimension, order }
    }

    /// Number of nodes (2, 3, 4 or 9).
    pub fn node_count(&self) -> usize {
        self.order.nodes_per_element(self.dimension)
    }

    /// Evaluate shape functions and derivatives at (ξ[, η]).
    /// `eta` is ignored for 1D elements.
    pub fn eval(&self, xi: f64, eta: f64) -> BasisEval {
        match (self.dimension, self.order) {
            (Dimension::OneD, ElementOrder::Linear) => BasisEval {
                n: vec![1.0 - xi, xi],
                d_xi: vec![-1.0, 1.0],
                d_eta: Vec::new(),
            },
            (Dimension::OneD, ElementOrder::Quadratic) => {
                let (n, d) = lagrange_quadratic(xi);
                BasisEval {
                    n: n.to_vec(),
                    d_xi: d.to_vec(),
                    d_eta: Vec::new(),
                }
            }
            (Dimension::TwoD, ElementOrder::Linear) => BasisEval {
                // internal order: BL, TL, BR, TR
                n: vec![
                    (1.0 - xi) * (1.0 - eta),
                    (1.0 - xi) * eta,
                    xi * (1.0 - eta),
                    xi * eta,
                ],
                d_xi: vec![-(1.0 - eta), -eta, 1.0 - eta, eta],
                d_eta: vec![-(1.0 - xi), 1.0 - xi, -xi, xi],
            },
            (Dimension::TwoD, ElementOrder::Quadratic) => {
                let (lx, dlx) = lagrange_quadratic(xi);
                let (ly, dly) = lagrange_quadratic(eta);
                let mut n = Vec::with_capacity(9);
                let mut d_xi = Vec::with_capacity(9);
                let mut d_eta = Vec::with_capacity(9);
                for col in 0..3 {
                    for row in 0..3 {
                        n.push(lx[col] * ly[row]);
                        d_xi.push(dlx[col] * ly[row]);
                        d_eta.push(lx[col] * dly[row]);
                    }
                }
                BasisEval { n, d_xi, d_eta }
            }
        }
    }
}

/// Quadratic Lagrange interpolants on {0, ½, 1} and their derivatives.
fn lagrange_quadratic(c: f64) -> ([f64; 3], [f64; 3]) {
    (
        [
            2.0 * c * c - 3.0 * c + 1.0,
            -4.0 * c * c + 4.0 * c,
            2.0 * c * c - c,
        ],
        [4.0 * c - 3.0, -8.0 * c + 4.0, 4.0 * c - 1.0],
    )
}
