//! Gauss quadrature rules on the reference element.
//!
//! Rules are stated on [0, 1]. Linear elements use the one-point rule at the
//! element center; quadratic elements use the three-point Gauss–Legendre
//! rule per direction (tensor product in 2D). Triangle rules appear in Gmsh
//! meshes but carry no assembly path, so requesting one fails loudly.

use fem_model::{Dimension, ElementOrder};

use crate::error::{Result, SolverError};

/// One quadrature point with its weight; `eta` is zero for line rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussPoint {
    pub xi: f64,
    pub eta: f64,
    pub weight: f64,
}

/// Three-point Gauss–Legendre abscissae and weights on [0, 1].
fn gauss_legendre_3() -> ([f64; 3], [f64; 3]) {
    let offset = (3.0f64 / 5.0).sqrt() / 2.0;
    (
        [0.5 - offset, 0.5, 0.5 + offset],
        [5.0 / 18.0, 8.0 / 18.0, 5.0 / 18.0],
    )
}

/// 1D rule along a line or element edge.
pub fn line_rule(order: ElementOrder) -> (Vec<f64>, Vec<f64>) {
    match order {
        ElementOrder::Linear => (vec![0.5], vec![1.0]),
        ElementOrder::Quadratic => {
            let (points, weights) = gauss_legendre_3();
            (points.to_vec(), weights.to_vec())
        }
    }
}

/// Volume rule for one (dimension, order) pair.
pub fn volume_rule(dimension: Dimension, order: ElementOrder) -> Vec<GaussPoint> {
    match dimension {
        Dimension::OneD => {
            let (points, weights) = line_rule(order);
            points
                .iter()
                .zip(&weights)
                .map(|(&xi, &weight)| GaussPoint {
                    xi,
                    eta: 0.0,
                    weight,
                })
                .collect()
        }
        Dimension::TwoD => match order {
            ElementOrder::Linear => vec![GaussPoint {
                xi: 0.5,
                eta: 0.5,
                weight: 1.0,
            }],
            ElementOrder::Quadratic => {
                let (points, weights) = gauss_legendre_3();
                let mut rule = Vec::with_capacity(9);
                for i in 0..3 {
                    for j in 0..3 {
                        rule.push(GaussPoint {
                            xi: points[i],
                            eta: points[j],
                            weight: weights[i] * weights[j],
                        });
                    }
                }
                rule
            }
        },
    }
}

/// Triangle rules are tabulated by mesh generators but unsupported here.
pub fn triangle_rule(_order: ElementOrder) -> Result<Vec<GaussPoint>> {
    Err(SolverError::NotImplemented(
        "triangular element integration",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_the_reference_measure() {
        for dimension in [Dimension::OneD, Dimension::TwoD] {
            for order in [ElementOrder::Linear, ElementOrder::Quadratic] {
                let rule = volume_rule(dimension, order);
                let total: f64 = rule.iter().map(|gp| gp.weight).sum();
                assert!(
                    (total - 1.0).abs() < 1e-12,
                    "weights sum to {total} for {dimension:?} {order:?}"
                );
            }
        }
    }

    #[test]
    fn three_point_rule_integrates_quintics() {
        // Gauss-Legendre with 3 points is exact through degree 5:
        // integral of x^5 over [0,1] is 1/6.
        let (points, weights) = line_rule(ElementOrder::Quadratic);
        let integral: f64 = points
            .iter()
            .zip(&weights)
            .map(|(&x, &w)| w * x.powi(5))
            .sum();
        assert!((integral - 1.0 / 6.0).abs() < 1e-14);
    }

    #[test]
    fn linear_quad_uses_the_centroid() {
        let rule = volume_rule(Dimension::TwoD, ElementOrder::Linear);
        assert_eq!(rule.len(), 1);
        assert_eq!((rule[0].xi, rule[0].eta, rule[0].weight), (0.5, 0.5, 1.0));
    }

    #[test]
    fn quadratic_quad_uses_nine_points() {
        let rule = volume_rule(Dimension::TwoD, ElementOrder::Quadratic);
        assert_eq!(rule.len(), 9);
    }

    #[test]
    fn triangle_rules_fail_loudly() {
        assert!(matches!(
            triangle_rule(ElementOrder::Linear),
            Err(SolverError::NotImplemented(_))
        ));
    }
}
