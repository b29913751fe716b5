//! Boundary condition records.
//!
//! A condition is attached to one boundary tag and applies to every node of
//! every `(element, side)` pair recorded under that tag. Conditions are
//! created by the configuration layer, consulted after element assembly, and
//! never mutated once a solve begins.

use serde::{Deserialize, Serialize};

/// Boundary condition attached to a boundary tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BoundaryCondition {
    /// Dirichlet: fixes the scalar unknown on every node of the side
    ConstantValue(f64),
    /// Dirichlet temperature (heat conduction alias of `ConstantValue`)
    ConstantTemp(f64),
    /// Robin: convective exchange with a surrounding medium at `t_inf`
    /// through a film coefficient `h`
    Convection { h: f64, t_inf: f64 },
    /// Natural: traction-free side, no assembly work
    StressFree,
    /// Natural: zero normal gradient (symmetry), no assembly work
    ZeroGradient,
    /// Dirichlet on both velocity components (flow layout)
    ConstantVelocity(f64, f64),
}

impl BoundaryCondition {
    /// Whether the condition prescribes values directly (row elimination).
    pub fn is_dirichlet(&self) -> bool {
        matches!(
            self,
            BoundaryCondition::ConstantValue(_)
                | BoundaryCondition::ConstantTemp(_)
                | BoundaryCondition::ConstantVelocity(_, _)
        )
    }

    /// Whether the condition requires no assembly work at all.
    pub fn is_natural(&self) -> bool {
        matches!(
            self,
            BoundaryCondition::StressFree | BoundaryCondition::ZeroGradient
        )
    }

    /// The prescribed scalar value, for the scalar Dirichlet variants.
    pub fn scalar_value(&self) -> Option<f64> {
        match self {
            BoundaryCondition::ConstantValue(v) | BoundaryCondition::ConstantTemp(v) => Some(*v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(BoundaryCondition::ConstantTemp(200.0).is_dirichlet());
        assert!(BoundaryCondition::ConstantVelocity(1.0, 0.0).is_dirichlet());
        assert!(!BoundaryCondition::Convection { h: 1.0, t_inf: 20.0 }.is_dirichlet());
        assert!(BoundaryCondition::ZeroGradient.is_natural());
        assert!(BoundaryCondition::StressFree.is_natural());
        assert!(!BoundaryCondition::ConstantValue(0.0).is_natural());
    }

    #[test]
    fn scalar_values() {
        assert_eq!(BoundaryCondition::ConstantValue(1.5).scalar_value(), Some(1.5));
        assert_eq!(BoundaryCondition::ConstantTemp(200.0).scalar_value(), Some(200.0));
        assert_eq!(BoundaryCondition::ZeroGradient.scalar_value(), None);
    }

    #[test]
    fn serializes_as_tagged_variant() {
        let bc = BoundaryCondition::Convection { h: 1.0, t_inf: 20.0 };
        let json = serde_json::to_string(&bc).unwrap();
        assert!(json.contains("Convection"));
        let back: BoundaryCondition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bc);
    }
}
