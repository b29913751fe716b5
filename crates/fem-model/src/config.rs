//! Mesh configuration for structured mesh generation.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Spatial dimension of the discretization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    /// One-dimensional line mesh
    OneD,
    /// Two-dimensional quadrilateral mesh
    TwoD,
}

/// Polynomial order of the element basis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementOrder {
    /// Linear (2-node line, 4-node quad)
    Linear,
    /// Quadratic (3-node line, 9-node quad)
    Quadratic,
}

impl ElementOrder {
    /// Number of node intervals spanned by one element per direction
    /// (1 for linear, 2 for quadratic).
    pub fn nodes_per_direction(&self) -> usize {
        match self {
            ElementOrder::Linear => 1,
            ElementOrder::Quadratic => 2,
        }
    }

    /// Number of nodes carried by a single element.
    pub fn nodes_per_element(&self, dimension: Dimension) -> usize {
        match (dimension, self) {
            (Dimension::OneD, ElementOrder::Linear) => 2,
            (Dimension::OneD, ElementOrder::Quadratic) => 3,
            (Dimension::TwoD, ElementOrder::Linear) => 4,
            (Dimension::TwoD, ElementOrder::Quadratic) => 9,
        }
    }
}

/// Parameters of a structured mesh on [0, max_x] (× [0, max_y] in 2D).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshConfig {
    /// Spatial dimension
    pub dimension: Dimension,
    /// Element order
    pub element_order: ElementOrder,
    /// Number of elements along x
    pub num_elements_x: usize,
    /// Number of elements along y (2D only)
    pub num_elements_y: Option<usize>,
    /// Domain extent along x
    pub max_x: f64,
    /// Domain extent along y (2D only)
    pub max_y: Option<f64>,
}

impl MeshConfig {
    /// Configuration for a 1D mesh with `num_elements_x` elements on [0, max_x].
    pub fn one_dimensional(order: ElementOrder, num_elements_x: usize, max_x: f64) -> Self {
        Self {
            dimension: Dimension::OneD,
            element_order: order,
            num_elements_x,
            num_elements_y: None,
            max_x,
            max_y: None,
        }
    }

    /// Configuration for a 2D mesh on [0, max_x] × [0, max_y].
    pub fn two_dimensional(
        order: ElementOrder,
        num_elements_x: usize,
        num_elements_y: usize,
        max_x: f64,
        max_y: f64,
    ) -> Self {
        Self {
            dimension: Dimension::TwoD,
            element_order: order,
            num_elements_x,
            num_elements_y: Some(num_elements_y),
            max_x,
            max_y: Some(max_y),
        }
    }

    /// Check that all required parameters are present and usable.
    pub fn validate(&self) -> Result<()> {
        if self.num_elements_x == 0 {
            return Err(ModelError::InvalidParameter {
                name: "num_elements_x",
                reason: "at least one element is required".to_string(),
            });
        }
        if !self.max_x.is_finite() || self.max_x <= 0.0 {
            return Err(ModelError::InvalidParameter {
                name: "max_x",
                reason: format!("domain extent must be positive, got {}", self.max_x),
            });
        }
        if self.dimension == Dimension::TwoD {
            match self.num_elements_y {
                Some(0) => {
                    return Err(ModelError::InvalidParameter {
                        name: "num_elements_y",
                        reason: "at least one element is required".to_string(),
                    });
                }
                Some(_) => {}
                None => return Err(ModelError::MissingParameter("num_elements_y")),
            }
            match self.max_y {
                Some(m) if m.is_finite() && m > 0.0 => {}
                Some(m) => {
                    return Err(ModelError::InvalidParameter {
                        name: "max_y",
                        reason: format!("domain extent must be positive, got {m}"),
                    });
                }
                None => return Err(ModelError::MissingParameter("max_y")),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_dimensional_config_validates() {
        let config = MeshConfig::one_dimensional(ElementOrder::Linear, 10, 1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn two_dimensional_config_requires_y_parameters() {
        let mut config = MeshConfig::two_dimensional(ElementOrder::Quadratic, 8, 4, 4.0, 2.0);
        assert!(config.validate().is_ok());

        config.num_elements_y = None;
        assert!(matches!(
            config.validate(),
            Err(ModelError::MissingParameter("num_elements_y"))
        ));
    }

    #[test]
    fn rejects_empty_or_degenerate_domains() {
        let config = MeshConfig::one_dimensional(ElementOrder::Linear, 0, 1.0);
        assert!(config.validate().is_err());

        let config = MeshConfig::one_dimensional(ElementOrder::Linear, 4, 0.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn node_counts_per_element() {
        assert_eq!(ElementOrder::Linear.nodes_per_element(Dimension::OneD), 2);
        assert_eq!(ElementOrder::Quadratic.nodes_per_element(Dimension::OneD), 3);
        assert_eq!(ElementOrder::Linear.nodes_per_element(Dimension::TwoD), 4);
        assert_eq!(ElementOrder::Quadratic.nodes_per_element(Dimension::TwoD), 9);
    }
}
