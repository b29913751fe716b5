//! Mesh data structures for finite element analysis.
//!
//! A generated (or imported) mesh is stored as flat coordinate arrays plus a
//! nodal numbering table (`nop`) holding 1-based global node indices, one row
//! per element. Boundary elements are grouped under a numeric tag: structured
//! meshes use the side code as the tag, imported meshes use the Gmsh physical
//! group tag.
//!
//! Internal quadrilateral numbering is a contract shared with the assembly
//! layer:
//!
//! ```text
//! linear                quadratic (column * 3 + row)
//!   1 ----- 3             2 --- 5 --- 8
//!   |       |             1     4     7
//!   0 ----- 2             0 --- 3 --- 6
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{Dimension, ElementOrder};
use crate::error::{ModelError, Result};

/// A side of an element on the domain boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ElementSide {
    Bottom,
    Left,
    Top,
    Right,
}

impl ElementSide {
    /// Numeric side code: 1D {0 = left, 1 = right};
    /// 2D {0 = bottom, 1 = left, 2 = top, 3 = right}.
    pub fn code(&self, dimension: Dimension) -> usize {
        match dimension {
            Dimension::OneD => match self {
                ElementSide::Left => 0,
                ElementSide::Right => 1,
                _ => unreachable!("1D meshes only have left/right sides"),
            },
            Dimension::TwoD => match self {
                ElementSide::Bottom => 0,
                ElementSide::Left => 1,
                ElementSide::Top => 2,
                ElementSide::Right => 3,
            },
        }
    }

    /// Inverse of [`ElementSide::code`].
    pub fn from_code(dimension: Dimension, code: usize) -> Result<Self> {
        let side = match (dimension, code) {
            (Dimension::OneD, 0) => ElementSide::Left,
            (Dimension::OneD, 1) => ElementSide::Right,
            (Dimension::TwoD, 0) => ElementSide::Bottom,
            (Dimension::TwoD, 1) => ElementSide::Left,
            (Dimension::TwoD, 2) => ElementSide::Top,
            (Dimension::TwoD, 3) => ElementSide::Right,
            _ => return Err(ModelError::UnknownSideCode { code, dimension }),
        };
        Ok(side)
    }

    /// Local node indices lying on this side, in the internal numbering.
    pub fn local_nodes(&self, dimension: Dimension, order: ElementOrder) -> &'static [usize] {
        match (dimension, order, self) {
            (Dimension::OneD, ElementOrder::Linear, ElementSide::Left) => &[0],
            (Dimension::OneD, ElementOrder::Linear, ElementSide::Right) => &[1],
            (Dimension::OneD, ElementOrder::Quadratic, ElementSide::Left) => &[0],
            (Dimension::OneD, ElementOrder::Quadratic, ElementSide::Right) => &[2],
            (Dimension::OneD, _, _) => unreachable!("1D meshes only have left/right sides"),
            (Dimension::TwoD, ElementOrder::Linear, ElementSide::Bottom) => &[0, 2],
            (Dimension::TwoD, ElementOrder::Linear, ElementSide::Left) => &[0, 1],
            (Dimension::TwoD, ElementOrder::Linear, ElementSide::Top) => &[1, 3],
            (Dimension::TwoD, ElementOrder::Linear, ElementSide::Right) => &[2, 3],
            (Dimension::TwoD, ElementOrder::Quadratic, ElementSide::Bottom) => &[0, 3, 6],
            (Dimension::TwoD, ElementOrder::Quadratic, ElementSide::Left) => &[0, 1, 2],
            (Dimension::TwoD, ElementOrder::Quadratic, ElementSide::Top) => &[2, 5, 8],
            (Dimension::TwoD, ElementOrder::Quadratic, ElementSide::Right) => &[6, 7, 8],
        }
    }

    /// Whether the side runs along the x direction (side integrals build the
    /// tangent from ξ-derivatives on horizontal sides, η-derivatives on
    /// vertical ones).
    pub fn is_horizontal(&self) -> bool {
        matches!(self, ElementSide::Bottom | ElementSide::Top)
    }

    /// Natural coordinates of a point on this side, given the 1D Gauss
    /// coordinate `g` along the side.
    pub fn natural_point(&self, g: f64) -> (f64, f64) {
        match self {
            ElementSide::Bottom => (g, 0.0),
            ElementSide::Top => (g, 1.0),
            ElementSide::Left => (0.0, g),
            ElementSide::Right => (1.0, g),
        }
    }
}

/// An element lying on the domain boundary, with the side that touches it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryElement {
    /// Element index (0-based)
    pub element: usize,
    /// The boundary side of that element
    pub side: ElementSide,
}

/// Complete mesh data, immutable after generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    /// Node x coordinates, indexed by 0-based node index
    pub nodes_x: Vec<f64>,
    /// Node y coordinates; empty for 1D meshes
    pub nodes_y: Vec<f64>,
    /// Nodal numbering: one row per element, 1-based global node indices
    pub nop: Vec<Vec<usize>>,
    /// Boundary elements grouped by tag
    pub boundary_elements: BTreeMap<usize, Vec<BoundaryElement>>,
    /// Element order echo
    pub element_order: ElementOrder,
    /// Dimension echo
    pub dimension: Dimension,
}

impl MeshData {
    /// Total number of nodes.
    pub fn total_nodes(&self) -> usize {
        self.nodes_x.len()
    }

    /// Total number of elements.
    pub fn total_elements(&self) -> usize {
        self.nop.len()
    }

    /// Number of nodes carried by each element.
    pub fn nodes_per_element(&self) -> usize {
        self.element_order.nodes_per_element(self.dimension)
    }

    /// 1-based nodal numbering of one element.
    pub fn element_nodes(&self, element: usize) -> &[usize] {
        &self.nop[element]
    }

    /// Gather the physical coordinates of an element's nodes.
    /// The y vector is empty for 1D meshes.
    pub fn element_coordinates(&self, element: usize) -> (Vec<f64>, Vec<f64>) {
        let nodes = &self.nop[element];
        let xs = nodes.iter().map(|&n| self.nodes_x[n - 1]).collect();
        let ys = match self.dimension {
            Dimension::OneD => Vec::new(),
            Dimension::TwoD => nodes.iter().map(|&n| self.nodes_y[n - 1]).collect(),
        };
        (xs, ys)
    }

    /// Check internal consistency: coordinate lengths, row sizes, and that
    /// every nodal numbering entry is a valid 1-based node index.
    pub fn validate(&self) -> Result<()> {
        let total = self.total_nodes();
        if self.dimension == Dimension::TwoD && self.nodes_y.len() != total {
            return Err(ModelError::InvalidNumbering(format!(
                "coordinate arrays disagree: {} x entries, {} y entries",
                total,
                self.nodes_y.len()
            )));
        }
        let expected = self.nodes_per_element();
        for (e, nodes) in self.nop.iter().enumerate() {
            if nodes.len() != expected {
                return Err(ModelError::InvalidNumbering(format!(
                    "element {} has {} nodes, expected {}",
                    e,
                    nodes.len(),
                    expected
                )));
            }
            for &n in nodes {
                if n == 0 || n > total {
                    return Err(ModelError::InvalidNumbering(format!(
                        "element {e} references node {n}, valid range is 1..={total}"
                    )));
                }
            }
        }
        for (tag, entries) in &self.boundary_elements {
            for entry in entries {
                if entry.element >= self.total_elements() {
                    return Err(ModelError::InvalidNumbering(format!(
                        "boundary tag {} references element {} out of range",
                        tag, entry.element
                    )));
                }
            }
        }
        Ok(())
    }

    /// Summary counts for reporting.
    pub fn statistics(&self) -> MeshStatistics {
        MeshStatistics {
            total_nodes: self.total_nodes(),
            total_elements: self.total_elements(),
            boundary_counts: self
                .boundary_elements
                .iter()
                .map(|(tag, entries)| (*tag, entries.len()))
                .collect(),
        }
    }
}

/// Mesh summary counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshStatistics {
    pub total_nodes: usize,
    pub total_elements: usize,
    /// Boundary element count per tag
    pub boundary_counts: BTreeMap<usize, usize>,
}

impl MeshStatistics {
    /// Format as a human-readable string
    pub fn format(&self) -> String {
        format!(
            "Mesh: {} nodes, {} elements, {} boundary tags",
            self.total_nodes,
            self.total_elements,
            self.boundary_counts.len()
        )
    }
}
