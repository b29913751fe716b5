//! Structured mesh generation for 1D and 2D domains.
//!
//! Nodes are laid out with equal spacing; 2D meshes are generated
//! column-major (y varies fastest), so node `i * ny + j` sits at column `i`,
//! row `j`. Boundary elements are recorded per side with the side code used
//! as the boundary tag.

use std::collections::BTreeMap;

use crate::config::{Dimension, ElementOrder, MeshConfig};
use crate::error::Result;
use crate::mesh::{BoundaryElement, ElementSide, MeshData};

/// Structured mesh generator
pub struct StructuredMesh;

impl StructuredMesh {
    /// Generate the mesh described by `config`.
    pub fn generate(config: &MeshConfig) -> Result<MeshData> {
        config.validate()?;
        let mesh = match config.dimension {
            Dimension::OneD => Self::generate_1d(config),
            Dimension::TwoD => Self::generate_2d(config),
        };
        mesh.validate()?;
        Ok(mesh)
    }

    fn generate_1d(config: &MeshConfig) -> MeshData {
        let k = config.element_order.nodes_per_direction();
        let num_elements = config.num_elements_x;
        let total_nodes = k * num_elements + 1;
        let dx = config.max_x / (total_nodes - 1) as f64;

        let nodes_x: Vec<f64> = (0..total_nodes).map(|i| i as f64 * dx).collect();

        let mut nop = Vec::with_capacity(num_elements);
        for e in 0..num_elements {
            match config.element_order {
                ElementOrder::Linear => nop.push(vec![e + 1, e + 2]),
                ElementOrder::Quadratic => nop.push(vec![2 * e + 1, 2 * e + 2, 2 * e + 3]),
            }
        }

        let mut boundary_elements = BTreeMap::new();
        boundary_elements.insert(
            ElementSide::Left.code(Dimension::OneD),
            vec![BoundaryElement {
                element: 0,
                side: ElementSide::Left,
            }],
        );
        boundary_elements.insert(
            ElementSide::Right.code(Dimension::OneD),
            vec![BoundaryElement {
                element: num_elements - 1,
                side: ElementSide::Right,
            }],
        );

        MeshData {
            nodes_x,
            nodes_y: Vec::new(),
            nop,
            boundary_elements,
            element_order: config.element_order,
            dimension: Dimension::OneD,
        }
    }

    fn generate_2d(config: &MeshConfig) -> MeshData {
        let k = config.element_order.nodes_per_direction();
        let nex = config.num_elements_x;
        let ney = config.num_elements_y.expect("validated");
        let max_x = config.max_x;
        let max_y = config.max_y.expect("validated");

        let nx = k * nex + 1;
        let ny = k * ney + 1;
        let dx = max_x / (nx - 1) as f64;
        let dy = max_y / (ny - 1) as f64;

        let mut nodes_x = Vec::with_capacity(nx * ny);
        let mut nodes_y = Vec::with_capacity(nx * ny);
        for i in 0..nx {
            for j in 0..ny {
                nodes_x.push(i as f64 * dx);
                nodes_y.push(j as f64 * dy);
            }
        }

        // 1-based node index at grid column i, row j
        let node = |i: usize, j: usize| i * ny + j + 1;

        let mut nop = Vec::with_capacity(nex * ney);
        for ex in 0..nex {
            for ey in 0..ney {
                match config.element_order {
                    ElementOrder::Linear => {
                        // internal order: BL, TL, BR, TR
                        nop.push(vec![
                            node(ex, ey),
                            node(ex, ey + 1),
                            node(ex + 1, ey),
                            node(ex + 1, ey + 1),
                        ]);
                    }
                    ElementOrder::Quadratic => {
                        // 3x3 lexicographic: local index = column * 3 + row
                        let mut nodes = Vec::with_capacity(9);
                        for col in 0..3 {
                            for row in 0..3 {
                                nodes.push(node(2 * ex + col, 2 * ey + row));
                            }
                        }
                        nop.push(nodes);
                    }
                }
            }
        }

        let boundary_elements = Self::find_boundary_elements(nex, ney);

        MeshData {
            nodes_x,
            nodes_y,
            nop,
            boundary_elements,
            element_order: config.element_order,
            dimension: Dimension::TwoD,
        }
    }

    /// Sweep all elements and record `(element, side)` for each element on
    /// the domain boundary, keyed by the side code.
    fn find_boundary_elements(nex: usize, ney: usize) -> BTreeMap<usize, Vec<BoundaryElement>> {
        let mut boundary: BTreeMap<usize, Vec<BoundaryElement>> = BTreeMap::new();
        let mut push = |side: ElementSide, element: usize| {
            boundary
                .entry(side.code(Dimension::TwoD))
                .or_default()
                .push(BoundaryElement { element, side });
        };
        for ex in 0..nex {
            for ey in 0..ney {
                let e = ex * ney + ey;
                if ey == 0 {
                    push(ElementSide::Bottom, e);
                }
                if ex == 0 {
                    push(ElementSide::Left, e);
                }
                if ey == ney - 1 {
                    push(ElementSide::Top, e);
                }
                if ex == nex - 1 {
                    push(ElementSide::Right, e);
                }
            }
        }
        boundary
    }
}
