//! Pre-parsed Gmsh payload contract.
//!
//! The payload mirrors what the external parser emits from a `.msh` file:
//! coordinate arrays indexed by node tag − 1, raw connectivity in Gmsh node
//! ordering, the physical group table, and boundary node groups keyed by
//! physical tag. Map keys arrive as JSON strings and are converted to
//! numeric tags inside the adapter.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Gmsh element type code for the 4-node quadrangle
pub const GMSH_QUAD4: usize = 3;
/// Gmsh element type code for the 9-node quadrangle
pub const GMSH_QUAD9: usize = 10;
/// Gmsh element type code for the 3-node triangle
pub const GMSH_TRI3: usize = 2;
/// Gmsh element type code for the 6-node triangle
pub const GMSH_TRI6: usize = 9;

/// One entry of the physical group table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalGroup {
    /// Physical tag
    pub tag: usize,
    /// Group dimension (1 = boundary curve, 2 = surface)
    pub dimension: usize,
    /// Group name from the mesh file
    pub name: String,
}

/// Raw element connectivity in Gmsh node ordering
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodalNumbering {
    /// Quadrilateral connectivity (4 or 9 node tags per element, 1-based)
    #[serde(default)]
    pub quad_elements: Vec<Vec<usize>>,
    /// Triangle connectivity (3 or 6 node tags per element, 1-based)
    #[serde(default)]
    pub triangle_elements: Vec<Vec<usize>>,
}

/// Complete pre-parsed mesh payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GmshPayload {
    /// Node x coordinates, indexed by node tag − 1
    pub nodes_x_coordinates: Vec<f64>,
    /// Node y coordinates, indexed by node tag − 1
    pub nodes_y_coordinates: Vec<f64>,
    /// Raw connectivity
    pub nodal_numbering: NodalNumbering,
    /// Physical group table
    #[serde(default)]
    pub physical_prop_map: Vec<PhysicalGroup>,
    /// Boundary node groups per physical tag: each entry is the node tags of
    /// one boundary line element (pairs for linear, triples for quadratic)
    #[serde(default)]
    pub boundary_node_pairs: BTreeMap<String, Vec<Vec<usize>>>,
    /// Histogram of Gmsh element type codes seen by the parser
    #[serde(default)]
    pub element_types: BTreeMap<String, usize>,
}

impl GmshPayload {
    /// Deserialize a payload from its JSON form.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
