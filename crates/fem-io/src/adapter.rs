//! Remaps a pre-parsed Gmsh payload into the internal mesh format.
//!
//! Two jobs:
//! 1. Reorder quadrilateral connectivity from Gmsh numbering (corners
//!    counter-clockwise, then edge midpoints, then center) into the internal
//!    column-major layout.
//! 2. Resolve each boundary node group to an `(element, side)` pair by
//!    locating the element that contains all listed nodes and classifying
//!    the side from their local indices.

use std::collections::BTreeMap;

use tracing::{debug, error, warn};

use fem_model::{BoundaryElement, Dimension, ElementOrder, ElementSide, MeshData};

use crate::error::{ImportError, Result};
use crate::gmsh::{GMSH_QUAD4, GMSH_QUAD9, GMSH_TRI3, GMSH_TRI6, GmshPayload};

/// Gmsh position `p` of a 4-node quad lands at internal position
/// `LINEAR_TARGET[p]`.
const LINEAR_TARGET: [usize; 4] = [0, 2, 3, 1];

/// Internal position `i` of a 9-node quad reads Gmsh position
/// `QUADRATIC_SOURCE[i]`.
const QUADRATIC_SOURCE: [usize; 9] = [0, 7, 3, 4, 8, 6, 1, 5, 2];

/// Element type codes the import understands (quads are remapped, lines and
/// points carry boundary/vertex data and need no volume connectivity).
const KNOWN_TYPE_CODES: [usize; 7] = [1, 8, 15, GMSH_QUAD4, GMSH_QUAD9, GMSH_TRI3, GMSH_TRI6];

/// Convert a payload into internal mesh data.
pub fn import_mesh(payload: &GmshPayload) -> Result<MeshData> {
    if payload.nodes_x_coordinates.is_empty() {
        return Err(ImportError::MissingField("nodesXCoordinates"));
    }
    if payload.nodes_y_coordinates.len() != payload.nodes_x_coordinates.len() {
        return Err(ImportError::InvalidConnectivity(format!(
            "coordinate arrays disagree: {} x entries, {} y entries",
            payload.nodes_x_coordinates.len(),
            payload.nodes_y_coordinates.len()
        )));
    }
    if !payload.nodal_numbering.triangle_elements.is_empty() {
        // Triangles have no assembly path; reject them at the boundary
        // instead of carrying a mesh that can never be solved.
        return Err(ImportError::UnsupportedElementType(format!(
            "{} triangular elements in payload",
            payload.nodal_numbering.triangle_elements.len()
        )));
    }
    if payload.nodal_numbering.quad_elements.is_empty() {
        return Err(ImportError::MissingField("nodalNumbering.quadElements"));
    }

    report_element_types(payload);

    let order = infer_order(&payload.nodal_numbering.quad_elements)?;
    let nop = remap_quads(&payload.nodal_numbering.quad_elements, order)?;

    let mut mesh = MeshData {
        nodes_x: payload.nodes_x_coordinates.clone(),
        nodes_y: payload.nodes_y_coordinates.clone(),
        nop,
        boundary_elements: BTreeMap::new(),
        element_order: order,
        dimension: Dimension::TwoD,
    };
    mesh.validate()?;

    mesh.boundary_elements = resolve_boundaries(payload, &mesh);
    Ok(mesh)
}

fn report_element_types(payload: &GmshPayload) {
    for (code, count) in &payload.element_types {
        match code.parse::<usize>() {
            Ok(code) if KNOWN_TYPE_CODES.contains(&code) => {
                debug!(code, count, "element type in payload");
            }
            _ => warn!(code = %code, count, "unknown element type skipped"),
        }
    }
}

fn infer_order(quads: &[Vec<usize>]) -> Result<ElementOrder> {
    let nodes = quads[0].len();
    let order = match nodes {
        4 => ElementOrder::Linear,
        9 => ElementOrder::Quadratic,
        n => {
            return Err(ImportError::UnsupportedElementType(format!(
                "quadrilateral with {n} nodes"
            )));
        }
    };
    for (e, quad) in quads.iter().enumerate() {
        if quad.len() != nodes {
            return Err(ImportError::InvalidConnectivity(format!(
                "element {e} has {} nodes, element 0 has {nodes}",
                quad.len()
            )));
        }
    }
    Ok(order)
}

fn remap_quads(quads: &[Vec<usize>], order: ElementOrder) -> Result<Vec<Vec<usize>>> {
    let mut nop = Vec::with_capacity(quads.len());
    for quad in quads {
        let mut internal = vec![0usize; quad.len()];
        match order {
            ElementOrder::Linear => {
                for (p, &node) in quad.iter().enumerate() {
                    internal[LINEAR_TARGET[p]] = node;
                }
            }
            ElementOrder::Quadratic => {
                for (i, slot) in internal.iter_mut().enumerate() {
                    *slot = quad[QUADRATIC_SOURCE[i]];
                }
            }
        }
        nop.push(internal);
    }
    Ok(nop)
}

/// Resolve boundary node groups to `(element, side)` pairs, keyed by the
/// physical tag. Unresolvable entries leave the boundary incomplete but do
/// not abort the import.
fn resolve_boundaries(
    payload: &GmshPayload,
    mesh: &MeshData,
) -> BTreeMap<usize, Vec<BoundaryElement>> {
    let mut boundaries: BTreeMap<usize, Vec<BoundaryElement>> = BTreeMap::new();

    for group in &payload.physical_prop_map {
        if group.dimension != 1 {
            continue;
        }
        let Some(node_groups) = payload.boundary_node_pairs.get(&group.tag.to_string()) else {
            warn!(
                tag = group.tag,
                name = %group.name,
                "physical group has no boundary node data, skipped"
            );
            continue;
        };

        let entries = boundaries.entry(group.tag).or_default();
        for nodes in node_groups {
            match locate_boundary_side(mesh, nodes) {
                Some(entry) => entries.push(entry),
                None => {
                    error!(
                        tag = group.tag,
                        ?nodes,
                        "no element contains this boundary node group; boundary incomplete"
                    );
                }
            }
        }
    }

    boundaries
}

/// Find the element containing every node of the group and classify the side
/// from their local indices.
fn locate_boundary_side(mesh: &MeshData, nodes: &[usize]) -> Option<BoundaryElement> {
    for (element, nop) in mesh.nop.iter().enumerate() {
        let locals: Option<Vec<usize>> = nodes
            .iter()
            .map(|n| nop.iter().position(|&m| m == *n))
            .collect();
        let Some(locals) = locals else { continue };
        if let Some(side) = classify_side(&locals, mesh.element_order) {
            return Some(BoundaryElement { element, side });
        }
    }
    None
}

fn classify_side(locals: &[usize], order: ElementOrder) -> Option<ElementSide> {
    for side in [
        ElementSide::Bottom,
        ElementSide::Left,
        ElementSide::Top,
        ElementSide::Right,
    ] {
        let side_nodes = side.local_nodes(Dimension::TwoD, order);
        if locals.iter().all(|l| side_nodes.contains(l)) {
            return Some(side);
        }
    }
    None
}
