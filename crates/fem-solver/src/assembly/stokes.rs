//! Creeping (Stokes) flow assembly on a mixed velocity/pressure layout.
//!
//! Taylor–Hood discretization on quadratic quads: biquadratic velocity on
//! all 9 element nodes, bilinear pressure on the 4 corner nodes (locals
//! {0, 2, 6, 8}). Unknowns are blocked as
//! [ux 0..Nv | uy Nv..2Nv | p 2Nv..2Nv+Np] with pressure DOFs numbered by
//! ascending global corner-node index.
//!
//! The momentum blocks follow the negated-stiffness convention of the heat
//! kernel; continuity rows are the transpose of the pressure-gradient
//! columns, so the assembled system is symmetric indefinite.

use std::collections::BTreeMap;

use fem_model::{Dimension, ElementOrder, MeshData};

use crate::basis::ReferenceElement;
use crate::error::{Result, SolverError};
use crate::mapping::physical_gradients;
use crate::prep::{FeSpace, GlobalSystem};

/// Local indices of the pressure (corner) nodes of a 9-node quad, ordered to
/// match the bilinear basis layout BL, TL, BR, TR.
pub const PRESSURE_LOCALS: [usize; 4] = [0, 2, 6, 8];

/// Unknown layout of the mixed velocity/pressure system
#[derive(Debug, Clone)]
pub struct FlowLayout {
    /// Number of velocity nodes (all mesh nodes)
    pub velocity_nodes: usize,
    /// 1-based corner node index → pressure DOF ordinal
    pub pressure_index: BTreeMap<usize, usize>,
}

impl FlowLayout {
    /// Total number of unknowns: 2·Nv + Np.
    pub fn num_dofs(&self) -> usize {
        2 * self.velocity_nodes + self.pressure_index.len()
    }

    /// Row of the x velocity at a 1-based node.
    pub fn ux(&self, node: usize) -> usize {
        node - 1
    }

    /// Row of the y velocity at a 1-based node.
    pub fn uy(&self, node: usize) -> usize {
        self.velocity_nodes + node - 1
    }

    /// Row of the pressure at a 1-based corner node, if it carries one.
    pub fn pressure(&self, node: usize) -> Option<usize> {
        self.pressure_index
            .get(&node)
            .map(|k| 2 * self.velocity_nodes + k)
    }

    /// Row of pressure DOF 0, the one pinned to remove the null space.
    pub fn pressure_pin_row(&self) -> usize {
        2 * self.velocity_nodes
    }
}

/// Build the mixed layout for a quadratic 2D mesh.
pub fn flow_layout(mesh: &MeshData) -> Result<FlowLayout> {
    if mesh.dimension != Dimension::TwoD || mesh.element_order != ElementOrder::Quadratic {
        return Err(SolverError::NotImplemented(
            "creeping flow outside 2D quadratic meshes",
        ));
    }
    let mut corners: Vec<usize> = mesh
        .nop
        .iter()
        .flat_map(|nodes| PRESSURE_LOCALS.iter().map(|&l| nodes[l]))
        .collect();
    corners.sort_unstable();
    corners.dedup();
    let pressure_index = corners
        .into_iter()
        .enumerate()
        .map(|(k, node)| (node, k))
        .collect();
    Ok(FlowLayout {
        velocity_nodes: mesh.total_nodes(),
        pressure_index,
    })
}

/// Creeping flow assembly kernel
pub struct StokesAssembler {
    /// Dynamic viscosity
    pub viscosity: f64,
}

impl StokesAssembler {
    /// Assemble the full mixed system.
    pub fn assemble(
        &self,
        space: &FeSpace,
        layout: &FlowLayout,
        system: &mut GlobalSystem,
    ) -> Result<()> {
        if space.mesh.dimension != Dimension::TwoD
            || space.mesh.element_order != ElementOrder::Quadratic
        {
            return Err(SolverError::NotImplemented(
                "creeping flow outside 2D quadratic meshes",
            ));
        }
        let pressure_reference = ReferenceElement::new(Dimension::TwoD, ElementOrder::Linear);

        for element in 0..space.mesh.total_elements() {
            let (xs, ys) = space.mesh.element_coordinates(element);
            let numbering = space.mesh.element_nodes(element);
            let nodes = space.reference.node_count();

            for gp in &space.rule {
                let basis = space.reference.eval(gp.xi, gp.eta);
                let mapped = physical_gradients(element, Dimension::TwoD, &xs, &ys, &basis)?;
                let scale = gp.weight * mapped.det;
                let p_basis = pressure_reference.eval(gp.xi, gp.eta);

                for i in 0..nodes {
                    let ux_i = layout.ux(numbering[i]);
                    let uy_i = layout.uy(numbering[i]);

                    for j in 0..nodes {
                        let viscous = -self.viscosity
                            * scale
                            * (mapped.dn_dx[i] * mapped.dn_dx[j]
                                + mapped.dn_dy[i] * mapped.dn_dy[j]);
                        system.jacobian[(ux_i, layout.ux(numbering[j]))] += viscous;
                        system.jacobian[(uy_i, layout.uy(numbering[j]))] += viscous;
                    }

                    for (k, &local) in PRESSURE_LOCALS.iter().enumerate() {
                        let p_k = layout
                            .pressure(numbering[local])
                            .expect("corner nodes carry pressure DOFs");
                        let gx = scale * mapped.dn_dx[i] * p_basis.n[k];
                        let gy = scale * mapped.dn_dy[i] * p_basis.n[k];
                        // Pressure gradient in the momentum rows, continuity
                        // as its transpose.
                        system.jacobian[(ux_i, p_k)] += gx;
                        system.jacobian[(uy_i, p_k)] += gy;
                        system.jacobian[(p_k, ux_i)] += gx;
                        system.jacobian[(p_k, uy_i)] += gy;
                    }
                }
            }
        }
        Ok(())
    }
}
