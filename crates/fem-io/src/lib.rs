//! Mesh import for the finite element core.
//!
//! The Gmsh parser itself is an external collaborator; this crate consumes
//! its pre-parsed payload (node coordinates, raw connectivity in Gmsh
//! numbering, physical groups, boundary node groups) and remaps it into the
//! internal [`fem_model::MeshData`] format.

pub mod adapter;
pub mod error;
pub mod gmsh;

pub use adapter::import_mesh;
pub use error::{ImportError, Result};
pub use gmsh::{GmshPayload, NodalNumbering, PhysicalGroup};
