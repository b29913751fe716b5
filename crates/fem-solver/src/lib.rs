//! Finite element simulation core.
//!
//! Discretizes second-order PDEs on structured or imported meshes and solves
//! the resulting algebraic systems. The pipeline:
//!
//! 1. Mesh preparation ([`prep::FeSpace`]) from structured parameters
//!    (`fem-model`) or a pre-parsed Gmsh payload (`fem-io`),
//! 2. Reference-element machinery: basis functions, Gauss quadrature,
//!    isoparametric mapping,
//! 3. Element-wise assembly for heat conduction, a general linear 1D PDE,
//!    viscous eikonal front propagation, and creeping flow,
//! 4. Boundary-condition application (Dirichlet, Robin, natural),
//! 5. Linear solvers (dense LU, Jacobi engines) with a Newton/continuation
//!    loop for the nonlinear model,
//! 6. A frontal elimination solver interleaving assembly with pivoting.
//!
//! The [`model::FeaModel`] facade is the configuration surface consumed by
//! driver scripts.

pub mod assembly;
pub mod basis;
pub mod boundary;
pub mod error;
pub mod frontal;
pub mod mapping;
pub mod model;
pub mod newton;
pub mod prep;
pub mod quadrature;
pub mod solvers;

pub use assembly::eikonal::{EikonalAssembler, VISCOSITY_FLOOR};
pub use assembly::general_pde::{Coefficient, CoefficientFunctions, GeneralPdeAssembler};
pub use assembly::heat::HeatAssembler;
pub use assembly::stokes::{FlowLayout, StokesAssembler, flow_layout};
pub use basis::{BasisEval, ReferenceElement};
pub use boundary::{DofLayout, NodalConstraints, apply_boundary_conditions};
pub use error::{Result, SolverError};
pub use frontal::{FrontalConfig, FrontalSolver};
pub use mapping::{MappedGradients, physical_gradients};
pub use model::{FeaModel, MeshSource, ModelKind, Solution, SolveOptions};
pub use newton::{ContinuationStep, NewtonConfig, NewtonResults, solve_with_continuation};
pub use prep::{FeSpace, GlobalSystem};
pub use quadrature::{GaussPoint, line_rule, triangle_rule, volume_rule};
pub use solvers::{LinearSolveOptions, SolveInfo, SolverMethod, solve_linear_system};
