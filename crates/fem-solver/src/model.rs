//! Model facade: configuration and pipeline orchestration.
//!
//! A [`FeaModel`] holds the physics selection, the mesh source, the boundary
//! conditions, and the solver method, and runs the pipeline the
//! configuration asks for:
//!
//! - linear path: assemble → apply boundary conditions → linear solve,
//! - nonlinear path: continuation over the activation parameter, Newton loop
//!   inside, re-assembling at every iterate,
//! - frontal path: prefront scan → per-element assembly interleaved with
//!   elimination → back-substitution.
//!
//! Tag strings from driver configurations are converted to the closed enums
//! exactly once, at this boundary.

use std::collections::BTreeMap;
use std::str::FromStr;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use tracing::debug;

use fem_io::{GmshPayload, import_mesh};
use fem_model::{BoundaryCondition, MeshConfig, StructuredMesh};

use crate::assembly::LocalSystem;
use crate::assembly::eikonal::EikonalAssembler;
use crate::assembly::general_pde::{CoefficientFunctions, GeneralPdeAssembler};
use crate::assembly::heat::HeatAssembler;
use crate::assembly::stokes::{StokesAssembler, flow_layout};
use crate::boundary::{
    DofLayout, apply_boundary_conditions, dirichlet_constraints, robin_element_table,
    robin_side_contribution,
};
use crate::error::{Result, SolverError};
use crate::frontal::{FrontalConfig, FrontalSolver};
use crate::newton::{ContinuationStep, NewtonConfig, solve_with_continuation};
use crate::prep::{FeSpace, GlobalSystem};
use crate::solvers::{LinearSolveOptions, SolverMethod, solve_linear_system};

/// Physics model selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKind {
    /// Steady heat conduction
    HeatConduction,
    /// General linear 1D convection–diffusion–reaction PDE
    GeneralFormPde,
    /// Viscous eikonal front propagation
    FrontPropagation,
    /// Creeping (Stokes) flow on the mixed layout
    CreepingFlow,
}

impl FromStr for ModelKind {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "heatConductionScript" => Ok(ModelKind::HeatConduction),
            "generalFormPDEScript" => Ok(ModelKind::GeneralFormPde),
            "frontPropagationScript" => Ok(ModelKind::FrontPropagation),
            "creepingFlowScript" => Ok(ModelKind::CreepingFlow),
            other => Err(SolverError::Configuration(format!(
                "unknown model tag \"{other}\""
            ))),
        }
    }
}

/// Where the mesh comes from: structured parameters or a pre-parsed payload
#[derive(Debug, Clone)]
pub enum MeshSource {
    Structured(MeshConfig),
    Imported(GmshPayload),
}

/// Caller overrides for the solve call
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SolveOptions {
    /// Iteration cap (Newton steps for the nonlinear path, sweeps for the
    /// iterative linear solvers)
    pub max_iterations: Option<usize>,
    /// Convergence tolerance
    pub tolerance: Option<f64>,
}

/// Solve outcome: the solution vector plus the node coordinates it lives on
#[derive(Debug, Clone)]
pub struct Solution {
    /// Nodal values; for the flow layout the blocks are
    /// [ux | uy | pressure]
    pub values: DVector<f64>,
    pub nodes_x: Vec<f64>,
    pub nodes_y: Vec<f64>,
    /// False only when an iterative budget ran out (soft outcome)
    pub converged: bool,
    /// Iterations spent (1 for direct solves)
    pub iterations: usize,
    /// Continuation history of the nonlinear path; empty otherwise
    pub steps: Vec<ContinuationStep>,
}

/// Configuration holder and pipeline entry point
#[derive(Debug)]
pub struct FeaModel {
    model: Option<ModelKind>,
    coefficients: Option<CoefficientFunctions>,
    mesh: Option<MeshSource>,
    boundary: BTreeMap<usize, BoundaryCondition>,
    method: Option<SolverMethod>,
    viscosity: f64,
    frontal: FrontalConfig,
}

impl Default for FeaModel {
    fn default() -> Self {
        Self::new()
    }
}

impl FeaModel {
    pub fn new() -> Self {
        Self {
            model: None,
            coefficients: None,
            mesh: None,
            boundary: BTreeMap::new(),
            method: None,
            viscosity: 1.0,
            frontal: FrontalConfig::default(),
        }
    }

    /// Select the physics model.
    pub fn set_model(&mut self, model: ModelKind) -> &mut Self {
        self.model = Some(model);
        self
    }

    /// Coefficient functions of the general-form PDE.
    pub fn set_coefficient_functions(&mut self, coefficients: CoefficientFunctions) -> &mut Self {
        self.coefficients = Some(coefficients);
        self
    }

    /// Mesh source: structured parameters or an imported payload.
    pub fn set_mesh(&mut self, mesh: MeshSource) -> &mut Self {
        self.mesh = Some(mesh);
        self
    }

    /// Attach a boundary condition to a side label ("0".."3" for structured
    /// meshes) or a Gmsh physical tag.
    pub fn add_boundary_condition(
        &mut self,
        key: &str,
        condition: BoundaryCondition,
    ) -> Result<&mut Self> {
        let tag: usize = key.parse().map_err(|_| {
            SolverError::Configuration(format!("boundary key \"{key}\" is not a numeric tag"))
        })?;
        self.boundary.insert(tag, condition);
        Ok(self)
    }

    /// Select the linear solver method.
    pub fn set_solver_method(&mut self, method: SolverMethod) -> &mut Self {
        self.method = Some(method);
        self
    }

    /// Viscosity of the creeping-flow model.
    pub fn set_viscosity(&mut self, viscosity: f64) -> &mut Self {
        self.viscosity = viscosity;
        self
    }

    /// Frontal solver bounds.
    pub fn set_frontal_config(&mut self, config: FrontalConfig) -> &mut Self {
        self.frontal = config;
        self
    }

    fn method(&self) -> SolverMethod {
        self.method.unwrap_or(SolverMethod::LuSolve)
    }

    fn build_space(&self) -> Result<FeSpace> {
        let mesh = match &self.mesh {
            Some(MeshSource::Structured(config)) => StructuredMesh::generate(config)?,
            Some(MeshSource::Imported(payload)) => import_mesh(payload)?,
            None => {
                return Err(SolverError::Configuration(
                    "no mesh configured".to_string(),
                ));
            }
        };
        FeSpace::new(mesh)
    }

    /// Run the configured pipeline.
    pub fn solve(&self, options: SolveOptions) -> Result<Solution> {
        let model = self.model.ok_or_else(|| {
            SolverError::Configuration("no model configured".to_string())
        })?;
        let space = self.build_space()?;
        debug!(
            model = ?model,
            method = %self.method(),
            "{}",
            space.mesh.statistics().format()
        );

        match model {
            ModelKind::HeatConduction => self.solve_scalar_linear(
                &space,
                &options,
                &|space, system| HeatAssembler.assemble(space, system),
                &|space, element| HeatAssembler.assemble_element(space, element),
            ),
            ModelKind::GeneralFormPde => {
                let coefficients = self.coefficients.as_ref().ok_or_else(|| {
                    SolverError::Configuration(
                        "the general-form model needs coefficient functions".to_string(),
                    )
                })?;
                self.solve_scalar_linear(
                    &space,
                    &options,
                    &|space, system| {
                        GeneralPdeAssembler { coefficients }.assemble(space, system)
                    },
                    &|space, element| {
                        GeneralPdeAssembler { coefficients }.assemble_element(space, element)
                    },
                )
            }
            ModelKind::FrontPropagation => self.solve_front_propagation(&space, &options),
            ModelKind::CreepingFlow => self.solve_creeping_flow(&space, &options),
        }
    }

    /// Linear scalar pipeline: matrix path for the direct/iterative methods,
    /// interleaved path for the frontal method.
    fn solve_scalar_linear(
        &self,
        space: &FeSpace,
        options: &SolveOptions,
        assemble_matrix: &dyn Fn(&FeSpace, &mut GlobalSystem) -> Result<()>,
        assemble_element: &dyn Fn(&FeSpace, usize) -> Result<LocalSystem>,
    ) -> Result<Solution> {
        let (values, iterations) = match self.method() {
            SolverMethod::Frontal => {
                let values = self.frontal_pass(space, None, &|element| {
                    assemble_element(space, element)
                })?;
                (values, 1)
            }
            method => {
                let mut system = space.allocate_system(space.mesh.total_nodes());
                assemble_matrix(space, &mut system)?;
                apply_boundary_conditions(
                    space,
                    &self.boundary,
                    DofLayout::Scalar,
                    &mut system,
                    None,
                )?;
                let (values, info) =
                    solve_linear_system(method, &system, &self.linear_options(options))?;
                (values, info.iterations)
            }
        };

        Ok(Solution {
            values,
            nodes_x: space.mesh.nodes_x.clone(),
            nodes_y: space.mesh.nodes_y.clone(),
            converged: true,
            iterations,
            steps: Vec::new(),
        })
    }

    /// Continuation-driven Newton pipeline for the front propagation model.
    fn solve_front_propagation(&self, space: &FeSpace, options: &SolveOptions) -> Result<Solution> {
        let num_dofs = space.mesh.total_nodes();
        let newton = NewtonConfig {
            max_iterations: options.max_iterations.unwrap_or(100),
            tolerance: options.tolerance.unwrap_or(1e-4),
            ..NewtonConfig::default()
        };
        let method = self.method();

        let results = solve_with_continuation(num_dofs, &newton, |iterate, activation| {
            let kernel = EikonalAssembler {
                solution: iterate,
                activation,
            };
            match method {
                SolverMethod::Frontal => self.frontal_pass(space, Some(iterate), &|element| {
                    kernel.assemble_element(space, element)
                }),
                method => {
                    let mut system = space.allocate_system(num_dofs);
                    kernel.assemble(space, &mut system)?;
                    apply_boundary_conditions(
                        space,
                        &self.boundary,
                        DofLayout::Scalar,
                        &mut system,
                        Some(iterate),
                    )?;
                    let (increment, _) =
                        solve_linear_system(method, &system, &LinearSolveOptions::default())?;
                    Ok(increment)
                }
            }
        })?;

        let iterations = results.total_iterations();
        Ok(Solution {
            values: results.solution,
            nodes_x: space.mesh.nodes_x.clone(),
            nodes_y: space.mesh.nodes_y.clone(),
            converged: results.converged,
            iterations,
            steps: results.steps,
        })
    }

    /// Mixed velocity/pressure pipeline for the creeping-flow model.
    fn solve_creeping_flow(&self, space: &FeSpace, options: &SolveOptions) -> Result<Solution> {
        if self.method() != SolverMethod::LuSolve {
            return Err(SolverError::Configuration(
                "creeping flow supports the lusolve method only".to_string(),
            ));
        }
        let layout = flow_layout(&space.mesh)?;
        let mut system = space.allocate_system(layout.num_dofs());
        StokesAssembler {
            viscosity: self.viscosity,
        }
        .assemble(space, &layout, &mut system)?;
        apply_boundary_conditions(
            space,
            &self.boundary,
            DofLayout::VelocityPressure(&layout),
            &mut system,
            None,
        )?;
        let (values, info) = solve_linear_system(
            SolverMethod::LuSolve,
            &system,
            &self.linear_options(options),
        )?;

        Ok(Solution {
            values,
            nodes_x: space.mesh.nodes_x.clone(),
            nodes_y: space.mesh.nodes_y.clone(),
            converged: true,
            iterations: info.iterations,
            steps: Vec::new(),
        })
    }

    /// One frontal sweep: Dirichlet table, Robin folded into the local
    /// systems, assembly interleaved with elimination.
    fn frontal_pass(
        &self,
        space: &FeSpace,
        iterate: Option<&DVector<f64>>,
        assemble_element: &dyn Fn(usize) -> Result<LocalSystem>,
    ) -> Result<DVector<f64>> {
        let constraints = dirichlet_constraints(space, &self.boundary, iterate)?;
        let robin = robin_element_table(space, &self.boundary)?;
        let solver = FrontalSolver::new(space, self.frontal);

        solver.solve(&constraints, |element| {
            let mut local = assemble_element(element)?;
            if let Some(sides) = robin.get(&element) {
                for &(side, h, t_inf) in sides {
                    let extra = robin_side_contribution(space, element, side, h, t_inf)?;
                    local.matrix += extra.matrix;
                    local.residual += extra.residual;
                }
            }
            Ok(local)
        })
    }

    fn linear_options(&self, options: &SolveOptions) -> LinearSolveOptions {
        let defaults = LinearSolveOptions::default();
        LinearSolveOptions {
            max_iterations: options.max_iterations.unwrap_or(defaults.max_iterations),
            tolerance: options.tolerance.unwrap_or(defaults.tolerance),
        }
    }
}
