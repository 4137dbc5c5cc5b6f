// Domain layer: grind model, equation set and solver contract
pub mod domain;

// Application layer: Use cases and report rendering
pub mod application;

// Infrastructure layer: External concerns (CLI, config file, logging)
pub mod infrastructure;

// Solver adapters: Concrete implementations of SolverService
pub mod solver;

// Re-export commonly used types
pub use domain::{
    ConfigError, Equation, EquationSet, GrindParameters, LinearExpr, ModelError, Solution,
    SolutionStatus, SolverBackend, SolverError, SolverService, StateId,
};

pub use application::{
    ExpectationTable, GrindAnalysisService, ReportError, RunError, RunOutcome, RunSettings,
};

pub use solver::{ExactSolver, LpSolver, SolverFactory};

#[cfg(feature = "highs")]
pub use solver::HighsSolver;
