// Solver adapters module

pub mod exact_solver;
pub mod factory;
pub mod formulation;
#[cfg(feature = "highs")]
pub mod highs_solver;
pub mod lp_solver;
pub mod policy;

pub use exact_solver::ExactSolver;
pub use factory::SolverFactory;
#[cfg(feature = "highs")]
pub use highs_solver::HighsSolver;
pub use lp_solver::LpSolver;
