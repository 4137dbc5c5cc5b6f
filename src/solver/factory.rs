use crate::domain::{
    solver_service::{Result, SolverError, SolverService},
    value_objects::SolverBackend,
};
use crate::solver::{ExactSolver, LpSolver};
use std::sync::Arc;

/// Factory for creating solver instances based on configuration
pub struct SolverFactory;

impl SolverFactory {
    /// Create a solver for a specific backend
    pub fn create_from_backend(backend: SolverBackend) -> Result<Arc<dyn SolverService>> {
        match backend {
            SolverBackend::Exact => Ok(Arc::new(ExactSolver::new())),
            SolverBackend::Lp => Ok(Arc::new(LpSolver::new())),
            #[cfg(feature = "highs")]
            SolverBackend::Highs => Ok(Arc::new(crate::solver::HighsSolver::new())),
            #[cfg(not(feature = "highs"))]
            SolverBackend::Highs => Err(SolverError::SolverNotAvailable(
                "HiGHS support is not compiled in; rebuild with --features highs".to_string(),
            )),
        }
    }

    /// Get the default solver (exact policy iteration)
    pub fn default_solver() -> Arc<dyn SolverService> {
        Arc::new(ExactSolver::new())
    }
}
