// Domain service interface for solving expectation equation sets
// Backends only see the plain `EquationSet`, never the grind parameters

use super::models::{Equation, EquationSet, Solution};
use num_traits::Signed;

/// Error types for the solver service
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    #[error("Solver not available: {0}")]
    SolverNotAvailable(String),

    #[error("System is unsatisfiable: {0}")]
    Unsatisfiable(String),

    #[error("Solver execution failed: {0}")]
    ExecutionFailed(String),
}

pub type Result<T> = std::result::Result<T, SolverError>;

/// Domain service interface for equation-set solvers
///
/// Implementations must return exact values: an approximate backend is
/// expected to certify its answer before returning it.
pub trait SolverService: Send + Sync {
    /// Solve an equation set, returning one value per state
    fn solve(&self, problem: &EquationSet) -> Result<Solution>;

    /// Validate an equation set without solving it
    fn validate(&self, problem: &EquationSet) -> Result<()> {
        problem.check_ordering()?;

        let mut errors = Vec::new();
        for (state, equation) in problem.iter() {
            let (constant, weights) = match equation {
                Equation::Constant(c) => (Some(c), Vec::new()),
                Equation::Alias(_) => (None, Vec::new()),
                Equation::Linear(expr) | Equation::MinOf { expr, .. } => (
                    Some(&expr.constant),
                    expr.terms.iter().map(|(w, _)| w).collect(),
                ),
            };

            if constant.is_some_and(|c| c.is_negative()) {
                errors.push(format!("{} has a negative constant", state));
            }
            if weights.iter().any(|w| w.is_negative()) {
                errors.push(format!("{} has a negative weight", state));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SolverError::InvalidProblem(errors.join("; ")))
        }
    }

    /// Get the name of this solver backend
    fn name(&self) -> &str;
}
