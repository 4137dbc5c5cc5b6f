// Exact backend: policy iteration from the keep-rolling policy

use super::policy::{self, Policy};
use crate::domain::{
    models::{EquationSet, Solution},
    solver_service::{Result, SolverService},
};
use std::time::Instant;

pub struct ExactSolver;

impl ExactSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ExactSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverService for ExactSolver {
    fn solve(&self, problem: &EquationSet) -> Result<Solution> {
        // Validate first
        self.validate(problem)?;

        let start_time = Instant::now();
        policy::solve_from(problem, Policy::keep_rolling(problem), start_time)
    }

    fn name(&self) -> &str {
        "exact policy iteration"
    }
}
