// good_lp adapter (pure-Rust microlp solver)
// The float optimum only seeds the exact policy iteration

use super::formulation::{self, RowSense};
use crate::domain::{
    models::{EquationSet, Solution},
    solver_service::{Result, SolverError, SolverService},
    value_objects::SolutionStatus,
};
use good_lp::{
    solvers::microlp, variable, variables, Expression, ResolutionError,
    Solution as GoodLpSolutionTrait, SolverModel, Variable as GoodLpVariable,
};
use std::time::Instant;

pub struct LpSolver;

impl LpSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LpSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverService for LpSolver {
    fn solve(&self, problem: &EquationSet) -> Result<Solution> {
        // Validate first
        self.validate(problem)?;

        let start_time = Instant::now();
        let rows = formulation::rows(problem)?;

        let mut vars = variables!();
        let columns: Vec<GoodLpVariable> = (0..problem.num_states())
            .map(|_| vars.add(variable().min(0.0)))
            .collect();

        let mut objective: Expression = 0.into();
        for &column in &columns {
            objective += column;
        }

        let mut lp_model = vars.maximise(objective).using(microlp::microlp);
        for row in &rows {
            let mut lhs: Expression = 0.into();
            for &(column, coeff) in &row.terms {
                lhs += coeff * columns[column];
            }
            lp_model = match row.sense {
                RowSense::Equal => lp_model.with(lhs.eq(row.bound)),
                RowSense::AtMost => lp_model.with(lhs.leq(row.bound)),
            };
        }

        match lp_model.solve() {
            Ok(sol) => {
                let values: Vec<f64> = columns.iter().map(|&column| sol.value(column)).collect();
                tracing::debug!(rows = rows.len(), "LP optimum found, certifying exactly");
                formulation::certify(problem, &values, start_time)
            }
            Err(ResolutionError::Infeasible) | Err(ResolutionError::Unbounded) => {
                Ok(Solution::new(
                    SolutionStatus::Unsatisfiable,
                    "LP relaxation has no finite optimum: the grind never completes",
                ))
            }
            Err(e) => Err(SolverError::ExecutionFailed(format!("{:?}", e))),
        }
    }

    fn name(&self) -> &str {
        "microlp"
    }
}
