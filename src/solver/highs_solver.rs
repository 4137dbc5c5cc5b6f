// HiGHS Solver Adapter
// Translates the shared LP rows to the HiGHS row-wise API

use super::formulation::{self, RowSense};
use crate::domain::{
    models::{EquationSet, Solution},
    solver_service::{Result, SolverError, SolverService},
    value_objects::SolutionStatus,
};
use std::time::Instant;

pub struct HighsSolver;

impl HighsSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HighsSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverService for HighsSolver {
    fn solve(&self, problem: &EquationSet) -> Result<Solution> {
        // Validate first
        self.validate(problem)?;

        let start_time = Instant::now();
        let rows = formulation::rows(problem)?;

        use highs::{HighsModelStatus, RowProblem, Sense};

        let mut pb = RowProblem::default();
        let cols: Vec<_> = (0..problem.num_states())
            .map(|_| pb.add_column(1.0, 0.0..))
            .collect();

        for row in &rows {
            let terms: Vec<_> = row
                .terms
                .iter()
                .map(|&(column, coeff)| (cols[column], coeff))
                .collect();
            match row.sense {
                RowSense::Equal => {
                    pb.add_row(row.bound..=row.bound, &terms);
                }
                RowSense::AtMost => {
                    pb.add_row(..=row.bound, &terms);
                }
            }
        }

        let solved = pb.optimise(Sense::Maximise).solve();

        match solved.status() {
            HighsModelStatus::Optimal => {
                let values = solved.get_solution().columns().to_vec();
                formulation::certify(problem, &values, start_time)
            }
            HighsModelStatus::Infeasible
            | HighsModelStatus::Unbounded
            | HighsModelStatus::UnboundedOrInfeasible => Ok(Solution::new(
                SolutionStatus::Unsatisfiable,
                "LP relaxation has no finite optimum: the grind never completes",
            )),
            status => Err(SolverError::ExecutionFailed(format!(
                "HiGHS solver returned status: {:?}",
                status
            ))),
        }
    }

    fn name(&self) -> &str {
        "HiGHS"
    }
}
