// Use case: parameters -> equation set -> solved values -> report

use super::report::{format_decimal, write_workbook, ExpectationTable, ReportError};
use crate::domain::{
    EquationSet, GrindParameters, ModelError, Solution, SolverBackend, SolverError,
    SolverService, SolverStatistics,
};
use crate::solver::SolverFactory;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Everything a single run needs
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub parameters: GrindParameters,
    pub backend: SolverBackend,
    pub out_dir: PathBuf,
    /// Decimal places in console output
    pub precision: usize,
    pub show_equations: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            parameters: GrindParameters::default(),
            backend: SolverBackend::default(),
            out_dir: PathBuf::from("out"),
            precision: 5,
            show_equations: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("failed to write console output: {0}")]
    Console(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub table: ExpectationTable,
    pub report_path: PathBuf,
    pub statistics: SolverStatistics,
    pub elapsed: Duration,
}

/// Expected-time analysis backed by one solver
pub struct GrindAnalysisService {
    solver: Arc<dyn SolverService>,
}

impl GrindAnalysisService {
    pub fn new(solver: Arc<dyn SolverService>) -> Self {
        Self { solver }
    }

    pub fn from_backend(backend: SolverBackend) -> Result<Self, SolverError> {
        Ok(Self::new(SolverFactory::create_from_backend(backend)?))
    }

    pub fn solver_name(&self) -> &str {
        self.solver.name()
    }

    /// Solve and verify without touching the filesystem
    pub fn solve(&self, parameters: &GrindParameters) -> Result<(EquationSet, Solution), RunError> {
        let set = parameters.build_equations()?;
        let solution = self.solve_set(&set)?;
        Ok((set, solution))
    }

    pub fn expectation_table(
        &self,
        parameters: &GrindParameters,
    ) -> Result<ExpectationTable, RunError> {
        let (set, solution) = self.solve(parameters)?;
        Ok(ExpectationTable::from_solution(&set, &solution)?)
    }

    fn solve_set(&self, set: &EquationSet) -> Result<Solution, RunError> {
        tracing::info!(
            solver = self.solver.name(),
            states = set.num_states(),
            "solving equation set"
        );
        let solution = self.solver.solve(set)?;
        if !solution.is_satisfiable() {
            return Err(SolverError::Unsatisfiable(solution.message).into());
        }
        // A violated equation here is a builder or backend bug
        set.verify(&solution.values)?;
        tracing::info!(
            iterations = solution.statistics.policy_iterations,
            solve_ms = solution.statistics.solve_time_ms,
            "{}",
            solution.message
        );
        Ok(solution)
    }

    /// Full run with console report and workbook
    pub fn run<W: Write>(
        &self,
        settings: &RunSettings,
        out: &mut W,
    ) -> Result<RunOutcome, RunError> {
        let start = Instant::now();
        let params = &settings.parameters;
        tracing::debug!(?params, backend = %settings.backend, "starting run");

        let set = params.build_equations()?;
        writeln!(
            out,
            "SOLVING SYSTEM OF {} VARIABLES WITH {} ROLLS AND {} DEFICITS",
            set.num_states(),
            params.total_rolls,
            params.total_deficit
        )?;
        if settings.show_equations {
            write!(out, "{}", set)?;
        }

        let solution = match self.solve_set(&set) {
            Ok(solution) => solution,
            Err(RunError::Solver(SolverError::Unsatisfiable(message))) => {
                writeln!(out, "CHECK: unsat")?;
                return Err(SolverError::Unsatisfiable(message).into());
            }
            Err(e) => return Err(e),
        };
        writeln!(out, "CHECK: {}", solution.status)?;

        let assignment: Vec<String> = set
            .iter()
            .map(|(state, _)| format!("{} = {}", state, solution.values[set.index(state)]))
            .collect();
        writeln!(out, "MODEL: [{}]", assignment.join(", "))?;

        let table = ExpectationTable::from_solution(&set, &solution)?;
        for (state, value) in table.iter() {
            writeln!(
                out,
                "{} DEFICIT AND {} ROLLS EXPECTED: {} ({})",
                state.deficit,
                state.rolls,
                format_decimal(value, settings.precision),
                value
            )?;
        }

        let report_path = write_workbook(&table, &settings.out_dir)?;
        writeln!(out, "REPORT WRITTEN TO: {}", report_path.display())?;
        writeln!(
            out,
            "EXPECTED TIME TO GET ACHIEVEMENT: {} ({})",
            format_decimal(&table.root, settings.precision),
            table.root
        )?;

        let elapsed = start.elapsed();
        writeln!(out, "COMPUTE TIME TAKEN: {:.3}s", elapsed.as_secs_f64())?;

        Ok(RunOutcome {
            table,
            report_path,
            statistics: solution.statistics,
            elapsed,
        })
    }
}
