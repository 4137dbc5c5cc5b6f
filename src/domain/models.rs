use super::solver_service::{Result, SolverError};
use super::value_objects::SolutionStatus;
use num_rational::BigRational;
use num_traits::{Signed, Zero};
use std::fmt;

/// A cell of the expectation grid: deficit left and rolls remaining
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId {
    pub deficit: u32,
    pub rolls: u32,
}

impl StateId {
    pub fn new(deficit: u32, rolls: u32) -> Self {
        Self { deficit, rolls }
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v({},{})", self.deficit, self.rolls)
    }
}

/// `constant + Σ weight · value(state)` with exact coefficients
#[derive(Debug, Clone, PartialEq)]
pub struct LinearExpr {
    pub constant: BigRational,
    pub terms: Vec<(BigRational, StateId)>,
}

impl LinearExpr {
    pub fn constant(constant: BigRational) -> Self {
        Self {
            constant,
            terms: Vec::new(),
        }
    }

    /// Add `weight · value(state)`, merging with an existing term for the same state
    pub fn add_term(&mut self, weight: BigRational, state: StateId) {
        if let Some((existing, _)) = self.terms.iter_mut().find(|(_, s)| *s == state) {
            *existing += weight;
        } else {
            self.terms.push((weight, state));
        }
    }

    pub fn with_term(mut self, weight: BigRational, state: StateId) -> Self {
        self.add_term(weight, state);
        self
    }

    pub fn references(&self) -> impl Iterator<Item = StateId> + '_ {
        self.terms.iter().map(|(_, state)| *state)
    }

    /// Evaluate against known state values
    pub fn evaluate_with<F>(&self, mut value: F) -> BigRational
    where
        F: FnMut(StateId) -> BigRational,
    {
        self.terms
            .iter()
            .fold(self.constant.clone(), |acc, (weight, state)| {
                acc + weight * value(*state)
            })
    }
}

impl fmt::Display for LinearExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        if !self.constant.is_zero() || self.terms.is_empty() {
            write!(f, "{}", self.constant)?;
            first = false;
        }
        for (weight, state) in &self.terms {
            if !first {
                write!(f, " + ")?;
            }
            write!(f, "{}*{}", weight, state)?;
            first = false;
        }
        Ok(())
    }
}

/// Right-hand side of the equation defining one state
#[derive(Debug, Clone, PartialEq)]
pub enum Equation {
    /// value = c
    Constant(BigRational),
    /// value = value(target)
    Alias(StateId),
    /// value = expr
    Linear(LinearExpr),
    /// value = min(value(fallback), expr)
    MinOf { fallback: StateId, expr: LinearExpr },
}

impl Equation {
    pub fn references(&self) -> Vec<StateId> {
        match self {
            Equation::Constant(_) => Vec::new(),
            Equation::Alias(target) => vec![*target],
            Equation::Linear(expr) => expr.references().collect(),
            Equation::MinOf { fallback, expr } => std::iter::once(*fallback)
                .chain(expr.references())
                .collect(),
        }
    }

    /// Exact value of the right-hand side under a full assignment
    pub fn evaluate_with<F>(&self, mut value: F) -> BigRational
    where
        F: FnMut(StateId) -> BigRational,
    {
        match self {
            Equation::Constant(c) => c.clone(),
            Equation::Alias(target) => value(*target),
            Equation::Linear(expr) => expr.evaluate_with(value),
            Equation::MinOf { fallback, expr } => {
                let reset = value(*fallback);
                let keep = expr.evaluate_with(&mut value);
                if reset < keep {
                    reset
                } else {
                    keep
                }
            }
        }
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Equation::Constant(c) => write!(f, "{}", c),
            Equation::Alias(target) => write!(f, "{}", target),
            Equation::Linear(expr) => write!(f, "{}", expr),
            Equation::MinOf { fallback, expr } => write!(f, "min({}, {})", fallback, expr),
        }
    }
}

/// One equation per grid state, stored row-major by deficit.
///
/// `anchor` is the start-of-grind state. Equations that reference it are
/// the reset edges; every other reference must point at a state with
/// strictly fewer rolls remaining.
#[derive(Debug, Clone)]
pub struct EquationSet {
    pub total_deficit: u32,
    pub total_rolls: u32,
    pub anchor: StateId,
    pub equations: Vec<Equation>,
}

impl EquationSet {
    pub fn new(
        total_deficit: u32,
        total_rolls: u32,
        anchor: StateId,
        equations: Vec<Equation>,
    ) -> Self {
        Self {
            total_deficit,
            total_rolls,
            anchor,
            equations,
        }
    }

    pub fn rows(&self) -> usize {
        self.total_deficit as usize + 1
    }

    pub fn cols(&self) -> usize {
        self.total_rolls as usize + 1
    }

    pub fn num_states(&self) -> usize {
        self.rows() * self.cols()
    }

    pub fn contains(&self, state: StateId) -> bool {
        state.deficit <= self.total_deficit && state.rolls <= self.total_rolls
    }

    pub fn index(&self, state: StateId) -> usize {
        state.deficit as usize * self.cols() + state.rolls as usize
    }

    pub fn state(&self, index: usize) -> StateId {
        StateId::new((index / self.cols()) as u32, (index % self.cols()) as u32)
    }

    pub fn equation(&self, state: StateId) -> &Equation {
        &self.equations[self.index(state)]
    }

    pub fn iter(&self) -> impl Iterator<Item = (StateId, &Equation)> + '_ {
        self.equations
            .iter()
            .enumerate()
            .map(move |(index, equation)| (self.state(index), equation))
    }

    /// Non-anchor states ordered so every dependency precedes its dependents
    pub fn evaluation_order(&self) -> Vec<StateId> {
        let mut order: Vec<StateId> = (0..self.num_states())
            .map(|index| self.state(index))
            .filter(|state| *state != self.anchor)
            .collect();
        order.sort_by_key(|state| (state.rolls, state.deficit));
        order
    }

    /// Check that rolls-remaining strictly decreases along every non-reset edge.
    ///
    /// This is what makes the system solvable by back-substitution once the
    /// anchor value is known.
    pub fn check_ordering(&self) -> Result<()> {
        if self.equations.len() != self.num_states() {
            return Err(SolverError::InvalidProblem(format!(
                "expected {} equations for a {}x{} grid, found {}",
                self.num_states(),
                self.rows(),
                self.cols(),
                self.equations.len()
            )));
        }
        if !self.contains(self.anchor) {
            return Err(SolverError::InvalidProblem(format!(
                "anchor {} lies outside the grid",
                self.anchor
            )));
        }

        for (state, equation) in self.iter() {
            for reference in equation.references() {
                if !self.contains(reference) {
                    return Err(SolverError::InvalidProblem(format!(
                        "equation for {} references {} outside the grid",
                        state, reference
                    )));
                }
                let reset_edge = reference == self.anchor && state != self.anchor;
                if !reset_edge && reference.rolls >= state.rolls {
                    return Err(SolverError::InvalidProblem(format!(
                        "equation for {} references {} without consuming a roll",
                        state, reference
                    )));
                }
            }
        }
        Ok(())
    }

    /// Check an assignment against every equation exactly
    pub fn verify(&self, values: &[BigRational]) -> Result<()> {
        if values.len() != self.num_states() {
            return Err(SolverError::ExecutionFailed(format!(
                "assignment has {} values for {} states",
                values.len(),
                self.num_states()
            )));
        }

        for (state, equation) in self.iter() {
            let actual = &values[self.index(state)];
            if actual.is_negative() {
                return Err(SolverError::ExecutionFailed(format!(
                    "{} = {} is negative",
                    state, actual
                )));
            }
            let expected = equation.evaluate_with(|s| values[self.index(s)].clone());
            if *actual != expected {
                return Err(SolverError::ExecutionFailed(format!(
                    "{} = {} violates {} = {} (right-hand side is {})",
                    state, actual, state, equation, expected
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for EquationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (state, equation) in self.iter() {
            writeln!(f, "{} = {}", state, equation)?;
        }
        Ok(())
    }
}

/// Statistics about the solve process
#[derive(Debug, Clone, Default)]
pub struct SolverStatistics {
    pub solve_time_ms: f64,
    pub num_variables: u32,
    pub num_equations: u32,
    pub policy_iterations: u32,
}

/// Assignment returned by a backend, indexed like `EquationSet::equations`
#[derive(Debug, Clone)]
pub struct Solution {
    pub status: SolutionStatus,
    pub values: Vec<BigRational>,
    pub message: String,
    pub statistics: SolverStatistics,
}

impl Solution {
    pub fn new(status: SolutionStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            values: Vec::new(),
            message: message.into(),
            statistics: SolverStatistics::default(),
        }
    }

    pub fn satisfiable(values: Vec<BigRational>) -> Self {
        Self {
            status: SolutionStatus::Satisfiable,
            values,
            message: "Unique assignment found".to_string(),
            statistics: SolverStatistics::default(),
        }
    }

    pub fn with_statistics(mut self, statistics: SolverStatistics) -> Self {
        self.statistics = statistics;
        self
    }

    pub fn is_satisfiable(&self) -> bool {
        self.status == SolutionStatus::Satisfiable
    }

    pub fn value(&self, set: &EquationSet, state: StateId) -> Option<&BigRational> {
        if !set.contains(state) {
            return None;
        }
        self.values.get(set.index(state))
    }
}
