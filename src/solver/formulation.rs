// LP formulation shared by the floating-point backends
//
// The expectation is the largest assignment with v ≤ each branch of every
// `min`, so the LP maximises Σ v. Its float answer only picks the starting
// policy; exact policy iteration then certifies and refines it.

use super::policy::{self, Policy};
use crate::domain::{Choice, Equation, EquationSet, LinearExpr, Result, Solution, SolverError};
use num_rational::BigRational;
use num_traits::ToPrimitive;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSense {
    Equal,
    AtMost,
}

/// `Σ coefficient · v[column]  (= | ≤)  bound`
#[derive(Debug, Clone)]
pub struct LpRow {
    pub terms: Vec<(usize, f64)>,
    pub sense: RowSense,
    pub bound: f64,
}

fn to_f64(value: &BigRational) -> Result<f64> {
    value
        .to_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| SolverError::InvalidProblem(format!("{} does not fit in an f64", value)))
}

/// `v[column] − Σ w · v[t] (sense) constant`
fn expression_row(
    set: &EquationSet,
    column: usize,
    expr: &LinearExpr,
    sense: RowSense,
) -> Result<LpRow> {
    let mut terms = vec![(column, 1.0)];
    for (weight, state) in &expr.terms {
        terms.push((set.index(*state), -to_f64(weight)?));
    }
    Ok(LpRow {
        terms,
        sense,
        bound: to_f64(&expr.constant)?,
    })
}

pub fn rows(set: &EquationSet) -> Result<Vec<LpRow>> {
    let mut rows = Vec::with_capacity(set.num_states() * 2);
    for (state, equation) in set.iter() {
        let column = set.index(state);
        match equation {
            Equation::Constant(c) => rows.push(LpRow {
                terms: vec![(column, 1.0)],
                sense: RowSense::Equal,
                bound: to_f64(c)?,
            }),
            Equation::Alias(target) => rows.push(LpRow {
                terms: vec![(column, 1.0), (set.index(*target), -1.0)],
                sense: RowSense::Equal,
                bound: 0.0,
            }),
            Equation::Linear(expr) => {
                rows.push(expression_row(set, column, expr, RowSense::Equal)?)
            }
            Equation::MinOf { fallback, expr } => {
                rows.push(LpRow {
                    terms: vec![(column, 1.0), (set.index(*fallback), -1.0)],
                    sense: RowSense::AtMost,
                    bound: 0.0,
                });
                rows.push(expression_row(set, column, expr, RowSense::AtMost)?);
            }
        }
    }
    Ok(rows)
}

/// Read the branch each `min` settled on from an approximate assignment
pub fn policy_from_values(set: &EquationSet, values: &[f64]) -> Policy {
    let choices = set
        .iter()
        .map(|(_, equation)| {
            let Equation::MinOf { fallback, expr } = equation else {
                return Choice::Expression;
            };
            let reset = values[set.index(*fallback)];
            let keep = expr.terms.iter().fold(
                expr.constant.to_f64().unwrap_or(f64::INFINITY),
                |acc, (weight, state)| {
                    acc + weight.to_f64().unwrap_or(f64::INFINITY) * values[set.index(*state)]
                },
            );
            let tolerance = 1e-7 * keep.abs().max(1.0);
            if reset + tolerance < keep {
                Choice::Fallback
            } else {
                Choice::Expression
            }
        })
        .collect();
    Policy::from_choices(choices)
}

/// Turn an LP optimum into an exact, certified solution
pub fn certify(set: &EquationSet, values: &[f64], started: Instant) -> Result<Solution> {
    let start = policy_from_values(set, values);
    let start = match policy::evaluate(set, &start) {
        Ok(_) => start,
        Err(SolverError::Unsatisfiable(_)) => {
            tracing::debug!("LP policy never completes; restarting from keep-rolling");
            Policy::keep_rolling(set)
        }
        Err(e) => return Err(e),
    };
    policy::solve_from(set, start, started)
}
