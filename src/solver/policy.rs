// Exact policy iteration shared by every backend
//
// A policy fixes the branch of each `min(fallback, expr)` equation. Under a
// fixed policy every state is an affine function `a + b·x` of the anchor
// value `x`, found by back-substitution in rolls-remaining order. The
// anchor's own equation then pins `x = a / (1 - b)`.

use crate::domain::{
    Choice, Equation, EquationSet, LinearExpr, Result, Solution, SolutionStatus, SolverError,
    SolverStatistics, StateId,
};
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::time::Instant;

const MAX_POLICY_ITERATIONS: u32 = 10_000;

/// `constant + slope · anchor`
#[derive(Debug, Clone, PartialEq)]
struct Affine {
    constant: BigRational,
    slope: BigRational,
}

impl Affine {
    fn anchor() -> Self {
        Self {
            constant: BigRational::zero(),
            slope: BigRational::one(),
        }
    }

    fn constant(constant: BigRational) -> Self {
        Self {
            constant,
            slope: BigRational::zero(),
        }
    }

    fn at(&self, anchor: &BigRational) -> BigRational {
        &self.constant + &self.slope * anchor
    }
}

/// Branch choice per state; entries for non-`MinOf` states are ignored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    choices: Vec<Choice>,
}

impl Policy {
    /// Never abandon a grind early
    pub fn keep_rolling(set: &EquationSet) -> Self {
        Self {
            choices: vec![Choice::Expression; set.num_states()],
        }
    }

    pub fn from_choices(choices: Vec<Choice>) -> Self {
        Self { choices }
    }

    pub fn choice(&self, index: usize) -> Choice {
        self.choices.get(index).copied().unwrap_or(Choice::Expression)
    }

    /// Number of states that reset under this policy
    pub fn resets(&self, set: &EquationSet) -> usize {
        set.iter()
            .enumerate()
            .filter(|(index, (_, equation))| {
                matches!(equation, Equation::MinOf { .. })
                    && self.choice(*index) == Choice::Fallback
            })
            .count()
    }
}

/// Result of a converged policy iteration
#[derive(Debug, Clone)]
pub struct Converged {
    pub values: Vec<BigRational>,
    pub policy: Policy,
    pub iterations: u32,
}

fn form<'a>(set: &EquationSet, forms: &'a [Option<Affine>], state: StateId) -> Result<&'a Affine> {
    forms[set.index(state)].as_ref().ok_or_else(|| {
        SolverError::InvalidProblem(format!("{} is referenced before it is evaluated", state))
    })
}

fn combine(set: &EquationSet, forms: &[Option<Affine>], expr: &LinearExpr) -> Result<Affine> {
    let mut combined = Affine::constant(expr.constant.clone());
    for (weight, state) in &expr.terms {
        let term = form(set, forms, *state)?;
        combined.constant += weight * &term.constant;
        combined.slope += weight * &term.slope;
    }
    Ok(combined)
}

fn affine_of(
    set: &EquationSet,
    forms: &[Option<Affine>],
    equation: &Equation,
    choice: Choice,
) -> Result<Affine> {
    match equation {
        Equation::Constant(c) => Ok(Affine::constant(c.clone())),
        Equation::Alias(target) => form(set, forms, *target).cloned(),
        Equation::Linear(expr) => combine(set, forms, expr),
        Equation::MinOf { fallback, expr } => match choice {
            Choice::Fallback => form(set, forms, *fallback).cloned(),
            Choice::Expression => combine(set, forms, expr),
        },
    }
}

/// Exact values of every state under a fixed policy
pub fn evaluate(set: &EquationSet, policy: &Policy) -> Result<Vec<BigRational>> {
    let anchor_index = set.index(set.anchor);
    let mut forms: Vec<Option<Affine>> = vec![None; set.num_states()];
    forms[anchor_index] = Some(Affine::anchor());

    for state in set.evaluation_order() {
        let index = set.index(state);
        let affine = affine_of(set, &forms, set.equation(state), policy.choice(index))?;
        forms[index] = Some(affine);
    }

    let root = affine_of(
        set,
        &forms,
        set.equation(set.anchor),
        policy.choice(anchor_index),
    )?;
    let denominator = BigRational::one() - &root.slope;
    if !denominator.is_positive() {
        return Err(SolverError::Unsatisfiable(format!(
            "from {} the grind completes with probability {}; no finite expectation exists",
            set.anchor, denominator
        )));
    }
    let anchor_value = root.constant / denominator;

    forms
        .iter()
        .enumerate()
        .map(|(index, affine)| {
            affine.as_ref().map(|a| a.at(&anchor_value)).ok_or_else(|| {
                SolverError::InvalidProblem(format!("{} was never evaluated", set.state(index)))
            })
        })
        .collect()
}

/// Greedy branch choice against a full assignment; ties keep the current branch
fn improve(set: &EquationSet, policy: &Policy, values: &[BigRational]) -> Policy {
    let choices = set
        .iter()
        .enumerate()
        .map(|(index, (_, equation))| {
            let current = policy.choice(index);
            let Equation::MinOf { fallback, expr } = equation else {
                return current;
            };
            let reset = &values[set.index(*fallback)];
            let keep = expr.evaluate_with(|s| values[set.index(s)].clone());
            if *reset < keep {
                Choice::Fallback
            } else if keep < *reset {
                Choice::Expression
            } else {
                current
            }
        })
        .collect();
    Policy::from_choices(choices)
}

/// Run policy iteration from `start` until no state changes branch
pub fn iterate(set: &EquationSet, start: Policy) -> Result<Converged> {
    let mut policy = start;
    for iteration in 1..=MAX_POLICY_ITERATIONS {
        let values = evaluate(set, &policy)?;
        let next = improve(set, &policy, &values);
        if next == policy {
            tracing::debug!(
                iterations = iteration,
                resets = policy.resets(set),
                "policy iteration converged"
            );
            return Ok(Converged {
                values,
                policy,
                iterations: iteration,
            });
        }
        tracing::trace!(iteration, resets = next.resets(set), "policy improved");
        policy = next;
    }
    Err(SolverError::ExecutionFailed(format!(
        "policy iteration did not converge within {} iterations",
        MAX_POLICY_ITERATIONS
    )))
}

/// Iterate from `start` and package the outcome as a domain solution.
///
/// An unsatisfiable system is a regular outcome, not an error.
pub fn solve_from(set: &EquationSet, start: Policy, started: Instant) -> Result<Solution> {
    let outcome = iterate(set, start);
    let mut statistics = SolverStatistics {
        solve_time_ms: 0.0,
        num_variables: set.num_states() as u32,
        num_equations: set.equations.len() as u32,
        policy_iterations: 0,
    };

    match outcome {
        Ok(converged) => {
            statistics.policy_iterations = converged.iterations;
            statistics.solve_time_ms = started.elapsed().as_secs_f64() * 1000.0;
            let mut solution = Solution::satisfiable(converged.values);
            solution.message = format!(
                "Unique assignment found; {} of {} states reset",
                converged.policy.resets(set),
                set.num_states()
            );
            Ok(solution.with_statistics(statistics))
        }
        Err(SolverError::Unsatisfiable(message)) => {
            statistics.solve_time_ms = started.elapsed().as_secs_f64() * 1000.0;
            Ok(Solution::new(SolutionStatus::Unsatisfiable, message).with_statistics(statistics))
        }
        Err(e) => Err(e),
    }
}
