// Domain value objects representing core modelling concepts

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Outcome of asking a backend for a satisfying assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// A unique assignment satisfying every equation was found
    Satisfiable,
    /// No finite assignment exists (the grind can never complete)
    Unsatisfiable,
}

impl fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolutionStatus::Satisfiable => write!(f, "sat"),
            SolutionStatus::Unsatisfiable => write!(f, "unsat"),
        }
    }
}

/// Solver backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverBackend {
    /// Exact policy iteration over memoized back-substitution
    #[default]
    Exact,
    /// Pure-Rust LP through good_lp, certified exactly afterwards
    #[serde(alias = "microlp")]
    Lp,
    /// HiGHS LP (requires the `highs` feature), certified exactly afterwards
    Highs,
}

impl fmt::Display for SolverBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverBackend::Exact => write!(f, "exact"),
            SolverBackend::Lp => write!(f, "lp"),
            SolverBackend::Highs => write!(f, "highs"),
        }
    }
}

impl FromStr for SolverBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exact" => Ok(SolverBackend::Exact),
            "lp" | "microlp" => Ok(SolverBackend::Lp),
            "highs" => Ok(SolverBackend::Highs),
            other => Err(format!(
                "unknown solver backend '{}' (expected exact, lp or highs)",
                other
            )),
        }
    }
}

/// Branch taken by a `min(fallback, expression)` equation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Keep rolling: value follows the expectation expression
    Expression,
    /// Abandon: value follows the fallback state (a full reset)
    Fallback,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_parses_case_insensitively() {
        assert_eq!("EXACT".parse::<SolverBackend>(), Ok(SolverBackend::Exact));
        assert_eq!("microlp".parse::<SolverBackend>(), Ok(SolverBackend::Lp));
        assert_eq!("highs".parse::<SolverBackend>(), Ok(SolverBackend::Highs));
        assert!("z3".parse::<SolverBackend>().is_err());
    }

    #[test]
    fn status_displays_like_a_check_result() {
        assert_eq!(SolutionStatus::Satisfiable.to_string(), "sat");
        assert_eq!(SolutionStatus::Unsatisfiable.to_string(), "unsat");
    }
}
