// Expected-cost recurrence for a dice-roll grind
//
// State `(i, j)` is the expected additional time needed to collect `i` more
// successes with `j` rolls left before a forced reset. Every attempt costs
// the same `attempt_cost` (boss, respite and transaction domains are too
// rare to model). Running out of rolls with any deficit left costs a full
// restart, and a fresh grind never abandons before its first roll.

use super::models::{Equation, EquationSet, LinearExpr, StateId};
use super::solver_service::SolverError;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Invalid grind parameters, reported before any equation is built
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("outcome distribution is empty")]
    NoOutcomes,

    #[error("probability of {successes} successes is negative ({value})")]
    NegativeProbability { successes: usize, value: Decimal },

    #[error("outcome probabilities sum to {0}, expected exactly 1")]
    ProbabilitiesDoNotSumToOne(Decimal),

    #[error("{name} must be non-negative, got {value}")]
    NegativeCost { name: &'static str, value: Decimal },

    #[error("a deficit of {deficit} needs at least one roll per grind")]
    NoRolls { deficit: u32 },

    #[error("reset_cost must be positive: a free reset may have no unique expectation")]
    FreeReset,
}

/// Failure to turn parameters into a solvable equation set
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("equation set failed its ordering check")]
    Ordering(#[source] SolverError),
}

/// Caller-supplied constants of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrindParameters {
    /// Probability of reducing the deficit by exactly `k`, indexed by `k`
    pub outcome_probabilities: Vec<Decimal>,
    /// Time of a full reset-and-restart cycle
    pub reset_cost: Decimal,
    /// Time of one roll attempt
    pub attempt_cost: Decimal,
    pub total_rolls: u32,
    pub total_deficit: u32,
}

impl Default for GrindParameters {
    /// Two elites in the first plane, three in the second, one in the third
    fn default() -> Self {
        Self {
            outcome_probabilities: vec![
                Decimal::new(85, 2),
                Decimal::new(10, 2),
                Decimal::new(5, 2),
            ],
            reset_cost: Decimal::from(51),
            attempt_cost: Decimal::from(17),
            total_rolls: 16,
            total_deficit: 12,
        }
    }
}

impl GrindParameters {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.outcome_probabilities.is_empty() {
            return Err(ConfigError::NoOutcomes);
        }
        for (successes, p) in self.outcome_probabilities.iter().enumerate() {
            if p.is_sign_negative() && !p.is_zero() {
                return Err(ConfigError::NegativeProbability {
                    successes,
                    value: *p,
                });
            }
        }
        let total: Decimal = self.outcome_probabilities.iter().sum();
        if total != Decimal::ONE {
            return Err(ConfigError::ProbabilitiesDoNotSumToOne(total));
        }
        for (name, value) in [
            ("reset_cost", self.reset_cost),
            ("attempt_cost", self.attempt_cost),
        ] {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(ConfigError::NegativeCost { name, value });
            }
        }
        if self.total_rolls == 0 && self.total_deficit > 0 {
            return Err(ConfigError::NoRolls {
                deficit: self.total_deficit,
            });
        }
        if self.total_rolls > 0 && self.reset_cost.is_zero() {
            return Err(ConfigError::FreeReset);
        }
        Ok(())
    }

    pub fn num_states(&self) -> usize {
        (self.total_deficit as usize + 1) * (self.total_rolls as usize + 1)
    }

    pub fn root(&self) -> StateId {
        StateId::new(self.total_deficit, self.total_rolls)
    }

    /// Build one equation per state of the `(D+1) x (R+1)` grid.
    pub fn build_equations(&self) -> Result<EquationSet, ModelError> {
        self.validate()?;

        let probabilities: Vec<BigRational> = self
            .outcome_probabilities
            .iter()
            .map(decimal_to_rational)
            .collect();
        let attempt_cost = decimal_to_rational(&self.attempt_cost);
        let reset_cost = decimal_to_rational(&self.reset_cost);
        let root = self.root();

        let mut equations = Vec::with_capacity(self.num_states());
        for deficit in 0..=self.total_deficit {
            for rolls in 0..=self.total_rolls {
                let state = StateId::new(deficit, rolls);
                let equation = if deficit == 0 && rolls == 0 {
                    Equation::Constant(BigRational::zero())
                } else if rolls == 0 {
                    // Out of rolls with a deficit left: forced full reset
                    Equation::Alias(root)
                } else if state == root {
                    Equation::Linear(roll(&reset_cost, &probabilities, state))
                } else {
                    Equation::MinOf {
                        fallback: root,
                        expr: roll(&attempt_cost, &probabilities, state),
                    }
                };
                equations.push(equation);
            }
        }

        let set = EquationSet::new(self.total_deficit, self.total_rolls, root, equations);
        set.check_ordering().map_err(ModelError::Ordering)?;
        Ok(set)
    }
}

/// `cost + Σ_k p_k · value(max(i − k, 0), j − 1)`
fn roll(cost: &BigRational, probabilities: &[BigRational], from: StateId) -> LinearExpr {
    probabilities
        .iter()
        .enumerate()
        .filter(|(_, p)| !p.is_zero())
        .fold(LinearExpr::constant(cost.clone()), |expr, (k, p)| {
            let deficit = (from.deficit as usize).saturating_sub(k) as u32;
            expr.with_term(p.clone(), StateId::new(deficit, from.rolls - 1))
        })
}

/// Lossless conversion of a decimal literal to an exact rational
pub fn decimal_to_rational(value: &Decimal) -> BigRational {
    let denominator = num_traits::pow(BigInt::from(10), value.scale() as usize);
    BigRational::new(BigInt::from(value.mantissa()), denominator)
}
