#![allow(dead_code)]

use grindopt::GrindParameters;
use rust_decimal::Decimal;
use std::str::FromStr;

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// D=1, R=1, fair coin, reset 10, attempt 1: expectation 20
pub fn coin_flip() -> GrindParameters {
    GrindParameters {
        outcome_probabilities: vec![dec("0.5"), dec("0.5")],
        reset_cost: dec("10"),
        attempt_cost: dec("1"),
        total_rolls: 1,
        total_deficit: 1,
    }
}

pub fn small(total_deficit: u32, total_rolls: u32) -> GrindParameters {
    GrindParameters {
        total_deficit,
        total_rolls,
        ..GrindParameters::default()
    }
}
