mod common;

use common::{coin_flip, small};
use grindopt::application::format_decimal;
use grindopt::{
    ExpectationTable, GrindAnalysisService, GrindParameters, RunError, SolverBackend,
    SolverError, SolverFactory,
};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};

fn int(n: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

fn table(params: &GrindParameters) -> ExpectationTable {
    GrindAnalysisService::new(SolverFactory::default_solver())
        .expectation_table(params)
        .unwrap()
}

/// Every checkable property of a solved grid
fn assert_invariants(params: &GrindParameters, table: &ExpectationTable) {
    let (d, r) = (params.total_deficit, params.total_rolls);
    assert_eq!(table.rows(), d as usize + 1);
    assert_eq!(table.cols(), r as usize + 1);
    assert_eq!(table.get(d, r), Some(&table.root));
    assert!(table.get(0, 0).unwrap().is_zero());

    for i in 1..=d {
        assert_eq!(table.get(i, 0).unwrap(), &table.root, "reset floor at deficit {}", i);
    }
    for (state, value) in table.iter() {
        assert!(!value.is_negative(), "{} is negative", state);
        if state.rolls >= 1 {
            assert!(value <= &table.root, "{} exceeds the root value", state);
        }
    }

    let reset = grindopt::domain::decimal_to_rational(&params.reset_cost);
    let expected_root = params
        .outcome_probabilities
        .iter()
        .enumerate()
        .fold(reset, |acc, (k, p)| {
            let successor = table
                .get(d.saturating_sub(k as u32), r - 1)
                .unwrap()
                .clone();
            acc + grindopt::domain::decimal_to_rational(p) * successor
        });
    assert_eq!(table.root, expected_root);
}

#[test]
fn coin_flip_expects_twenty() {
    let params = coin_flip();
    let table = table(&params);
    assert_eq!(table.root, int(20));
    assert_eq!(table.get(1, 0), Some(&int(20)));
    assert_eq!(table.get(0, 0), Some(&int(0)));
    assert_eq!(table.get(0, 1), Some(&int(1)));
    assert_invariants(&params, &table);
}

#[test]
fn default_grind_matches_known_expectation() {
    let params = GrindParameters::default();
    let table = table(&params);
    assert_eq!(format_decimal(&table.root, 5), "237939.04790");
    assert_invariants(&params, &table);
}

#[test]
fn small_grind_has_exact_fractional_answer() {
    let params = small(2, 3);
    let table = table(&params);
    assert_eq!(
        table.root,
        BigRational::new(BigInt::from(680_000), BigInt::from(1353))
    );
    assert_invariants(&params, &table);
}

#[test]
fn zero_deficit_still_rolls_out_the_grind() {
    // v(0,1) = min(x, 17), x = 51 + v(0,1)
    let params = small(0, 2);
    let table = table(&params);
    assert_eq!(table.get(0, 1), Some(&int(17)));
    assert_eq!(table.root, int(68));
    assert_invariants(&params, &table);
}

#[test]
fn empty_grind_costs_nothing() {
    let table = table(&small(0, 0));
    assert_eq!(table.rows(), 1);
    assert_eq!(table.cols(), 1);
    assert!(table.root.is_zero());
}

#[test]
fn lp_backend_agrees_exactly_with_exact_backend() {
    let exact = GrindAnalysisService::from_backend(SolverBackend::Exact).unwrap();
    let lp = GrindAnalysisService::from_backend(SolverBackend::Lp).unwrap();
    let cases = [
        coin_flip(),
        small(2, 3),
        small(4, 6),
        small(0, 2),
        GrindParameters::default(),
    ];
    for params in cases {
        let expected = exact.expectation_table(&params).unwrap();
        let actual = lp.expectation_table(&params).unwrap();
        assert_eq!(expected, actual);
        assert_invariants(&params, &actual);
    }
}

#[test]
fn unreachable_deficit_is_unsatisfiable() {
    // At most two successes per roll, so a deficit of 5 never clears in 2 rolls
    let params = small(5, 2);
    let service = GrindAnalysisService::new(SolverFactory::default_solver());
    let err = service.expectation_table(&params).unwrap_err();
    assert!(matches!(err, RunError::Solver(SolverError::Unsatisfiable(_))));
}

#[test]
fn higher_reset_cost_never_lowers_the_expectation() {
    let cheap = table(&small(3, 4)).root;
    let mut params = small(3, 4);
    params.reset_cost += rust_decimal::Decimal::from(40);
    let expensive = table(&params).root;
    assert!(expensive >= cheap);
}
