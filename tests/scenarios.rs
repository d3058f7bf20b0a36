//! End-to-end scenarios: a named reaction network run through the public
//! API and checked against its known closed-form or qualitative behavior.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crn::det::{self, DetOptions};
use crn::parse;
use crn::presets;
use crn::sto::{self, StoOptions};

fn assert_close(got: f64, want: f64, tol: f64) {
    assert!(
        (got - want).abs() < tol,
        "got {got}, want {want} within {tol}"
    );
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A+B->C, k=1, A=B=1. A(t)=1/(1+t), so C(10) = 1 - A(10) = 10/11.
#[test]
fn s1_addition() {
    init_logging();
    let (crn, counts) = parse::parse("A=1;B=1;C=0;A+B->C;").unwrap();
    let result = det::simulate(&crn, &counts, 10.0, DetOptions { resolution: 101 }).unwrap();
    let c = *result.species("C").unwrap().last().unwrap();
    assert_close(c, 10.0 / 11.0, 1e-3);
}

/// E+S->E+P, k=2, E constant at 1. S(t) = 5*exp(-2*E*t).
#[test]
fn s2_catalysis() {
    init_logging();
    let (crn, counts) = parse::parse("E=1;S=5;P=0;E+S->E+P:2;").unwrap();
    let result = det::simulate(&crn, &counts, 5.0, DetOptions::default()).unwrap();
    let s = *result.species("S").unwrap().last().unwrap();
    let p = *result.species("P").unwrap().last().unwrap();
    let expected_s = 5.0 * (-2.0 * 5.0).exp();
    assert_close(s, expected_s, 1e-3);
    assert_close(p, 5.0 - s, 1e-3);
}

/// A->A1+A2; A1+B->T; C->Z; A2->Z:2.5; Z+T->. At steady state
/// Z ~= C + A - min(A, B).
#[test]
fn s3_min_decay_network() {
    init_logging();
    let (crn, counts) = parse::parse(
        "A=2.5;B=2.0;C=1.5;A->A1+A2;A1+B->T;C->Z;A2->Z:2.5;Z+T->;",
    )
    .unwrap();
    let result = det::simulate(&crn, &counts, 50.0, DetOptions::default()).unwrap();
    let z = *result.species("Z").unwrap().last().unwrap();
    assert_close(z, 1.5 + 2.5 - 2.0, 1e-1);
}

/// 2X->Y, k=0.01, X(0)=100. The stochastic mean of Y(1) over many seeded
/// trials should track the combinatorial-rate deterministic trajectory
/// dx/dt = -k*x*(x-1), since that's exactly this network's rate law.
#[test]
fn s4_ssa_dimerization() {
    init_logging();
    let (crn, counts) = parse::parse("X=100;Y=0;2X->Y:0.01;").unwrap();

    let det_result = det::simulate(&crn, &counts, 1.0, DetOptions::default()).unwrap();
    let x_final = *det_result.species("X").unwrap().last().unwrap();
    let expected_y = (100.0 - x_final) / 2.0;

    let runs: u64 = 100;
    let mut total_y = 0i64;
    for seed in 0..runs {
        let mut initial = HashMap::new();
        initial.insert("X".to_string(), 100i64);
        let result = sto::simulate(
            &crn,
            &initial,
            StoOptions {
                t: Some(1.0),
                steps: Some(10_000),
                seed: Some(seed),
            },
        )
        .unwrap();
        total_y += result.species("Y").map(|s| *s.last().unwrap()).unwrap_or(0);
    }
    let mean_y = total_y as f64 / runs as f64;
    assert_close(mean_y, expected_y, 5.0);
}

/// Transfers a binary stack bit by bit; once `Stack1` is empty the halt
/// reaction fires exactly once and the system exhausts.
#[test]
fn s5_schema_stack() {
    init_logging();
    let (reactions, _initial) = presets::two_stack_transfer().unwrap();
    let crn = crn::Crn::new(reactions).unwrap();

    let mut initial = HashMap::new();
    initial.insert("s1".to_string(), 1i64);
    initial.insert("Stack1<101010>".to_string(), 1i64);
    initial.insert("Stack2<>".to_string(), 1i64);

    let result = sto::simulate(
        &crn,
        &initial,
        StoOptions {
            t: None,
            steps: Some(100),
            seed: Some(1),
        },
    )
    .unwrap();

    assert!(result.exhausted);
    assert_eq!(result.species("halt").unwrap().last(), Some(&1));
    assert_eq!(result.species("Stack1<>").unwrap().last(), Some(&1));
}

/// The increment-counter tile set grows from its 3-tile seed without
/// erroring and only ever places tiles from its own declared set.
#[test]
fn s6_tile_increment() {
    init_logging();
    let (system, seed) = presets::binary_increment_tiles();
    let mut rng = StdRng::seed_from_u64(7);
    let result = system.simulate(seed, 200, &mut rng).unwrap();

    let final_grid = result.final_grid();
    assert!(final_grid.placements().len() >= 3);
    let known: std::collections::HashSet<&str> = ["0", "1", "V", "H", "B"].into_iter().collect();
    for placement in final_grid.placements() {
        assert!(known.contains(placement.tile.name()));
    }
}

/// Ensures [`TileSystem`] rejects an empty seed, exercised here rather than
/// in `src/tile.rs` since it only needs the public surface.
#[test]
fn tile_system_requires_non_empty_seed() {
    init_logging();
    let (system, _seed) = presets::binary_increment_tiles();
    let mut rng = StdRng::seed_from_u64(1);
    let result: Result<_, crn::Error> = system.simulate(HashMap::new(), 10, &mut rng);
    assert!(result.is_err());
}
