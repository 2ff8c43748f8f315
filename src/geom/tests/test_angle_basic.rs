use std::f64::consts::{FRAC_PI_2, PI, TAU};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geom::{angle_and_distance, angle_difference, normalize_angle, transport_angle};

use super::fixtures::approx_eq;

#[test]
fn normalize_lands_in_half_open_range() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..10_000 {
        let angle: f64 = rng.random_range(-1e6..1e6);
        let wrapped = normalize_angle(angle);
        assert!((-PI..PI).contains(&wrapped), "{angle} -> {wrapped}");
    }
    assert!(approx_eq(normalize_angle(PI), -PI, 1e-15));
    assert!(approx_eq(normalize_angle(-PI), -PI, 1e-15));
    assert!(approx_eq(normalize_angle(0.0), 0.0, 0.0));
}

#[test]
fn normalize_ignores_whole_turns() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..1_000 {
        let angle: f64 = rng.random_range(-10.0..10.0);
        let turns: i32 = rng.random_range(-50..50);
        let shifted = normalize_angle(angle + TAU * f64::from(turns));
        // Compare through the wrap so values either side of ±π agree.
        assert!(angle_difference(shifted, normalize_angle(angle)).abs() < 1e-9);
    }
}

#[test]
fn normalize_handles_extreme_inputs() {
    for angle in [1e300, -1e300, f64::MAX, f64::MIN] {
        let wrapped = normalize_angle(angle);
        assert!((-PI..PI).contains(&wrapped), "{angle} -> {wrapped}");
    }
}

#[test]
fn difference_is_shortest_signed_turn() {
    assert!(approx_eq(angle_difference(0.1, -0.1), 0.2, 1e-12));
    assert!(approx_eq(angle_difference(-3.0, 3.0), TAU - 6.0, 1e-12));
    assert!(approx_eq(angle_difference(3.0, -3.0), 6.0 - TAU, 1e-12));
}

#[test]
fn transport_without_planar_turn_keeps_heading() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..1_000 {
        let tangent: f64 = rng.random_range(-20.0..20.0);
        let planar: f64 = rng.random_range(-20.0..20.0);
        assert!(approx_eq(transport_angle(tangent, planar, planar), normalize_angle(tangent), 1e-12));
    }
}

#[test]
fn transport_replays_planar_turn() {
    let out = transport_angle(0.25, FRAC_PI_2, PI);
    assert!(approx_eq(out, 0.25 + FRAC_PI_2, 1e-12));
}

#[test]
fn angle_and_distance_measures_from_start() {
    let step = angle_and_distance(1.0, 2.0, 1.0, 0.0, 0.0, FRAC_PI_2);
    assert!(approx_eq(step.distance, 2.0, 1e-12));
    assert!(approx_eq(step.planar_angle, FRAC_PI_2, 1e-12));
    assert!(approx_eq(step.tangent_angle, 0.0, 1e-12));

    let step = angle_and_distance(0.0, 0.0, 3.0, 4.0, 1.0, 0.0);
    assert!(approx_eq(step.distance, 5.0, 1e-12));
    let planar = (-4.0f64).atan2(-3.0);
    assert!(approx_eq(step.tangent_angle, normalize_angle(1.0 + planar), 1e-12));
}

#[test]
fn zero_distance_is_reported_not_rejected() {
    let step = angle_and_distance(2.0, 2.0, 2.0, 2.0, 0.5, 0.0);
    assert!(approx_eq(step.distance, 0.0, 0.0));
    assert!(step.tangent_angle.is_finite());
}
