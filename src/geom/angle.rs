//! Angle bookkeeping for carrying a walking direction from the planar layout
//! into the tangent spaces of the surface.
//!
//! The map from the plane to a tangent space is treated as a fixed rotation
//! at every step, so a change of heading in the plane is replayed as the same
//! change of heading on the surface.

use std::f64::consts::{PI, TAU};

/// Maps `angle` into `[-π, π)` with a single Euclidean remainder.
#[must_use]
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    // `rem_euclid` can round up to exactly TAU for tiny negative inputs.
    if wrapped >= PI { wrapped - TAU } else { wrapped }
}

/// Signed shortest rotation from `b` to `a`, in `[-π, π)`.
#[must_use]
pub fn angle_difference(a: f64, b: f64) -> f64 {
    normalize_angle(a - b)
}

/// Applies the planar change of heading `planar_next - planar_in` to the
/// tangent-space heading `tangent_in`.
#[must_use]
pub fn transport_angle(tangent_in: f64, planar_in: f64, planar_next: f64) -> f64 {
    normalize_angle(tangent_in + angle_difference(planar_next, planar_in))
}

/// Heading and length of a planar step, with the heading expressed in the
/// tangent space that `tangent_in`/`planar_in` were recorded in.
///
/// A zero `distance` carries no direction; callers must short-circuit on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarStep {
    pub tangent_angle: f64,
    pub planar_angle: f64,
    pub distance: f64,
}

#[must_use]
pub fn angle_and_distance(
    x: f64,
    y: f64,
    start_x: f64,
    start_y: f64,
    tangent_in: f64,
    planar_in: f64,
) -> PlanarStep {
    let dx = x - start_x;
    let dy = y - start_y;
    let planar_angle = dy.atan2(dx);
    PlanarStep {
        tangent_angle: transport_angle(tangent_in, planar_in, planar_angle),
        planar_angle,
        distance: dx.hypot(dy),
    }
}
