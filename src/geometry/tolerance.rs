// Centralized tolerances; every real comparison in the crate goes through here.

use std::cmp::Ordering;

pub const EPS: f64 = 1e-9;               // generic real equality
pub const EPS_POS: f64 = 1e-7;           // node coincidence threshold
pub const EPS_ANG: f64 = 1e-9;           // angle compare slack (radians)
pub const EPS_AREA: f64 = 1e-9;          // zero-area face threshold
pub const EPS_ON_CURVE: f64 = 1e-6;      // node-on-curve consistency
pub const EPS_CHECK: f64 = 1e-7;         // upper >= lower sanity check slack

// Step used to estimate the departure direction of a curve at a node
pub const TANGENT_STEP: f64 = 1e-5;

// Bisection cap for numeric inverses
pub const MAX_BISECT_ITERS: u32 = 200;

pub const TAU: f64 = std::f64::consts::TAU;

#[inline] pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool { a == b || (a - b).abs() <= eps }
#[inline] pub fn eq(a: f64, b: f64) -> bool { approx_eq(a, b, EPS) }
#[inline] pub fn lt(a: f64, b: f64) -> bool { a < b - EPS }
#[inline] pub fn gt(a: f64, b: f64) -> bool { a > b + EPS }
#[inline] pub fn le(a: f64, b: f64) -> bool { !gt(a, b) }
#[inline] pub fn ge(a: f64, b: f64) -> bool { !lt(a, b) }

/// Three-way comparison with `eps` slack; values within `eps` compare equal.
#[inline]
pub fn cmp_eps(a: f64, b: f64, eps: f64) -> Ordering {
    if approx_eq(a, b, eps) {
        Ordering::Equal
    } else if a < b {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

/// Lexicographic (x, then y) order of two coordinates under `EPS_POS`.
#[inline]
pub fn lex_cmp(ax: f64, ay: f64, bx: f64, by: f64) -> Ordering {
    cmp_eps(ax, bx, EPS_POS).then(cmp_eps(ay, by, EPS_POS))
}

#[inline]
pub fn same_point(ax: f64, ay: f64, bx: f64, by: f64) -> bool {
    approx_eq(ax, bx, EPS_POS) && approx_eq(ay, by, EPS_POS)
}

/// Maps an angle from `atan2` into `[0, 2π)`.
#[inline]
pub fn norm_angle(a: f64) -> f64 {
    let r = a.rem_euclid(TAU);
    if approx_eq(r, TAU, EPS_ANG) { 0.0 } else { r }
}
