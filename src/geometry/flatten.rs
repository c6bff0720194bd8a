use crate::geometry::curve::{CurveBound, CurveKind};
use crate::geometry::tolerance::{norm_angle, TANGENT_STEP};
use crate::model::Point;

use std::f64::consts::{FRAC_PI_2, PI};

/// Polyline following `curve` from `from` to `to`, both end points included
/// verbatim. Function curves get `samples` segments, everything else is a
/// straight segment.
pub fn flatten_curve(points: &mut Vec<Point>, curve: &CurveBound, from: Point, to: Point, samples: usize) {
    points.push(from);
    if let CurveKind::Function(f) = curve.kind() {
        if f.constant().is_none() {
            let dom = curve.domain();
            let n = samples.max(1);
            for i in 1..n {
                let x = from.x + (to.x - from.x) * (i as f64) / (n as f64);
                points.push(Point { x, y: f.eval(dom.clamp(x)) });
            }
        }
    }
    points.push(to);
}

/// Direction in which `curve` leaves `from` heading towards `to`, as an angle
/// in `[0, 2π)`. Vertical departures are exactly `π/2` or `3π/2`.
pub fn departure_angle(curve: &CurveBound, from: Point, to: Point) -> f64 {
    match curve.kind() {
        CurveKind::Vertical { .. } => {
            if to.y > from.y { FRAC_PI_2 } else { 1.5 * PI }
        }
        CurveKind::Point { .. } => norm_angle((to.y - from.y).atan2(to.x - from.x)),
        CurveKind::Function(f) => {
            let span = to.x - from.x;
            let step = TANGENT_STEP.min(span.abs() * 0.5).copysign(span);
            let dom = curve.domain();
            let y0 = f.eval(dom.clamp(from.x));
            let y1 = f.eval(dom.clamp(from.x + step));
            norm_angle((y1 - y0).atan2(step))
        }
    }
}
