//! Bounded curves: points, vertical segments and graphs of functions, each
//! restricted to an explicit [`Domain`].

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{FacetError, Result};
use crate::geometry::tolerance::{
    approx_eq, eq, ge, gt, le, lt, EPS, EPS_POS, MAX_BISECT_ITERS,
};

const MONOTONE_SAMPLES: usize = 64;

/// Closed interval `[lo, hi]`; either end may be infinite.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub lo: f64,
    pub hi: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DomainOverlap {
    None,
    SinglePoint(f64),
    Interval(Domain),
}

impl Domain {
    pub fn new(lo: f64, hi: f64) -> Option<Self> {
        if lo.is_nan() || hi.is_nan() || gt(lo, hi) {
            return None;
        }
        Some(Domain { lo: lo.min(hi), hi: hi.max(lo) })
    }

    /// Domain spanning two values given in any order.
    pub fn between(a: f64, b: f64) -> Self {
        Domain { lo: a.min(b), hi: a.max(b) }
    }

    pub fn point(x: f64) -> Self {
        Domain { lo: x, hi: x }
    }

    pub fn unbounded() -> Self {
        Domain { lo: f64::NEG_INFINITY, hi: f64::INFINITY }
    }

    pub fn is_degenerate(&self) -> bool {
        eq(self.lo, self.hi)
    }

    pub fn is_bounded(&self) -> bool {
        self.lo.is_finite() && self.hi.is_finite()
    }

    pub fn contains(&self, x: f64) -> bool {
        ge(x, self.lo) && le(x, self.hi)
    }

    /// Strict interior membership; the end points are excluded.
    pub fn contains_strictly(&self, x: f64) -> bool {
        gt(x, self.lo) && lt(x, self.hi)
    }

    pub fn covers(&self, other: &Domain) -> bool {
        self.contains(other.lo) && self.contains(other.hi)
    }

    pub fn width(&self) -> f64 {
        self.hi - self.lo
    }

    pub fn clamp(&self, x: f64) -> f64 {
        x.max(self.lo).min(self.hi)
    }

    pub fn overlap(&self, other: &Domain) -> DomainOverlap {
        let lo = self.lo.max(other.lo);
        let hi = self.hi.min(other.hi);
        if lt(hi, lo) {
            DomainOverlap::None
        } else if eq(lo, hi) {
            DomainOverlap::SinglePoint(lo)
        } else {
            DomainOverlap::Interval(Domain { lo, hi })
        }
    }

    /// `n` evenly spaced points strictly inside a bounded domain.
    pub fn interior_samples(&self, n: usize) -> Vec<f64> {
        if !self.is_bounded() || self.is_degenerate() {
            return Vec::new();
        }
        (1..=n)
            .map(|i| self.lo + self.width() * (i as f64) / ((n + 1) as f64))
            .collect()
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lo, self.hi)
    }
}

/// Evaluation callback of a general function curve, injected by the caller.
///
/// Implementations must be free of side effects; the same curve may be
/// evaluated from several graphs.
pub trait CurveFn: Send + Sync {
    fn eval(&self, x: f64) -> f64;

    /// Closed-form inverse, when one is known.
    fn inverse_at(&self, _y: f64) -> Option<f64> {
        None
    }

    /// The value of a horizontal (constant) function.
    fn constant(&self) -> Option<f64> {
        None
    }
}

/// `y = slope * x + intercept`
#[derive(Clone, Copy, Debug)]
pub struct Linear {
    pub slope: f64,
    pub intercept: f64,
}

impl CurveFn for Linear {
    fn eval(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
    fn inverse_at(&self, y: f64) -> Option<f64> {
        if approx_eq(self.slope, 0.0, EPS) {
            None
        } else {
            Some((y - self.intercept) / self.slope)
        }
    }
    fn constant(&self) -> Option<f64> {
        approx_eq(self.slope, 0.0, EPS).then_some(self.intercept)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Constant(pub f64);

impl CurveFn for Constant {
    fn eval(&self, _x: f64) -> f64 {
        self.0
    }
    fn constant(&self) -> Option<f64> {
        Some(self.0)
    }
}

/// Adapts a closure into a [`CurveFn`].
pub struct FnCurve<F>(pub F);

impl<F> CurveFn for FnCurve<F>
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn eval(&self, x: f64) -> f64 {
        (self.0)(x)
    }
}

/// Numeric inverse of a function that is monotone on `x_domain`.
pub struct Inverse {
    inner: Arc<dyn CurveFn>,
    x_domain: Domain,
    increasing: bool,
}

impl CurveFn for Inverse {
    fn eval(&self, y: f64) -> f64 {
        if let Some(x) = self.inner.inverse_at(y) {
            return x;
        }
        bisect(self.inner.as_ref(), self.x_domain, self.increasing, y)
    }
    fn inverse_at(&self, x: f64) -> Option<f64> {
        Some(self.inner.eval(x))
    }
}

fn bisect(f: &dyn CurveFn, dom: Domain, increasing: bool, y: f64) -> f64 {
    let (mut lo, mut hi) = (dom.lo, dom.hi);
    for _ in 0..MAX_BISECT_ITERS {
        let mid = 0.5 * (lo + hi);
        if hi - lo <= EPS * mid.abs().max(1.0) {
            return mid;
        }
        let below = f.eval(mid) < y;
        if below == increasing {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

#[derive(Clone)]
pub enum CurveKind {
    Point { x: f64, y: f64 },
    /// `x = x`; the bound's domain is the span of `y`.
    Vertical { x: f64 },
    Function(Arc<dyn CurveFn>),
}

struct CurveDef {
    label: String,
    kind: CurveKind,
}

/// A curve restricted to a domain.
///
/// Clones and [`CurveBound::restrict`]ed copies share identity with the
/// original, which is what lets a region's boundary pieces be matched back to
/// the curve definitions they came from.
#[derive(Clone)]
pub struct CurveBound {
    def: Arc<CurveDef>,
    domain: Domain,
}

impl fmt::Debug for CurveBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.def.kind {
            CurveKind::Point { .. } => "point",
            CurveKind::Vertical { .. } => "vertical",
            CurveKind::Function(_) => "function",
        };
        f.debug_struct("CurveBound")
            .field("label", &self.def.label)
            .field("kind", &kind)
            .field("domain", &self.domain)
            .finish()
    }
}

fn degenerate(label: &str, domain: Domain) -> FacetError {
    FacetError::Domain {
        curve: label.to_string(),
        value: domain.lo,
        domain: domain.to_string(),
    }
}

impl CurveBound {
    fn from_parts(label: String, kind: CurveKind, domain: Domain) -> Self {
        CurveBound {
            def: Arc::new(CurveDef { label, kind }),
            domain,
        }
    }

    pub fn point(x: f64, y: f64) -> Self {
        Self::from_parts(
            format!("point({}, {})", x, y),
            CurveKind::Point { x, y },
            Domain::point(x),
        )
    }

    pub fn vertical(label: impl Into<String>, x: f64, y_domain: Domain) -> Result<Self> {
        let label = label.into();
        if y_domain.is_degenerate() || !x.is_finite() {
            return Err(degenerate(&label, y_domain));
        }
        Ok(Self::from_parts(label, CurveKind::Vertical { x }, y_domain))
    }

    pub fn from_fn(
        label: impl Into<String>,
        domain: Domain,
        f: Arc<dyn CurveFn>,
    ) -> Result<Self> {
        let label = label.into();
        if domain.is_degenerate() {
            return Err(degenerate(&label, domain));
        }
        Ok(Self::from_parts(label, CurveKind::Function(f), domain))
    }

    pub fn function<F>(label: impl Into<String>, domain: Domain, f: F) -> Result<Self>
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self::from_fn(label, domain, Arc::new(FnCurve(f)))
    }

    pub fn linear(
        label: impl Into<String>,
        domain: Domain,
        slope: f64,
        intercept: f64,
    ) -> Result<Self> {
        Self::from_fn(label, domain, Arc::new(Linear { slope, intercept }))
    }

    pub fn constant(label: impl Into<String>, domain: Domain, y: f64) -> Result<Self> {
        Self::from_fn(label, domain, Arc::new(Constant(y)))
    }

    /// The straight segment between two points: a vertical bound when they
    /// share `x`, otherwise a linear (possibly constant) function.
    pub fn line_through(label: impl Into<String>, p: (f64, f64), q: (f64, f64)) -> Result<Self> {
        let label = label.into();
        if approx_eq(p.0, q.0, EPS_POS) {
            return Self::vertical(label, p.0, Domain::between(p.1, q.1));
        }
        let slope = (q.1 - p.1) / (q.0 - p.0);
        let domain = Domain::between(p.0, q.0);
        if approx_eq(slope, 0.0, EPS) {
            return Self::constant(label, domain, p.1);
        }
        Self::linear(label, domain, slope, p.1 - slope * p.0)
    }

    pub fn label(&self) -> &str {
        &self.def.label
    }

    pub fn kind(&self) -> &CurveKind {
        &self.def.kind
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn is_point(&self) -> bool {
        matches!(self.def.kind, CurveKind::Point { .. })
    }

    pub fn is_vertical(&self) -> bool {
        matches!(self.def.kind, CurveKind::Vertical { .. })
    }

    pub fn is_horizontal(&self) -> bool {
        match &self.def.kind {
            CurveKind::Function(f) => f.constant().is_some(),
            _ => false,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self.def.kind, CurveKind::Function(_))
    }

    pub fn vertical_x(&self) -> Option<f64> {
        match self.def.kind {
            CurveKind::Vertical { x } => Some(x),
            _ => None,
        }
    }

    /// Identity comparison: true when both bounds come from the same definition.
    pub fn same_curve(&self, other: &CurveBound) -> bool {
        Arc::ptr_eq(&self.def, &other.def)
    }

    fn out_of_domain(&self, value: f64) -> FacetError {
        FacetError::Domain {
            curve: self.def.label.clone(),
            value,
            domain: self.domain.to_string(),
        }
    }

    /// `y = f(x)`. `Ok(None)` when `y` is not unique (a vertical bound at its
    /// own `x`).
    pub fn evaluate_at(&self, x: f64) -> Result<Option<f64>> {
        match &self.def.kind {
            CurveKind::Point { x: px, y } => {
                if approx_eq(x, *px, EPS_POS) {
                    Ok(Some(*y))
                } else {
                    Err(self.out_of_domain(x))
                }
            }
            CurveKind::Vertical { x: vx } => {
                if approx_eq(x, *vx, EPS_POS) {
                    Ok(None)
                } else {
                    Err(self.out_of_domain(x))
                }
            }
            CurveKind::Function(f) => {
                if !self.domain.contains(x) {
                    return Err(self.out_of_domain(x));
                }
                Ok(Some(f.eval(self.domain.clamp(x))))
            }
        }
    }

    /// `x = f⁻¹(y)`. `Ok(None)` for a horizontal function at its own `y`.
    pub fn evaluate_at_y(&self, y: f64) -> Result<Option<f64>> {
        match &self.def.kind {
            CurveKind::Point { x, y: py } => {
                if approx_eq(y, *py, EPS_POS) {
                    Ok(Some(*x))
                } else {
                    Err(self.out_of_domain(y))
                }
            }
            CurveKind::Vertical { x } => {
                if self.domain.contains(y) {
                    Ok(Some(*x))
                } else {
                    Err(self.out_of_domain(y))
                }
            }
            CurveKind::Function(f) => {
                if let Some(c) = f.constant() {
                    return if approx_eq(c, y, EPS_POS) {
                        Ok(None)
                    } else {
                        Err(self.out_of_domain(y))
                    };
                }
                let increasing = self.monotone_direction()?;
                let range = self.range()?;
                if !range.contains(y) {
                    return Err(self.out_of_domain(y));
                }
                let x = match f.inverse_at(y) {
                    Some(x) => x,
                    None => bisect(f.as_ref(), self.domain, increasing, y),
                };
                Ok(Some(self.domain.clamp(x)))
            }
        }
    }

    /// `Some(true)` increasing, `Some(false)` decreasing, error otherwise.
    fn monotone_direction(&self) -> Result<bool> {
        let f = match &self.def.kind {
            CurveKind::Function(f) => f,
            _ => return Err(FacetError::InverseUndefined(self.def.label.clone())),
        };
        let probe = self.domain.clamp(0.0);
        if f.inverse_at(f.eval(probe)).is_some() {
            // closed-form inverse: direction from two probes
            let (a, b) = if self.domain.is_bounded() {
                (self.domain.lo, self.domain.hi)
            } else {
                (probe, probe + 1.0)
            };
            return Ok(f.eval(b) > f.eval(a));
        }
        if !self.domain.is_bounded() {
            return Err(FacetError::InverseUndefined(self.def.label.clone()));
        }
        let n = MONOTONE_SAMPLES;
        let mut prev = f.eval(self.domain.lo);
        let mut dir: Option<bool> = None;
        for i in 1..=n {
            let x = self.domain.lo + self.domain.width() * (i as f64) / (n as f64);
            let y = f.eval(x);
            if approx_eq(y, prev, EPS) {
                return Err(FacetError::InverseUndefined(self.def.label.clone()));
            }
            let up = y > prev;
            match dir {
                None => dir = Some(up),
                Some(d) if d != up => {
                    return Err(FacetError::InverseUndefined(self.def.label.clone()))
                }
                _ => {}
            }
            prev = y;
        }
        dir.ok_or_else(|| FacetError::InverseUndefined(self.def.label.clone()))
    }

    /// Range of `y` over the domain (`[y, y]` for a point, the domain itself for
    /// a vertical bound). Monotone functions use their end values; other
    /// bounded functions are sampled.
    pub fn range(&self) -> Result<Domain> {
        match &self.def.kind {
            CurveKind::Point { y, .. } => Ok(Domain::point(*y)),
            CurveKind::Vertical { .. } => Ok(self.domain),
            CurveKind::Function(f) => {
                if let Some(c) = f.constant() {
                    return Ok(Domain::point(c));
                }
                if self.monotone_direction().is_ok() {
                    return Ok(Domain::between(f.eval(self.domain.lo), f.eval(self.domain.hi)));
                }
                if !self.domain.is_bounded() {
                    return Err(FacetError::InverseUndefined(self.def.label.clone()));
                }
                let n = MONOTONE_SAMPLES * 4;
                let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
                for i in 0..=n {
                    let x = self.domain.lo + self.domain.width() * (i as f64) / (n as f64);
                    let y = f.eval(x);
                    lo = lo.min(y);
                    hi = hi.max(y);
                }
                Ok(Domain::between(lo, hi))
            }
        }
    }

    /// The same curve with the axes swapped.
    pub fn inverse(&self) -> Result<CurveBound> {
        let label = format!("inverse({})", self.def.label);
        match &self.def.kind {
            CurveKind::Point { x, y } => Ok(Self::from_parts(
                label,
                CurveKind::Point { x: *y, y: *x },
                Domain::point(*y),
            )),
            CurveKind::Vertical { x } => Self::constant(label, self.domain, *x),
            CurveKind::Function(f) => {
                if let Some(c) = f.constant() {
                    return Self::vertical(label, c, self.domain);
                }
                let increasing = self.monotone_direction()?;
                let range = self.range()?;
                let inv = Inverse {
                    inner: f.clone(),
                    x_domain: self.domain,
                    increasing,
                };
                Self::from_fn(label, range, Arc::new(inv))
            }
        }
    }

    pub fn domain_overlap(&self, other: &CurveBound) -> DomainOverlap {
        self.domain.overlap(&other.domain)
    }

    /// Narrows the domain, keeping the curve's identity.
    pub fn restrict(&self, domain: Domain) -> Result<CurveBound> {
        if !self.domain.covers(&domain) {
            return Err(self.out_of_domain(if self.domain.contains(domain.lo) {
                domain.hi
            } else {
                domain.lo
            }));
        }
        if domain.is_degenerate() && !self.is_point() {
            return Err(degenerate(&self.def.label, domain));
        }
        Ok(CurveBound {
            def: self.def.clone(),
            domain,
        })
    }

    /// Whether `(x, y)` lies on the curve within `eps`.
    pub fn passes_through(&self, x: f64, y: f64, eps: f64) -> bool {
        match &self.def.kind {
            CurveKind::Point { x: px, y: py } => approx_eq(x, *px, eps) && approx_eq(y, *py, eps),
            CurveKind::Vertical { x: vx } => {
                approx_eq(x, *vx, eps) && ge(y, self.domain.lo - eps) && le(y, self.domain.hi + eps)
            }
            CurveKind::Function(f) => {
                if !(ge(x, self.domain.lo - eps) && le(x, self.domain.hi + eps)) {
                    return false;
                }
                let fy = f.eval(self.domain.clamp(x));
                approx_eq(fy, y, eps * fy.abs().max(1.0))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parabola() -> CurveBound {
        CurveBound::function("x^2", Domain::new(-2.0, 2.0).unwrap(), |x| x * x).unwrap()
    }

    #[test]
    fn domain_rejects_inverted_bounds() {
        assert!(Domain::new(2.0, 1.0).is_none());
        assert!(Domain::new(1.0, 1.0).unwrap().is_degenerate());
        assert!(Domain::new(f64::NEG_INFINITY, 0.0).is_some());
    }

    #[test]
    fn evaluate_outside_domain_is_error() {
        let c = parabola();
        assert_eq!(c.evaluate_at(1.5).unwrap(), Some(2.25));
        let err = c.evaluate_at(3.0).unwrap_err();
        assert!(matches!(err, FacetError::Domain { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn vertical_is_undefined_at_its_x() {
        let v = CurveBound::vertical("x=1", 1.0, Domain::new(0.0, 3.0).unwrap()).unwrap();
        assert_eq!(v.evaluate_at(1.0).unwrap(), None);
        assert!(v.evaluate_at(2.0).is_err());
        assert_eq!(v.evaluate_at_y(2.0).unwrap(), Some(1.0));
        assert!(v.evaluate_at_y(4.0).is_err());
    }

    #[test]
    fn non_monotone_inverse_is_undefined() {
        let c = parabola();
        assert!(matches!(c.inverse(), Err(FacetError::InverseUndefined(_))));
        assert!(matches!(c.evaluate_at_y(1.0), Err(FacetError::InverseUndefined(_))));
    }

    #[test]
    fn monotone_inverse_by_bisection() {
        let c = parabola().restrict(Domain::new(0.0, 2.0).unwrap()).unwrap();
        let x = c.evaluate_at_y(2.0).unwrap().unwrap();
        assert!((x - 2f64.sqrt()).abs() < 1e-7);
        let inv = c.inverse().unwrap();
        assert_eq!(inv.domain(), Domain::new(0.0, 4.0).unwrap());
        let y = inv.evaluate_at(4.0).unwrap().unwrap();
        assert!((y - 2.0).abs() < 1e-7);
    }

    #[test]
    fn vertical_and_horizontal_swap_under_inverse() {
        let v = CurveBound::vertical("x=1", 1.0, Domain::new(0.0, 3.0).unwrap()).unwrap();
        let h = v.inverse().unwrap();
        assert!(h.is_horizontal());
        assert_eq!(h.evaluate_at(2.0).unwrap(), Some(1.0));
        let back = h.inverse().unwrap();
        assert!(back.is_vertical());
        assert_eq!(back.vertical_x(), Some(1.0));
        assert_eq!(back.domain(), Domain::new(0.0, 3.0).unwrap());
    }

    #[test]
    fn linear_inverse_on_unbounded_domain() {
        let l = CurveBound::linear("2x+1", Domain::unbounded(), 2.0, 1.0).unwrap();
        assert_eq!(l.evaluate_at_y(5.0).unwrap(), Some(2.0));
        let inv = l.inverse().unwrap();
        assert_eq!(inv.evaluate_at(5.0).unwrap(), Some(2.0));
    }

    #[test]
    fn overlap_classification() {
        let a = Domain::new(0.0, 2.0).unwrap();
        assert_eq!(a.overlap(&Domain::new(3.0, 4.0).unwrap()), DomainOverlap::None);
        assert_eq!(a.overlap(&Domain::new(2.0, 4.0).unwrap()), DomainOverlap::SinglePoint(2.0));
        assert_eq!(
            a.overlap(&Domain::new(1.0, 4.0).unwrap()),
            DomainOverlap::Interval(Domain::new(1.0, 2.0).unwrap())
        );
    }

    #[test]
    fn restrict_keeps_identity() {
        let c = parabola();
        let r = c.restrict(Domain::new(0.0, 1.0).unwrap()).unwrap();
        assert!(r.same_curve(&c));
        assert!(!parabola().same_curve(&c));
        assert!(c.restrict(Domain::new(0.0, 5.0).unwrap()).is_err());
    }

    #[test]
    fn domain_error_recovers_through_overlap() {
        let a = CurveBound::linear("a", Domain::new(0.0, 2.0).unwrap(), 1.0, 0.0).unwrap();
        let b = CurveBound::linear("b", Domain::new(1.0, 3.0).unwrap(), -1.0, 4.0).unwrap();
        assert!(a.evaluate_at(2.5).is_err());
        let DomainOverlap::Interval(shared) = a.domain_overlap(&b) else {
            panic!("expected interval overlap");
        };
        let a2 = a.restrict(shared).unwrap();
        assert_eq!(a2.evaluate_at(shared.hi).unwrap(), Some(2.0));
    }

    #[test]
    fn line_through_picks_kind() {
        assert!(CurveBound::line_through("v", (1.0, 0.0), (1.0, 2.0)).unwrap().is_vertical());
        assert!(CurveBound::line_through("h", (0.0, 2.0), (1.0, 2.0)).unwrap().is_horizontal());
        let d = CurveBound::line_through("d", (0.0, 0.0), (2.0, 4.0)).unwrap();
        assert_eq!(d.evaluate_at(1.0).unwrap(), Some(2.0));
        assert!(CurveBound::line_through("p", (1.0, 1.0), (1.0, 1.0)).is_err());
    }
}
