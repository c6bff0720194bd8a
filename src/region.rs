//! Solver-facing description of one bounded face: left/right extremes plus
//! upper and lower boundary chains ordered by increasing x.

use serde::{Deserialize, Serialize};

use crate::error::{FacetError, Result};
use crate::geometry::curve::{CurveBound, CurveKind, Domain};
use crate::geometry::math::polygon_bbox;
use crate::geometry::tolerance::{approx_eq, gt, le, lt, EPS, EPS_POS};
use crate::model::{EdgeId, HalfEdgeId, Point};

/// A reference line for position and revolution queries.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "axis", content = "at", rename_all = "lowercase")]
pub enum Axis {
    /// `y = c`
    Horizontal(f64),
    /// `x = c`
    Vertical(f64),
}

/// One boundary edge inside a chain, oriented left to right.
#[derive(Clone, Debug)]
pub struct ChainPiece {
    /// The edge's curve restricted to this piece; same identity as the
    /// curve the edge was built from.
    pub curve: CurveBound,
    pub edge: EdgeId,
    pub start: Point,
    pub end: Point,
}

impl ChainPiece {
    pub fn is_vertical(&self) -> bool {
        self.curve.is_vertical()
    }

    pub fn x_span(&self) -> Domain {
        Domain::between(self.start.x, self.end.x)
    }

    /// Strictly moves to the right.
    pub fn advances(&self) -> bool {
        !self.is_vertical() && gt(self.end.x, self.start.x)
    }

    fn value_at(&self, x: f64) -> Option<f64> {
        if self.is_vertical() || !self.x_span().contains(x) {
            return None;
        }
        if approx_eq(x, self.start.x, EPS_POS) {
            return Some(self.start.y);
        }
        if approx_eq(x, self.end.x, EPS_POS) {
            return Some(self.end.y);
        }
        match self.curve.kind() {
            CurveKind::Function(f) => Some(f.eval(self.curve.domain().clamp(x))),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Chain {
    pub pieces: Vec<ChainPiece>,
}

impl Chain {
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn curves(&self) -> impl Iterator<Item = &CurveBound> {
        self.pieces.iter().map(|p| &p.curve)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.curves().map(CurveBound::label).collect()
    }

    /// Every distinct y the chain takes at `x`; more than one when it folds.
    pub fn values_at(&self, x: f64) -> Vec<f64> {
        let mut out: Vec<f64> = Vec::new();
        for p in &self.pieces {
            if let Some(y) = p.value_at(x) {
                if !out.iter().any(|&v| approx_eq(v, y, EPS_POS)) {
                    out.push(y);
                }
            }
        }
        out
    }

    pub fn evaluate_at(&self, x: f64) -> Result<f64> {
        let vals = self.values_at(x);
        match vals.as_slice() {
            [y] => Ok(*y),
            [] => Err(FacetError::Domain {
                curve: self.labels().join(" + "),
                value: x,
                domain: self.x_span().map_or_else(|| "[]".to_string(), |d| d.to_string()),
            }),
            _ => Err(FacetError::UnsupportedTopology(format!(
                "chain takes {} values at x = {}",
                vals.len(),
                x
            ))),
        }
    }

    /// No piece runs backwards or vertically.
    pub fn is_monotone(&self) -> bool {
        self.pieces.iter().all(ChainPiece::advances)
    }

    pub fn x_span(&self) -> Option<Domain> {
        let first = self.pieces.first()?;
        let last = self.pieces.last()?;
        Some(Domain::between(first.start.x, last.end.x))
    }
}

#[derive(Clone, Debug)]
pub struct Region {
    pub(crate) cycle_index: usize,
    pub(crate) left: CurveBound,
    pub(crate) right: CurveBound,
    pub(crate) upper: Chain,
    pub(crate) lower: Chain,
    pub(crate) signed_area: f64,
    pub(crate) half_edges: Vec<HalfEdgeId>,
    pub(crate) outline: Vec<Point>,
}

fn bound_x(b: &CurveBound) -> f64 {
    match b.kind() {
        CurveKind::Point { x, .. } => *x,
        CurveKind::Vertical { x } => *x,
        CurveKind::Function(_) => b.domain().lo,
    }
}

fn line_x(b: &CurveBound) -> Result<f64> {
    match b.kind() {
        CurveKind::Point { x, .. } | CurveKind::Vertical { x } => Ok(*x),
        CurveKind::Function(_) => Err(FacetError::UnsupportedTopology(format!(
            "'{}' is not a vertical line",
            b.label()
        ))),
    }
}

impl Region {
    /// Index of the source cycle in the graph's primitive list.
    pub fn cycle_index(&self) -> usize {
        self.cycle_index
    }

    /// A point bound, or the vertical bound closing the region on the left.
    pub fn left(&self) -> &CurveBound {
        &self.left
    }

    pub fn right(&self) -> &CurveBound {
        &self.right
    }

    pub fn upper(&self) -> &Chain {
        &self.upper
    }

    pub fn lower(&self) -> &Chain {
        &self.lower
    }

    pub fn signed_area(&self) -> f64 {
        self.signed_area
    }

    pub fn half_edges(&self) -> &[HalfEdgeId] {
        &self.half_edges
    }

    pub fn outline(&self) -> &[Point] {
        &self.outline
    }

    pub fn left_x(&self) -> f64 {
        bound_x(&self.left)
    }

    pub fn right_x(&self) -> f64 {
        bound_x(&self.right)
    }

    /// Horizontal extent `[left.x, right.x]`.
    pub fn domain(&self) -> Domain {
        Domain::between(self.left_x(), self.right_x())
    }

    pub fn y_range(&self) -> Domain {
        let (_, lo, _, hi) = polygon_bbox(&self.outline);
        Domain::between(lo, hi)
    }

    /// True when the vertical line `x` lies strictly to the right of the whole
    /// region; touching its right extreme does not count.
    pub fn right_of(&self, x: f64) -> bool {
        lt(self.right_x(), x)
    }

    /// True when the vertical line `x` lies strictly to the left of the whole
    /// region.
    pub fn left_of(&self, x: f64) -> bool {
        lt(x, self.left_x())
    }

    /// [`Region::right_of`] for a line given as a bound, e.g. another
    /// region's extreme. A point bound stands for the vertical line through it.
    pub fn right_of_bound(&self, bound: &CurveBound) -> Result<bool> {
        Ok(self.right_of(line_x(bound)?))
    }

    /// [`Region::left_of`] for a line given as a bound.
    pub fn left_of_bound(&self, bound: &CurveBound) -> Result<bool> {
        Ok(self.left_of(line_x(bound)?))
    }

    pub fn passes_through(&self, axis: Axis) -> bool {
        match axis {
            Axis::Vertical(x) => self.domain().contains_strictly(x),
            Axis::Horizontal(y) => self.y_range().contains_strictly(y),
        }
    }

    /// The chain nearer to a horizontal axis lying outside the region: the
    /// inner radius of a solid of revolution about that axis.
    ///
    /// A vertical axis is an error: both chains span the same x-interval, so
    /// neither is nearer to it. Use [`Region::left`] and [`Region::right`] for
    /// revolution about a vertical axis.
    pub fn closest_chain(&self, axis: Axis) -> Result<&Chain> {
        match axis {
            Axis::Vertical(x) => Err(FacetError::UnsupportedTopology(format!(
                "upper/lower chains are equidistant from the vertical axis x = {}",
                x
            ))),
            Axis::Horizontal(y) => {
                if self.passes_through(axis) {
                    return Err(FacetError::AxisThroughRegion(format!("y = {}", y)));
                }
                if le(self.y_range().hi, y) {
                    Ok(&self.upper)
                } else {
                    Ok(&self.lower)
                }
            }
        }
    }

    /// Both chains are graphs of x: integrable directly with respect to x.
    pub fn is_one_to_one(&self) -> bool {
        self.upper.is_monotone() && self.lower.is_monotone()
    }

    pub fn require_one_to_one(&self) -> Result<()> {
        if self.is_one_to_one() {
            Ok(())
        } else {
            Err(FacetError::UnsupportedTopology(format!(
                "region of cycle {} is not one-to-one in x",
                self.cycle_index
            )))
        }
    }

    fn check_x(&self, x: f64) -> Result<()> {
        if self.domain().contains(x) {
            Ok(())
        } else {
            Err(FacetError::Domain {
                curve: format!("region {}", self.cycle_index),
                value: x,
                domain: self.domain().to_string(),
            })
        }
    }

    pub fn upper_at(&self, x: f64) -> Result<f64> {
        self.check_x(x)?;
        self.upper.evaluate_at(x)
    }

    pub fn lower_at(&self, x: f64) -> Result<f64> {
        self.check_x(x)?;
        self.lower.evaluate_at(x)
    }

    /// Strict interior test (even-odd rule on the flattened outline).
    pub fn contains(&self, x: f64, y: f64) -> bool {
        if !self.domain().contains_strictly(x) {
            return false;
        }
        let n = self.outline.len();
        let mut inside = false;
        for i in 0..n {
            let a = self.outline[i];
            let b = self.outline[(i + 1) % n];
            if (a.y > y) != (b.y > y) {
                let t = (y - a.y) / (b.y - a.y);
                let cx = a.x + t * (b.x - a.x);
                if approx_eq(cx, x, EPS) {
                    return false; // on the boundary
                }
                if cx > x {
                    inside = !inside;
                }
            }
        }
        inside
    }
}
