use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use crate::algorithms::facets::{Cycle, FacetCalculator, FacetOptions, Facets, Primitive};
use crate::error::{FacetError, Result};
use crate::geometry::curve::{CurveBound, Domain};
use crate::geometry::tolerance::{approx_eq, lex_cmp, EPS_CHECK, EPS_POS};
use crate::model::{edge_of, twin, HalfEdgeId, NodeId, Point};
use crate::region::{Chain, ChainPiece, Region};
use crate::PlanarGraph;

/// Turns the bounded cycles of a graph into [`Region`]s.
pub struct RegionAssembler<'a> {
    graph: &'a PlanarGraph,
    facets: Arc<Facets>,
    options: FacetOptions,
}

/// One step of a left-to-right path between the extremes of a cycle.
#[derive(Clone, Copy)]
struct Step {
    h: HalfEdgeId,
    start: Point,
    end: Point,
}

impl<'a> RegionAssembler<'a> {
    pub fn new(calc: &'a FacetCalculator) -> Result<Self> {
        Ok(RegionAssembler {
            graph: calc.graph().as_ref(),
            facets: calc.primitives()?,
            options: calc.options(),
        })
    }

    pub fn from_facets(graph: &'a PlanarGraph, facets: Arc<Facets>, options: FacetOptions) -> Self {
        RegionAssembler {
            graph,
            facets,
            options,
        }
    }

    pub fn facets(&self) -> &Facets {
        &self.facets
    }

    /// One result per bounded cycle, in primitive order. A failure only
    /// affects its own region.
    pub fn assemble(&self) -> Vec<Result<Region>> {
        self.facets
            .primitives
            .iter()
            .enumerate()
            .filter_map(|(i, p)| match p {
                Primitive::MinimalCycle(c) if !c.is_outer() => Some(self.build_region(i, c)),
                _ => None,
            })
            .collect()
    }

    /// The regions that assembled cleanly; rejected ones are logged.
    pub fn regions(&self) -> Vec<Region> {
        let mut out = Vec::new();
        for r in self.assemble() {
            match r {
                Ok(region) => out.push(region),
                Err(e) => log::warn!("region rejected: {}", e),
            }
        }
        out
    }

    pub fn build_region(&self, index: usize, cycle: &Cycle) -> Result<Region> {
        if let Some(node) = repeated_node(cycle) {
            return Err(FacetError::UnsupportedTopology(format!(
                "cycle {} touches itself at node {}",
                index, node
            )));
        }
        let n = cycle.len();
        let pos = cycle
            .nodes
            .iter()
            .map(|&id| {
                self.graph
                    .node_pos(id)
                    .ok_or_else(|| FacetError::structural(format!("cycle {} visits missing node {}", index, id)))
            })
            .collect::<Result<Vec<Point>>>()?;
        let lex = |i: &usize, j: &usize| lex_cmp(pos[*i].x, pos[*i].y, pos[*j].x, pos[*j].y);
        let i_min = (0..n).min_by(lex).unwrap_or(0);
        let i_max = (0..n).max_by(lex).unwrap_or(0);
        if lex(&i_min, &i_max) != Ordering::Less {
            return Err(FacetError::UnsupportedTopology(format!(
                "cycle {} has no distinct extremes",
                index
            )));
        }

        // forward walk from the left extreme reaches the right extreme
        let mut path_a: Vec<Step> = Vec::new();
        let mut i = i_min;
        while i != i_max {
            let j = (i + 1) % n;
            path_a.push(Step { h: cycle.half_edges[i], start: pos[i], end: pos[j] });
            i = j;
        }
        // the other way round, reversed to run left to right
        let mut path_b: Vec<Step> = Vec::new();
        let mut i = i_max;
        while i != i_min {
            let j = (i + 1) % n;
            path_b.push(Step { h: twin(cycle.half_edges[i]), start: pos[j], end: pos[i] });
            i = j;
        }
        path_b.reverse();

        let left_pt = pos[i_min];
        let right_pt = pos[i_max];
        let mut left_parts: Vec<Step> = Vec::new();
        let mut right_parts: Vec<Step> = Vec::new();
        let chain_a = self.peel_chain(&path_a, left_pt.x, right_pt.x, &mut left_parts, &mut right_parts)?;
        let chain_b = self.peel_chain(&path_b, left_pt.x, right_pt.x, &mut left_parts, &mut right_parts)?;
        let left = self.extreme_bound(left_pt, &left_parts)?;
        let right = self.extreme_bound(right_pt, &right_parts)?;

        let span = Domain::between(left_pt.x, right_pt.x);
        let samples = span.interior_samples(self.options.check_samples);
        let (upper, lower) = if samples.is_empty() {
            order_chains(index, chain_a, chain_b, &span.interior_samples(1))?
        } else {
            order_chains(index, chain_a, chain_b, &samples)?
        };
        for &x in &samples {
            let (u, l) = (upper.values_at(x), lower.values_at(x));
            if let ([u], [l]) = (u.as_slice(), l.as_slice()) {
                if *u < *l - EPS_CHECK * l.abs().max(1.0) {
                    return Err(FacetError::Classification {
                        cycle: index,
                        x,
                        upper: *u,
                        lower: *l,
                    });
                }
            }
        }

        let mut outline = Vec::new();
        for &h in &cycle.half_edges {
            let mut pts = self.graph.flatten_half_edge(h, self.options.samples_per_edge)?;
            pts.pop();
            outline.extend(pts);
        }

        Ok(Region {
            cycle_index: index,
            left,
            right,
            upper,
            lower,
            signed_area: cycle.signed_area,
            half_edges: cycle.half_edges.clone(),
            outline,
        })
    }

    /// Moves vertical steps lying on the extremes into `left`/`right` and
    /// converts the rest into chain pieces.
    fn peel_chain(
        &self,
        path: &[Step],
        left_x: f64,
        right_x: f64,
        left: &mut Vec<Step>,
        right: &mut Vec<Step>,
    ) -> Result<Chain> {
        let on = |s: &Step, x: f64| {
            approx_eq(s.start.x, x, EPS_POS) && approx_eq(s.end.x, x, EPS_POS) && self.is_vertical(s.h)
        };
        let mut lo = 0;
        while lo < path.len() && on(&path[lo], left_x) {
            left.push(path[lo]);
            lo += 1;
        }
        let mut hi = path.len();
        while hi > lo && on(&path[hi - 1], right_x) {
            right.push(path[hi - 1]);
            hi -= 1;
        }
        let mut pieces = Vec::with_capacity(hi - lo);
        for s in &path[lo..hi] {
            pieces.push(self.piece(s)?);
        }
        Ok(Chain { pieces })
    }

    fn is_vertical(&self, h: HalfEdgeId) -> bool {
        self.graph.half_edge_curve(h).map_or(false, CurveBound::is_vertical)
    }

    fn piece(&self, s: &Step) -> Result<ChainPiece> {
        let curve = self
            .graph
            .half_edge_curve(s.h)
            .ok_or_else(|| FacetError::structural(format!("half-edge {} has no edge", s.h)))?;
        let dom = curve.domain();
        let span = if curve.is_vertical() {
            Domain::between(dom.clamp(s.start.y), dom.clamp(s.end.y))
        } else {
            Domain::between(dom.clamp(s.start.x), dom.clamp(s.end.x))
        };
        Ok(ChainPiece {
            curve: curve.restrict(span)?,
            edge: edge_of(s.h),
            start: s.start,
            end: s.end,
        })
    }

    /// A point bound at `p`, or the vertical bound spanned by `parts`.
    fn extreme_bound(&self, p: Point, parts: &[Step]) -> Result<CurveBound> {
        if parts.is_empty() {
            return Ok(CurveBound::point(p.x, p.y));
        }
        let span = parts.iter().fold(Domain::point(p.y), |d, s| {
            Domain::between(d.lo.min(s.start.y).min(s.end.y), d.hi.max(s.start.y).max(s.end.y))
        });
        if let [only] = parts {
            return Ok(self.piece(only)?.curve);
        }
        let label = parts
            .iter()
            .filter_map(|s| self.graph.half_edge_curve(s.h).map(|c| c.label().to_string()))
            .collect::<Vec<_>>()
            .join(" + ");
        CurveBound::vertical(label, p.x, span)
    }
}

fn repeated_node(cycle: &Cycle) -> Option<NodeId> {
    let mut seen = HashSet::with_capacity(cycle.nodes.len());
    cycle.nodes.iter().copied().find(|n| !seen.insert(*n))
}

/// Decides which chain lies above by the mean vertical gap over `samples`.
fn order_chains(index: usize, a: Chain, b: Chain, samples: &[f64]) -> Result<(Chain, Chain)> {
    let mut gap = 0.0;
    let mut seen = 0usize;
    for &x in samples {
        let (va, vb) = (a.values_at(x), b.values_at(x));
        if va.is_empty() || vb.is_empty() {
            continue;
        }
        let mean = |v: &[f64]| v.iter().sum::<f64>() / v.len() as f64;
        gap += mean(&va) - mean(&vb);
        seen += 1;
    }
    if seen == 0 {
        return Err(FacetError::UnsupportedTopology(format!(
            "cycle {} has no shared x between its chains",
            index
        )));
    }
    Ok(if gap >= 0.0 { (a, b) } else { (b, a) })
}

impl FacetCalculator {
    /// Shortcut for assembling the regions of this calculator's graph.
    pub fn regions(&self) -> Result<Vec<Result<Region>>> {
        Ok(RegionAssembler::new(self)?.assemble())
    }
}
