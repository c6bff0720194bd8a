use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use serde::Serialize;

use crate::error::{FacetError, Result};
use crate::geometry::math::polygon_area;
use crate::geometry::tolerance::{EPS_AREA, EPS_ON_CURVE};
use crate::model::{edge_of, twin, HalfEdgeId, NodeId, Point};
use crate::{edge_sides, PlanarGraph};

#[cfg(feature = "facet_prof")]
use std::time::Instant;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FacetOptions {
    /// Segments used to flatten a function curve for area and extent queries.
    pub samples_per_edge: usize,
    /// Interior x samples for the `upper >= lower` region check.
    pub check_samples: usize,
}

impl Default for FacetOptions {
    fn default() -> Self {
        FacetOptions {
            samples_per_edge: 16,
            check_samples: 9,
        }
    }
}

/// The closed boundary walk of one face. `nodes[i]` is the origin of
/// `half_edges[i]`. A walk that touches itself at a vertex keeps every pass
/// through that vertex and is not [simple](Cycle::is_simple).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Cycle {
    pub half_edges: Vec<HalfEdgeId>,
    pub nodes: Vec<NodeId>,
    /// Positive for counter-clockwise (bounded) faces.
    pub signed_area: f64,
}

impl Cycle {
    pub fn len(&self) -> usize {
        self.half_edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.half_edges.is_empty()
    }

    /// Clockwise cycles bound the unbounded face of their component.
    pub fn is_outer(&self) -> bool {
        self.signed_area < 0.0
    }

    /// No node is visited twice.
    pub fn is_simple(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.nodes.len());
        self.nodes.iter().all(|n| seen.insert(*n))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Primitive {
    IsolatedNode { node: NodeId },
    Filament { half_edges: Vec<HalfEdgeId> },
    MinimalCycle(Cycle),
}

impl Primitive {
    pub fn half_edge_count(&self) -> usize {
        match self {
            Primitive::IsolatedNode { .. } => 0,
            Primitive::Filament { half_edges } => half_edges.len(),
            Primitive::MinimalCycle(c) => c.len(),
        }
    }

    pub fn as_cycle(&self) -> Option<&Cycle> {
        match self {
            Primitive::MinimalCycle(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_outer_face(&self) -> bool {
        self.as_cycle().map_or(false, Cycle::is_outer)
    }
}

/// Every primitive of one graph; each half-edge belongs to exactly one.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Facets {
    pub primitives: Vec<Primitive>,
}

impl Facets {
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn cycles(&self) -> impl Iterator<Item = &Cycle> {
        self.primitives.iter().filter_map(Primitive::as_cycle)
    }

    pub fn bounded_cycles(&self) -> impl Iterator<Item = &Cycle> {
        self.cycles().filter(|c| !c.is_outer())
    }

    pub fn outer_faces(&self) -> impl Iterator<Item = &Cycle> {
        self.cycles().filter(|c| c.is_outer())
    }

    pub fn isolated_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::IsolatedNode { node } => Some(*node),
            _ => None,
        })
    }

    pub fn filaments(&self) -> impl Iterator<Item = &[HalfEdgeId]> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Filament { half_edges } => Some(half_edges.as_slice()),
            _ => None,
        })
    }

    pub fn half_edge_total(&self) -> usize {
        self.primitives.iter().map(Primitive::half_edge_count).sum()
    }
}

/// Computes and caches the primitives of one graph.
///
/// The caller's graph is shared read-only; each computation runs on a private
/// copy. The cache lives until [`FacetCalculator::replace_graph`].
pub struct FacetCalculator {
    graph: Arc<PlanarGraph>,
    options: FacetOptions,
    cache: RefCell<Option<Arc<Facets>>>,
}

impl FacetCalculator {
    pub fn new(graph: Arc<PlanarGraph>) -> Self {
        FacetCalculator {
            graph,
            options: FacetOptions::default(),
            cache: RefCell::new(None),
        }
    }

    pub fn with_options(mut self, options: FacetOptions) -> Self {
        self.options = options;
        self.cache = RefCell::new(None);
        self
    }

    pub fn graph(&self) -> &Arc<PlanarGraph> {
        &self.graph
    }

    pub fn options(&self) -> FacetOptions {
        self.options
    }

    pub fn replace_graph(&mut self, graph: Arc<PlanarGraph>) {
        self.graph = graph;
        self.cache = RefCell::new(None);
    }

    pub fn primitives(&self) -> Result<Arc<Facets>> {
        if let Some(f) = self.cache.borrow().as_ref() {
            return Ok(f.clone());
        }
        let facets = Arc::new(self.compute_uncached()?);
        *self.cache.borrow_mut() = Some(facets.clone());
        Ok(facets)
    }

    /// Traces a fresh working copy of the graph, bypassing the cache.
    pub fn compute_uncached(&self) -> Result<Facets> {
        #[cfg(feature = "facet_prof")]
        let t_all = Instant::now();
        let mut work = WorkGraph::new(self.graph.as_ref().clone(), self.options)?;
        let facets = work.trace()?;
        let outer = facets.outer_faces().count();
        log::debug!(
            "facets: nodes={} edges={} primitives={} bounded={} outer={}",
            self.graph.node_count(),
            self.graph.edge_count(),
            facets.len(),
            facets.bounded_cycles().count(),
            outer
        );
        if outer > 1 {
            log::warn!("facets: {} outer boundaries (disconnected components)", outer);
        }
        #[cfg(feature = "facet_prof")]
        log::debug!("facets total_ms={:.3}", t_all.elapsed().as_secs_f64() * 1000.0);
        Ok(facets)
    }
}

struct BitSet {
    words: Vec<u64>,
}

impl BitSet {
    fn new(len: usize) -> Self {
        BitSet { words: vec![0; (len + 63) / 64] }
    }
    fn insert(&mut self, i: usize) {
        self.words[i / 64] |= 1 << (i % 64);
    }
    fn contains(&self, i: usize) -> bool {
        self.words[i / 64] & (1 << (i % 64)) != 0
    }
}

/// Private copy of a graph plus the tracing state.
struct WorkGraph {
    graph: PlanarGraph,
    order: Vec<Vec<HalfEdgeId>>, // sorted departures per node
    visited: BitSet,
    options: FacetOptions,
}

impl WorkGraph {
    fn new(graph: PlanarGraph, options: FacetOptions) -> Result<Self> {
        #[cfg(feature = "facet_prof")]
        let t = Instant::now();
        validate(&graph)?;
        #[cfg(feature = "facet_prof")]
        let validate_ms = t.elapsed().as_secs_f64() * 1000.0;
        #[cfg(feature = "facet_prof")]
        let t = Instant::now();
        let mut order = Vec::with_capacity(graph.nodes.len());
        for (id, _) in graph.nodes() {
            order.push(graph.sorted_half_edges(id)?);
        }
        #[cfg(feature = "facet_prof")]
        log::debug!(
            "facets validate_ms={:.3} sort_ms={:.3}",
            validate_ms,
            t.elapsed().as_secs_f64() * 1000.0
        );
        let visited = BitSet::new(graph.half_edge_count() as usize);
        Ok(WorkGraph {
            graph,
            order,
            visited,
            options,
        })
    }

    fn origin(&self, h: HalfEdgeId) -> Result<NodeId> {
        self.graph
            .half_edge_origin(h)
            .ok_or_else(|| FacetError::structural(format!("half-edge {} has no origin", h)))
    }

    fn target(&self, h: HalfEdgeId) -> Result<NodeId> {
        self.origin(twin(h))
    }

    fn trace(&mut self) -> Result<Facets> {
        let mut primitives = Vec::new();
        for (id, n) in self.graph.nodes() {
            if n.degree() == 0 {
                primitives.push(Primitive::IsolatedNode { node: id });
            }
        }
        for start in 0..self.graph.half_edge_count() {
            if self.visited.contains(start as usize) {
                continue;
            }
            let walk = self.trace_walk(start)?;
            self.classify(&walk, &mut primitives)?;
        }
        Ok(Facets { primitives })
    }

    /// Follows angular successors from `start` until the walk closes.
    fn trace_walk(&mut self, start: HalfEdgeId) -> Result<Vec<HalfEdgeId>> {
        let limit = self.graph.half_edge_count() as usize;
        let mut walk = Vec::new();
        let mut h = start;
        loop {
            walk.push(h);
            self.visited.insert(h as usize);
            let w = self.target(h)?;
            let next = PlanarGraph::successor_in(&self.order[w as usize], h).ok_or_else(|| {
                FacetError::structural(format!(
                    "half-edge {} arrives at node {} without a departing twin",
                    h, w
                ))
            })?;
            if next == start {
                break;
            }
            if walk.len() >= limit || self.visited.contains(next as usize) {
                return Err(FacetError::structural(format!(
                    "walk from half-edge {} does not close",
                    start
                )));
            }
            h = next;
        }
        Ok(walk)
    }

    /// Spurs become filaments; what is left is one face. Its orientation is
    /// taken over the whole walk, so an outer boundary pinched at a vertex
    /// stays a single outer face and a hole touching its face's boundary
    /// stays inside that face.
    fn classify(&self, walk: &[HalfEdgeId], out: &mut Vec<Primitive>) -> Result<()> {
        let (rest, spurs) = peel_spurs(walk);
        for run in spurs {
            out.push(Primitive::Filament { half_edges: run });
        }
        if rest.is_empty() {
            return Ok(());
        }
        let area = self.loop_area(&rest)?;
        if area.abs() <= EPS_AREA {
            out.push(Primitive::Filament { half_edges: rest });
            return Ok(());
        }
        let nodes = rest.iter().map(|&h| self.origin(h)).collect::<Result<Vec<_>>>()?;
        let cycle = Cycle {
            half_edges: rest,
            nodes,
            signed_area: area,
        };
        if !cycle.is_simple() {
            log::debug!(
                "facets: {} walk of {} half-edges touches itself (area {:.6})",
                if cycle.is_outer() { "outer" } else { "bounded" },
                cycle.len(),
                area
            );
        }
        out.push(Primitive::MinimalCycle(cycle));
        Ok(())
    }

    fn loop_area(&self, lp: &[HalfEdgeId]) -> Result<f64> {
        let mut ring: Vec<Point> = Vec::new();
        for &h in lp {
            let mut pts = self.graph.flatten_half_edge(h, self.options.samples_per_edge)?;
            pts.pop(); // next half-edge starts here
            ring.extend(pts);
        }
        Ok(polygon_area(&ring))
    }
}

/// Removes every half-edge immediately followed by its twin (cyclically),
/// repeatedly. Returns the remaining walk and the removed runs in walk order.
fn peel_spurs(walk: &[HalfEdgeId]) -> (Vec<HalfEdgeId>, Vec<Vec<HalfEdgeId>>) {
    let n = walk.len();
    let mut removed = vec![false; n];
    let mut stack: VecDeque<usize> = VecDeque::with_capacity(n);
    for i in 0..n {
        match stack.back() {
            Some(&top) if walk[top] == twin(walk[i]) => {
                stack.pop_back();
                removed[top] = true;
                removed[i] = true;
            }
            _ => stack.push_back(i),
        }
    }
    while stack.len() >= 2 {
        let (first, last) = (stack[0], stack[stack.len() - 1]);
        if walk[last] != twin(walk[first]) {
            break;
        }
        stack.pop_front();
        stack.pop_back();
        removed[first] = true;
        removed[last] = true;
    }
    let rest: Vec<HalfEdgeId> = stack.iter().map(|&i| walk[i]).collect();

    let mut runs: Vec<Vec<HalfEdgeId>> = Vec::new();
    let mut cur: Vec<HalfEdgeId> = Vec::new();
    for i in 0..n {
        if removed[i] {
            cur.push(walk[i]);
        } else if !cur.is_empty() {
            runs.push(std::mem::take(&mut cur));
        }
    }
    if !cur.is_empty() {
        if removed[0] && !rest.is_empty() && !runs.is_empty() {
            // the trailing run continues into the leading one
            let mut head = runs.remove(0);
            cur.append(&mut head);
        }
        runs.push(cur);
    }
    (rest, runs)
}

/// Checks everything the tracer relies on before it starts.
fn validate(g: &PlanarGraph) -> Result<()> {
    let mut expected_degree = vec![0usize; g.nodes.len()];
    for (eid, e) in g.edges() {
        let pa = g.node_pos(e.a);
        let pb = g.node_pos(e.b);
        let (pa, pb) = match (pa, pb) {
            (Some(pa), Some(pb)) => (pa, pb),
            _ => {
                let missing = if pa.is_none() { e.a } else { e.b };
                return Err(FacetError::structural(format!(
                    "edge {} references missing node {}",
                    eid, missing
                )));
            }
        };
        if e.a == e.b {
            return Err(FacetError::structural(format!("edge {} is a self loop at node {}", eid, e.a)));
        }
        if e.curve.is_point() {
            return Err(FacetError::structural(format!("edge {} is tagged with a point curve", eid)));
        }
        for (n, p) in [(e.a, pa), (e.b, pb)] {
            if !e.curve.passes_through(p.x, p.y, EPS_ON_CURVE) {
                return Err(FacetError::structural(format!(
                    "node {} does not lie on curve '{}' of edge {}",
                    n,
                    e.curve.label(),
                    eid
                )));
            }
        }
        match edge_sides(&e.curve, pa, pb) {
            Some(sides) if sides == e.sides => {}
            _ => {
                return Err(FacetError::structural(format!(
                    "node {} has inconsistent side annotations on edge {}",
                    e.a, eid
                )))
            }
        }
        expected_degree[e.a as usize] += 1;
        expected_degree[e.b as usize] += 1;
    }
    for (id, n) in g.nodes() {
        if n.half_edges.len() != expected_degree[id as usize] {
            return Err(FacetError::structural(format!(
                "node {} lists {} half-edges, expected {}",
                id,
                n.half_edges.len(),
                expected_degree[id as usize]
            )));
        }
        for &h in &n.half_edges {
            if (edge_of(h) as usize) >= g.edges.len() || g.half_edge_origin(h) != Some(id) {
                return Err(FacetError::structural(format!(
                    "node {} lists half-edge {} that does not depart from it",
                    id, h
                )));
            }
        }
    }
    Ok(())
}
