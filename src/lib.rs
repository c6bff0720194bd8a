pub mod error;
pub mod model;
pub mod geometry {
    pub mod curve;
    pub mod flatten;
    pub mod math;
    pub mod tolerance;
}
pub mod algorithms {
    pub mod batch;
    pub mod facets;
    pub mod ordering;
    pub mod regions;
}
pub mod json;
pub mod region;

pub use algorithms::batch::{decompose, decompose_batch};
pub use algorithms::facets::{Cycle, FacetCalculator, FacetOptions, Facets, Primitive};
pub use algorithms::regions::RegionAssembler;
pub use error::{FacetError, Result};
pub use geometry::curve::{CurveBound, CurveFn, CurveKind, Domain, DomainOverlap};
pub use model::{Edge, EdgeId, HalfEdgeId, Node, NodeId, Point, Side};
pub use region::{Axis, Chain, ChainPiece, Region};

use geometry::curve::CurveKind as Kind;
use geometry::tolerance::{approx_eq, same_point, EPS_ON_CURVE, EPS_POS};
use model::{edge_of, is_reversed};

/// Nodes and curve-tagged edges of a planar subdivision.
///
/// Built once by the producer of the figure (through [`PlanarGraph::add_node`]
/// and [`PlanarGraph::add_edge`], or raw via [`PlanarGraph::from_parts`]) and
/// read-only afterwards; `clone` is a full structural copy.
#[derive(Clone, Debug, Default)]
pub struct PlanarGraph {
    pub(crate) nodes: Vec<Node>, // id is index
    pub(crate) edges: Vec<Edge>, // id is index
}

impl PlanarGraph {
    pub fn new() -> Self {
        PlanarGraph::default()
    }

    /// Raw construction without validation. Edges whose end points do not
    /// resolve are kept (and reported by the facet calculator) but are not
    /// linked into any node's incidence list.
    pub fn from_parts(points: Vec<Point>, edges: Vec<Edge>) -> Self {
        let mut nodes: Vec<Node> = points
            .into_iter()
            .map(|pos| Node { pos, half_edges: Vec::new() })
            .collect();
        for (eid, e) in edges.iter().enumerate() {
            let h = model::forward(eid as EdgeId);
            if (e.a as usize) < nodes.len() && (e.b as usize) < nodes.len() {
                nodes[e.a as usize].half_edges.push(h);
                nodes[e.b as usize].half_edges.push(model::twin(h));
            }
        }
        PlanarGraph { nodes, edges }
    }

    // Nodes
    pub fn add_node(&mut self, x: f64, y: f64) -> Option<NodeId> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        if let Some(id) = self.find_node(x, y) {
            return Some(id);
        }
        let id = self.nodes.len() as NodeId;
        self.nodes.push(Node {
            pos: Point { x, y },
            half_edges: Vec::new(),
        });
        Some(id)
    }

    pub fn find_node(&self, x: f64, y: f64) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| same_point(n.pos.x, n.pos.y, x, y))
            .map(|i| i as NodeId)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id as usize)
    }

    pub fn node_pos(&self, id: NodeId) -> Option<Point> {
        self.node(id).map(|n| n.pos)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (i as NodeId, n))
    }

    pub fn node_count(&self) -> u32 {
        self.nodes.len() as u32
    }

    // Edges

    /// Adds an edge along `curve`. Returns `None` for unknown or identical
    /// end points, point curves, and end points that do not lie on the curve.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId, curve: CurveBound) -> Option<EdgeId> {
        if a == b {
            return None;
        }
        let pa = self.node_pos(a)?;
        let pb = self.node_pos(b)?;
        let sides = edge_sides(&curve, pa, pb)?;
        if !curve.passes_through(pa.x, pa.y, EPS_ON_CURVE)
            || !curve.passes_through(pb.x, pb.y, EPS_ON_CURVE)
        {
            return None;
        }
        let id = self.edges.len() as EdgeId;
        self.edges.push(Edge { a, b, curve, sides });
        let h = model::forward(id);
        self.nodes[a as usize].half_edges.push(h);
        self.nodes[b as usize].half_edges.push(model::twin(h));
        Some(id)
    }

    /// Convenience: adds both end points and the edge between them.
    pub fn add_curve_segment(&mut self, from: (f64, f64), to: (f64, f64), curve: CurveBound) -> Option<EdgeId> {
        let a = self.add_node(from.0, from.1)?;
        let b = self.add_node(to.0, to.1)?;
        self.add_edge(a, b, curve)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id as usize)
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges.iter().enumerate().map(|(i, e)| (i as EdgeId, e))
    }

    pub fn edge_count(&self) -> u32 {
        self.edges.len() as u32
    }

    pub fn half_edge_count(&self) -> u32 {
        2 * self.edge_count()
    }

    // Half-edges
    pub fn half_edge_origin(&self, h: HalfEdgeId) -> Option<NodeId> {
        let e = self.edge(edge_of(h))?;
        Some(if is_reversed(h) { e.b } else { e.a })
    }

    pub fn half_edge_target(&self, h: HalfEdgeId) -> Option<NodeId> {
        self.half_edge_origin(model::twin(h))
    }

    pub fn half_edge_side(&self, h: HalfEdgeId) -> Option<Side> {
        let e = self.edge(edge_of(h))?;
        Some(e.sides[(h & 1) as usize])
    }

    pub fn half_edge_curve(&self, h: HalfEdgeId) -> Option<&CurveBound> {
        self.edge(edge_of(h)).map(|e| &e.curve)
    }

    /// The same figure with x and y swapped; every edge curve is replaced by
    /// the inverse of its piece between the edge's end points.
    pub fn transposed(&self) -> Result<PlanarGraph> {
        let points = self
            .nodes
            .iter()
            .map(|n| Point { x: n.pos.y, y: n.pos.x })
            .collect();
        let mut edges = Vec::with_capacity(self.edges.len());
        for (eid, e) in self.edges() {
            let (pa, pb) = match (self.node_pos(e.a), self.node_pos(e.b)) {
                (Some(pa), Some(pb)) => (pa, pb),
                _ => {
                    return Err(FacetError::structural(format!(
                        "edge {} references a missing node",
                        eid
                    )))
                }
            };
            let dom = e.curve.domain();
            let piece = if e.curve.is_vertical() {
                Domain::between(dom.clamp(pa.y), dom.clamp(pb.y))
            } else {
                Domain::between(dom.clamp(pa.x), dom.clamp(pb.x))
            };
            let curve = e.curve.restrict(piece)?.inverse()?;
            let (ta, tb) = (Point { x: pa.y, y: pa.x }, Point { x: pb.y, y: pb.x });
            let sides = edge_sides(&curve, ta, tb).ok_or_else(|| {
                FacetError::structural(format!("edge {} has no transposed orientation", eid))
            })?;
            edges.push(Edge { a: e.a, b: e.b, curve, sides });
        }
        Ok(PlanarGraph::from_parts(points, edges))
    }
}

/// Side annotations `[a -> b, b -> a]` implied by geometry, or `None` when the
/// curve cannot carry an edge between these points.
pub(crate) fn edge_sides(curve: &CurveBound, pa: Point, pb: Point) -> Option<[Side; 2]> {
    match curve.kind() {
        Kind::Point { .. } => None,
        Kind::Vertical { .. } => {
            if approx_eq(pa.y, pb.y, EPS_POS) {
                return None;
            }
            let s = Side::from_direction(pa, pb, true);
            Some([s, s.opposite()])
        }
        Kind::Function(_) => {
            if approx_eq(pa.x, pb.x, EPS_POS) {
                return None;
            }
            let s = Side::from_direction(pa, pb, false);
            Some([s, s.opposite()])
        }
    }
}
