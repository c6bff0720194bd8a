use crate::error::{FacetError, Result};
use crate::geometry::flatten::{departure_angle, flatten_curve};
use crate::geometry::tolerance::{cmp_eps, lex_cmp, EPS_ANG};
use crate::model::{edge_of, twin, HalfEdgeId, NodeId, Point};
use crate::PlanarGraph;

impl PlanarGraph {
    fn half_edge_ends(&self, h: HalfEdgeId) -> Result<(Point, Point)> {
        let unresolved = || FacetError::structural(format!("half-edge {} has an unresolved end point", h));
        let from = self.half_edge_origin(h).and_then(|n| self.node_pos(n)).ok_or_else(unresolved)?;
        let to = self.half_edge_target(h).and_then(|n| self.node_pos(n)).ok_or_else(unresolved)?;
        Ok((from, to))
    }

    /// Angle in `[0, 2π)` at which half-edge `h` leaves its origin.
    pub fn departure_angle(&self, h: HalfEdgeId) -> Result<f64> {
        let (from, to) = self.half_edge_ends(h)?;
        let e = self
            .edge(edge_of(h))
            .ok_or_else(|| FacetError::structural(format!("half-edge {} has no edge", h)))?;
        Ok(departure_angle(&e.curve, from, to))
    }

    /// Half-edges leaving `node`, counter-clockwise from angle 0. Equal
    /// angles fall back to the far end point (x, then y), then to the id.
    pub fn sorted_half_edges(&self, node: NodeId) -> Result<Vec<HalfEdgeId>> {
        let n = self
            .node(node)
            .ok_or_else(|| FacetError::structural(format!("node {} does not exist", node)))?;
        let mut keyed: Vec<(f64, Point, HalfEdgeId)> = Vec::with_capacity(n.half_edges.len());
        for &h in &n.half_edges {
            let (_, to) = self.half_edge_ends(h)?;
            keyed.push((self.departure_angle(h)?, to, h));
        }
        keyed.sort_by(|a, b| {
            cmp_eps(a.0, b.0, EPS_ANG)
                .then(lex_cmp(a.1.x, a.1.y, b.1.x, b.1.y))
                .then(a.2.cmp(&b.2))
        });
        Ok(keyed.into_iter().map(|(_, _, h)| h).collect())
    }

    /// Polyline along half-edge `h` from its origin to its target.
    pub fn flatten_half_edge(&self, h: HalfEdgeId, samples: usize) -> Result<Vec<Point>> {
        let (from, to) = self.half_edge_ends(h)?;
        let curve = self
            .half_edge_curve(h)
            .ok_or_else(|| FacetError::structural(format!("half-edge {} has no edge", h)))?;
        let mut pts = Vec::with_capacity(samples + 1);
        flatten_curve(&mut pts, curve, from, to, samples);
        Ok(pts)
    }

    /// Next half-edge of a face walk arriving along `h`, given the sorted
    /// order at the target of `h`: the clockwise neighbour of `twin(h)`, so the
    /// face stays on the left and bounded faces wind counter-clockwise.
    pub(crate) fn successor_in(order: &[HalfEdgeId], h: HalfEdgeId) -> Option<HalfEdgeId> {
        let back = twin(h);
        let i = order.iter().position(|&x| x == back)?;
        Some(order[(i + order.len() - 1) % order.len()])
    }
}
