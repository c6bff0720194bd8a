use serde::Serialize;
use serde_json::{json, Value};

use crate::algorithms::facets::{Facets, Primitive};
use crate::geometry::curve::{CurveBound, CurveKind, Domain};
use crate::model::{HalfEdgeId, NodeId};
use crate::region::{Chain, Region};

pub fn primitives_to_json(facets: &Facets) -> Value {
    #[derive(Serialize)]
    #[serde(tag = "kind", rename_all = "snake_case")]
    enum PrimSer<'a> {
        IsolatedNode {
            node: NodeId,
        },
        Filament {
            half_edges: &'a [HalfEdgeId],
        },
        MinimalCycle {
            half_edges: &'a [HalfEdgeId],
            nodes: &'a [NodeId],
            area: f64,
            outer: bool,
        },
    }

    let prims: Vec<PrimSer> = facets
        .primitives
        .iter()
        .map(|p| match p {
            Primitive::IsolatedNode { node } => PrimSer::IsolatedNode { node: *node },
            Primitive::Filament { half_edges } => PrimSer::Filament { half_edges },
            Primitive::MinimalCycle(c) => PrimSer::MinimalCycle {
                half_edges: &c.half_edges,
                nodes: &c.nodes,
                area: c.signed_area,
                outer: c.is_outer(),
            },
        })
        .collect();
    json!({
        "count": prims.len(),
        "half_edges": facets.half_edge_total(),
        "primitives": prims,
    })
}

#[derive(Serialize)]
struct BoundSer<'a> {
    label: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    x: Option<f64>,
    domain: Domain,
}

impl<'a> From<&'a CurveBound> for BoundSer<'a> {
    fn from(c: &'a CurveBound) -> Self {
        let (kind, x) = match c.kind() {
            CurveKind::Point { x, .. } => ("point", Some(*x)),
            CurveKind::Vertical { x } => ("vertical", Some(*x)),
            CurveKind::Function(_) => ("function", None),
        };
        BoundSer {
            label: c.label(),
            kind,
            x,
            domain: c.domain(),
        }
    }
}

#[derive(Serialize)]
struct PieceSer<'a> {
    label: &'a str,
    edge: u32,
    from: [f64; 2],
    to: [f64; 2],
}

fn chain_json(chain: &Chain) -> Vec<PieceSer<'_>> {
    chain
        .pieces
        .iter()
        .map(|p| PieceSer {
            label: p.curve.label(),
            edge: p.edge,
            from: [p.start.x, p.start.y],
            to: [p.end.x, p.end.y],
        })
        .collect()
}

impl Region {
    /// Diagnostic summary: extremes, both chains and the area.
    pub fn to_json_value(&self) -> Value {
        json!({
            "cycle": self.cycle_index,
            "area": self.signed_area,
            "domain": self.domain(),
            "left": BoundSer::from(&self.left),
            "right": BoundSer::from(&self.right),
            "upper": chain_json(&self.upper),
            "lower": chain_json(&self.lower),
            "one_to_one": self.is_one_to_one(),
        })
    }
}

pub fn regions_to_json(regions: &[Region]) -> Value {
    Value::Array(regions.iter().map(Region::to_json_value).collect())
}
