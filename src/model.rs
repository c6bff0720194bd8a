use serde::{Deserialize, Serialize};

use crate::geometry::curve::CurveBound;

pub type NodeId = u32;
pub type EdgeId = u32;
/// Half-edge `2e` runs `a -> b` along edge `e`, `2e + 1` runs `b -> a`.
pub type HalfEdgeId = u32;

#[inline] pub fn twin(h: HalfEdgeId) -> HalfEdgeId { h ^ 1 }
#[inline] pub fn edge_of(h: HalfEdgeId) -> EdgeId { h >> 1 }
#[inline] pub fn is_reversed(h: HalfEdgeId) -> bool { h & 1 == 1 }
#[inline] pub fn forward(e: EdgeId) -> HalfEdgeId { e << 1 }

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// Where the face to the left of a half-edge lies relative to its curve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Above,
    Below,
    Left,
    Right,
}

impl Side {
    /// Side seen by a half-edge running from `from` to `to` along a function
    /// (`vertical == false`) or a vertical curve.
    pub fn from_direction(from: Point, to: Point, vertical: bool) -> Side {
        if vertical {
            if to.y > from.y { Side::Left } else { Side::Right }
        } else if to.x > from.x {
            Side::Above
        } else {
            Side::Below
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Above => Side::Below,
            Side::Below => Side::Above,
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub pos: Point,
    pub(crate) half_edges: Vec<HalfEdgeId>, // departing half-edges
}

impl Node {
    pub fn half_edges(&self) -> &[HalfEdgeId] {
        &self.half_edges
    }
    pub fn degree(&self) -> usize {
        self.half_edges.len()
    }
}

/// Undirected edge between two nodes along a curve. `sides[0]` annotates
/// `a -> b`, `sides[1]` annotates `b -> a`.
#[derive(Clone, Debug)]
pub struct Edge {
    pub a: NodeId,
    pub b: NodeId,
    pub curve: CurveBound,
    pub sides: [Side; 2],
}
