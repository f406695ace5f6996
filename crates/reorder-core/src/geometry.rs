//! Geometry helpers for proximity measurement.

use crate::tree::{NodeId, NodeTree, ancestors};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A rectangle that has not been measured yet.
pub const UNMEASURED: Rect = Rect {
    x0: f64::NAN,
    y0: f64::NAN,
    x1: f64::NAN,
    y1: f64::NAN,
};

/// Axis an area locks movement to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

/// Check that every field of a rectangle is known.
pub fn is_measured(rect: &Rect) -> bool {
    !(rect.x0.is_nan() || rect.y0.is_nan() || rect.x1.is_nan() || rect.y1.is_nan())
}

/// Bounding rectangle of `node`, or [`UNMEASURED`] if it is absent.
pub fn rect_of(tree: &dyn NodeTree, node: Option<NodeId>) -> Rect {
    node.and_then(|n| tree.rect(n)).unwrap_or(UNMEASURED)
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    a.distance(b)
}

/// Distance after projecting both points onto `axis`, if one is locked.
pub fn axis_distance(a: Point, b: Point, axis: Option<Axis>) -> f64 {
    match axis {
        Some(Axis::X) => (a.x - b.x).abs(),
        Some(Axis::Y) => (a.y - b.y).abs(),
        None => distance(a, b),
    }
}

/// The ancestor of `node` (or `node` itself) that shares a parent with `reference`.
///
/// Used to measure the whole item when a drag starts on a nested handle.
pub fn shared_ancestor(tree: &dyn NodeTree, node: NodeId, reference: NodeId) -> Option<NodeId> {
    let target = tree.parent(reference);
    if tree.parent(node) == target {
        return Some(node);
    }
    ancestors(tree, node).find(|&n| tree.parent(n) == target)
}
