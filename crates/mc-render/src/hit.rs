//! Hit testing: world point → card lookup.
//!
//! Walks cards back-to-front (last painted = topmost) to find which card is
//! under a given world position.

use mc_core::id::NodeId;
use mc_core::model::{Node, Position};

/// Find the topmost card at `p`. Returns `None` on background.
pub fn hit_test(nodes: &[Node], p: Position) -> Option<NodeId> {
    nodes.iter().rev().find(|n| n.contains(p)).map(|n| n.id)
}

/// All cards whose bounds intersect the rectangle `(rx, ry, rw, rh)`, in
/// document order. Used for box selection.
pub fn hit_test_rect(nodes: &[Node], rx: f32, ry: f32, rw: f32, rh: f32) -> Vec<NodeId> {
    nodes
        .iter()
        .filter(|n| {
            n.position.x <= rx + rw && n.right() >= rx && n.position.y <= ry + rh && n.bottom() >= ry
        })
        .map(|n| n.id)
        .collect()
}
