//! Alignment guides: snap a dragged card to its siblings' edges and centers.
//!
//! For every sibling the engine collects candidates per axis (min edge,
//! max edge, then center) in node iteration order. The first candidate
//! lying strictly closer than `threshold` to one of the dragged card's own
//! reference points (min, max, center; checked in that order) wins the axis.
//! This is first-match, not best-match: a nearer candidate from a later
//! sibling never overrides an earlier hit.

use crate::model::{Node, Position};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Default snap distance in world units.
pub const DEFAULT_SNAP_THRESHOLD: f32 = 5.0;

/// One world-space coordinate a dragged card snapped to.
/// Serializes as `{"x": ..}` or `{"y": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GuideLine {
    /// A vertical line at `x` (left/right/center alignment).
    Vertical { x: f32 },
    /// A horizontal line at `y` (top/bottom/center alignment).
    Horizontal { y: f32 },
}

/// Corrected coordinates per axis. `None` means "leave as is".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SnappedPosition {
    pub x: Option<f32>,
    pub y: Option<f32>,
}

/// Output of `compute_guides`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GuideResult {
    pub horizontal: Option<GuideLine>,
    pub vertical: Option<GuideLine>,
    #[serde(rename = "snappedPosition")]
    pub snapped: SnappedPosition,
}

impl GuideResult {
    /// Apply the snapped axes to a pre-snap position.
    pub fn apply(&self, position: Position) -> Position {
        Position::new(
            self.snapped.x.unwrap_or(position.x),
            self.snapped.y.unwrap_or(position.y),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.horizontal.is_none() && self.vertical.is_none()
    }
}

type Candidates = SmallVec<[f32; 24]>;

/// Compute guide lines and the snapped position for `dragged` against every
/// other card in `nodes` (the dragged card itself is skipped by id).
pub fn compute_guides(dragged: &Node, nodes: &[Node], threshold: f32) -> GuideResult {
    let mut vertical_candidates = Candidates::new();
    let mut horizontal_candidates = Candidates::new();

    for n in nodes.iter().filter(|n| n.id != dragged.id) {
        let (x, w) = (n.position.x, n.size.width);
        let (y, h) = (n.position.y, n.size.height);
        vertical_candidates.extend([x, x + w, x + w / 2.0]);
        horizontal_candidates.extend([y, y + h, y + h / 2.0]);
    }

    let snap_x = first_match(
        &vertical_candidates,
        dragged.position.x,
        dragged.size.width,
        threshold,
    );
    let snap_y = first_match(
        &horizontal_candidates,
        dragged.position.y,
        dragged.size.height,
        threshold,
    );

    GuideResult {
        vertical: snap_x.map(|(_, line)| GuideLine::Vertical { x: line }),
        horizontal: snap_y.map(|(_, line)| GuideLine::Horizontal { y: line }),
        snapped: SnappedPosition {
            x: snap_x.map(|(pos, _)| pos),
            y: snap_y.map(|(pos, _)| pos),
        },
    }
}

/// Returns `(snapped_origin, candidate)` for the first candidate within
/// `threshold` of the start, end, or center of the span `[start, start+len]`.
fn first_match(candidates: &[f32], start: f32, len: f32, threshold: f32) -> Option<(f32, f32)> {
    // Offsets of the reference points from `start`: min, max, center.
    let offsets = [0.0, len, len / 2.0];
    candidates.iter().find_map(|&candidate| {
        offsets
            .iter()
            .find(|&&off| (candidate - (start + off)).abs() < threshold)
            .map(|&off| (candidate - off, candidate))
    })
}
