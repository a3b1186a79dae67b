//! Select tool: click selection, marquee selection, and snapped dragging.
//!
//! The tool translates world-space input events into `GraphMutation`s. It
//! never writes the store itself: selection changes come back as
//! `SetSelection` (applied without history) and drags as absolute
//! `MoveNode`s (applied inside the session's drag batch).
//!
//! ## Modifier behaviors
//!
//! | Modifier | Click | Marquee | Drag |
//! |----------|-------|---------|------|
//! | **Shift** | Toggle card in/out of selection | Add to selection | none |
//!
//! While dragging, the grabbed card is snapped to its siblings with
//! `compute_guides`; the rest of the selection follows rigidly. Snapping
//! runs against the card's *unsnapped* position, accumulated from raw
//! pointer deltas, so a snap never sticks once the pointer moves away.

use crate::input::InputEvent;
use crate::mutation::GraphMutation;
use mc_core::align::{DEFAULT_SNAP_THRESHOLD, GuideResult, compute_guides};
use mc_core::id::NodeId;
use mc_core::model::{Node, Position};
use mc_core::store::GraphStore;
use mc_render::hit::hit_test_rect;

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragState {
    grabbed: NodeId,
    /// Grabbed card position before snapping.
    raw: Position,
    last_x: f32,
    last_y: f32,
}

#[derive(Debug)]
pub struct SelectTool {
    pub snap_threshold: f32,
    drag: Option<DragState>,
    guides: GuideResult,
    /// Marquee (rubber-band) selection anchor, world space.
    pub marquee_start: Option<(f32, f32)>,
    /// Current marquee rectangle (normalized: x, y, w, h).
    pub marquee_rect: Option<(f32, f32, f32, f32)>,
    marquee_additive: bool,
}

impl Default for SelectTool {
    fn default() -> Self {
        Self::new(DEFAULT_SNAP_THRESHOLD)
    }
}

impl SelectTool {
    pub fn new(snap_threshold: f32) -> Self {
        Self {
            snap_threshold,
            drag: None,
            guides: GuideResult::default(),
            marquee_start: None,
            marquee_rect: None,
            marquee_additive: false,
        }
    }

    /// Guides for the current drag frame (empty when not dragging).
    pub fn guides(&self) -> &GuideResult {
        &self.guides
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn dragged_node(&self) -> Option<NodeId> {
        self.drag.map(|d| d.grabbed)
    }

    /// Drop any in-flight drag or marquee (e.g. the document was replaced).
    pub fn reset(&mut self) {
        self.drag = None;
        self.guides = GuideResult::default();
        self.marquee_start = None;
        self.marquee_rect = None;
    }

    /// Normalize a drag rectangle from start + current positions.
    fn normalize_rect(x1: f32, y1: f32, x2: f32, y2: f32) -> (f32, f32, f32, f32) {
        (x1.min(x2), y1.min(y2), (x2 - x1).abs(), (y2 - y1).abs())
    }

    /// Handle an input event, returning zero or more mutations.
    pub fn handle(
        &mut self,
        event: &InputEvent,
        hit_node: Option<NodeId>,
        store: &GraphStore,
    ) -> Vec<GraphMutation> {
        match event {
            InputEvent::PointerDown { x, y, modifiers } => {
                self.reset();
                let mut selected = store.selected_node_ids();
                let edges = store.selected_edge_ids();

                let Some(hit_id) = hit_node else {
                    // Empty space: start marquee.
                    self.marquee_start = Some((*x, *y));
                    self.marquee_rect = Some((*x, *y, 0.0, 0.0));
                    self.marquee_additive = modifiers.shift;
                    if modifiers.shift {
                        return vec![];
                    }
                    return vec![GraphMutation::SetSelection {
                        nodes: Vec::new(),
                        edges: Vec::new(),
                    }];
                };

                let selection = if modifiers.shift {
                    // Shift+click: toggle card in/out of selection.
                    if let Some(pos) = selected.iter().position(|id| *id == hit_id) {
                        selected.remove(pos);
                    } else {
                        selected.push(hit_id);
                    }
                    GraphMutation::SetSelection {
                        nodes: selected,
                        edges,
                    }
                } else if selected.contains(&hit_id) {
                    // Already selected: keep the group for dragging.
                    GraphMutation::SetSelection {
                        nodes: selected,
                        edges,
                    }
                } else {
                    GraphMutation::SetSelection {
                        nodes: vec![hit_id],
                        edges: Vec::new(),
                    }
                };

                if let Some(node) = store.node(hit_id) {
                    self.drag = Some(DragState {
                        grabbed: hit_id,
                        raw: node.position,
                        last_x: *x,
                        last_y: *y,
                    });
                }
                vec![selection]
            }
            InputEvent::PointerMove { x, y, .. } => {
                if let Some((sx, sy)) = self.marquee_start {
                    self.marquee_rect = Some(Self::normalize_rect(sx, sy, *x, *y));
                    return vec![];
                }
                let Some(drag) = self.drag.as_mut() else {
                    return vec![];
                };
                let Some(grabbed) = store.node(drag.grabbed) else {
                    return vec![];
                };

                drag.raw = drag.raw.offset(x - drag.last_x, y - drag.last_y);
                drag.last_x = *x;
                drag.last_y = *y;

                let probe = Node {
                    position: drag.raw,
                    ..grabbed.clone()
                };
                self.guides = compute_guides(&probe, store.nodes(), self.snap_threshold);
                let target = self.guides.apply(drag.raw);
                log::trace!("drag {}: raw {:?} → {:?}", drag.grabbed, drag.raw, target);

                let dx = target.x - grabbed.position.x;
                let dy = target.y - grabbed.position.y;
                let grabbed_id = drag.grabbed;

                let mut moving = store.selected_node_ids();
                if !moving.contains(&grabbed_id) {
                    moving.push(grabbed_id);
                }
                moving
                    .into_iter()
                    .filter_map(|id| store.node(id))
                    .map(|n| GraphMutation::MoveNode {
                        id: n.id,
                        position: if n.id == grabbed_id {
                            target
                        } else {
                            n.position.offset(dx, dy)
                        },
                    })
                    .collect()
            }
            InputEvent::PointerUp { .. } => {
                let mut out = Vec::new();
                if let Some((rx, ry, rw, rh)) = self.marquee_rect {
                    let mut nodes = if self.marquee_additive {
                        store.selected_node_ids()
                    } else {
                        Vec::new()
                    };
                    for id in hit_test_rect(store.nodes(), rx, ry, rw, rh) {
                        if !nodes.contains(&id) {
                            nodes.push(id);
                        }
                    }
                    // A bare click on empty space is not a marquee.
                    if rw > 0.0 || rh > 0.0 {
                        out.push(GraphMutation::SetSelection {
                            nodes,
                            edges: Vec::new(),
                        });
                    }
                }
                self.reset();
                out
            }
            InputEvent::Key { .. } => vec![],
        }
    }
}
