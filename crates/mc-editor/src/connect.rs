//! Connect gestures: direct handle-to-handle connections, and the
//! create-on-release heuristic for drags that end on empty canvas.
//!
//! When a handle drag is released without a valid target, a new card is
//! centered on the release point and linked from the origin handle. The new
//! card's target handle is the side facing the origin handle (top↔bottom,
//! left↔right). Relative card positions are never consulted.

use crate::mutation::GraphMutation;
use mc_core::id::NodeId;
use mc_core::model::{Edge, Handle, Node, Size};
use mc_core::store::GraphStore;
use mc_core::viewport::Viewport;

/// Where a handle drag started.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectOrigin {
    pub node: NodeId,
    /// Raw handle id from the host; may be anything.
    pub handle: Option<String>,
}

/// Target handle for a card created from a drag that started on `handle`.
/// Anything outside the four sides yields no handle.
pub fn opposite_handle(handle: Option<&str>) -> Option<Handle> {
    handle.and_then(Handle::parse).map(Handle::opposite)
}

/// A card plus the edge linking it to the drag origin.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectPlan {
    pub node: Node,
    pub edge: Edge,
}

impl ConnectPlan {
    pub fn into_mutation(self) -> GraphMutation {
        GraphMutation::AddSubgraph {
            nodes: vec![self.node],
            edges: vec![self.edge],
        }
    }
}

/// Tracks one handle drag from `start` to `end`/`cancel`.
#[derive(Debug, Default)]
pub struct ConnectGesture {
    origin: Option<ConnectOrigin>,
}

impl ConnectGesture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn origin(&self) -> Option<&ConnectOrigin> {
        self.origin.as_ref()
    }

    pub fn start(&mut self, node: NodeId, handle: Option<&str>) {
        log::debug!("connect: start at {node} / {handle:?}");
        self.origin = Some(ConnectOrigin {
            node,
            handle: handle.map(str::to_string),
        });
    }

    pub fn cancel(&mut self) {
        self.origin = None;
    }

    /// Finish the drag at screen `(sx, sy)`. A drop on a valid handle is
    /// handled by [`direct_edge`]; only an invalid drop with a recorded
    /// origin that still exists produces a plan. The origin is consumed.
    pub fn end(
        &mut self,
        valid: bool,
        sx: f32,
        sy: f32,
        viewport: &Viewport,
        store: &GraphStore,
        card_size: Size,
    ) -> Option<ConnectPlan> {
        let origin = self.origin.take()?;
        if valid {
            return None;
        }
        if !store.contains_node(origin.node) {
            log::debug!("connect: origin {} vanished mid-drag", origin.node);
            return None;
        }

        let release = viewport.screen_to_world(sx, sy);
        let mut node = Node::card(store.fresh_node_id("node"), release);
        node.size = card_size;
        let node = node.anchored_at(release, [0.5, 0.5]);

        let handle = origin.handle.as_deref();
        let edge = Edge::new(store.fresh_edge_id("edge"), origin.node, node.id)
            .with_handles(handle.and_then(Handle::parse), opposite_handle(handle));

        log::debug!(
            "connect: new card {} at ({}, {}) linked from {}",
            node.id,
            release.x,
            release.y,
            origin.node
        );
        Some(ConnectPlan { node, edge })
    }
}

/// Edge for a direct handle-to-handle connection, or `None` if an endpoint
/// is missing or the same connection already exists.
pub fn direct_edge(
    store: &GraphStore,
    source: NodeId,
    source_handle: Option<&str>,
    target: NodeId,
    target_handle: Option<&str>,
) -> Option<Edge> {
    if !store.contains_node(source) || !store.contains_node(target) {
        return None;
    }
    let edge = Edge::new(store.fresh_edge_id("edge"), source, target).with_handles(
        source_handle.and_then(Handle::parse),
        target_handle.and_then(Handle::parse),
    );
    if store.edges().iter().any(|e| e.same_connection(&edge)) {
        log::debug!("connect: {source} → {target} already connected");
        return None;
    }
    Some(edge)
}
