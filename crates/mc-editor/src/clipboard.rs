//! Copy/cut/paste of card subgraphs, plus routing of system paste events.
//!
//! The buffer holds a *copy* of the selected cards and of the edges whose
//! both endpoints are selected. Edges with one endpoint outside the
//! selection are never buffered, so a paste cannot produce a dangling edge.
//!
//! Paste keeps the buffer's relative layout and places its bounding-box
//! origin at the anchor. Each paste derives fresh ids from the originals
//! plus a per-session nonce; the nonce is bumped until none of the derived
//! ids collide with the store, so repeated pastes of one buffer never clash.

use crate::mutation::GraphMutation;
use mc_core::id::{EdgeId, NodeId};
use mc_core::model::{Document, Edge, Node, Position};
use mc_core::store::GraphStore;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Text written to the system clipboard on copy/cut so a later paste event
/// can be told apart from unrelated clipboard content.
pub const CLIPBOARD_MARKER: &str = "__MIND_CANVAS_NODES__";

/// Session-local copy buffer.
#[derive(Debug, Default)]
pub struct Clipboard {
    buffer: Document,
    nonce: u64,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &Document {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.nodes.is_empty()
    }

    /// Replace the buffer with the current selection. Returns `true` when
    /// the selection was non-empty (the host should then write the marker).
    pub fn copy(&mut self, store: &GraphStore) -> bool {
        let selected: HashSet<NodeId> = store.selected_node_ids().into_iter().collect();
        let nodes: Vec<Node> = store
            .nodes()
            .iter()
            .filter(|n| selected.contains(&n.id))
            .cloned()
            .collect();
        let edges: Vec<Edge> = store.internal_edges(&selected).cloned().collect();
        log::debug!("clipboard: copied {} cards, {} edges", nodes.len(), edges.len());
        self.buffer = Document::new(nodes, edges);
        !self.buffer.nodes.is_empty()
    }

    /// Copy, then produce the mutation that removes exactly the buffered
    /// cards and edges. An edge with one endpoint outside the selection is
    /// neither buffered nor removed. `None` when nothing is selected.
    pub fn cut(&mut self, store: &GraphStore) -> Option<GraphMutation> {
        if !self.copy(store) {
            return None;
        }
        Some(GraphMutation::CutSubgraph {
            nodes: self.buffer.nodes.iter().map(|n| n.id).collect(),
            edges: self.buffer.edges.iter().map(|e| e.id).collect(),
        })
    }

    /// Build the mutations for one paste at `anchor` (world space): clear
    /// the existing selection, then add the re-identified copies, selected.
    /// `None` when the buffer is empty. The buffer is kept.
    pub fn paste(&mut self, store: &GraphStore, anchor: Position) -> Option<Vec<GraphMutation>> {
        if self.is_empty() {
            return None;
        }

        let min_x = self.buffer.nodes.iter().map(|n| n.position.x).fold(f32::INFINITY, f32::min);
        let min_y = self.buffer.nodes.iter().map(|n| n.position.y).fold(f32::INFINITY, f32::min);
        let nonce = self.next_nonce(store);

        let nodes: Vec<Node> = self
            .buffer
            .nodes
            .iter()
            .map(|n| Node {
                id: NodeId::derived(n.id, nonce),
                position: Position::new(
                    anchor.x + (n.position.x - min_x),
                    anchor.y + (n.position.y - min_y),
                ),
                selected: true,
                ..n.clone()
            })
            .collect();
        let edges: Vec<Edge> = self
            .buffer
            .edges
            .iter()
            .map(|e| Edge {
                id: EdgeId::derived(e.id, nonce),
                source: NodeId::derived(e.source, nonce),
                target: NodeId::derived(e.target, nonce),
                selected: true,
                ..e.clone()
            })
            .collect();

        log::debug!(
            "clipboard: paste #{nonce} of {} cards at ({}, {})",
            nodes.len(),
            anchor.x,
            anchor.y
        );
        Some(vec![
            GraphMutation::SetSelection {
                nodes: Vec::new(),
                edges: Vec::new(),
            },
            GraphMutation::AddSubgraph { nodes, edges },
        ])
    }

    /// Next nonce whose derived ids are all free in `store`.
    fn next_nonce(&mut self, store: &GraphStore) -> u64 {
        loop {
            self.nonce += 1;
            let nonce = self.nonce;
            let node_clash = self
                .buffer
                .nodes
                .iter()
                .any(|n| store.contains_node(NodeId::derived(n.id, nonce)));
            let edge_clash = self
                .buffer
                .edges
                .iter()
                .any(|e| store.edge(EdgeId::derived(e.id, nonce)).is_some());
            if !node_clash && !edge_clash {
                return nonce;
            }
            log::debug!("clipboard: nonce {nonce} collides, skipping");
        }
    }
}

// ─── System paste routing ────────────────────────────────────────────────

/// What the host saw on a system paste event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipboardPayload {
    /// `text/plain` content, if any.
    #[serde(default)]
    pub text: Option<String>,
    /// MIME types of the clipboard items.
    #[serde(default)]
    pub types: Vec<String>,
}

impl ClipboardPayload {
    pub fn has_marker(&self) -> bool {
        self.text.as_deref() == Some(CLIPBOARD_MARKER)
    }

    pub fn has_image(&self) -> bool {
        self.types.iter().any(|t| t.contains("image"))
    }
}

/// Who takes a system paste event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PasteRoute {
    /// Paste the node buffer (host suppresses the default paste).
    Nodes,
    /// Decode the image item, then call back with its data URL.
    Image,
    /// Not ours; let the default paste happen.
    Ignore,
}

/// Marker beats image; image beats a marker-less buffer; anything else is
/// left to the host.
pub fn route_paste(payload: &ClipboardPayload, buffer_has_nodes: bool) -> PasteRoute {
    if buffer_has_nodes && payload.has_marker() {
        PasteRoute::Nodes
    } else if payload.has_image() {
        PasteRoute::Image
    } else if buffer_has_nodes {
        PasteRoute::Nodes
    } else {
        PasteRoute::Ignore
    }
}

/// Compact capture stamp from an ISO-8601 time: `2024-05-01T12:30:45.123Z`
/// becomes `20240501123045`.
pub fn capture_stamp(iso: &str) -> String {
    iso.chars()
        .filter(|c| !matches!(c, '-' | ':' | 'T' | '.'))
        .take(14)
        .collect()
}

pub fn image_card_label(stamp: &str) -> String {
    format!("Pasted image {stamp}.png")
}
