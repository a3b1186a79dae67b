//! The graph store: canonical ordered collections of cards and edges.
//!
//! Every mutation keeps the dangling-edge invariant: an edge is only ever
//! accepted when both endpoints exist, and removing a card removes every
//! edge touching it. The one exception is `remove_nodes_only`, which cut
//! uses to leave edges to unselected cards in place. Mutations are
//! synchronous; there is no queue.

use crate::id::{EdgeId, NodeId};
use crate::lint::repair_document;
use crate::model::{Document, Edge, Node, NodePatch, Position, Size};
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphStore {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl GraphStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `doc` (repaired if it breaks an invariant).
    pub fn from_document(doc: Document) -> Self {
        let mut store = Self::new();
        store.replace_all(doc.nodes, doc.edges);
        store
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn selected_node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().filter(|n| n.selected).map(|n| n.id).collect()
    }

    pub fn selected_edge_ids(&self) -> Vec<EdgeId> {
        self.edges.iter().filter(|e| e.selected).map(|e| e.id).collect()
    }

    /// Edges touching at least one card of `ids`.
    pub fn connected_edges(&self, ids: &HashSet<NodeId>) -> impl Iterator<Item = &Edge> {
        self.edges
            .iter()
            .filter(move |e| ids.contains(&e.source) || ids.contains(&e.target))
    }

    /// Edges whose both endpoints are in `ids`.
    pub fn internal_edges(&self, ids: &HashSet<NodeId>) -> impl Iterator<Item = &Edge> {
        self.edges
            .iter()
            .filter(move |e| ids.contains(&e.source) && ids.contains(&e.target))
    }

    /// A structural copy of the current state.
    pub fn document(&self) -> Document {
        Document::new(self.nodes.clone(), self.edges.clone())
    }

    /// Generate a card id not present in the store.
    pub fn fresh_node_id(&self, prefix: &str) -> NodeId {
        loop {
            let id = NodeId::with_prefix(prefix);
            if !self.contains_node(id) {
                return id;
            }
        }
    }

    /// Generate an edge id not present in the store.
    pub fn fresh_edge_id(&self, prefix: &str) -> EdgeId {
        loop {
            let id = EdgeId::with_prefix(prefix);
            if self.edge(id).is_none() {
                return id;
            }
        }
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Append a card. Rejected (returns `false`) if the id is taken.
    pub fn add_node(&mut self, node: Node) -> bool {
        if self.contains_node(node.id) {
            log::warn!("add_node: id `{}` already exists", node.id);
            return false;
        }
        self.nodes.push(node);
        true
    }

    /// Append an edge. Rejected if the id is taken or an endpoint is missing.
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        if self.edge(edge.id).is_some() {
            log::warn!("add_edge: id `{}` already exists", edge.id);
            return false;
        }
        if !self.contains_node(edge.source) || !self.contains_node(edge.target) {
            log::warn!(
                "add_edge: `{}` would dangle ({} → {})",
                edge.id,
                edge.source,
                edge.target
            );
            return false;
        }
        self.edges.push(edge);
        true
    }

    /// Merge `patch` into the card's data.
    pub fn update_node(&mut self, id: NodeId, patch: &NodePatch) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.data.merge(patch);
                true
            }
            None => false,
        }
    }

    pub fn move_node(&mut self, id: NodeId, position: Position) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    pub fn resize_node(&mut self, id: NodeId, size: Size) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.size = size;
                true
            }
            None => false,
        }
    }

    /// Remove cards and every edge touching them. Returns the removed cards.
    pub fn remove_nodes(&mut self, ids: &[NodeId]) -> Vec<Node> {
        let ids: HashSet<NodeId> = ids.iter().copied().collect();
        let (removed, kept): (Vec<Node>, Vec<Node>) =
            std::mem::take(&mut self.nodes).into_iter().partition(|n| ids.contains(&n.id));
        self.nodes = kept;
        self.edges
            .retain(|e| !ids.contains(&e.source) && !ids.contains(&e.target));
        removed
    }

    /// Remove cards but keep every edge, including those that now point at a
    /// removed card. Returns the removed cards.
    pub fn remove_nodes_only(&mut self, ids: &[NodeId]) -> Vec<Node> {
        let ids: HashSet<NodeId> = ids.iter().copied().collect();
        let (removed, kept): (Vec<Node>, Vec<Node>) =
            std::mem::take(&mut self.nodes).into_iter().partition(|n| ids.contains(&n.id));
        self.nodes = kept;
        removed
    }

    /// Remove edges by id. Returns how many were removed.
    pub fn remove_edges(&mut self, ids: &[EdgeId]) -> usize {
        let before = self.edges.len();
        self.edges.retain(|e| !ids.contains(&e.id));
        before - self.edges.len()
    }

    /// Select exactly `nodes` and `edges`; everything else is deselected.
    pub fn set_selection(&mut self, nodes: &[NodeId], edges: &[EdgeId]) {
        for n in &mut self.nodes {
            n.selected = nodes.contains(&n.id);
        }
        for e in &mut self.edges {
            e.selected = edges.contains(&e.id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.set_selection(&[], &[]);
    }

    /// Replace the whole graph (load, undo/redo restore). Documents that
    /// break an invariant are repaired first.
    pub fn replace_all(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        let mut doc = Document::new(nodes, edges);
        repair_document(&mut doc);
        self.nodes = doc.nodes;
        self.edges = doc.edges;
    }

    /// Restore a document this store produced earlier (undo/redo). Taken
    /// as is, without repair.
    pub fn restore(&mut self, doc: Document) {
        self.nodes = doc.nodes;
        self.edges = doc.edges;
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }
}
