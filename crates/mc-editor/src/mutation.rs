//! Graph mutations: the single entry point through which gestures change
//! the store.
//!
//! Gesture handlers never poke the `GraphStore` directly for anything that
//! should be undoable. They build a `GraphMutation` and hand it to the
//! `CommandStack`, which captures the pre-image and then calls
//! `apply_mutation`. Selection changes are the exception: they are not
//! history-worthy and go straight to the store.

use mc_core::id::{EdgeId, NodeId};
use mc_core::model::{Edge, Node, NodePatch, Position, Size};
use mc_core::store::GraphStore;

#[derive(Debug, Clone, PartialEq)]
pub enum GraphMutation {
    AddNode {
        node: Box<Node>,
    },
    AddEdge {
        edge: Box<Edge>,
    },
    /// Nodes first, then edges, so edges may reference the new nodes.
    /// Used by paste and by create-on-connect.
    AddSubgraph {
        nodes: Vec<Node>,
        edges: Vec<Edge>,
    },
    UpdateNode {
        id: NodeId,
        patch: NodePatch,
    },
    MoveNode {
        id: NodeId,
        position: Position,
    },
    ResizeNode {
        id: NodeId,
        size: Size,
    },
    /// Removes the cards and every edge touching them.
    RemoveNodes {
        ids: Vec<NodeId>,
    },
    RemoveEdges {
        ids: Vec<EdgeId>,
    },
    /// Remove cards (with every edge touching them) and edges
    /// (delete-selected).
    RemoveSubgraph {
        nodes: Vec<NodeId>,
        edges: Vec<EdgeId>,
    },
    /// Remove exactly these cards and edges. Edges from a cut card to a card
    /// outside the cut stay in the store.
    CutSubgraph {
        nodes: Vec<NodeId>,
        edges: Vec<EdgeId>,
    },
    /// Select exactly these; everything else is deselected. Only recorded
    /// when it rides along with a content change (paste).
    SetSelection {
        nodes: Vec<NodeId>,
        edges: Vec<EdgeId>,
    },
    ReplaceAll {
        nodes: Vec<Node>,
        edges: Vec<Edge>,
    },
}

impl GraphMutation {
    /// Short label used for history entries and logs.
    pub fn label(&self) -> &'static str {
        match self {
            GraphMutation::AddNode { .. } => "add card",
            GraphMutation::AddEdge { .. } => "connect",
            GraphMutation::AddSubgraph { .. } => "add cards",
            GraphMutation::UpdateNode { .. } => "edit card",
            GraphMutation::MoveNode { .. } => "move card",
            GraphMutation::ResizeNode { .. } => "resize card",
            GraphMutation::RemoveNodes { .. } => "remove cards",
            GraphMutation::RemoveEdges { .. } => "remove edges",
            GraphMutation::RemoveSubgraph { .. } => "remove selection",
            GraphMutation::CutSubgraph { .. } => "cut",
            GraphMutation::SetSelection { .. } => "select",
            GraphMutation::ReplaceAll { .. } => "replace document",
        }
    }
}

/// Apply `mutation` to `store`. Returns `true` if the store changed.
pub fn apply_mutation(store: &mut GraphStore, mutation: GraphMutation) -> bool {
    match mutation {
        GraphMutation::AddNode { node } => store.add_node(*node),
        GraphMutation::AddEdge { edge } => store.add_edge(*edge),
        GraphMutation::AddSubgraph { nodes, edges } => {
            let mut changed = false;
            for node in nodes {
                changed |= store.add_node(node);
            }
            for edge in edges {
                changed |= store.add_edge(edge);
            }
            changed
        }
        GraphMutation::UpdateNode { id, patch } => {
            !patch.is_empty() && store.update_node(id, &patch)
        }
        GraphMutation::MoveNode { id, position } => match store.node(id) {
            Some(node) if node.position == position => false,
            Some(_) => store.move_node(id, position),
            None => false,
        },
        GraphMutation::ResizeNode { id, size } => match store.node(id) {
            Some(node) if node.size == size => false,
            Some(_) => store.resize_node(id, size),
            None => false,
        },
        GraphMutation::RemoveNodes { ids } => !store.remove_nodes(&ids).is_empty(),
        GraphMutation::RemoveEdges { ids } => store.remove_edges(&ids) > 0,
        GraphMutation::RemoveSubgraph { nodes, edges } => {
            let removed_edges = store.remove_edges(&edges);
            let removed_nodes = store.remove_nodes(&nodes);
            removed_edges > 0 || !removed_nodes.is_empty()
        }
        GraphMutation::CutSubgraph { nodes, edges } => {
            let removed_edges = store.remove_edges(&edges);
            let removed_nodes = store.remove_nodes_only(&nodes);
            removed_edges > 0 || !removed_nodes.is_empty()
        }
        GraphMutation::SetSelection { nodes, edges } => {
            let before = (store.selected_node_ids(), store.selected_edge_ids());
            store.set_selection(&nodes, &edges);
            before != (store.selected_node_ids(), store.selected_edge_ids())
        }
        GraphMutation::ReplaceAll { nodes, edges } => {
            store.replace_all(nodes, edges);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn card(id: &str, x: f32) -> Node {
        Node::card(NodeId::intern(id), Position::new(x, 0.0))
    }

    fn store_with(ids: &[&str]) -> GraphStore {
        let mut store = GraphStore::new();
        for (i, id) in ids.iter().enumerate() {
            store.add_node(card(id, i as f32 * 400.0));
        }
        store
    }

    #[test]
    fn subgraph_edges_see_new_nodes() {
        let mut store = store_with(&["ms_a"]);
        let b = card("ms_b", 500.0);
        let e = Edge::new(EdgeId::intern("ms_e"), NodeId::intern("ms_a"), b.id);
        assert!(apply_mutation(
            &mut store,
            GraphMutation::AddSubgraph {
                nodes: vec![b],
                edges: vec![e],
            }
        ));
        assert_eq!(store.nodes().len(), 2);
        assert_eq!(store.edges().len(), 1);
    }

    #[test]
    fn noop_moves_report_unchanged() {
        let mut store = store_with(&["mn_a"]);
        let id = NodeId::intern("mn_a");
        assert!(!apply_mutation(
            &mut store,
            GraphMutation::MoveNode {
                id,
                position: Position::new(0.0, 0.0),
            }
        ));
        assert!(apply_mutation(
            &mut store,
            GraphMutation::MoveNode {
                id,
                position: Position::new(3.0, 4.0),
            }
        ));
        assert!(!apply_mutation(
            &mut store,
            GraphMutation::MoveNode {
                id: NodeId::intern("mn_missing"),
                position: Position::new(3.0, 4.0),
            }
        ));
    }

    #[test]
    fn empty_patch_is_noop() {
        let mut store = store_with(&["mp_a"]);
        assert!(!apply_mutation(
            &mut store,
            GraphMutation::UpdateNode {
                id: NodeId::intern("mp_a"),
                patch: NodePatch::default(),
            }
        ));
    }

    #[test]
    fn remove_subgraph_cascades_to_touching_edges() {
        let mut store = store_with(&["mr_a", "mr_b", "mr_c"]);
        store.add_edge(Edge::new(
            EdgeId::intern("mr_ab"),
            NodeId::intern("mr_a"),
            NodeId::intern("mr_b"),
        ));
        store.add_edge(Edge::new(
            EdgeId::intern("mr_bc"),
            NodeId::intern("mr_b"),
            NodeId::intern("mr_c"),
        ));
        assert!(apply_mutation(
            &mut store,
            GraphMutation::RemoveSubgraph {
                nodes: vec![NodeId::intern("mr_c")],
                edges: vec![EdgeId::intern("mr_ab")],
            }
        ));
        // mr_bc dies with mr_c; mr_ab was listed explicitly.
        assert!(store.edges().is_empty());
        assert_eq!(store.nodes().len(), 2);
    }

    #[test]
    fn cut_subgraph_leaves_unlisted_edges() {
        let mut store = store_with(&["mc_a", "mc_b", "mc_c"]);
        store.add_edge(Edge::new(
            EdgeId::intern("mc_ab"),
            NodeId::intern("mc_a"),
            NodeId::intern("mc_b"),
        ));
        store.add_edge(Edge::new(
            EdgeId::intern("mc_bc"),
            NodeId::intern("mc_b"),
            NodeId::intern("mc_c"),
        ));
        assert!(apply_mutation(
            &mut store,
            GraphMutation::CutSubgraph {
                nodes: vec![NodeId::intern("mc_a"), NodeId::intern("mc_b")],
                edges: vec![EdgeId::intern("mc_ab")],
            }
        ));
        let edges: Vec<&str> = store.edges().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(edges, vec!["mc_bc"]);
        assert_eq!(store.nodes().len(), 1);
    }
}
