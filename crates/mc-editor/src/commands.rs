//! Undo/Redo command stack.
//!
//! History is snapshot-based: before a mutating gesture touches the store,
//! a structural copy of the whole document is pushed onto the undo stack.
//! Undo swaps the current document onto the redo stack and restores the
//! popped one; redo mirrors it. Any new entry discards the redo branch.
//!
//! Mutations enter through `execute`, which captures the pre-image itself,
//! so a call site cannot forget the snapshot. Drag and resize gestures use
//! **batching**: one snapshot at `begin_batch`, any number of live
//! mutations, and a single entry at `end_batch` (only if the document
//! actually changed).

use crate::mutation::{GraphMutation, apply_mutation};
use mc_core::model::Document;
use mc_core::store::GraphStore;
use std::collections::VecDeque;

/// One history entry: the document as it was, plus what was done to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub document: Document,
    pub description: String,
}

/// Manages undo/redo stacks with batch grouping for drag gestures.
#[derive(Debug, Default)]
pub struct CommandStack {
    /// Oldest entry at the front, so a depth limit drops from there.
    undo_stack: VecDeque<Snapshot>,
    redo_stack: Vec<Snapshot>,
    /// Maximum undo depth (`None` = unbounded).
    max_depth: Option<usize>,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    /// Pre-image captured at the start of the outermost batch.
    batch_snapshot: Option<Snapshot>,
}

impl CommandStack {
    pub fn new(max_depth: Option<usize>) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }

    /// Push a copy of the current document and clear the redo branch.
    /// Call this before mutating the store outside `execute`.
    pub fn take_snapshot(&mut self, store: &GraphStore, description: &str) {
        self.push(Snapshot {
            document: store.document(),
            description: description.to_string(),
        });
    }

    /// Apply `mutation` and record it as one undo step.
    ///
    /// Inside a batch the mutation is applied live and folded into the
    /// batch's entry. A mutation that changes nothing records nothing.
    pub fn execute(
        &mut self,
        store: &mut GraphStore,
        mutation: GraphMutation,
        description: &str,
    ) -> bool {
        if self.batch_depth > 0 {
            return apply_mutation(store, mutation);
        }

        let before = store.document();
        let changed = apply_mutation(store, mutation);
        if changed {
            self.push(Snapshot {
                document: before,
                description: description.to_string(),
            });
        } else {
            log::debug!("history: `{description}` changed nothing; not recorded");
        }
        changed
    }

    /// Apply several mutations as a single undo step.
    pub fn execute_all(
        &mut self,
        store: &mut GraphStore,
        mutations: Vec<GraphMutation>,
        description: &str,
    ) -> bool {
        self.begin_batch(store, description);
        let mut changed = false;
        for mutation in mutations {
            changed |= apply_mutation(store, mutation);
        }
        self.end_batch(store);
        changed
    }

    /// Start a batch group. The outermost call captures the pre-image.
    pub fn begin_batch(&mut self, store: &GraphStore, description: &str) {
        if self.batch_depth == 0 {
            self.batch_snapshot = Some(Snapshot {
                document: store.document(),
                description: description.to_string(),
            });
        }
        self.batch_depth += 1;
    }

    /// End a batch group. When the outermost batch closes and the document
    /// differs from the pre-image, one entry is pushed. Returns whether it was.
    pub fn end_batch(&mut self, store: &GraphStore) -> bool {
        if self.batch_depth == 0 {
            return false;
        }
        self.batch_depth -= 1;
        if self.batch_depth > 0 {
            return false;
        }
        let Some(before) = self.batch_snapshot.take() else {
            return false;
        };
        if before.document == store.document() {
            log::debug!("history: batch `{}` left the document as it was", before.description);
            return false;
        }
        self.push(before);
        true
    }

    /// Close every open batch level at once, recording the gesture if it
    /// changed the document. Used when a gesture never got its end event.
    pub fn flush_batch(&mut self, store: &GraphStore) -> bool {
        if self.batch_depth == 0 {
            return false;
        }
        if let Some(open) = &self.batch_snapshot {
            log::warn!("history: closing unfinished batch `{}`", open.description);
        }
        self.batch_depth = 1;
        self.end_batch(store)
    }

    pub fn is_batching(&self) -> bool {
        self.batch_depth > 0
    }

    /// Restore the previous document. `None` if there is nothing to undo
    /// or a gesture batch is still open.
    pub fn undo(&mut self, store: &mut GraphStore) -> Option<String> {
        if self.is_batching() {
            log::debug!("history: undo ignored during a gesture");
            return None;
        }
        let entry = self.undo_stack.pop_back()?;
        self.redo_stack.push(Snapshot {
            document: store.document(),
            description: entry.description.clone(),
        });
        store.restore(entry.document);
        Some(entry.description)
    }

    /// Re-apply the most recently undone document.
    pub fn redo(&mut self, store: &mut GraphStore) -> Option<String> {
        if self.is_batching() {
            log::debug!("history: redo ignored during a gesture");
            return None;
        }
        let entry = self.redo_stack.pop()?;
        self.undo_stack.push_back(Snapshot {
            document: store.document(),
            description: entry.description.clone(),
        });
        store.restore(entry.document);
        Some(entry.description)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Drop all history (used after a document load).
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.batch_depth = 0;
        self.batch_snapshot = None;
    }

    fn push(&mut self, entry: Snapshot) {
        log::debug!("history: push `{}`", entry.description);
        self.undo_stack.push_back(entry);
        if let Some(max) = self.max_depth {
            while self.undo_stack.len() > max {
                self.undo_stack.pop_front();
            }
        }
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mc_core::id::NodeId;
    use mc_core::model::{Node, Position};
    use pretty_assertions::assert_eq;

    fn store_with(id: &str) -> GraphStore {
        let mut store = GraphStore::new();
        store.add_node(Node::card(NodeId::intern(id), Position::default()));
        store
    }

    fn move_to(id: &str, x: f32) -> GraphMutation {
        GraphMutation::MoveNode {
            id: NodeId::intern(id),
            position: Position::new(x, 0.0),
        }
    }

    #[test]
    fn undo_redo_move() {
        let mut store = store_with("cs_box");
        let mut stack = CommandStack::new(None);
        let before = store.document();

        assert!(stack.execute(&mut store, move_to("cs_box", 50.0), "Move box"));
        let after = store.document();

        assert_eq!(stack.undo(&mut store), Some("Move box".to_string()));
        assert_eq!(store.document(), before);
        assert_eq!(stack.redo(&mut store), Some("Move box".to_string()));
        assert_eq!(store.document(), after);
    }

    #[test]
    fn redo_clears_on_new_action() {
        let mut store = store_with("cs_a");
        let mut stack = CommandStack::new(None);
        stack.execute(&mut store, move_to("cs_a", 5.0), "move");
        stack.undo(&mut store);
        assert!(stack.can_redo());

        stack.execute(&mut store, move_to("cs_a", 1.0), "move2");
        assert!(!stack.can_redo());
    }

    #[test]
    fn max_depth_trims_oldest() {
        let mut store = store_with("cs_d");
        let mut stack = CommandStack::new(Some(3));
        for i in 1..=5 {
            stack.execute(&mut store, move_to("cs_d", i as f32), &format!("move {i}"));
        }
        assert_eq!(stack.undo_len(), 3);
        assert_eq!(stack.undo(&mut store), Some("move 5".to_string()));
        stack.undo(&mut store);
        stack.undo(&mut store);
        assert_eq!(stack.undo(&mut store), None);
        // Oldest reachable state is after "move 2".
        assert_eq!(store.node(NodeId::intern("cs_d")).unwrap().position.x, 2.0);
    }

    #[test]
    fn unbounded_keeps_everything() {
        let mut store = store_with("cs_u");
        let mut stack = CommandStack::new(None);
        for i in 1..=250 {
            stack.execute(&mut store, move_to("cs_u", i as f32), "move");
        }
        assert_eq!(stack.undo_len(), 250);
    }

    #[test]
    fn noop_execute_records_nothing() {
        let mut store = store_with("cs_n");
        let mut stack = CommandStack::new(None);
        assert!(!stack.execute(&mut store, move_to("cs_n", 0.0), "still"));
        assert!(!stack.can_undo());
    }

    #[test]
    fn batch_collapses_to_one_entry() {
        let mut store = store_with("cs_b");
        let mut stack = CommandStack::new(None);
        let before = store.document();

        stack.begin_batch(&store, "drag");
        for x in [10.0, 20.0, 30.0] {
            stack.execute(&mut store, move_to("cs_b", x), "ignored");
        }
        assert_eq!(stack.undo(&mut store), None);
        assert!(stack.end_batch(&store));

        assert_eq!(stack.undo_len(), 1);
        assert_eq!(stack.undo(&mut store), Some("drag".to_string()));
        assert_eq!(store.document(), before);
    }

    #[test]
    fn unchanged_batch_is_dropped() {
        let mut store = store_with("cs_z");
        let mut stack = CommandStack::new(None);
        stack.begin_batch(&store, "drag");
        stack.execute(&mut store, move_to("cs_z", 10.0), "");
        stack.execute(&mut store, move_to("cs_z", 0.0), "");
        assert!(!stack.end_batch(&store));
        assert!(!stack.can_undo());
    }

    #[test]
    fn flush_closes_nested_batches() {
        let mut store = store_with("cs_f");
        let mut stack = CommandStack::new(None);
        stack.begin_batch(&store, "drag");
        stack.execute(&mut store, move_to("cs_f", 10.0), "");
        // The second begin arrives without an end for the first.
        stack.begin_batch(&store, "drag");
        stack.execute(&mut store, move_to("cs_f", 20.0), "");

        assert!(stack.flush_batch(&store));
        assert!(!stack.is_batching());
        assert!(!stack.flush_batch(&store));

        assert!(stack.execute(&mut store, move_to("cs_f", 30.0), "move"));
        assert_eq!(stack.undo(&mut store), Some("move".to_string()));
        assert_eq!(stack.undo(&mut store), Some("drag".to_string()));
        assert_eq!(store.node(NodeId::intern("cs_f")).unwrap().position.x, 0.0);
    }

    #[test]
    fn explicit_snapshot_then_direct_mutation() {
        let mut store = store_with("cs_s");
        let mut stack = CommandStack::new(None);
        let before = store.document();
        stack.take_snapshot(&store, "manual");
        store.move_node(NodeId::intern("cs_s"), Position::new(7.0, 7.0));
        stack.undo(&mut store);
        assert_eq!(store.document(), before);
    }

    #[test]
    fn empty_stacks_are_noops() {
        let mut store = store_with("cs_e");
        let mut stack = CommandStack::new(None);
        let before = store.document();
        assert_eq!(stack.undo(&mut store), None);
        assert_eq!(stack.redo(&mut store), None);
        assert_eq!(store.document(), before);
    }
}
