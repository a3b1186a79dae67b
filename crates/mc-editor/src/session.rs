//! Editor session: one canvas instance and every gesture it responds to.
//!
//! The session owns all per-editor state (store, history, clipboard buffer,
//! pointer tracking, in-flight gestures, autosave) so two editors on one
//! page never share anything. Hosts feed it screen-space events and read
//! back the store.
//!
//! Every content change goes through `CommandStack`, which snapshots the
//! document first. Selection-only changes bypass history.

use crate::autosave::{Autosave, SaveStatus};
use crate::clipboard::{
    Clipboard, ClipboardPayload, PasteRoute, capture_stamp, image_card_label, route_paste,
};
use crate::commands::CommandStack;
use crate::config::EditorConfig;
use crate::connect::{ConnectGesture, direct_edge};
use crate::input::{InputEvent, Modifiers};
use crate::mutation::{GraphMutation, apply_mutation};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::tools::SelectTool;
use mc_core::align::GuideResult;
use mc_core::document::{DocumentError, SavePayload, parse_record};
use mc_core::id::{EdgeId, NodeId};
use mc_core::lint::lint_document;
use mc_core::model::{Document, MIN_CARD_SIZE, Node, NodePatch, Position, Size};
use mc_core::store::GraphStore;
use mc_core::viewport::Viewport;
use mc_render::guides::{GuideOverlay, project_guides};
use mc_render::hit::hit_test;

pub struct EditorSession {
    config: EditorConfig,
    store: GraphStore,
    commands: CommandStack,
    clipboard: Clipboard,
    connect: ConnectGesture,
    tool: SelectTool,
    viewport: Viewport,
    /// Last pointer position in screen space, if the pointer has been seen.
    pointer: Option<(f32, f32)>,
    /// The one card whose text is being edited.
    editing: Option<NodeId>,
    autosave: Autosave,
    /// Content changed since the last `poll_save`.
    dirty: bool,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorSession {
    pub fn new(config: EditorConfig) -> Self {
        let store = if config.seed_welcome_node {
            GraphStore::from_document(Document::welcome())
        } else {
            GraphStore::new()
        };
        Self {
            commands: CommandStack::new(config.history_limit),
            tool: SelectTool::new(config.snap_threshold),
            autosave: Autosave::new(config.autosave_quiet_ms),
            store,
            clipboard: Clipboard::new(),
            connect: ConnectGesture::new(),
            viewport: Viewport::default(),
            pointer: None,
            editing: None,
            dirty: false,
            config,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn document(&self) -> Document {
        self.store.document()
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn guides(&self) -> &GuideResult {
        self.tool.guides()
    }

    /// Current guides projected into screen space.
    pub fn guide_overlay(&self) -> GuideOverlay {
        project_guides(self.tool.guides(), &self.viewport)
    }

    pub fn marquee(&self) -> Option<(f32, f32, f32, f32)> {
        self.tool.marquee_rect
    }

    pub fn editing(&self) -> Option<NodeId> {
        self.editing
    }

    pub fn save_status(&self) -> SaveStatus {
        self.autosave.status()
    }

    pub fn can_undo(&self) -> bool {
        self.commands.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.commands.can_redo()
    }

    /// Last pointer position in world space.
    pub fn pointer_world(&self) -> Option<Position> {
        self.pointer
            .map(|(sx, sy)| self.viewport.screen_to_world(sx, sy))
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    /// Track the pointer without a button held (paste anchor).
    pub fn pointer_hover(&mut self, sx: f32, sy: f32) {
        self.pointer = Some((sx, sy));
    }

    pub fn pointer_down(&mut self, sx: f32, sy: f32, modifiers: Modifiers) {
        // A previous gesture whose pointer-up never arrived.
        self.interrupt_gesture();
        self.pointer = Some((sx, sy));
        let world = self.viewport.screen_to_world(sx, sy);
        let hit = hit_test(self.store.nodes(), world);
        let event = InputEvent::PointerDown {
            x: world.x,
            y: world.y,
            modifiers,
        };
        let mutations = self.tool.handle(&event, hit, &self.store);
        self.dispatch(mutations, "move card");
        if self.tool.is_dragging() {
            self.commands.begin_batch(&self.store, "move card");
        }
    }

    /// Returns `true` if cards moved.
    pub fn pointer_move(&mut self, sx: f32, sy: f32, modifiers: Modifiers) -> bool {
        self.pointer = Some((sx, sy));
        let world = self.viewport.screen_to_world(sx, sy);
        let event = InputEvent::PointerMove {
            x: world.x,
            y: world.y,
            modifiers,
        };
        let mutations = self.tool.handle(&event, None, &self.store);
        self.dispatch(mutations, "move card")
    }

    /// Ends a drag or marquee. Returns `true` if a drag left a history entry.
    pub fn pointer_up(&mut self, sx: f32, sy: f32, modifiers: Modifiers) -> bool {
        self.pointer = Some((sx, sy));
        let world = self.viewport.screen_to_world(sx, sy);
        let event = InputEvent::PointerUp {
            x: world.x,
            y: world.y,
            modifiers,
        };
        let mutations = self.tool.handle(&event, None, &self.store);
        self.dispatch(mutations, "select");
        let recorded = self.commands.end_batch(&self.store);
        if recorded {
            self.mark_changed();
        }
        recorded
    }

    /// Double-click: on a card, start editing it; on background, create a
    /// card with its top-left at the click. Returns the new card's id.
    pub fn double_click(&mut self, sx: f32, sy: f32) -> Option<NodeId> {
        self.interrupt_gesture();
        let world = self.viewport.screen_to_world(sx, sy);
        if let Some(hit) = hit_test(self.store.nodes(), world) {
            self.begin_edit(hit);
            return None;
        }
        let mut node = Node::card(self.store.fresh_node_id("node"), world);
        node.size = self.config.card_size;
        let node = node.anchored_at(world, [0.0, 0.0]);
        let id = node.id;
        self.execute(
            GraphMutation::AddNode {
                node: Box::new(node),
            },
            "add card",
        )
        .then_some(id)
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn select_node(&mut self, id: NodeId, additive: bool) -> bool {
        if !self.store.contains_node(id) {
            return false;
        }
        let (mut nodes, edges) = if additive {
            (self.store.selected_node_ids(), self.store.selected_edge_ids())
        } else {
            (Vec::new(), Vec::new())
        };
        if !nodes.contains(&id) {
            nodes.push(id);
        }
        self.store.set_selection(&nodes, &edges);
        true
    }

    pub fn select_edge(&mut self, id: EdgeId, additive: bool) -> bool {
        if self.store.edge(id).is_none() {
            return false;
        }
        let (nodes, mut edges) = if additive {
            (self.store.selected_node_ids(), self.store.selected_edge_ids())
        } else {
            (Vec::new(), Vec::new())
        };
        if !edges.contains(&id) {
            edges.push(id);
        }
        self.store.set_selection(&nodes, &edges);
        true
    }

    pub fn select_all(&mut self) {
        let nodes: Vec<NodeId> = self.store.nodes().iter().map(|n| n.id).collect();
        let edges: Vec<EdgeId> = self.store.edges().iter().map(|e| e.id).collect();
        self.store.set_selection(&nodes, &edges);
    }

    pub fn clear_selection(&mut self) {
        self.store.clear_selection();
    }

    // ─── Text editing ────────────────────────────────────────────────────

    /// Make `id` the single card in edit mode.
    pub fn begin_edit(&mut self, id: NodeId) -> bool {
        if !self.store.contains_node(id) {
            return false;
        }
        self.editing = Some(id);
        true
    }

    /// Write the edited text as the card's content (label cleared) and leave
    /// edit mode. Returns `true` if the card changed.
    pub fn commit_edit(&mut self, text: &str) -> bool {
        let Some(id) = self.editing.take() else {
            return false;
        };
        self.interrupt_gesture();
        let unchanged = self
            .store
            .node(id)
            .is_some_and(|n| n.data.content == text && n.data.label.is_empty());
        if unchanged {
            return false;
        }
        self.execute(
            GraphMutation::UpdateNode {
                id,
                patch: NodePatch::edited_text(text),
            },
            "edit text",
        )
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    // ─── Resize ──────────────────────────────────────────────────────────

    /// Start a resize gesture; intermediate sizes fold into one undo step.
    pub fn begin_resize(&mut self) {
        self.interrupt_gesture();
        self.commands.begin_batch(&self.store, "resize card");
    }

    /// Resize a card, clamped to the minimum card size.
    pub fn resize(&mut self, id: NodeId, size: Size) -> bool {
        self.execute(
            GraphMutation::ResizeNode {
                id,
                size: size.at_least(MIN_CARD_SIZE),
            },
            "resize card",
        )
    }

    pub fn end_resize(&mut self) -> bool {
        let recorded = self.commands.end_batch(&self.store);
        if recorded {
            self.mark_changed();
        }
        recorded
    }

    // ─── Connect ─────────────────────────────────────────────────────────

    pub fn connect_start(&mut self, node: NodeId, handle: Option<&str>) {
        self.connect.start(node, handle);
    }

    /// Finish a handle drag at screen `(sx, sy)`. An invalid drop creates a
    /// linked card; returns its id.
    pub fn connect_end(&mut self, valid: bool, sx: f32, sy: f32) -> Option<NodeId> {
        self.interrupt_gesture();
        let plan = self.connect.end(
            valid,
            sx,
            sy,
            &self.viewport,
            &self.store,
            self.config.card_size,
        )?;
        let id = plan.node.id;
        self.execute(plan.into_mutation(), "add connected card")
            .then_some(id)
    }

    /// A drop on a valid handle. Duplicate connections are ignored.
    pub fn connect(
        &mut self,
        source: NodeId,
        source_handle: Option<&str>,
        target: NodeId,
        target_handle: Option<&str>,
    ) -> Option<EdgeId> {
        self.interrupt_gesture();
        let edge = direct_edge(&self.store, source, source_handle, target, target_handle)?;
        let id = edge.id;
        self.execute(
            GraphMutation::AddEdge {
                edge: Box::new(edge),
            },
            "connect",
        )
        .then_some(id)
    }

    // ─── Delete / clipboard ──────────────────────────────────────────────

    /// Remove the selected cards (with their edges) and selected edges.
    pub fn delete_selected(&mut self) -> bool {
        self.interrupt_gesture();
        let nodes = self.store.selected_node_ids();
        let edges = self.store.selected_edge_ids();
        if nodes.is_empty() && edges.is_empty() {
            return false;
        }
        self.execute(GraphMutation::RemoveSubgraph { nodes, edges }, "delete")
    }

    /// Copy the selection. `true` means the host should write
    /// `CLIPBOARD_MARKER` to the system clipboard.
    pub fn copy(&mut self) -> bool {
        self.clipboard.copy(&self.store)
    }

    /// Cut the selection. Same return contract as `copy`.
    pub fn cut(&mut self) -> bool {
        self.interrupt_gesture();
        match self.clipboard.cut(&self.store) {
            Some(mutation) => {
                self.execute(mutation, "cut");
                true
            }
            None => false,
        }
    }

    /// Paste the buffer with its bounding-box origin at `anchor`, or at the
    /// last pointer position. An unseen pointer counts as the screen origin.
    pub fn paste(&mut self, anchor: Option<Position>) -> bool {
        self.interrupt_gesture();
        let anchor = anchor
            .or_else(|| self.pointer_world())
            .unwrap_or_else(|| self.viewport.screen_to_world(0.0, 0.0));
        match self.clipboard.paste(&self.store, anchor) {
            Some(mutations) => self.execute_all(mutations, "paste"),
            None => false,
        }
    }

    /// Route a system paste event. `Nodes` is handled here; for `Image` the
    /// host decodes the item and calls `paste_image`. Anything but `Ignore`
    /// means the host should suppress its default paste.
    pub fn system_paste(&mut self, payload: &ClipboardPayload) -> PasteRoute {
        if self.editing.is_some() {
            return PasteRoute::Ignore;
        }
        let route = route_paste(payload, !self.clipboard.is_empty());
        log::debug!("paste routed to {route:?}");
        if route == PasteRoute::Nodes {
            self.paste(None);
        }
        route
    }

    /// Completion of an image decode: add one image card at the pointer,
    /// or centered in the viewport if the pointer was never seen.
    /// `iso_time` is the capture time, e.g. `2024-05-01T12:30:45.123Z`.
    pub fn paste_image(&mut self, data_url: &str, iso_time: &str) -> Option<NodeId> {
        self.interrupt_gesture();
        let size = self.config.image_card_size;
        let position = self.pointer_world().unwrap_or_else(|| {
            self.viewport
                .center_world()
                .offset(-size.width / 2.0, -size.height / 2.0)
        });
        let label = image_card_label(&capture_stamp(iso_time));
        let mut node = Node::image_card(self.store.fresh_node_id("node"), position, data_url, label);
        node.size = size;
        let id = node.id;
        self.execute(
            GraphMutation::AddNode {
                node: Box::new(node),
            },
            "paste image",
        )
        .then_some(id)
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Handle a key press. Returns `true` if the key was consumed and the
    /// host should suppress its default action.
    pub fn key_down(&mut self, key: &str, modifiers: Modifiers) -> bool {
        if self.editing.is_some() {
            return false;
        }
        let Some(action) = ShortcutMap::resolve(key, modifiers) else {
            return false;
        };
        log::debug!("shortcut {key:?} → {action:?}");
        match action {
            ShortcutAction::Undo => {
                self.undo();
                true
            }
            ShortcutAction::Redo => {
                self.redo();
                true
            }
            ShortcutAction::Copy => {
                self.copy();
                true
            }
            ShortcutAction::Cut => {
                self.cut();
                true
            }
            // The system paste event carries the clipboard payload.
            ShortcutAction::Paste => false,
            ShortcutAction::Delete => self.delete_selected(),
            ShortcutAction::SelectAll => {
                self.select_all();
                true
            }
            ShortcutAction::Deselect => {
                self.connect.cancel();
                self.clear_selection();
                true
            }
        }
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn take_snapshot(&mut self, description: &str) {
        self.interrupt_gesture();
        self.commands.take_snapshot(&self.store, description);
    }

    pub fn undo(&mut self) -> Option<String> {
        let description = self.commands.undo(&mut self.store)?;
        self.after_restore();
        Some(description)
    }

    pub fn redo(&mut self) -> Option<String> {
        let description = self.commands.redo(&mut self.store)?;
        self.after_restore();
        Some(description)
    }

    fn after_restore(&mut self) {
        self.tool.reset();
        if self.editing.is_some_and(|id| !self.store.contains_node(id)) {
            self.editing = None;
        }
        self.mark_changed();
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    /// The load request answered with `body`. A payload that cannot be
    /// decoded loads as an empty canvas; the error is returned for logging.
    /// Either way the load gate is released and history is cleared.
    pub fn load_succeeded(&mut self, body: &str) -> Result<(), DocumentError> {
        let (doc, result) = match parse_record(body) {
            Ok(doc) => (doc, Ok(())),
            Err(e) => {
                log::warn!("load: {e}; starting with an empty canvas");
                (Document::default(), Err(e))
            }
        };
        log::info!("load: {} cards, {} edges", doc.nodes.len(), doc.edges.len());
        for diagnostic in lint_document(&doc) {
            log::debug!("load: [{}] {}", diagnostic.rule, diagnostic.message);
        }
        self.replace_document(doc);
        self.autosave.finish_load();
        result
    }

    /// The load request itself failed. The current canvas stays as is.
    pub fn load_failed(&mut self) {
        log::warn!("load: request failed; keeping the initial canvas");
        self.autosave.finish_load();
    }

    /// Clock tick from the host. Returns the PUT body when a save is due;
    /// the host must answer with `save_finished`.
    pub fn poll_save(&mut self, now_ms: u64) -> Option<String> {
        if std::mem::take(&mut self.dirty) {
            self.autosave.note_mutation(now_ms);
        }
        if !self.autosave.poll(now_ms) {
            return None;
        }
        self.autosave.save_started();
        match SavePayload::from_document(&self.store.document()).and_then(|p| p.to_json()) {
            Ok(body) => {
                log::info!("autosave: saving {} bytes", body.len());
                Some(body)
            }
            Err(e) => {
                log::warn!("autosave: {e}");
                self.autosave.save_finished(false);
                None
            }
        }
    }

    pub fn save_finished(&mut self, ok: bool) {
        self.autosave.save_finished(ok);
    }

    fn replace_document(&mut self, doc: Document) {
        let Document { nodes, edges } = doc;
        apply_mutation(&mut self.store, GraphMutation::ReplaceAll { nodes, edges });
        self.commands.clear();
        self.tool.reset();
        self.connect.cancel();
        self.editing = None;
    }

    // ─── Internals ───────────────────────────────────────────────────────

    /// Route tool output: selection straight to the store, content through
    /// history. Returns whether content changed.
    fn dispatch(&mut self, mutations: Vec<GraphMutation>, description: &str) -> bool {
        let mut changed = false;
        for mutation in mutations {
            if matches!(mutation, GraphMutation::SetSelection { .. }) {
                apply_mutation(&mut self.store, mutation);
            } else {
                changed |= self.commands.execute(&mut self.store, mutation, description);
            }
        }
        changed
    }

    fn execute(&mut self, mutation: GraphMutation, description: &str) -> bool {
        let changed = self.commands.execute(&mut self.store, mutation, description);
        if changed && !self.commands.is_batching() {
            self.mark_changed();
        }
        changed
    }

    fn execute_all(&mut self, mutations: Vec<GraphMutation>, description: &str) -> bool {
        let changed = self.commands.execute_all(&mut self.store, mutations, description);
        if changed {
            self.mark_changed();
        }
        changed
    }

    /// Close a drag or resize that is still open, as its own history entry,
    /// so the next gesture neither nests in it nor gets folded into it.
    fn interrupt_gesture(&mut self) {
        if !self.commands.is_batching() {
            return;
        }
        if self.commands.flush_batch(&self.store) {
            self.mark_changed();
        }
        self.tool.reset();
    }

    fn mark_changed(&mut self) {
        // Changes before the initial load finishes are never saved.
        if self.autosave.is_load_finished() {
            self.dirty = true;
        }
    }
}
