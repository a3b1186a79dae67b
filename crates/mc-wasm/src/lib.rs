//! WASM bridge for Mind Canvas: exposes the editor session to the browser host.
//!
//! Compiled via `wasm-pack build --target web`. The host owns the DOM, the
//! network, and the clock; it forwards events here and reads back JSON.
//! Ids cross the boundary as plain strings, modifier keys as a bit set
//! (`shift = 1`, `ctrl = 2`, `alt = 4`, `meta = 8`).

use mc_core::id::{EdgeId, NodeId};
use mc_core::model::{Position, Size};
use mc_core::viewport::Viewport;
use mc_editor::{ClipboardPayload, EditorConfig, EditorSession, Modifiers, PasteRoute};
use mc_render::guides::{GUIDE_COLOR, GUIDE_WIDTH};
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

/// Install the console logger and panic hook once per page.
#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(target_arch = "wasm32")]
    {
        let _ = console_log::init_with_level(log::Level::Debug);
        console_error_panic_hook::set_once();
    }
}

/// The main WASM-facing canvas controller.
///
/// One instance per mounted editor; all interaction from the host goes
/// through it.
#[wasm_bindgen]
pub struct MindCanvas {
    session: EditorSession,
}

#[wasm_bindgen]
impl MindCanvas {
    /// Create a canvas controller for a viewport of the given size.
    /// `config_json` is an optional `EditorConfig` object; unknown or
    /// invalid input falls back to the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64, config_json: Option<String>) -> Self {
        let config = match config_json.as_deref() {
            Some(json) => EditorConfig::from_json(json).unwrap_or_else(|e| {
                log::warn!("config: {e}; using defaults");
                EditorConfig::default()
            }),
            None => EditorConfig::default(),
        };
        let mut session = EditorSession::new(config);
        session.set_viewport(Viewport::new(width as f32, height as f32));
        Self { session }
    }

    // ─── Viewport ────────────────────────────────────────────────────────

    /// Resize the visible area, keeping pan and zoom.
    pub fn resize(&mut self, width: f64, height: f64) {
        let viewport = Viewport {
            width: width as f32,
            height: height as f32,
            ..*self.session.viewport()
        };
        self.session.set_viewport(viewport);
    }

    /// Update pan and zoom after the host moved the canvas.
    pub fn set_transform(&mut self, x: f64, y: f64, zoom: f64) {
        let viewport = Viewport {
            x: x as f32,
            y: y as f32,
            zoom: zoom as f32,
            ..*self.session.viewport()
        };
        self.session.set_viewport(viewport);
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    /// Feed the body of a successful GET. Returns `{"ok":true}` or
    /// `{"ok":false,"error":"..."}`; the canvas is usable either way.
    pub fn load_succeeded(&mut self, body: &str) -> String {
        match self.session.load_succeeded(body) {
            Ok(()) => r#"{"ok":true}"#.to_string(),
            Err(e) => serde_json::json!({ "ok": false, "error": e.to_string() }).to_string(),
        }
    }

    pub fn load_failed(&mut self) {
        self.session.load_failed();
    }

    /// Clock tick. Returns the PUT body when a save is due.
    pub fn poll_save(&mut self, now_ms: f64) -> Option<String> {
        self.session.poll_save(now_ms.max(0.0) as u64)
    }

    pub fn save_finished(&mut self, ok: bool) {
        self.session.save_finished(ok);
    }

    /// `"saved"`, `"saving"`, or `"error"`.
    pub fn save_status(&self) -> String {
        self.session.save_status().as_str().to_string()
    }

    /// Current `{nodes, edges}` as JSON.
    pub fn document_json(&self) -> String {
        serde_json::to_string(&self.session.document())
            .unwrap_or_else(|_| r#"{"nodes":[],"edges":[]}"#.to_string())
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    pub fn pointer_hover(&mut self, x: f32, y: f32) {
        self.session.pointer_hover(x, y);
    }

    pub fn pointer_down(&mut self, x: f32, y: f32, modifiers: u8) {
        self.session
            .pointer_down(x, y, Modifiers::from_bits(modifiers));
    }

    /// Returns true if any card moved.
    pub fn pointer_move(&mut self, x: f32, y: f32, modifiers: u8) -> bool {
        self.session
            .pointer_move(x, y, Modifiers::from_bits(modifiers))
    }

    /// Returns true if the gesture changed content.
    pub fn pointer_up(&mut self, x: f32, y: f32, modifiers: u8) -> bool {
        self.session.pointer_up(x, y, Modifiers::from_bits(modifiers))
    }

    /// Returns the id of a newly created card, if the click landed on the
    /// background.
    pub fn double_click(&mut self, x: f32, y: f32) -> Option<String> {
        self.session.double_click(x, y).map(|id| id.to_string())
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn select_node(&mut self, id: &str, additive: bool) -> bool {
        self.session.select_node(NodeId::intern(id), additive)
    }

    pub fn select_edge(&mut self, id: &str, additive: bool) -> bool {
        self.session.select_edge(EdgeId::intern(id), additive)
    }

    pub fn select_all(&mut self) {
        self.session.select_all();
    }

    pub fn clear_selection(&mut self) {
        self.session.clear_selection();
    }

    /// Selected card ids as a JSON array.
    pub fn selected_ids(&self) -> String {
        let ids: Vec<&str> = self
            .session
            .store()
            .nodes()
            .iter()
            .filter(|n| n.selected)
            .map(|n| n.id.as_str())
            .collect();
        serde_json::to_string(&ids).unwrap_or_else(|_| "[]".to_string())
    }

    // ─── Text editing ────────────────────────────────────────────────────

    pub fn begin_edit(&mut self, id: &str) -> bool {
        self.session.begin_edit(NodeId::intern(id))
    }

    pub fn commit_edit(&mut self, text: &str) -> bool {
        self.session.commit_edit(text)
    }

    pub fn cancel_edit(&mut self) {
        self.session.cancel_edit();
    }

    pub fn editing_id(&self) -> Option<String> {
        self.session.editing().map(|id| id.to_string())
    }

    // ─── Resize ──────────────────────────────────────────────────────────

    pub fn begin_resize(&mut self) {
        self.session.begin_resize();
    }

    pub fn resize_node(&mut self, id: &str, width: f32, height: f32) -> bool {
        self.session
            .resize(NodeId::intern(id), Size::new(width, height))
    }

    pub fn end_resize(&mut self) -> bool {
        self.session.end_resize()
    }

    // ─── Connect ─────────────────────────────────────────────────────────

    pub fn connect_start(&mut self, node: &str, handle: Option<String>) {
        self.session
            .connect_start(NodeId::intern(node), handle.as_deref());
    }

    /// Returns the id of the card created by a drop on empty canvas.
    pub fn connect_end(&mut self, valid: bool, x: f32, y: f32) -> Option<String> {
        self.session
            .connect_end(valid, x, y)
            .map(|id| id.to_string())
    }

    /// Direct handle-to-handle connection. Returns the new edge id.
    pub fn connect(
        &mut self,
        source: &str,
        source_handle: Option<String>,
        target: &str,
        target_handle: Option<String>,
    ) -> Option<String> {
        self.session
            .connect(
                NodeId::intern(source),
                source_handle.as_deref(),
                NodeId::intern(target),
                target_handle.as_deref(),
            )
            .map(|id| id.to_string())
    }

    // ─── Clipboard ───────────────────────────────────────────────────────

    pub fn delete_selected(&mut self) -> bool {
        self.session.delete_selected()
    }

    pub fn copy(&mut self) -> bool {
        self.session.copy()
    }

    pub fn cut(&mut self) -> bool {
        self.session.cut()
    }

    /// Paste the buffer with its top-left at screen point (`x`, `y`).
    pub fn paste_at(&mut self, x: f32, y: f32) -> bool {
        let anchor: Position = self.session.viewport().screen_to_world(x, y);
        self.session.paste(Some(anchor))
    }

    /// Paste at the last pointer position.
    pub fn paste(&mut self) -> bool {
        self.session.paste(None)
    }

    /// Route a system paste event. `payload_json` is `{"text":..,"types":[..]}`.
    /// Returns `"nodes"` (already pasted; suppress the default), `"image"`
    /// (decode it and call `paste_image`), or `"ignore"`.
    pub fn system_paste(&mut self, payload_json: &str) -> String {
        let payload: ClipboardPayload = match serde_json::from_str(payload_json) {
            Ok(p) => p,
            Err(e) => {
                log::warn!("paste: bad payload: {e}");
                return route_name(PasteRoute::Ignore).to_string();
            }
        };
        route_name(self.session.system_paste(&payload)).to_string()
    }

    /// Place a decoded clipboard image. Returns the new card id.
    pub fn paste_image(&mut self, data_url: &str) -> Option<String> {
        let now = now_iso();
        self.session
            .paste_image(data_url, &now)
            .map(|id| id.to_string())
    }

    // ─── Keyboard / history ──────────────────────────────────────────────

    /// Returns true if the key was consumed.
    pub fn handle_key(&mut self, key: &str, modifiers: u8) -> bool {
        self.session.key_down(key, Modifiers::from_bits(modifiers))
    }

    pub fn take_snapshot(&mut self, description: &str) {
        self.session.take_snapshot(description);
    }

    /// Returns the description of the undone step.
    pub fn undo(&mut self) -> Option<String> {
        self.session.undo()
    }

    pub fn redo(&mut self) -> Option<String> {
        self.session.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.session.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.session.can_redo()
    }

    // ─── Overlays ────────────────────────────────────────────────────────

    /// Active alignment guides in world coordinates.
    pub fn guides_json(&self) -> String {
        serde_json::to_string(self.session.guides()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Marquee rectangle `[x, y, w, h]` in world coordinates, or `null`.
    pub fn marquee_json(&self) -> String {
        match self.session.marquee() {
            Some((x, y, w, h)) => serde_json::json!([x, y, w, h]).to_string(),
            None => "null".to_string(),
        }
    }

    /// Stroke the alignment guides over the host's canvas.
    pub fn draw_guides(&self, ctx: &CanvasRenderingContext2d) {
        let overlay = self.session.guide_overlay();
        if overlay.is_empty() {
            return;
        }
        ctx.save();
        ctx.set_stroke_style_str(GUIDE_COLOR);
        ctx.set_line_width(GUIDE_WIDTH);
        ctx.begin_path();
        for line in overlay.lines() {
            ctx.move_to(line.p0.x, line.p0.y);
            ctx.line_to(line.p1.x, line.p1.y);
        }
        ctx.stroke();
        ctx.restore();
    }
}

fn route_name(route: PasteRoute) -> &'static str {
    match route {
        PasteRoute::Nodes => "nodes",
        PasteRoute::Image => "image",
        PasteRoute::Ignore => "ignore",
    }
}

#[cfg(target_arch = "wasm32")]
fn now_iso() -> String {
    String::from(js_sys::Date::new_0().to_iso_string())
}

/// Native builds (tests) have no JS clock; any fixed stamp will do.
#[cfg(not(target_arch = "wasm32"))]
fn now_iso() -> String {
    "1970-01-01T00:00:00.000Z".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CTRL: u8 = 2;

    fn canvas() -> MindCanvas {
        MindCanvas::new(800.0, 600.0, Some(r#"{"seedWelcomeNode":false}"#.into()))
    }

    #[test]
    fn bad_config_falls_back_to_defaults() {
        let canvas = MindCanvas::new(800.0, 600.0, Some("not json".into()));
        assert_eq!(canvas.session.store().nodes().len(), 1);
    }

    #[test]
    fn load_reports_status_json() {
        let mut canvas = canvas();
        assert_eq!(
            canvas.load_succeeded(r#"{"content":"{\"nodes\":[],\"edges\":[]}"}"#),
            r#"{"ok":true}"#
        );
        let failed: serde_json::Value =
            serde_json::from_str(&canvas.load_succeeded(r#"{"content":"nope"}"#)).unwrap();
        assert_eq!(failed["ok"], false);
        assert!(failed["error"].as_str().unwrap().contains("content"));
    }

    #[test]
    fn double_click_then_undo_via_key() {
        let mut canvas = canvas();
        canvas.load_failed();
        let id = canvas.double_click(40.0, 40.0).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&canvas.document_json()).unwrap();
        assert_eq!(doc["nodes"][0]["id"], id.as_str());
        assert!(canvas.can_undo());

        assert!(canvas.handle_key("z", CTRL));
        assert_eq!(canvas.document_json(), r#"{"nodes":[],"edges":[]}"#);
        assert!(canvas.can_redo());
    }

    #[test]
    fn paste_routing_names() {
        let mut canvas = canvas();
        canvas.double_click(40.0, 40.0);
        assert_eq!(canvas.system_paste(r#"{"types":["text/plain"],"text":"hi"}"#), "ignore");
        assert_eq!(canvas.system_paste("garbage"), "ignore");

        canvas.select_all();
        assert!(canvas.copy());
        assert_eq!(canvas.system_paste(r#"{"types":["text/plain"]}"#), "nodes");
        let selected: Vec<String> = serde_json::from_str(&canvas.selected_ids()).unwrap();
        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn paste_at_converts_screen_point() {
        let mut canvas = canvas();
        canvas.double_click(0.0, 0.0);
        canvas.select_all();
        canvas.copy();
        canvas.set_transform(100.0, 50.0, 2.0);
        assert!(canvas.paste_at(300.0, 250.0));

        let doc = canvas.session.document();
        let pasted = doc.nodes.iter().find(|n| n.selected).unwrap();
        assert_eq!(pasted.position, Position::new(100.0, 100.0));
    }

    #[test]
    fn image_paste_returns_card_id() {
        let mut canvas = canvas();
        let id = canvas.paste_image("data:image/png;base64,AA==").unwrap();
        let node = canvas.session.store().node(NodeId::intern(&id)).unwrap();
        assert!(node.data.label.starts_with("Pasted image "));
        assert_eq!(canvas.undo().as_deref(), Some("paste image"));
    }

    #[test]
    fn marquee_and_guides_serialize() {
        let mut canvas = canvas();
        assert_eq!(canvas.marquee_json(), "null");
        canvas.pointer_down(10.0, 10.0, 0);
        canvas.pointer_move(60.0, 40.0, 0);
        assert_eq!(canvas.marquee_json(), "[10.0,10.0,50.0,30.0]");
        canvas.pointer_up(60.0, 40.0, 0);
        assert_eq!(canvas.marquee_json(), "null");

        let guides: serde_json::Value = serde_json::from_str(&canvas.guides_json()).unwrap();
        assert!(guides.is_object());
    }

    #[test]
    fn save_status_round() {
        let mut canvas = canvas();
        canvas.load_failed();
        canvas.double_click(40.0, 40.0);
        assert_eq!(canvas.poll_save(0.0), None);
        assert!(canvas.poll_save(5_000.0).is_some());
        assert_eq!(canvas.save_status(), "saving");
        canvas.save_finished(true);
        assert_eq!(canvas.save_status(), "saved");
    }
}
