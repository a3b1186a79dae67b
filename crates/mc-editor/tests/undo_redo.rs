//! Integration tests: snapshot history through the editor session.
//!
//! Every gesture that changes content must be undoable in one step, and
//! undo/redo must restore documents exactly (deep equality).

use mc_core::id::NodeId;
use mc_core::model::{Position, Size};
use mc_editor::{EditorConfig, EditorSession, Modifiers};
use pretty_assertions::assert_eq;

fn loaded_with(config: EditorConfig) -> EditorSession {
    let mut session = EditorSession::new(EditorConfig {
        seed_welcome_node: false,
        ..config
    });
    let body = serde_json::json!({
        "id": "m1",
        "content": include_str!("fixtures/mind_map.json"),
    })
    .to_string();
    session.load_succeeded(&body).unwrap();
    session
}

fn loaded() -> EditorSession {
    loaded_with(EditorConfig::default())
}

fn position(session: &EditorSession, id: &str) -> Position {
    session.store().node(NodeId::intern(id)).unwrap().position
}

// ─── Basic undo/redo ────────────────────────────────────────────────────

#[test]
fn load_starts_with_empty_history() {
    let mut session = loaded();
    assert_eq!(session.store().nodes().len(), 3);
    assert!(!session.can_undo());
    assert_eq!(session.undo(), None);
}

#[test]
fn undo_then_redo_restores_exact_documents() {
    let mut session = loaded();
    let before = session.document();

    let id = session.double_click(100.0, 500.0).unwrap();
    let after = session.document();
    assert_eq!(session.store().node(id).unwrap().position, Position::new(100.0, 500.0));

    assert_eq!(session.undo(), Some("add card".to_string()));
    assert_eq!(session.document(), before);
    assert_eq!(session.redo(), Some("add card".to_string()));
    assert_eq!(session.document(), after);
}

#[test]
fn new_action_discards_redo_branch() {
    let mut session = loaded();
    session.double_click(100.0, 500.0);
    session.undo();
    assert!(session.can_redo());
    session.double_click(900.0, 900.0);
    assert!(!session.can_redo());
}

#[test]
fn explicit_snapshot_is_restorable() {
    let mut session = loaded();
    let before = session.document();
    session.take_snapshot("external edit");
    assert_eq!(session.undo(), Some("external edit".to_string()));
    assert_eq!(session.document(), before);
}

#[test]
fn history_limit_drops_oldest() {
    let mut session = loaded_with(EditorConfig {
        history_limit: Some(2),
        ..EditorConfig::default()
    });
    for i in 0..4 {
        session.double_click(1000.0 + i as f32 * 400.0, 1000.0);
    }
    assert!(session.undo().is_some());
    assert!(session.undo().is_some());
    assert_eq!(session.undo(), None);
    assert_eq!(session.store().nodes().len(), 5);
}

// ─── Drag ───────────────────────────────────────────────────────────────

#[test]
fn drag_snaps_and_undoes_in_one_step() {
    let mut session = loaded();
    let before = session.document();

    session.pointer_down(450.0, 50.0, Modifiers::NONE);
    session.pointer_move(400.0, 50.0, Modifiers::NONE);
    // Raw (298, 0): root's right edge (300) and top (0) are within reach.
    session.pointer_move(348.0, 50.0, Modifiers::NONE);
    assert_eq!(position(&session, "ideas"), Position::new(300.0, 0.0));
    assert!(session.guides().vertical.is_some());
    assert!(!session.guide_overlay().is_empty());

    assert!(session.pointer_up(348.0, 50.0, Modifiers::NONE));
    assert!(session.guides().is_empty());

    assert_eq!(session.undo(), Some("move card".to_string()));
    assert_eq!(
        session.document().nodes.iter().map(|n| n.position).collect::<Vec<_>>(),
        before.nodes.iter().map(|n| n.position).collect::<Vec<_>>()
    );
    assert!(!session.can_undo());
}

#[test]
fn click_without_move_leaves_no_history() {
    let mut session = loaded();
    session.pointer_down(450.0, 50.0, Modifiers::NONE);
    assert!(!session.pointer_up(450.0, 50.0, Modifiers::NONE));
    assert!(!session.can_undo());
    assert_eq!(session.store().selected_node_ids(), vec![NodeId::intern("ideas")]);
}

#[test]
fn undo_is_ignored_mid_drag() {
    let mut session = loaded();
    session.double_click(1000.0, 1000.0);
    session.pointer_down(450.0, 50.0, Modifiers::NONE);
    session.pointer_move(470.0, 90.0, Modifiers::NONE);
    assert_eq!(session.undo(), None);
    session.pointer_up(470.0, 90.0, Modifiers::NONE);
    assert_eq!(session.undo(), Some("move card".to_string()));
    assert_eq!(session.undo(), Some("add card".to_string()));
}

#[test]
fn lost_pointer_up_does_not_disable_history() {
    let mut session = loaded();
    session.pointer_down(450.0, 50.0, Modifiers::NONE);
    session.pointer_move(470.0, 90.0, Modifiers::NONE);
    // Released outside the window: the next press arrives without an up.
    session.pointer_down(470.0, 90.0, Modifiers::NONE);
    session.pointer_move(500.0, 100.0, Modifiers::NONE);
    assert!(session.pointer_up(500.0, 100.0, Modifiers::NONE));
    assert_eq!(position(&session, "ideas"), Position::new(450.0, 50.0));

    session.double_click(2000.0, 2000.0).unwrap();
    assert_eq!(session.undo(), Some("add card".to_string()));
    assert_eq!(session.undo(), Some("move card".to_string()));
    assert_eq!(position(&session, "ideas"), Position::new(420.0, 40.0));
    assert_eq!(session.undo(), Some("move card".to_string()));
    assert_eq!(position(&session, "ideas"), Position::new(400.0, 0.0));
    assert_eq!(session.undo(), None);
}

#[test]
fn content_gesture_mid_drag_gets_its_own_step() {
    let mut session = loaded();
    session.pointer_down(450.0, 50.0, Modifiers::NONE);
    session.pointer_move(470.0, 90.0, Modifiers::NONE);
    let id = session.double_click(2000.0, 2000.0).unwrap();

    // The drag ended there; later moves do nothing.
    assert!(!session.pointer_move(600.0, 300.0, Modifiers::NONE));
    assert!(!session.pointer_up(600.0, 300.0, Modifiers::NONE));
    assert_eq!(position(&session, "ideas"), Position::new(420.0, 40.0));

    assert_eq!(session.undo(), Some("add card".to_string()));
    assert!(session.store().node(id).is_none());
    assert_eq!(position(&session, "ideas"), Position::new(420.0, 40.0));
    assert_eq!(session.undo(), Some("move card".to_string()));
    assert!(!session.can_undo());
}

#[test]
fn delete_key_mid_drag_is_separate_from_the_move() {
    let mut session = loaded();
    session.pointer_down(450.0, 50.0, Modifiers::NONE);
    session.pointer_move(470.0, 90.0, Modifiers::NONE);
    assert!(session.key_down("Delete", Modifiers::NONE));
    assert!(session.store().node(NodeId::intern("ideas")).is_none());

    assert_eq!(session.undo(), Some("delete".to_string()));
    assert_eq!(position(&session, "ideas"), Position::new(420.0, 40.0));
    assert_eq!(session.undo(), Some("move card".to_string()));
}

// ─── Resize / edit / delete ─────────────────────────────────────────────

#[test]
fn resize_without_end_is_closed_by_the_next_one() {
    let mut session = loaded();
    let id = NodeId::intern("notes");
    session.begin_resize();
    session.resize(id, Size::new(250.0, 120.0));
    session.begin_resize();
    session.resize(id, Size::new(200.0, 100.0));
    assert!(session.end_resize());

    assert_eq!(session.undo(), Some("resize card".to_string()));
    assert_eq!(session.store().node(id).unwrap().size, Size::new(250.0, 120.0));
    assert_eq!(session.undo(), Some("resize card".to_string()));
    assert_eq!(session.store().node(id).unwrap().size, Size::new(300.0, 150.0));
    assert_eq!(session.undo(), None);
}

#[test]
fn resize_gesture_is_one_step_and_clamped() {
    let mut session = loaded();
    let id = NodeId::intern("notes");
    session.begin_resize();
    session.resize(id, Size::new(250.0, 120.0));
    session.resize(id, Size::new(40.0, 10.0));
    assert!(session.end_resize());
    assert_eq!(session.store().node(id).unwrap().size, Size::new(100.0, 50.0));

    session.undo();
    assert_eq!(session.store().node(id).unwrap().size, Size::new(300.0, 150.0));
    assert!(!session.can_undo());
}

#[test]
fn commit_edit_replaces_content_and_clears_label() {
    let mut session = loaded();
    let id = NodeId::intern("root");
    session.double_click(10.0, 10.0);
    assert_eq!(session.editing(), Some(id));
    assert!(session.commit_edit("Quarterly plan"));
    assert_eq!(session.editing(), None);

    let data = &session.store().node(id).unwrap().data;
    assert_eq!(data.content, "Quarterly plan");
    assert_eq!(data.label, "");

    session.undo();
    assert_eq!(session.store().node(id).unwrap().data.label, "Project");
}

#[test]
fn delete_selected_cascades_and_undoes() {
    let mut session = loaded();
    session.select_node(NodeId::intern("ideas"), false);
    let before = session.document();
    assert!(session.key_down("Delete", Modifiers::NONE));
    assert_eq!(session.store().nodes().len(), 2);
    let edges: Vec<&str> = session.store().edges().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(edges, vec!["e-root-notes"]);

    let cmd = Modifiers {
        meta: true,
        ..Modifiers::NONE
    };
    assert!(session.key_down("z", cmd));
    assert_eq!(session.document(), before);
}
