//! Integration tests: connect gestures through the editor session.

use mc_core::id::NodeId;
use mc_core::model::{Handle, Position};
use mc_core::viewport::Viewport;
use mc_editor::{EditorConfig, EditorSession};
use pretty_assertions::assert_eq;

fn loaded() -> EditorSession {
    let mut session = EditorSession::new(EditorConfig {
        seed_welcome_node: false,
        ..EditorConfig::default()
    });
    let body = serde_json::json!({
        "id": "m1",
        "content": include_str!("fixtures/mind_map.json"),
    })
    .to_string();
    session.load_succeeded(&body).unwrap();
    session
}

#[test]
fn failed_drop_from_left_creates_card_with_right_target() {
    let mut session = loaded();
    session.connect_start(NodeId::intern("root"), Some("left"));
    let id = session.connect_end(false, 400.0, 550.0).unwrap();

    let card = session.store().node(id).unwrap();
    assert_eq!(card.position, Position::new(250.0, 475.0));
    assert_eq!(card.origin, Some([0.5, 0.5]));
    assert_eq!(card.data.content, "");

    let edge = session.store().edges().iter().find(|e| e.target == id).unwrap();
    assert_eq!(edge.source, NodeId::intern("root"));
    assert_eq!(edge.source_handle, Some(Handle::Left));
    assert_eq!(edge.target_handle, Some(Handle::Right));
    assert_eq!(edge.kind, "default");
    assert_eq!(edge.style.stroke_width, 3.0);
}

#[test]
fn unrecognized_handle_yields_null_target() {
    let mut session = loaded();
    session.connect_start(NodeId::intern("notes"), Some("handle-7"));
    let id = session.connect_end(false, 100.0, 700.0).unwrap();
    let edge = session.store().edges().iter().find(|e| e.target == id).unwrap();
    assert_eq!(edge.target_handle, None);

    let json = serde_json::to_value(edge).unwrap();
    assert!(json["targetHandle"].is_null());
}

#[test]
fn release_is_converted_to_world_space() {
    let mut session = loaded();
    session.set_viewport(Viewport {
        x: -200.0,
        y: 100.0,
        zoom: 0.5,
        width: 800.0,
        height: 600.0,
    });
    session.connect_start(NodeId::intern("ideas"), Some("top"));
    let id = session.connect_end(false, 100.0, 100.0).unwrap();
    // world = ((100 + 200) / 0.5, (100 - 100) / 0.5) = (600, 0)
    let card = session.store().node(id).unwrap();
    assert_eq!(card.position, Position::new(450.0, -75.0));
}

#[test]
fn no_origin_means_no_card() {
    let mut session = loaded();
    let before = session.document();
    assert_eq!(session.connect_end(false, 10.0, 10.0), None);
    assert_eq!(session.document(), before);
    assert!(!session.can_undo());
}

#[test]
fn valid_drop_consumes_origin_without_creating() {
    let mut session = loaded();
    session.connect_start(NodeId::intern("root"), Some("right"));
    assert_eq!(session.connect_end(true, 500.0, 50.0), None);
    assert_eq!(session.store().nodes().len(), 3);
    // A later stray end does nothing either.
    assert_eq!(session.connect_end(false, 500.0, 50.0), None);
}

#[test]
fn create_on_connect_is_one_undo_step() {
    let mut session = loaded();
    let before = session.document();
    session.connect_start(NodeId::intern("root"), Some("bottom"));
    session.connect_end(false, 150.0, 800.0).unwrap();
    assert_eq!(session.store().nodes().len(), 4);
    assert_eq!(session.store().edges().len(), 4);

    assert_eq!(session.undo(), Some("add connected card".to_string()));
    assert_eq!(session.document(), before);
}

#[test]
fn direct_connect_adds_styled_edge_once() {
    let mut session = loaded();
    let (ideas, root) = (NodeId::intern("ideas"), NodeId::intern("root"));
    let id = session.connect(ideas, Some("bottom"), root, Some("top")).unwrap();
    let edge = session.store().edge(id).unwrap();
    assert_eq!(edge.style.stroke, "#b1b1b7");
    assert_eq!(edge.source_handle, Some(Handle::Bottom));

    assert_eq!(session.connect(ideas, Some("bottom"), root, Some("top")), None);
    assert_eq!(session.store().edges().len(), 4);
    assert_eq!(session.undo(), Some("connect".to_string()));
    assert_eq!(session.store().edges().len(), 3);
}
