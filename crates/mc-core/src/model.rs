//! Card/edge data model for mind-map documents.
//!
//! A document is two ordered collections: cards (nodes) placed in world
//! space, and edges connecting a handle on one card to a handle on another.
//! Order matters: it is the iteration order used by the alignment engine's
//! first-match policy and the paint order of the host.
//!
//! Field names serialize in camelCase so persisted documents read
//! `sourceHandle`, `imageUrl`, and so on.

use crate::id::{EdgeId, NodeId};
use serde::{Deserialize, Deserializer, Serialize};

// ─── Defaults ────────────────────────────────────────────────────────────

/// Default card size (text cards).
pub const CARD_SIZE: Size = Size::new(300.0, 150.0);

/// Default size of a card created from a pasted image.
pub const IMAGE_CARD_SIZE: Size = Size::new(300.0, 250.0);

/// Smallest size a card can be resized to.
pub const MIN_CARD_SIZE: Size = Size::new(100.0, 50.0);

/// Default edge stroke.
pub const EDGE_STROKE: &str = "#b1b1b7";
pub const EDGE_STROKE_WIDTH: f32 = 3.0;

// ─── Geometry ────────────────────────────────────────────────────────────

/// A point in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Explicit card size. Missing fields deserialize as 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Clamp to at least `min` on both axes.
    pub fn at_least(self, min: Size) -> Self {
        Self::new(self.width.max(min.width), self.height.max(min.height))
    }
}

// ─── Cards ───────────────────────────────────────────────────────────────

/// Visual/behavioral variant of a card. `Card` is the only one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Card,
}

/// The editable payload of a card.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// A partial update to `NodeData`. `None` fields leave the card untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodePatch {
    pub label: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
}

impl NodePatch {
    /// Patch written when inline text editing commits: content replaces the
    /// label-or-content display text and the label is cleared.
    pub fn edited_text(text: impl Into<String>) -> Self {
        Self {
            label: Some(String::new()),
            content: Some(text.into()),
            image_url: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.label.is_none() && self.content.is_none() && self.image_url.is_none()
    }
}

impl NodeData {
    pub fn merge(&mut self, patch: &NodePatch) {
        if let Some(label) = &patch.label {
            self.label.clone_from(label);
        }
        if let Some(content) = &patch.content {
            self.content.clone_from(content);
        }
        if let Some(url) = &patch.image_url {
            self.image_url = Some(url.clone());
        }
    }
}

/// A card on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,

    #[serde(rename = "type", default)]
    pub kind: NodeKind,

    /// Top-left corner in world space.
    pub position: Position,

    /// Older documents store the size under `style`.
    #[serde(default, alias = "style")]
    pub size: Size,

    #[serde(default)]
    pub data: NodeData,

    #[serde(default)]
    pub selected: bool,

    /// Anchor fraction the card was created with (`[0.5, 0.5]` = centered on
    /// the creation point). `position` already has it applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<[f32; 2]>,
}

impl Node {
    /// Empty text card with the default size, top-left at `position`.
    pub fn card(id: NodeId, position: Position) -> Self {
        Self {
            id,
            kind: NodeKind::Card,
            position,
            size: CARD_SIZE,
            data: NodeData::default(),
            selected: false,
            origin: None,
        }
    }

    /// Card showing an image, with a caller-provided label.
    pub fn image_card(
        id: NodeId,
        position: Position,
        image_url: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            size: IMAGE_CARD_SIZE,
            data: NodeData {
                label: label.into(),
                content: String::new(),
                image_url: Some(image_url.into()),
            },
            ..Self::card(id, position)
        }
    }

    /// Re-anchor so that the fraction `origin` of the card lands on `point`.
    #[must_use]
    pub fn anchored_at(mut self, point: Position, origin: [f32; 2]) -> Self {
        self.position = Position::new(
            point.x - self.size.width * origin[0],
            point.y - self.size.height * origin[1],
        );
        self.origin = Some(origin);
        self
    }

    #[must_use]
    pub fn with_data(mut self, data: NodeData) -> Self {
        self.data = data;
        self
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.size.width
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.height
    }

    pub fn contains(&self, p: Position) -> bool {
        p.x >= self.position.x && p.x <= self.right() && p.y >= self.position.y && p.y <= self.bottom()
    }

    /// Text shown on the card face: content, else label.
    pub fn display_text(&self) -> &str {
        if self.data.content.is_empty() {
            &self.data.label
        } else {
            &self.data.content
        }
    }
}

// ─── Edges ───────────────────────────────────────────────────────────────

/// A named anchor on a card's border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    Top,
    Bottom,
    Left,
    Right,
}

impl Handle {
    pub const ALL: [Handle; 4] = [Handle::Top, Handle::Bottom, Handle::Left, Handle::Right];

    /// Parse a host handle id. Anything outside the four sides is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "top" => Some(Handle::Top),
            "bottom" => Some(Handle::Bottom),
            "left" => Some(Handle::Left),
            "right" => Some(Handle::Right),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Handle::Top => "top",
            Handle::Bottom => "bottom",
            Handle::Left => "left",
            Handle::Right => "right",
        }
    }

    /// The facing side: top↔bottom, left↔right.
    pub fn opposite(self) -> Self {
        match self {
            Handle::Top => Handle::Bottom,
            Handle::Bottom => Handle::Top,
            Handle::Left => Handle::Right,
            Handle::Right => Handle::Left,
        }
    }
}

/// Unknown handle strings in stored documents load as "no handle".
fn lenient_handle<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Handle>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Handle::parse))
}

/// Stroke applied to an edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    pub stroke_width: f32,
    pub stroke: String,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            stroke_width: EDGE_STROKE_WIDTH,
            stroke: EDGE_STROKE.to_string(),
        }
    }
}

fn default_edge_kind() -> String {
    "default".to_string()
}

/// A directed connection `source → target` between two cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, deserialize_with = "lenient_handle")]
    pub source_handle: Option<Handle>,
    #[serde(default, deserialize_with = "lenient_handle")]
    pub target_handle: Option<Handle>,
    #[serde(rename = "type", default = "default_edge_kind")]
    pub kind: String,
    #[serde(default)]
    pub style: EdgeStyle,
    #[serde(default)]
    pub selected: bool,
}

impl Edge {
    pub fn new(id: EdgeId, source: NodeId, target: NodeId) -> Self {
        Self {
            id,
            source,
            target,
            source_handle: None,
            target_handle: None,
            kind: default_edge_kind(),
            style: EdgeStyle::default(),
            selected: false,
        }
    }

    #[must_use]
    pub fn with_handles(mut self, source: Option<Handle>, target: Option<Handle>) -> Self {
        self.source_handle = source;
        self.target_handle = target;
        self
    }

    pub fn touches(&self, node: NodeId) -> bool {
        self.source == node || self.target == node
    }

    /// Same endpoints and handles (ids and styling ignored).
    pub fn same_connection(&self, other: &Edge) -> bool {
        self.source == other.source
            && self.target == other.target
            && self.source_handle == other.source_handle
            && self.target_handle == other.target_handle
    }
}

// ─── Document ────────────────────────────────────────────────────────────

/// A whole canvas: the persisted shape and the undo/redo snapshot shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Document {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    /// The placeholder canvas a fresh editor starts with.
    pub fn welcome() -> Self {
        let node = Node::card(NodeId::intern("1"), Position::new(250.0, 250.0)).with_data(NodeData {
            label: "Welcome".into(),
            content: "Double click background to add a node.".into(),
            image_url: None,
        });
        Self::new(vec![node], Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}
