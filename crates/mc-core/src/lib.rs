pub mod align;
pub mod document;
pub mod id;
pub mod lint;
pub mod model;
pub mod store;
pub mod viewport;

pub use align::{DEFAULT_SNAP_THRESHOLD, GuideLine, GuideResult, SnappedPosition, compute_guides};
pub use document::{DocumentError, SavePayload};
pub use id::{EdgeId, NodeId};
pub use lint::{LintDiagnostic, LintSeverity, LintSubject, lint_document, repair_document};
pub use model::*;
pub use store::GraphStore;
pub use viewport::Viewport;
