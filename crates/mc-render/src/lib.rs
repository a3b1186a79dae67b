pub mod guides;
pub mod hit;

pub use guides::{GuideOverlay, project_guides};
pub use hit::{hit_test, hit_test_rect};
