//! Guide overlay: project alignment guides into screen space.
//!
//! A vertical guide spans the full viewport height at the screen x of its
//! world coordinate; a horizontal guide spans the full width. Guides that fall
//! outside the viewport are culled.

use kurbo::{Line, Point};
use mc_core::align::{GuideLine, GuideResult};
use mc_core::viewport::Viewport;

/// Guide stroke color (matches the selection accent).
pub const GUIDE_COLOR: &str = "#b4c46c";
pub const GUIDE_WIDTH: f64 = 1.0;

/// Screen-space guide segments ready to stroke.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GuideOverlay {
    pub vertical: Option<Line>,
    pub horizontal: Option<Line>,
}

impl GuideOverlay {
    pub fn is_empty(&self) -> bool {
        self.vertical.is_none() && self.horizontal.is_none()
    }

    /// Lines in paint order (vertical first).
    pub fn lines(&self) -> impl Iterator<Item = Line> {
        self.vertical.into_iter().chain(self.horizontal)
    }
}

/// Project a guide result through the viewport transform.
pub fn project_guides(guides: &GuideResult, viewport: &Viewport) -> GuideOverlay {
    let overlay = GuideOverlay {
        vertical: guides.vertical.and_then(|g| project(g, viewport)),
        horizontal: guides.horizontal.and_then(|g| project(g, viewport)),
    };
    log::trace!("guide overlay: {overlay:?}");
    overlay
}

fn project(guide: GuideLine, viewport: &Viewport) -> Option<Line> {
    let zoom = f64::from(viewport.zoom);
    let width = f64::from(viewport.width);
    let height = f64::from(viewport.height);
    match guide {
        GuideLine::Vertical { x } => {
            let sx = f64::from(x) * zoom + f64::from(viewport.x);
            (0.0..=width)
                .contains(&sx)
                .then(|| Line::new(Point::new(sx, 0.0), Point::new(sx, height)))
        }
        GuideLine::Horizontal { y } => {
            let sy = f64::from(y) * zoom + f64::from(viewport.y);
            (0.0..=height)
                .contains(&sy)
                .then(|| Line::new(Point::new(0.0, sy), Point::new(width, sy)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mc_core::align::SnappedPosition;
    use pretty_assertions::assert_eq;

    fn result(v: Option<f32>, h: Option<f32>) -> GuideResult {
        GuideResult {
            vertical: v.map(|x| GuideLine::Vertical { x }),
            horizontal: h.map(|y| GuideLine::Horizontal { y }),
            snapped: SnappedPosition::default(),
        }
    }

    #[test]
    fn empty_result_draws_nothing() {
        let overlay = project_guides(&GuideResult::default(), &Viewport::default());
        assert!(overlay.is_empty());
        assert_eq!(overlay.lines().count(), 0);
    }

    #[test]
    fn vertical_guide_spans_viewport_height() {
        let vp = Viewport {
            x: 10.0,
            y: 0.0,
            zoom: 2.0,
            width: 800.0,
            height: 600.0,
        };
        let overlay = project_guides(&result(Some(100.0), None), &vp);
        let line = overlay.vertical.unwrap();
        assert_eq!(line.p0, Point::new(210.0, 0.0));
        assert_eq!(line.p1, Point::new(210.0, 600.0));
        assert!(overlay.horizontal.is_none());
    }

    #[test]
    fn horizontal_guide_uses_pan_offset() {
        let vp = Viewport {
            x: 0.0,
            y: -50.0,
            zoom: 1.0,
            width: 400.0,
            height: 300.0,
        };
        let overlay = project_guides(&result(None, Some(150.0)), &vp);
        let line = overlay.horizontal.unwrap();
        assert_eq!(line.p0, Point::new(0.0, 100.0));
        assert_eq!(line.p1, Point::new(400.0, 100.0));
    }

    #[test]
    fn offscreen_guides_are_culled() {
        let vp = Viewport::new(200.0, 200.0);
        let overlay = project_guides(&result(Some(-5.0), Some(900.0)), &vp);
        assert!(overlay.is_empty());
    }

    #[test]
    fn both_guides_paint_vertical_first() {
        let overlay = project_guides(&result(Some(40.0), Some(60.0)), &Viewport::new(100.0, 80.0));
        assert_eq!(
            overlay,
            GuideOverlay {
                vertical: Some(Line::new(Point::new(40.0, 0.0), Point::new(40.0, 80.0))),
                horizontal: Some(Line::new(Point::new(0.0, 60.0), Point::new(100.0, 60.0))),
            }
        );
        let order: Vec<Line> = overlay.lines().collect();
        assert_eq!(order[0], overlay.vertical.unwrap());
    }
}
