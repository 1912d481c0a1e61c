use crate::config::ViewConfig;
use serde::{Deserialize, Serialize};

/// Uniform scale + translate applied to the whole scene. Maps layout space
/// to screen space as `screen = layout * scale + translate`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub translate_x: f32,
    pub translate_y: f32,
    pub scale: f32,
}

impl ViewTransform {
    pub const IDENTITY: Self = Self {
        translate_x: 0.0,
        translate_y: 0.0,
        scale: 1.0,
    };

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.scale + self.translate_x,
            y * self.scale + self.translate_y,
        )
    }

    pub fn invert(&self, x: f32, y: f32) -> (f32, f32) {
        (
            (x - self.translate_x) / self.scale,
            (y - self.translate_y) / self.scale,
        )
    }

    pub fn to_svg_attr(&self) -> String {
        format!(
            "translate({:.2},{:.2}) scale({})",
            self.translate_x, self.translate_y, self.scale
        )
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    Idle,
    Dragging { last_x: f32, last_y: f32 },
}

/// Pan/zoom state for one rendering session.
#[derive(Debug, Clone)]
pub struct PanZoomController {
    transform: ViewTransform,
    viewport: Viewport,
    state: GestureState,
    config: ViewConfig,
}

impl PanZoomController {
    pub fn new(viewport: Viewport, config: ViewConfig) -> Self {
        let mut controller = Self {
            transform: ViewTransform::IDENTITY,
            viewport,
            state: GestureState::Idle,
            config,
        };
        controller.reset();
        controller
    }

    /// Center the layout origin in the viewport at the initial zoom-out.
    pub fn reset(&mut self) {
        let (cx, cy) = self.viewport.center();
        self.transform = ViewTransform {
            translate_x: cx,
            translate_y: cy,
            scale: self.clamp_scale(self.config.initial_scale),
        };
        self.state = GestureState::Idle;
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, GestureState::Dragging { .. })
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.state = GestureState::Dragging {
            last_x: x,
            last_y: y,
        };
    }

    /// Pans while dragging. Returns whether the transform changed.
    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        let GestureState::Dragging { last_x, last_y } = self.state else {
            return false;
        };
        self.state = GestureState::Dragging {
            last_x: x,
            last_y: y,
        };
        self.pan_by(x - last_x, y - last_y)
    }

    pub fn pointer_up(&mut self) {
        self.state = GestureState::Idle;
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) -> bool {
        if !dx.is_finite() || !dy.is_finite() || (dx == 0.0 && dy == 0.0) {
            return false;
        }
        self.transform.translate_x += dx;
        self.transform.translate_y += dy;
        true
    }

    /// Wheel tick in pixel units; positive `delta_y` zooms out.
    pub fn wheel(&mut self, delta_y: f32, x: f32, y: f32) -> bool {
        let factor = 2f32.powf(-delta_y * self.config.wheel_sensitivity);
        self.zoom_by(factor, x, y)
    }

    /// Pinch gesture reporting the scale change since the previous event.
    pub fn pinch(&mut self, factor: f32, x: f32, y: f32) -> bool {
        self.zoom_by(factor, x, y)
    }

    pub fn zoom_by(&mut self, factor: f32, x: f32, y: f32) -> bool {
        if factor.is_nan() {
            return false;
        }
        self.zoom_to(self.transform.scale * factor, x, y)
    }

    /// Zoom to `scale` (clamped) keeping the layout point under `(x, y)` fixed.
    pub fn zoom_to(&mut self, scale: f32, x: f32, y: f32) -> bool {
        if scale.is_nan() || !x.is_finite() || !y.is_finite() {
            return false;
        }
        let next = self.clamp_scale(scale);
        if next == self.transform.scale {
            return false;
        }
        let (lx, ly) = self.transform.invert(x, y);
        self.transform = ViewTransform {
            translate_x: x - lx * next,
            translate_y: y - ly * next,
            scale: next,
        };
        true
    }

    /// New renderable area. The current pan/zoom is kept as is.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn clamp_scale(&self, scale: f32) -> f32 {
        scale.clamp(self.config.min_scale, self.config.max_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> PanZoomController {
        PanZoomController::new(Viewport::new(800.0, 600.0), ViewConfig::default())
    }

    #[test]
    fn starts_centered_and_zoomed_out() {
        let view = controller();
        assert_eq!(
            view.transform(),
            ViewTransform {
                translate_x: 400.0,
                translate_y: 300.0,
                scale: 0.8
            }
        );
        assert_eq!(view.state(), GestureState::Idle);
    }

    #[test]
    fn drag_pans_only_while_pointer_held() {
        let mut view = controller();
        assert!(!view.pointer_move(10.0, 10.0));
        view.pointer_down(100.0, 100.0);
        assert!(view.is_dragging());
        assert!(view.pointer_move(130.0, 90.0));
        assert!(view.pointer_move(140.0, 95.0));
        view.pointer_up();
        assert_eq!(view.state(), GestureState::Idle);
        assert!(!view.pointer_move(500.0, 500.0));
        let t = view.transform();
        assert_eq!((t.translate_x, t.translate_y), (440.0, 295.0));
        assert_eq!(t.scale, 0.8);
    }

    #[test]
    fn zoom_is_clamped_not_rejected() {
        let mut view = controller();
        assert!(view.zoom_by(100.0, 400.0, 300.0));
        assert_eq!(view.transform().scale, 4.0);
        assert!(!view.zoom_by(2.0, 400.0, 300.0));
        assert!(view.zoom_by(1e-6, 400.0, 300.0));
        assert_eq!(view.transform().scale, 0.1);
        // A huge wheel delta overflows the factor to infinity; still clamps.
        assert!(view.wheel(-1e9, 0.0, 0.0));
        assert_eq!(view.transform().scale, 4.0);
        assert!(!view.zoom_by(f32::NAN, 0.0, 0.0));
    }

    #[test]
    fn zoom_keeps_point_under_pointer() {
        let mut view = controller();
        let before = view.transform().invert(250.0, 120.0);
        view.wheel(-120.0, 250.0, 120.0);
        let after = view.transform().invert(250.0, 120.0);
        assert!((before.0 - after.0).abs() < 1e-3);
        assert!((before.1 - after.1).abs() < 1e-3);
        assert!(view.transform().scale > 0.8);
    }

    #[test]
    fn wheel_zoom_applies_while_dragging() {
        let mut view = controller();
        view.pointer_down(10.0, 10.0);
        assert!(view.pinch(1.5, 400.0, 300.0));
        assert!(view.is_dragging());
        assert!((view.transform().scale - 1.2).abs() < 1e-6);
    }

    #[test]
    fn resize_keeps_transform() {
        let mut view = controller();
        view.pan_by(25.0, -40.0);
        let before = view.transform();
        view.resize(Viewport::new(1920.0, 1080.0));
        assert_eq!(view.transform(), before);
        assert_eq!(view.viewport(), Viewport::new(1920.0, 1080.0));
    }

    #[test]
    fn transform_round_trips_points() {
        let t = ViewTransform {
            translate_x: 12.0,
            translate_y: -7.0,
            scale: 2.0,
        };
        assert_eq!(t.apply(3.0, 4.0), (18.0, 1.0));
        assert_eq!(t.invert(18.0, 1.0), (3.0, 4.0));
        assert_eq!(t.to_svg_attr(), "translate(12.00,-7.00) scale(2)");
    }
}
