use glam::Vec2;

const PITCH_LIMIT: f32 = 85.0;
const DRAG_SENSITIVITY: f32 = 0.4;
const WHEEL_STEP: f32 = 0.05;
const BUTTON_STEP: f32 = 0.1;
const ZOOM_MIN: f32 = 0.7;
const ZOOM_MAX: f32 = 1.6;

/// Camera/model state shared between input handling and the render loop.
/// Input handling is the only writer; the render loop only reads.
pub struct ViewState {
    /// Degrees. `x` is pitch, clamped to [-85, 85]; `y` is yaw, wrapping
    /// modulo 360.
    pub rotation: Vec2,
    /// Clamped to [0.7, 1.6].
    pub zoom: f32,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            rotation: Vec2::new(-15.0, 30.0),
            zoom: 1.0,
        }
    }
}

impl ViewState {
    /// Apply a pointer drag delta in pixels. Vertical drag is pitch,
    /// horizontal is yaw.
    pub fn apply_drag(&mut self, delta: Vec2) {
        self.rotation.x =
            (self.rotation.x + delta.y * DRAG_SENSITIVITY).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.rotation.y = (self.rotation.y + delta.x * DRAG_SENSITIVITY).rem_euclid(360.0);
    }

    /// One wheel notch: zoom in when scrolling up, out when scrolling down.
    pub fn apply_wheel(&mut self, scroll_up: bool) {
        let step = if scroll_up { WHEEL_STEP } else { -WHEEL_STEP };
        self.zoom = (self.zoom + step).clamp(ZOOM_MIN, ZOOM_MAX);
    }

    /// Zoom entry point for the overlay button.
    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + BUTTON_STEP).clamp(ZOOM_MIN, ZOOM_MAX);
    }

    /// Zoom entry point for the overlay button.
    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom - BUTTON_STEP).clamp(ZOOM_MIN, ZOOM_MAX);
    }
}

/// Pointer drag state: Idle until pointer-down, back to Idle on pointer-up.
/// Moves with no active drag change nothing.
#[derive(Default)]
pub struct PointerController {
    dragging: bool,
    last_pointer: Vec2,
}

impl PointerController {
    pub fn pointer_down(&mut self, at: Vec2) {
        self.dragging = true;
        self.last_pointer = at;
    }

    pub fn pointer_up(&mut self) {
        self.dragging = false;
    }

    pub fn pointer_move(&mut self, to: Vec2, view: &mut ViewState) {
        if !self.dragging {
            return;
        }
        let delta = to - self.last_pointer;
        self.last_pointer = to;
        view.apply_drag(delta);
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_clamps_at_limit() {
        let mut view = ViewState::default();
        view.rotation.x = 80.0;
        // A +20 degree pitch delta pins at the boundary instead of overshooting.
        view.apply_drag(Vec2::new(0.0, 50.0));
        assert_eq!(view.rotation.x, 85.0);

        view.rotation.x = -80.0;
        view.apply_drag(Vec2::new(0.0, -50.0));
        assert_eq!(view.rotation.x, -85.0);
    }

    #[test]
    fn yaw_wraps_modulo_360() {
        let mut view = ViewState::default();
        view.rotation.y = 350.0;
        view.apply_drag(Vec2::new(50.0, 0.0));
        assert!((view.rotation.y - 10.0).abs() < 1e-4);

        view.rotation.y = 5.0;
        view.apply_drag(Vec2::new(-50.0, 0.0));
        assert!((view.rotation.y - 345.0).abs() < 1e-4);
        assert!(view.rotation.y >= 0.0 && view.rotation.y < 360.0);
    }

    #[test]
    fn zoom_clamps_on_button_and_wheel() {
        let mut view = ViewState::default();
        view.zoom = 1.55;
        view.zoom_in();
        assert_eq!(view.zoom, 1.6);

        view.zoom = 0.72;
        view.apply_wheel(false);
        assert_eq!(view.zoom, 0.7);

        view.zoom = 1.0;
        view.apply_wheel(true);
        assert!((view.zoom - 1.05).abs() < 1e-6);
        view.zoom_out();
        assert!((view.zoom - 0.95).abs() < 1e-6);
    }

    #[test]
    fn drag_sequence_updates_rotation_then_idles() {
        let mut view = ViewState::default();
        let mut pointer = PointerController::default();

        pointer.pointer_down(Vec2::new(100.0, 100.0));
        assert!(pointer.is_dragging());
        pointer.pointer_move(Vec2::new(110.0, 106.0), &mut view);
        assert!((view.rotation.y - 34.0).abs() < 1e-4);
        assert!((view.rotation.x - (-12.6)).abs() < 1e-4);
        pointer.pointer_up();
        assert!(!pointer.is_dragging());

        // A move with no prior pointer-down changes nothing.
        let before = (view.rotation, view.zoom);
        pointer.pointer_move(Vec2::new(400.0, 400.0), &mut view);
        assert_eq!(before, (view.rotation, view.zoom));
    }
}
