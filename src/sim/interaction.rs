//! Drag-to-rotate with clamped targets and exponential easing.

use bevy_math::Vec2;

use crate::core::InteractionConfig;

/// Smoothed scene rotation.
///
/// `x` follows horizontal drag and is applied as yaw, `y` follows vertical
/// drag and is applied as tilt. Only the targets are written by input; the
/// actual values approach them in [`RotationState::ease`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub target_x: f32,
    pub target_y: f32,
}

impl RotationState {
    /// Move a `smoothing` fraction of the remaining distance toward the target.
    pub fn ease(&mut self, smoothing: f32) {
        self.x += (self.target_x - self.x) * smoothing;
        self.y += (self.target_y - self.y) * smoothing;
    }

    pub fn distance_to_target(&self) -> f32 {
        Vec2::new(self.target_x - self.x, self.target_y - self.y).length()
    }
}

/// Pointer/touch drag tracker feeding a [`RotationState`].
#[derive(Clone, Debug)]
pub struct DragController {
    config: InteractionConfig,
    dragging: bool,
    /// Last absolute touch point; touch reports positions, not deltas
    last_touch: Option<Vec2>,
}

impl DragController {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            dragging: false,
            last_touch: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn drag_start(&mut self) {
        self.dragging = true;
    }

    /// Accumulate a pointer delta (pixels). Ignored unless a drag is active.
    pub fn drag_move(&mut self, dx: f32, dy: f32, rotation: &mut RotationState) {
        if !self.dragging {
            return;
        }
        let k = self.config.sensitivity;
        let limit = self.config.limit;
        rotation.target_x = (rotation.target_x + dx * k).clamp(-limit, limit);
        rotation.target_y = (rotation.target_y + dy * k).clamp(-limit, limit);
    }

    pub fn drag_end(&mut self) {
        self.dragging = false;
        self.last_touch = None;
    }

    pub fn touch_start(&mut self, at: Vec2) {
        self.dragging = true;
        self.last_touch = Some(at);
    }

    /// Turn an absolute touch position into a drag delta against the previous one.
    pub fn touch_move(&mut self, at: Vec2, rotation: &mut RotationState) {
        let Some(previous) = self.last_touch else {
            return;
        };
        let delta = at - previous;
        self.last_touch = Some(at);
        self.drag_move(delta.x, delta.y, rotation);
    }

    pub fn touch_end(&mut self) {
        self.drag_end();
    }

    /// Zero the targets; the actual rotation eases back on later frames.
    pub fn reset(&self, rotation: &mut RotationState) {
        rotation.target_x = 0.0;
        rotation.target_y = 0.0;
    }

    pub fn ease(&self, rotation: &mut RotationState) {
        rotation.ease(self.config.smoothing);
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_outside_a_drag_are_ignored() {
        let mut drag = DragController::new(InteractionConfig::default());
        let mut rot = RotationState::default();
        drag.drag_move(100.0, 100.0, &mut rot);
        assert_eq!(rot, RotationState::default());

        drag.drag_start();
        drag.drag_move(10.0, -5.0, &mut rot);
        assert!((rot.target_x - 0.04).abs() < 1e-6);
        assert!((rot.target_y + 0.02).abs() < 1e-6);

        drag.drag_end();
        drag.drag_move(10.0, 10.0, &mut rot);
        assert!((rot.target_x - 0.04).abs() < 1e-6);
    }

    #[test]
    fn touch_and_pointer_agree() {
        let config = InteractionConfig::default();
        let mut pointer = DragController::new(config);
        let mut touch = DragController::new(config);
        let mut a = RotationState::default();
        let mut b = RotationState::default();

        pointer.drag_start();
        touch.touch_start(Vec2::new(200.0, 200.0));
        let path = [Vec2::new(210.0, 195.0), Vec2::new(230.0, 190.0), Vec2::new(228.0, 201.0)];
        let mut prev = Vec2::new(200.0, 200.0);
        for p in path {
            pointer.drag_move(p.x - prev.x, p.y - prev.y, &mut a);
            touch.touch_move(p, &mut b);
            prev = p;
        }
        assert!((a.target_x - b.target_x).abs() < 1e-6);
        assert!((a.target_y - b.target_y).abs() < 1e-6);
    }

    #[test]
    fn touch_move_without_start_is_ignored() {
        let mut drag = DragController::new(InteractionConfig::default());
        let mut rot = RotationState::default();
        drag.touch_move(Vec2::new(50.0, 50.0), &mut rot);
        assert_eq!(rot.target_x, 0.0);
        assert!(!drag.is_dragging());
    }

    #[test]
    fn reset_eases_instead_of_snapping() {
        let mut drag = DragController::new(InteractionConfig::default());
        let mut rot = RotationState {
            x: 0.5,
            y: -0.5,
            target_x: 0.5,
            target_y: -0.5,
        };
        drag.reset(&mut rot);
        assert_eq!((rot.x, rot.y), (0.5, -0.5));
        drag.ease(&mut rot);
        assert!(rot.x > 0.0 && rot.x < 0.5);
        assert!(rot.y < 0.0 && rot.y > -0.5);
    }
}
