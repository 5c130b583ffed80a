//! Swing intent component.
//!
//! The intent is the controller's only view of player input. Your code maps
//! devices to it (keyboard, gamepad, AI, network replay); the controller
//! systems read it every fixed tick.

use bevy::prelude::*;

/// Largest pitch magnitude the control rotation allows (just under 90°).
const MAX_PITCH: f32 = 89.0 * std::f32::consts::PI / 180.0;

/// Input state for a swinging character.
///
/// # Example
///
/// ```rust
/// use web_swing_controller::prelude::*;
///
/// let mut intent = SwingIntent::new();
/// intent.set_swing_pressed(true);
/// intent.set_move_forward(1.0);
/// assert!(intent.is_swing_pressed());
/// assert!(intent.has_move_input());
///
/// intent.clear_movement();
/// assert!(!intent.has_move_input());
/// ```
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
pub struct SwingIntent {
    /// Forward/backward axis (-1.0 = back, 1.0 = forward).
    pub move_forward: f32,
    /// Side axis (-1.0 = left, 1.0 = right).
    pub move_right: f32,
    /// Control yaw in radians (0 faces -Z).
    pub control_yaw: f32,
    /// Control pitch in radians (positive looks up).
    pub control_pitch: f32,
    /// Whether the swing action is held.
    pub swing_pressed: bool,
    /// Whether the jump action is held.
    ///
    /// The controller detects press and release edges itself: pressing
    /// starts a charge, releasing fires the jump.
    pub jump_pressed: bool,
    /// Whether the run action is held.
    pub run_pressed: bool,
    /// Origin for dash traces (e.g. the camera). Uses the actor position when `None`.
    pub aim_origin: Option<Vec3>,
    /// Pending dash request, consumed by the controller.
    pub(crate) dash_requested: bool,
    /// Previous tick's jump state (for edge detection).
    pub(crate) jump_pressed_prev: bool,
}

impl Default for SwingIntent {
    fn default() -> Self {
        Self {
            move_forward: 0.0,
            move_right: 0.0,
            control_yaw: 0.0,
            control_pitch: 0.0,
            swing_pressed: false,
            jump_pressed: false,
            run_pressed: false,
            aim_origin: None,
            dash_requested: false,
            jump_pressed_prev: false,
        }
    }
}

impl SwingIntent {
    /// Create a new empty intent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the forward axis, clamped to [-1, 1].
    pub fn set_move_forward(&mut self, value: f32) {
        self.move_forward = value.clamp(-1.0, 1.0);
    }

    /// Set the side axis, clamped to [-1, 1].
    pub fn set_move_right(&mut self, value: f32) {
        self.move_right = value.clamp(-1.0, 1.0);
    }

    /// Clear both movement axes.
    pub fn clear_movement(&mut self) {
        self.move_forward = 0.0;
        self.move_right = 0.0;
    }

    /// Whether either movement axis is non-zero.
    pub fn has_move_input(&self) -> bool {
        self.move_forward != 0.0 || self.move_right != 0.0
    }

    /// Add yaw (radians).
    pub fn add_yaw(&mut self, delta: f32) {
        self.control_yaw = (self.control_yaw + delta).rem_euclid(std::f32::consts::TAU);
    }

    /// Add pitch (radians), clamped short of straight up or down.
    pub fn add_pitch(&mut self, delta: f32) {
        self.control_pitch = (self.control_pitch + delta).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Turn at a normalized rate (1.0 = `base_rate` radians per second).
    pub fn turn_at_rate(&mut self, rate: f32, base_rate: f32, dt: f32) {
        self.add_yaw(rate * base_rate * dt);
    }

    /// Look up/down at a normalized rate (1.0 = `base_rate` radians per second).
    pub fn look_up_at_rate(&mut self, rate: f32, base_rate: f32, dt: f32) {
        self.add_pitch(rate * base_rate * dt);
    }

    /// Full control rotation (yaw then pitch).
    pub fn control_rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.control_yaw, self.control_pitch, 0.0)
    }

    /// Aim direction of the control rotation.
    pub fn aim_direction(&self) -> Vec3 {
        self.control_rotation() * Vec3::NEG_Z
    }

    /// Set the swing state.
    pub fn set_swing_pressed(&mut self, pressed: bool) {
        self.swing_pressed = pressed;
    }

    /// Check if swing is held.
    pub fn is_swing_pressed(&self) -> bool {
        self.swing_pressed
    }

    /// Set the jump state. Call this every tick with the current button state.
    pub fn set_jump_pressed(&mut self, pressed: bool) {
        self.jump_pressed = pressed;
    }

    /// Check if jump is held.
    pub fn is_jump_pressed(&self) -> bool {
        self.jump_pressed
    }

    /// Set the run state.
    pub fn set_run_pressed(&mut self, pressed: bool) {
        self.run_pressed = pressed;
    }

    /// Request a web dash on the next tick.
    pub fn request_dash(&mut self) {
        self.dash_requested = true;
    }

    /// Whether a dash is pending.
    pub fn has_dash_request(&self) -> bool {
        self.dash_requested
    }

    /// Take and consume the pending dash request.
    pub fn take_dash_request(&mut self) -> bool {
        std::mem::take(&mut self.dash_requested)
    }

    /// Consume this tick's jump edges as `(pressed, released)`.
    pub(crate) fn take_jump_edges(&mut self) -> (bool, bool) {
        let pressed = self.jump_pressed && !self.jump_pressed_prev;
        let released = !self.jump_pressed && self.jump_pressed_prev;
        self.jump_pressed_prev = self.jump_pressed;
        (pressed, released)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_new() {
        let intent = SwingIntent::new();
        assert_eq!(intent.move_forward, 0.0);
        assert_eq!(intent.move_right, 0.0);
        assert!(!intent.is_swing_pressed());
        assert!(!intent.is_jump_pressed());
        assert!(!intent.has_dash_request());
    }

    #[test]
    fn move_axes_are_clamped() {
        let mut intent = SwingIntent::new();
        intent.set_move_forward(5.0);
        intent.set_move_right(-5.0);
        assert_eq!(intent.move_forward, 1.0);
        assert_eq!(intent.move_right, -1.0);
        assert!(intent.has_move_input());
    }

    #[test]
    fn pitch_is_clamped() {
        let mut intent = SwingIntent::new();
        intent.add_pitch(10.0);
        assert_eq!(intent.control_pitch, MAX_PITCH);
        intent.look_up_at_rate(-1.0, 100.0, 1.0);
        assert_eq!(intent.control_pitch, -MAX_PITCH);
    }

    #[test]
    fn yaw_wraps() {
        let mut intent = SwingIntent::new();
        intent.turn_at_rate(1.0, std::f32::consts::PI, 3.0);
        assert!((intent.control_yaw - std::f32::consts::PI).abs() < 1e-4);
    }

    #[test]
    fn zero_rotation_aims_forward() {
        let intent = SwingIntent::new();
        assert!(intent.aim_direction().distance(Vec3::NEG_Z) < 1e-6);
    }

    #[test]
    fn positive_pitch_aims_up() {
        let mut intent = SwingIntent::new();
        intent.add_pitch(0.5);
        assert!(intent.aim_direction().y > 0.0);
    }

    #[test]
    fn jump_edges() {
        let mut intent = SwingIntent::new();
        assert_eq!(intent.take_jump_edges(), (false, false));

        intent.set_jump_pressed(true);
        assert_eq!(intent.take_jump_edges(), (true, false));
        assert_eq!(intent.take_jump_edges(), (false, false));

        intent.set_jump_pressed(false);
        assert_eq!(intent.take_jump_edges(), (false, true));
        assert_eq!(intent.take_jump_edges(), (false, false));
    }

    #[test]
    fn dash_request_is_consumed_once() {
        let mut intent = SwingIntent::new();
        intent.request_dash();
        assert!(intent.has_dash_request());
        assert!(intent.take_dash_request());
        assert!(!intent.take_dash_request());
    }
}
