//! Stick input setters for the live control snapshot.

use crate::packet::protocol::ControlState;

/// Throttle range in percent
pub const THROTTLE_MIN: f32 = 0.0;
pub const THROTTLE_MAX: f32 = 100.0;

/// Pitch and roll are limited to ±45 degrees
pub const TILT_LIMIT: f32 = 45.0;

impl ControlState {
    /// Zero all four channels; flags are left alone
    pub fn reset_channels(&mut self) {
        self.throttle = 0.0;
        self.pitch = 0.0;
        self.roll = 0.0;
        self.yaw = 0.0;
    }

    pub fn set_throttle(&mut self, amount: f32) {
        self.throttle = amount.clamp(THROTTLE_MIN, THROTTLE_MAX);
    }

    pub fn set_pitch(&mut self, amount: f32) {
        self.pitch = amount.clamp(-TILT_LIMIT, TILT_LIMIT);
    }

    pub fn set_roll(&mut self, amount: f32) {
        self.roll = amount.clamp(-TILT_LIMIT, TILT_LIMIT);
    }

    /// Yaw is not clamped
    pub fn set_yaw(&mut self, amount: f32) {
        self.yaw = amount;
    }

    pub fn change_throttle(&mut self, delta: f32) {
        self.set_throttle(self.throttle + delta);
    }

    pub fn change_pitch(&mut self, delta: f32) {
        self.set_pitch(self.pitch + delta);
    }

    pub fn change_roll(&mut self, delta: f32) {
        self.set_roll(self.roll + delta);
    }

    pub fn change_yaw(&mut self, delta: f32) {
        self.set_yaw(self.yaw + delta);
    }
}
