//! # Telemetry Module
//!
//! Read-out of telemetry received from the vehicle.
//!
//! This module handles:
//! - Typed access to each telemetry field by name
//! - Filling acceleration from a sampling source
//! - Logging telemetry to rotating JSONL files

pub mod logger;

use crate::packet::protocol::TelemetryState;

pub use logger::TelemetryLogger;

/// Every readable telemetry field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TelemetryField {
    Pitch,
    Armed,
    Throttle,
    Roll,
    Yaw,
    AccX,
    AccY,
    AccZ,
    Estop,
    Crashed,
    Charging,
    Charged,
    LowBattery,
}

impl TelemetryField {
    pub const ALL: [TelemetryField; 13] = [
        TelemetryField::Pitch,
        TelemetryField::Armed,
        TelemetryField::Throttle,
        TelemetryField::Roll,
        TelemetryField::Yaw,
        TelemetryField::AccX,
        TelemetryField::AccY,
        TelemetryField::AccZ,
        TelemetryField::Estop,
        TelemetryField::Crashed,
        TelemetryField::Charging,
        TelemetryField::Charged,
        TelemetryField::LowBattery,
    ];
}

/// Value of one telemetry field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TelemetryReading {
    Channel(f32),
    Flag(bool),
}

impl TelemetryReading {
    /// Numeric view; flags read as `0.0` / `1.0`
    pub fn as_f32(self) -> f32 {
        match self {
            TelemetryReading::Channel(value) => value,
            TelemetryReading::Flag(flag) => {
                if flag {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

/// Accelerometer axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Source of acceleration samples (e.g. an on-board accelerometer)
pub trait AccelerationSource {
    fn sample(&mut self, axis: Axis) -> f32;
}

impl TelemetryState {
    /// Read one field
    pub fn read(&self, field: TelemetryField) -> TelemetryReading {
        use TelemetryReading::{Channel, Flag};

        match field {
            TelemetryField::Pitch => Channel(self.pitch),
            TelemetryField::Armed => Flag(self.armed),
            TelemetryField::Throttle => Channel(self.throttle),
            TelemetryField::Roll => Channel(self.roll),
            TelemetryField::Yaw => Channel(self.yaw),
            TelemetryField::AccX => Channel(self.acc_x),
            TelemetryField::AccY => Channel(self.acc_y),
            TelemetryField::AccZ => Channel(self.acc_z),
            TelemetryField::Estop => Flag(self.estop),
            TelemetryField::Crashed => Flag(self.crashed),
            TelemetryField::Charging => Flag(self.charging),
            TelemetryField::Charged => Flag(self.charged),
            TelemetryField::LowBattery => Flag(self.low_battery),
        }
    }

    /// Overwrite `acc_x`, `acc_y` and `acc_z` with fresh samples
    pub fn sample_acceleration<S: AccelerationSource + ?Sized>(&mut self, source: &mut S) {
        self.acc_x = source.sample(Axis::X);
        self.acc_y = source.sample(Axis::Y);
        self.acc_z = source.sample(Axis::Z);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counting {
        calls: Vec<Axis>,
    }

    impl AccelerationSource for Counting {
        fn sample(&mut self, axis: Axis) -> f32 {
            self.calls.push(axis);
            self.calls.len() as f32
        }
    }

    #[test]
    fn test_read_channels_and_flags() {
        let state = TelemetryState {
            pitch: 1.0,
            throttle: 2.0,
            roll: 3.0,
            yaw: 4.0,
            crashed: true,
            charged: true,
            ..Default::default()
        };

        assert_eq!(state.read(TelemetryField::Pitch), TelemetryReading::Channel(1.0));
        assert_eq!(state.read(TelemetryField::Throttle), TelemetryReading::Channel(2.0));
        assert_eq!(state.read(TelemetryField::Roll), TelemetryReading::Channel(3.0));
        assert_eq!(state.read(TelemetryField::Yaw), TelemetryReading::Channel(4.0));
        assert_eq!(state.read(TelemetryField::Crashed), TelemetryReading::Flag(true));
        assert_eq!(state.read(TelemetryField::Charged), TelemetryReading::Flag(true));
        assert_eq!(state.read(TelemetryField::Charging), TelemetryReading::Flag(false));
        assert_eq!(state.read(TelemetryField::Armed), TelemetryReading::Flag(false));
    }

    #[test]
    fn test_every_field_is_readable() {
        let state = TelemetryState::default();
        for field in TelemetryField::ALL {
            assert_eq!(state.read(field).as_f32(), 0.0, "{:?}", field);
        }
    }

    #[test]
    fn test_reading_as_f32() {
        assert_eq!(TelemetryReading::Channel(-2.5).as_f32(), -2.5);
        assert_eq!(TelemetryReading::Flag(true).as_f32(), 1.0);
        assert_eq!(TelemetryReading::Flag(false).as_f32(), 0.0);
    }

    #[test]
    fn test_sample_acceleration_order() {
        let mut source = Counting { calls: Vec::new() };
        let mut state = TelemetryState::default();

        state.sample_acceleration(&mut source);

        assert_eq!(source.calls, vec![Axis::X, Axis::Y, Axis::Z]);
        assert_eq!(state.acc_x, 1.0);
        assert_eq!(state.acc_y, 2.0);
        assert_eq!(state.acc_z, 3.0);
    }
}
