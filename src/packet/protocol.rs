//! # Link Protocol Constants and Types
//!
//! Core definitions shared by the control and telemetry directions.
//!
//! Both directions use the same 9-byte layout:
//!
//! ```text
//! byte 0:      bit0=armed  bit1=estop  bit2=crashed  bit3=charging
//!              bit4=charged  bit5=low_battery  bits6-7=reserved(0)
//! bytes 1-2:   throttle, half-float, big-endian
//! bytes 3-4:   pitch,    half-float, big-endian
//! bytes 5-6:   roll,     half-float, big-endian
//! bytes 7-8:   yaw,      half-float, big-endian
//! ```

use bitflags::bitflags;
use serde::Serialize;

/// Payload size in bytes (flags + 4 half-float channels)
pub const PACKET_SIZE: usize = 9;

/// Offset of the first channel value inside the payload
pub const CHANNELS_OFFSET: usize = 1;

/// Number of half-float channels carried per packet
pub const NUM_CHANNELS: usize = 4;

/// Fixed-size payload buffer
pub type Packet = [u8; PACKET_SIZE];

bitflags! {
    /// Flag byte (byte 0) of every packet.
    ///
    /// The control direction only ever sets `ARMED` and `ESTOP`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct StatusFlags: u8 {
        /// **Bit 0** - Motors armed.
        const ARMED       = 1 << 0;
        /// **Bit 1** - Emergency stop engaged.
        const ESTOP       = 1 << 1;
        /// **Bit 2** - Vehicle detected a crash.
        const CRASHED     = 1 << 2;
        /// **Bit 3** - Battery is charging.
        const CHARGING    = 1 << 3;
        /// **Bit 4** - Battery is fully charged.
        const CHARGED     = 1 << 4;
        /// **Bit 5** - Battery is low.
        const LOW_BATTERY = 1 << 5;
    }
}

/// Control snapshot sent from the remote to the vehicle
///
/// Channel domains are enforced by the remote's setters, not here:
/// throttle in [0, 100], pitch and roll in [-45, 45], yaw unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlState {
    /// Motors armed (latched on the control side)
    pub armed: bool,

    /// Emergency stop engaged (latched on the control side)
    pub estop: bool,

    /// Throttle percentage
    pub throttle: f32,

    /// Pitch angle in degrees
    pub pitch: f32,

    /// Roll angle in degrees
    pub roll: f32,

    /// Yaw command
    pub yaw: f32,
}

/// Telemetry as last reported by the vehicle
///
/// `armed` and `estop` here are the raw bits from the most recent packet.
/// They are independent of the latched values held in [`ControlState`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TelemetryState {
    pub pitch: f32,
    pub throttle: f32,
    pub roll: f32,
    pub yaw: f32,
    pub armed: bool,
    pub estop: bool,
    pub crashed: bool,
    pub charging: bool,
    pub charged: bool,
    pub low_battery: bool,

    /// Acceleration, filled by an acceleration source rather than the decoder
    pub acc_x: f32,
    pub acc_y: f32,
    pub acc_z: f32,
}

/// Contents of one decoded packet before it is merged into state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryPacket {
    /// Flag byte with reserved bits dropped
    pub flags: StatusFlags,

    pub throttle: f32,
    pub pitch: f32,
    pub roll: f32,
    pub yaw: f32,
}

impl TelemetryPacket {
    /// Raw `armed` bit as reported on the wire
    pub fn armed(&self) -> bool {
        self.flags.contains(StatusFlags::ARMED)
    }

    /// Raw `estop` bit as reported on the wire
    pub fn estop(&self) -> bool {
        self.flags.contains(StatusFlags::ESTOP)
    }
}
