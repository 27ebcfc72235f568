//! # Link Packet Module
//!
//! The 9-byte control/telemetry payload exchanged with the vehicle.
//!
//! This module handles:
//! - Half-float conversion of channel values
//! - Control packet encoding (armed/estop flags + 4 channels)
//! - Telemetry packet decoding and latch merging
//! - Payload length validation

pub mod protocol;
pub mod half_float;
pub mod encoder;
pub mod decoder;
