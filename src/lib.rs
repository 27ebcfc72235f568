//! # AirBit Remote Library
//!
//! Control and telemetry link for AirBit drones.
//!
//! This library provides the transmitter side of the link: stick inputs and
//! arm/disarm/emergency-stop latches are encoded into a 9-byte half-float
//! packet (or sent field by field in delta mode), and telemetry packets
//! returned by the drone are decoded back into readable state.

pub mod config;
pub mod error;
pub mod packet;
pub mod radio;
pub mod remote;
pub mod telemetry;
