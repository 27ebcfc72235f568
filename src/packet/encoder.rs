//! # Packet Encoder
//!
//! Encodes control snapshots (and, for the vehicle side, telemetry) into the
//! fixed 9-byte payload.

use bytes::BufMut;

use super::half_float::f32_to_half;
use super::protocol::*;

/// Encode a control snapshot into a fresh packet
///
/// # Arguments
///
/// * `state` - Control snapshot to encode
///
/// # Returns
///
/// * `Packet` - 9-byte payload: flags + throttle, pitch, roll, yaw
///
/// # Examples
///
/// ```
/// use airbit_remote::packet::encoder::encode_control_packet;
/// use airbit_remote::packet::protocol::ControlState;
///
/// let state = ControlState { armed: true, throttle: 100.0, ..Default::default() };
/// let packet = encode_control_packet(&state);
/// assert_eq!(packet[0], 0x01);
/// assert_eq!(&packet[1..3], &[0x56, 0x40]);
/// ```
pub fn encode_control_packet(state: &ControlState) -> Packet {
    let mut packet = [0u8; PACKET_SIZE];
    encode_control_into(state, &mut packet);
    packet
}

/// Encode a control snapshot into an existing packet buffer
///
/// Every byte of `packet` is overwritten. Channel values are not range
/// checked; they only lose precision to half-float granularity.
pub fn encode_control_into(state: &ControlState, packet: &mut Packet) {
    let mut flags = StatusFlags::empty();
    flags.set(StatusFlags::ARMED, state.armed);
    flags.set(StatusFlags::ESTOP, state.estop);

    write_payload(
        packet,
        flags,
        [state.throttle, state.pitch, state.roll, state.yaw],
    );
}

/// Encode vehicle telemetry into a packet
///
/// This is the vehicle-side mirror of
/// [`decode_telemetry`](super::decoder::decode_telemetry); acceleration is
/// not part of the payload.
pub fn encode_telemetry_packet(state: &TelemetryState) -> Packet {
    let mut flags = StatusFlags::empty();
    flags.set(StatusFlags::ARMED, state.armed);
    flags.set(StatusFlags::ESTOP, state.estop);
    flags.set(StatusFlags::CRASHED, state.crashed);
    flags.set(StatusFlags::CHARGING, state.charging);
    flags.set(StatusFlags::CHARGED, state.charged);
    flags.set(StatusFlags::LOW_BATTERY, state.low_battery);

    let mut packet = [0u8; PACKET_SIZE];
    write_payload(
        &mut packet,
        flags,
        [state.throttle, state.pitch, state.roll, state.yaw],
    );
    packet
}

fn write_payload(packet: &mut Packet, flags: StatusFlags, channels: [f32; NUM_CHANNELS]) {
    let mut buf = &mut packet[..];
    buf.put_u8(flags.bits());
    for value in channels {
        buf.put_u16(f32_to_half(value));
    }
}
