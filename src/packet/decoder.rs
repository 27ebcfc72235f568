//! # Packet Decoder
//!
//! Decodes telemetry packets returned by the vehicle and merges their
//! armed/estop bits into the control-side latches.

use bytes::Buf;
use tracing::debug;

use super::half_float::half_to_f32;
use super::protocol::*;
use crate::error::{RemoteError, Result};

/// Parse a payload into flags and channel values
///
/// # Arguments
///
/// * `packet` - Received payload bytes
///
/// # Returns
///
/// * `Result<TelemetryPacket>` - Decoded packet, or error if the length is wrong
///
/// # Errors
///
/// Returns [`RemoteError::MalformedPacket`] unless `packet` is exactly
/// [`PACKET_SIZE`] bytes long.
pub fn decode_packet(packet: &[u8]) -> Result<TelemetryPacket> {
    if packet.len() != PACKET_SIZE {
        return Err(RemoteError::MalformedPacket {
            expected: PACKET_SIZE,
            actual: packet.len(),
        });
    }

    let mut buf = packet;
    let flags = StatusFlags::from_bits_truncate(buf.get_u8());
    let throttle = half_to_f32(buf.get_u16());
    let pitch = half_to_f32(buf.get_u16());
    let roll = half_to_f32(buf.get_u16());
    let yaw = half_to_f32(buf.get_u16());

    Ok(TelemetryPacket {
        flags,
        throttle,
        pitch,
        roll,
        yaw,
    })
}

/// Decode a telemetry packet into state
///
/// Telemetry fields (channels, status flags and the raw `armed` / `estop`
/// bits) are overwritten. The control-side latches are merged instead:
/// see [`merge_estop_latch`] and [`merge_arm_latch`].
///
/// Nothing is modified when the packet is rejected.
///
/// # Arguments
///
/// * `packet` - Received payload bytes (must be 9 bytes)
/// * `telemetry` - Telemetry state to overwrite
/// * `arm_latch` - Control-side armed latch
/// * `estop_latch` - Control-side emergency stop latch
///
/// # Errors
///
/// Returns [`RemoteError::MalformedPacket`] if the length is wrong.
///
/// # Examples
///
/// ```
/// use airbit_remote::packet::decoder::decode_telemetry;
/// use airbit_remote::packet::protocol::TelemetryState;
///
/// let mut telemetry = TelemetryState::default();
/// let (mut armed, mut estop) = (false, false);
///
/// let packet = [0x06, 0x3C, 0x00, 0, 0, 0, 0, 0, 0];
/// decode_telemetry(&packet, &mut telemetry, &mut armed, &mut estop)?;
///
/// assert!(telemetry.crashed);
/// assert_eq!(telemetry.throttle, 1.0);
/// assert!(estop);
/// # Ok::<(), airbit_remote::error::RemoteError>(())
/// ```
pub fn decode_telemetry(
    packet: &[u8],
    telemetry: &mut TelemetryState,
    arm_latch: &mut bool,
    estop_latch: &mut bool,
) -> Result<()> {
    let decoded = decode_packet(packet)?;
    let flags = decoded.flags;

    telemetry.armed = decoded.armed();
    telemetry.estop = decoded.estop();
    telemetry.crashed = flags.contains(StatusFlags::CRASHED);
    telemetry.charging = flags.contains(StatusFlags::CHARGING);
    telemetry.charged = flags.contains(StatusFlags::CHARGED);
    telemetry.low_battery = flags.contains(StatusFlags::LOW_BATTERY);

    telemetry.throttle = decoded.throttle;
    telemetry.pitch = decoded.pitch;
    telemetry.roll = decoded.roll;
    telemetry.yaw = decoded.yaw;

    *arm_latch = merge_arm_latch(*arm_latch, decoded.armed());
    *estop_latch = merge_estop_latch(*estop_latch, decoded.estop());

    debug!(
        "Decoded telemetry: flags=0x{:02X} throttle={} pitch={} roll={} yaw={}",
        flags.bits(),
        decoded.throttle,
        decoded.pitch,
        decoded.roll,
        decoded.yaw
    );

    Ok(())
}

/// Merge a received estop bit into the estop latch
///
/// Once set, locally or by the vehicle, the latch stays set; decoding never
/// clears it.
pub fn merge_estop_latch(latched: bool, received: bool) -> bool {
    latched || received
}

/// Merge a received armed bit into the armed latch
///
/// The received bit has no effect: only local arm/disarm changes the latch,
/// so the vehicle cannot disarm the remote. The raw bit is still reported in
/// [`TelemetryState::armed`].
pub fn merge_arm_latch(latched: bool, _received: bool) -> bool {
    latched
}
