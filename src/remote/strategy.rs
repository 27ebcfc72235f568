//! # Link Strategies
//!
//! The mutually exclusive ways of putting control state on the air:
//!
//! - [`PackedStrategy`]: the full 9-byte packet on every send
//! - [`ValuesStrategy`]: every channel as a tagged value on every send, plus
//!   one-shot command strings
//! - [`Synchronizer`]: changed fields only, as tagged values, plus one-shot
//!   command strings
//!
//! Exactly one strategy is active per [`Remote`](super::Remote).

use tracing::debug;

use super::sync::{Command, FieldAction, PendingCommands, Synchronizer};
use crate::config::TransportMode;
use crate::packet::encoder::encode_control_into;
use crate::packet::protocol::{ControlState, Packet, PACKET_SIZE};

/// One call to make on the radio transport
#[derive(Debug, Clone, PartialEq)]
pub enum Transmission {
    Buffer(Packet),
    Value(char, f32),
    Text(&'static str),
}

impl From<FieldAction> for Transmission {
    fn from(action: FieldAction) -> Self {
        match action {
            FieldAction::Command(command) => Transmission::Text(command.tag()),
            FieldAction::Throttle(v) => Transmission::Value('t', v),
            FieldAction::Pitch(v) => Transmission::Value('p', v),
            FieldAction::Roll(v) => Transmission::Value('r', v),
            FieldAction::Yaw(v) => Transmission::Value('y', v),
        }
    }
}

/// Decides what to transmit for a control snapshot
pub trait LinkStrategy: Send {
    /// Mode this strategy implements
    fn mode(&self) -> TransportMode;

    /// Queue a one-shot command
    fn request(&mut self, command: Command);

    /// Transmissions for the current snapshot, in send order
    fn transmissions(&mut self, controls: &ControlState) -> Vec<Transmission>;
}

/// Build the strategy for a configured mode
pub fn strategy_for(mode: TransportMode) -> Box<dyn LinkStrategy> {
    match mode {
        TransportMode::Packed => Box::new(PackedStrategy::new()),
        TransportMode::Values => Box::new(ValuesStrategy::new()),
        TransportMode::Delta => Box::new(Synchronizer::new()),
    }
}

/// Sends the whole packet unconditionally
///
/// Owns one packet buffer, overwritten on every send.
#[derive(Debug)]
pub struct PackedStrategy {
    buffer: Packet,
}

impl PackedStrategy {
    pub fn new() -> Self {
        Self {
            buffer: [0u8; PACKET_SIZE],
        }
    }
}

impl Default for PackedStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkStrategy for PackedStrategy {
    fn mode(&self) -> TransportMode {
        TransportMode::Packed
    }

    fn request(&mut self, command: Command) {
        // Armed/estop travel in the flag byte of every packet
        debug!("Packed mode: {:?} carried by the next packet", command);
    }

    fn transmissions(&mut self, controls: &ControlState) -> Vec<Transmission> {
        encode_control_into(controls, &mut self.buffer);
        vec![Transmission::Buffer(self.buffer)]
    }
}

/// Resends every channel value on each call
///
/// A lost value is corrected by the next send. Channels are withheld while
/// the estop latch is set; commands still go out.
#[derive(Debug, Default)]
pub struct ValuesStrategy {
    pending: PendingCommands,
}

impl ValuesStrategy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LinkStrategy for ValuesStrategy {
    fn mode(&self) -> TransportMode {
        TransportMode::Values
    }

    fn request(&mut self, command: Command) {
        self.pending.request(command);
    }

    fn transmissions(&mut self, controls: &ControlState) -> Vec<Transmission> {
        let mut actions = Vec::with_capacity(7);
        self.pending.drain_into(&mut actions);

        if !controls.estop {
            actions.extend([
                FieldAction::Throttle(controls.throttle),
                FieldAction::Pitch(controls.pitch),
                FieldAction::Roll(controls.roll),
                FieldAction::Yaw(controls.yaw),
            ]);
        }

        actions.into_iter().map(Transmission::from).collect()
    }
}

impl LinkStrategy for Synchronizer {
    fn mode(&self) -> TransportMode {
        TransportMode::Delta
    }

    fn request(&mut self, command: Command) {
        Synchronizer::request(self, command);
    }

    /// Channel values are withheld while the estop latch is set; commands
    /// still go out.
    fn transmissions(&mut self, controls: &ControlState) -> Vec<Transmission> {
        self.diff_and_send(controls)
            .into_iter()
            .filter(|action| !controls.estop || action.is_command())
            .map(Transmission::from)
            .collect()
    }
}
