//! # Remote Controller Module
//!
//! The transmitter side of the link. A [`Remote`] is the single owner of the
//! live control snapshot, the received telemetry, the active link strategy
//! and the radio transport.
//!
//! This module handles:
//! - Stick setters with range clamping
//! - Arm / disarm / emergency stop latches
//! - Sending control state through the configured strategy
//! - Decoding received telemetry (or ignoring it while disabled)

pub mod controls;
pub mod strategy;
pub mod sync;

use tracing::{debug, info, warn};

use crate::config::TransportMode;
use crate::error::{RemoteError, Result};
use crate::packet::decoder::decode_telemetry;
use crate::packet::protocol::{ControlState, TelemetryState};
use crate::radio::RadioTransport;
use crate::telemetry::{AccelerationSource, TelemetryField, TelemetryReading};
use strategy::{strategy_for, LinkStrategy, Transmission};
use sync::Command;

/// What happens to a buffer handed to [`Remote::on_received_buffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReceiveHandler {
    Decode,
    Discard,
}

impl ReceiveHandler {
    fn handle(
        self,
        buffer: &[u8],
        telemetry: &mut TelemetryState,
        controls: &mut ControlState,
    ) -> Result<()> {
        match self {
            ReceiveHandler::Decode => decode_telemetry(
                buffer,
                telemetry,
                &mut controls.armed,
                &mut controls.estop,
            ),
            ReceiveHandler::Discard => Ok(()),
        }
    }
}

/// Transmitter-side controller
///
/// # Examples
///
/// ```no_run
/// use airbit_remote::config::{Config, TransportMode};
/// use airbit_remote::radio::SerialRadio;
/// use airbit_remote::remote::Remote;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = Config::load("config/default.toml")?;
///     let (radio, _receiver) = SerialRadio::open(&config.radio)?;
///
///     let mut remote = Remote::new(radio, TransportMode::Packed);
///     remote.connect_to_channel(7).await?;
///     remote.arm();
///     remote.set_throttle(30.0);
///     remote.send_controls().await?;
///     Ok(())
/// }
/// ```
pub struct Remote<T> {
    transport: T,
    controls: ControlState,
    telemetry: TelemetryState,
    strategy: Box<dyn LinkStrategy>,
    receive_handler: ReceiveHandler,
}

impl<T> std::fmt::Debug for Remote<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Remote")
            .field("controls", &self.controls)
            .field("telemetry", &self.telemetry)
            .field("mode", &self.strategy.mode())
            .field("receive_handler", &self.receive_handler)
            .finish_non_exhaustive()
    }
}

impl<T: RadioTransport> Remote<T> {
    /// Create a remote using the strategy for `mode`
    pub fn new(transport: T, mode: TransportMode) -> Self {
        Self::with_strategy(transport, strategy_for(mode))
    }

    /// Create a remote with an explicit strategy
    pub fn with_strategy(transport: T, strategy: Box<dyn LinkStrategy>) -> Self {
        Self {
            transport,
            controls: ControlState::default(),
            telemetry: TelemetryState::default(),
            strategy,
            receive_handler: ReceiveHandler::Decode,
        }
    }

    /// Active transport mode
    pub fn mode(&self) -> TransportMode {
        self.strategy.mode()
    }

    /// Zero all stick channels
    pub fn initialise(&mut self) {
        self.controls.reset_channels();
    }

    /// Select the radio group shared with the vehicle
    pub async fn connect_to_channel(&mut self, group: u8) -> Result<()> {
        self.transport
            .set_channel(group)
            .await
            .map_err(|e| RemoteError::Radio(format!("Failed to set radio group {}: {}", group, e)))?;

        info!("Connected to radio group {}", group);
        Ok(())
    }

    /// Set the armed latch; the command goes out with the next send
    pub fn arm(&mut self) {
        self.controls.armed = true;
        self.strategy.request(Command::Arm);
        info!("Armed");
    }

    /// Clear the armed latch; the command goes out with the next send
    pub fn disarm(&mut self) {
        self.controls.armed = false;
        self.strategy.request(Command::Disarm);
        info!("Disarmed");
    }

    /// Latch the emergency stop and transmit immediately
    ///
    /// The latch is never cleared by received telemetry.
    ///
    /// # Returns
    ///
    /// * `Result<usize>` - Number of transmissions made
    pub async fn emergency_stop(&mut self) -> Result<usize> {
        self.controls.estop = true;
        self.strategy.request(Command::EmergencyStop);
        warn!("Emergency stop engaged");

        self.send_controls().await
    }

    pub fn set_throttle(&mut self, amount: f32) {
        self.controls.set_throttle(amount);
    }

    pub fn set_pitch(&mut self, amount: f32) {
        self.controls.set_pitch(amount);
    }

    pub fn set_roll(&mut self, amount: f32) {
        self.controls.set_roll(amount);
    }

    pub fn set_yaw(&mut self, amount: f32) {
        self.controls.set_yaw(amount);
    }

    pub fn change_throttle(&mut self, delta: f32) {
        self.controls.change_throttle(delta);
    }

    pub fn change_pitch(&mut self, delta: f32) {
        self.controls.change_pitch(delta);
    }

    pub fn change_roll(&mut self, delta: f32) {
        self.controls.change_roll(delta);
    }

    pub fn change_yaw(&mut self, delta: f32) {
        self.controls.change_yaw(delta);
    }

    /// Send the current control state through the active strategy
    ///
    /// # Returns
    ///
    /// * `Result<usize>` - Number of transmissions made (may be 0 in delta mode)
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Radio`] on the first failed transmission; the
    /// remaining ones are dropped.
    pub async fn send_controls(&mut self) -> Result<usize> {
        let transmissions = self.strategy.transmissions(&self.controls);
        let count = transmissions.len();

        for transmission in transmissions {
            let result = match &transmission {
                Transmission::Buffer(packet) => self.transport.send_buffer(packet).await,
                Transmission::Value(tag, value) => self.transport.send_value(*tag, *value).await,
                Transmission::Text(text) => self.transport.send_string(text).await,
            };

            result.map_err(|e| {
                RemoteError::Radio(format!("Failed to send {:?}: {}", transmission, e))
            })?;
        }

        debug!("Sent {} transmission(s) in {:?} mode", count, self.mode());
        Ok(count)
    }

    /// Handle a buffer delivered by the radio
    ///
    /// While telemetry is disabled this is a no-op and never fails.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::MalformedPacket`] if the buffer is not 9 bytes
    /// and telemetry is enabled.
    pub fn on_received_buffer(&mut self, buffer: &[u8]) -> Result<()> {
        self.receive_handler
            .handle(buffer, &mut self.telemetry, &mut self.controls)
    }

    /// Start decoding received buffers
    pub fn enable_telemetry(&mut self) {
        self.receive_handler = ReceiveHandler::Decode;
        info!("Telemetry enabled");
    }

    /// Stop decoding received buffers; the last telemetry is kept
    pub fn disable_telemetry(&mut self) {
        self.receive_handler = ReceiveHandler::Discard;
        info!("Telemetry disabled");
    }

    pub fn is_telemetry_enabled(&self) -> bool {
        self.receive_handler == ReceiveHandler::Decode
    }

    /// Refresh acceleration readings from a sampling source
    pub fn refresh_acceleration<S: AccelerationSource + ?Sized>(&mut self, source: &mut S) {
        self.telemetry.sample_acceleration(source);
    }

    /// Live control snapshot, including the armed/estop latches
    pub fn controls(&self) -> &ControlState {
        &self.controls
    }

    /// Telemetry as last received
    pub fn telemetry(&self) -> &TelemetryState {
        &self.telemetry
    }

    /// Read a single telemetry field
    pub fn read_telemetry(&self, field: TelemetryField) -> TelemetryReading {
        self.telemetry.read(field)
    }
}
