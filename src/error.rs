//! # Error Types
//!
//! Custom error types for AirBit Remote using `thiserror`.

use thiserror::Error;

/// Main error type for AirBit Remote
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Received buffer does not have the fixed payload length
    #[error("Malformed packet: expected {expected} bytes, got {actual}")]
    MalformedPacket { expected: usize, actual: usize },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Radio bridge errors
    #[error("Radio error: {0}")]
    Radio(String),

    /// None of the candidate radio bridge ports could be opened
    #[error("Radio bridge not found (tried: {0})")]
    RadioPortNotFound(String),

    /// Telemetry record serialization errors
    #[error("Telemetry log error: {0}")]
    TelemetryLog(#[from] serde_json::Error),
}

/// Result type alias for AirBit Remote
pub type Result<T> = std::result::Result<T, RemoteError>;
