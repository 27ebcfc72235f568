//! Trait abstraction for the radio primitives the remote invokes

use async_trait::async_trait;
use std::io;

/// Send side of the radio link
///
/// Implementations only move bytes; they never inspect packet contents.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RadioTransport: Send {
    /// Select the radio group both ends listen on
    async fn set_channel(&mut self, group: u8) -> io::Result<()>;

    /// Broadcast a raw payload
    async fn send_buffer(&mut self, buffer: &[u8]) -> io::Result<()>;

    /// Broadcast a tagged number (low-rate per-field transport)
    async fn send_value(&mut self, tag: char, value: f32) -> io::Result<()>;

    /// Broadcast a short command string
    async fn send_string(&mut self, text: &str) -> io::Result<()>;
}
