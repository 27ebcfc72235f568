//! # Radio Bridge Module
//!
//! Handles the link to a micro:bit radio bridge attached over USB serial.
//!
//! The bridge turns text lines into radio primitives and back:
//!
//! ```text
//! G <group>          select radio group
//! B <hex payload>    send (or, inbound, received) raw buffer
//! V <tag> <value>    send tagged number
//! S <text>           send string
//! ```

pub mod transport;

use async_trait::async_trait;
use bytes::Bytes;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, ReadHalf, WriteHalf};
use tokio::sync::mpsc;
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::{debug, info, warn};

use crate::config::RadioConfig;
use crate::error::{RemoteError, Result};
pub use transport::RadioTransport;

/// Default bridge device paths to try after the configured one
const DEFAULT_DEVICE_PATHS: &[&str] = &[
    "/dev/ttyACM0", // micro:bit USB CDC
    "/dev/ttyUSB0", // USB-to-serial adapters
];

/// Prefix of an inbound received-buffer line
const RECEIVED_BUFFER_PREFIX: &str = "B ";

/// Radio bridge writing one text line per primitive
pub struct LineRadio<W> {
    writer: W,
}

/// Line radio over the write half of a serial port
pub type SerialRadio = LineRadio<WriteHalf<SerialStream>>;

/// Read half of the bridge serial port
pub type SerialReceiver = ReadHalf<SerialStream>;

impl<W> std::fmt::Debug for LineRadio<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineRadio").finish_non_exhaustive()
    }
}

impl<W: AsyncWrite + Unpin + Send> LineRadio<W> {
    /// Wrap any async writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consume the radio and return the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    async fn write_line(&mut self, line: String) -> io::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;

        debug!("Sent bridge line: {}", line);
        Ok(())
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> RadioTransport for LineRadio<W> {
    async fn set_channel(&mut self, group: u8) -> io::Result<()> {
        self.write_line(format!("G {}", group)).await
    }

    async fn send_buffer(&mut self, buffer: &[u8]) -> io::Result<()> {
        self.write_line(format!("B {}", hex::encode(buffer))).await
    }

    async fn send_value(&mut self, tag: char, value: f32) -> io::Result<()> {
        self.write_line(format!("V {} {}", tag, value)).await
    }

    async fn send_string(&mut self, text: &str) -> io::Result<()> {
        self.write_line(format!("S {}", text)).await
    }
}

impl SerialRadio {
    /// Open the radio bridge
    ///
    /// Tries the configured port first, then the default device paths.
    ///
    /// # Returns
    ///
    /// * `Result<(SerialRadio, SerialReceiver)>` - Send side and read half
    ///
    /// # Errors
    ///
    /// Returns error if no bridge could be opened
    pub fn open(config: &RadioConfig) -> Result<(Self, SerialReceiver)> {
        let mut paths = vec![config.port.as_str()];
        paths.extend(DEFAULT_DEVICE_PATHS.iter().filter(|p| **p != config.port));

        Self::open_with_paths(&paths, config.baud_rate, Duration::from_millis(config.timeout_ms))
    }

    /// Open the radio bridge with custom device paths
    ///
    /// # Arguments
    ///
    /// * `paths` - Device paths to try (e.g., &["/dev/ttyACM0"])
    /// * `baud_rate` - Bridge baud rate
    /// * `timeout` - Serial I/O timeout
    pub fn open_with_paths(
        paths: &[&str],
        baud_rate: u32,
        timeout: Duration,
    ) -> Result<(Self, SerialReceiver)> {
        for path in paths {
            debug!("Trying to open radio bridge: {}", path);

            match Self::open_port(path, baud_rate, timeout) {
                Ok(port) => {
                    info!("Successfully opened radio bridge at {}", path);
                    let (reader, writer) = tokio::io::split(port);
                    return Ok((LineRadio::new(writer), reader));
                }
                Err(e) => {
                    warn!("Failed to open {}: {}", path, e);
                    continue;
                }
            }
        }

        Err(RemoteError::RadioPortNotFound(paths.join(", ")))
    }

    fn open_port(path: &str, baud_rate: u32, timeout: Duration) -> Result<SerialStream> {
        tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .timeout(timeout)
            .open_native_async()
            .map_err(|e| RemoteError::Radio(format!("Failed to open {}: {}", path, e)))
    }
}

/// Parse one inbound bridge line into a received payload
///
/// Returns `None` for lines that are not received buffers or carry invalid
/// hex. Payload length is not checked here.
pub fn parse_received_line(line: &str) -> Option<Bytes> {
    let payload = line.trim_end().strip_prefix(RECEIVED_BUFFER_PREFIX)?;

    match hex::decode(payload.trim()) {
        Ok(bytes) => Some(Bytes::from(bytes)),
        Err(e) => {
            warn!("Ignoring received buffer with invalid hex: {}", e);
            None
        }
    }
}

/// Forward received buffers from the bridge to the remote task
///
/// Runs until the reader reaches EOF or the receiving side is dropped.
/// Lines garbled by serial noise (including invalid UTF-8) are skipped.
pub async fn forward_received<R>(reader: R, tx: mpsc::Sender<Bytes>) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut raw = Vec::new();

    loop {
        raw.clear();
        if reader.read_until(b'\n', &mut raw).await? == 0 {
            break;
        }

        let line = String::from_utf8_lossy(&raw);
        match parse_received_line(&line) {
            Some(buffer) => {
                if tx.send(buffer).await.is_err() {
                    debug!("Receiver dropped, stopping radio reader");
                    break;
                }
            }
            None => debug!("Skipping bridge line: {:?}", line.trim_end()),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(radio: LineRadio<Vec<u8>>) -> String {
        String::from_utf8(radio.into_inner()).unwrap()
    }

    #[tokio::test]
    async fn test_set_channel_line() {
        let mut radio = LineRadio::new(Vec::new());
        radio.set_channel(7).await.unwrap();
        assert_eq!(written(radio), "G 7\n");
    }

    #[tokio::test]
    async fn test_send_buffer_line_is_hex() {
        let mut radio = LineRadio::new(Vec::new());
        radio
            .send_buffer(&[0x01, 0x52, 0x40, 0xC9, 0x00, 0x4D, 0x00, 0x45, 0x00])
            .await
            .unwrap();
        assert_eq!(written(radio), "B 015240c9004d004500\n");
    }

    #[tokio::test]
    async fn test_send_value_and_string_lines() {
        let mut radio = LineRadio::new(Vec::new());
        radio.send_value('t', 42.5).await.unwrap();
        radio.send_string("e").await.unwrap();
        assert_eq!(written(radio), "V t 42.5\nS e\n");
    }

    #[test]
    fn test_parse_received_line() {
        let buffer = parse_received_line("B 0300000000000000ff\r\n").unwrap();
        assert_eq!(buffer.len(), 9);
        assert_eq!(buffer[0], 0x03);
        assert_eq!(buffer[8], 0xFF);
    }

    #[test]
    fn test_parse_received_line_rejects_other_lines() {
        assert!(parse_received_line("V t 1").is_none());
        assert!(parse_received_line("").is_none());
        assert!(parse_received_line("B zz").is_none());
    }

    #[tokio::test]
    async fn test_forward_received_skips_noise() {
        let input: &[u8] = b"hello\nB 000000000000000000\nS a\nB 01\n";
        let (tx, mut rx) = mpsc::channel(8);

        forward_received(input, tx).await.unwrap();

        assert_eq!(rx.recv().await.unwrap().len(), 9);
        assert_eq!(rx.recv().await.unwrap().as_ref(), &[0x01]);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_forward_received_survives_invalid_utf8() {
        let input: &[u8] =
            b"B 000000000000000000\n\xff\xfe noise\nB 020000000000000000\nB 03";
        let (tx, mut rx) = mpsc::channel(8);

        forward_received(input, tx).await.unwrap();

        assert_eq!(rx.recv().await.unwrap()[0], 0x00);
        assert_eq!(rx.recv().await.unwrap()[0], 0x02);
        assert_eq!(rx.recv().await.unwrap().as_ref(), &[0x03], "unterminated last line");
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn test_open_with_invalid_paths_returns_error() {
        let invalid_paths = &["/dev/nonexistent0", "/dev/nonexistent1"];
        let result =
            SerialRadio::open_with_paths(invalid_paths, 115_200, Duration::from_millis(100));

        match result {
            Err(RemoteError::RadioPortNotFound(msg)) => {
                assert!(msg.contains("/dev/nonexistent0"));
                assert!(msg.contains("/dev/nonexistent1"));
            }
            Err(other) => panic!("Expected RadioPortNotFound error, got: {:?}", other),
            Ok(_) => panic!("Expected RadioPortNotFound error, got a port"),
        }
    }

    #[test]
    fn test_open_with_empty_paths_returns_error() {
        let result = SerialRadio::open_with_paths(&[], 115_200, Duration::from_millis(100));
        assert!(matches!(result, Err(RemoteError::RadioPortNotFound(_))));
    }

    #[test]
    fn test_device_path_order() {
        assert_eq!(DEFAULT_DEVICE_PATHS[0], "/dev/ttyACM0",
            "ttyACM0 should be tried first (micro:bit USB CDC)");
        assert_eq!(DEFAULT_DEVICE_PATHS[1], "/dev/ttyUSB0");
    }
}
