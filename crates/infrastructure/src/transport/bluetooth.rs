//! Bluetooth serial-profile (SPP) transport.
//!
//! The link is driven through the serial device the OS exposes for a
//! paired printer: `/dev/rfcommN` on Linux (bound with `rfcomm bind`),
//! `/dev/tty.*` on macOS, `COMn` on Windows. A MAC address is resolved to
//! its bound RFCOMM device through the kernel's binding table.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use domain::transport::{Transport, TransportKind, is_valid_mac};
use domain::{ConnectError, IoError};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::{debug, info, warn};

/// Bluetooth serial-profile configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BluetoothConfig {
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    #[serde(default = "default_rfcomm_table")]
    pub rfcomm_table: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_baud_rate() -> u32 {
    9600
}
fn default_rfcomm_table() -> String {
    "/proc/net/rfcomm".to_string()
}
fn default_timeout_ms() -> u64 {
    1000
}

impl Default for BluetoothConfig {
    fn default() -> Self {
        Self {
            baud_rate: default_baud_rate(),
            rfcomm_table: default_rfcomm_table(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Find the RFCOMM device bound to `mac` in the contents of the binding table.
///
/// Table lines look like `rfcomm0: 00:11:22:33:44:55 channel 1 clean`.
pub fn parse_rfcomm_table(contents: &str, mac: &str) -> Option<String> {
    let mac_upper = mac.to_uppercase();
    contents
        .lines()
        .filter(|line| line.to_uppercase().contains(&mac_upper))
        .filter_map(|line| line.split(':').next())
        .map(str::trim)
        .find(|name| name.starts_with("rfcomm"))
        .map(|name| format!("/dev/{}", name))
}

fn map_serial_error(device: &str, e: tokio_serial::Error) -> ConnectError {
    use std::io::ErrorKind as Io;
    use tokio_serial::ErrorKind;

    let detail = format!("{}: {}", device, e);
    match e.kind {
        ErrorKind::NoDevice | ErrorKind::Io(Io::NotFound) => ConnectError::DeviceNotFound(detail),
        ErrorKind::Io(Io::PermissionDenied) => ConnectError::PermissionDenied(format!(
            "{}. Tip: add the user to the dialout group or adjust the device permissions.",
            detail
        )),
        ErrorKind::Io(Io::TimedOut) => ConnectError::Timeout,
        _ => ConnectError::Unreachable(detail),
    }
}

/// Serial-profile link to a Bluetooth printer
pub struct BluetoothTransport {
    device: String,
    config: BluetoothConfig,
    port: Option<SerialStream>,
}

impl BluetoothTransport {
    pub fn new(device: &str, config: BluetoothConfig) -> Self {
        Self {
            device: device.to_string(),
            config,
            port: None,
        }
    }

    /// Turn the configured identifier into an openable device path
    fn resolve_device(&self) -> Result<String, ConnectError> {
        if is_valid_mac(&self.device) {
            let contents = std::fs::read_to_string(&self.config.rfcomm_table).map_err(|e| {
                ConnectError::DeviceNotFound(format!(
                    "{}: cannot read RFCOMM table {}: {}",
                    self.device, self.config.rfcomm_table, e
                ))
            })?;
            return parse_rfcomm_table(&contents, &self.device).ok_or_else(|| {
                ConnectError::DeviceNotFound(format!(
                    "{} is not bound to an RFCOMM device (try `rfcomm bind 0 {}`)",
                    self.device, self.device
                ))
            });
        }

        // Normalize port name for Windows (e.g., COM7 -> \\.\COM7)
        if cfg!(target_os = "windows") && !self.device.starts_with(r"\\.\") {
            return Ok(format!(r"\\.\{}", self.device));
        }

        if self.device.starts_with('/') && !Path::new(&self.device).exists() {
            return Err(ConnectError::DeviceNotFound(self.device.clone()));
        }

        Ok(self.device.clone())
    }

    fn on_io_error(&mut self, e: std::io::Error) -> IoError {
        let err = IoError::from(e);
        if err.is_disconnect() {
            warn!(device = %self.device, "Bluetooth link dropped");
            self.port = None;
        }
        err
    }
}

#[async_trait]
impl Transport for BluetoothTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Bluetooth
    }

    fn endpoint(&self) -> String {
        self.device.clone()
    }

    async fn open(&mut self) -> Result<(), ConnectError> {
        if self.port.is_some() {
            return Ok(());
        }

        let path = self.resolve_device()?;
        debug!(
            device = %self.device,
            path = %path,
            baud_rate = self.config.baud_rate,
            "Opening serial-profile link"
        );

        let port = tokio_serial::new(&path, self.config.baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .timeout(Duration::from_millis(self.config.timeout_ms))
            .open_native_async()
            .map_err(|e| {
                warn!(device = %self.device, path = %path, error = %e, "Failed to open serial-profile link");
                map_serial_error(&path, e)
            })?;

        self.port = Some(port);
        info!(device = %self.device, "Bluetooth printer connected");
        Ok(())
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<usize, IoError> {
        let port = self.port.as_mut().ok_or(IoError::NotConnected)?;
        match port.write(bytes).await {
            Ok(n) => Ok(n),
            Err(e) => Err(self.on_io_error(e)),
        }
    }

    async fn read(&mut self, buffer: &mut [u8]) -> Result<usize, IoError> {
        let port = self.port.as_mut().ok_or(IoError::NotConnected)?;
        match port.read(buffer).await {
            Ok(0) if !buffer.is_empty() => {
                debug!(device = %self.device, "Bluetooth link hung up");
                self.port = None;
                Ok(0)
            }
            Ok(n) => Ok(n),
            Err(e) => Err(self.on_io_error(e)),
        }
    }

    async fn close(&mut self) {
        if let Some(mut port) = self.port.take() {
            if let Err(e) = port.shutdown().await {
                warn!(error = %e, "Error shutting down serial-profile link");
            }
            info!(device = %self.device, "Bluetooth printer disconnected");
        }
    }

    fn release(&mut self) {
        self.port = None;
    }

    fn is_connected(&self) -> bool {
        self.port.is_some()
    }
}
