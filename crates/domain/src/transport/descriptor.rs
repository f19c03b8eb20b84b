use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::transport_kind::TransportKind;
use crate::error::ConnectError;

/// Default raw printing port for network printers
pub const DEFAULT_NETWORK_PORT: u16 = 9100;

fn default_network_port() -> u16 {
    DEFAULT_NETWORK_PORT
}

/// Describes how to reach a printer, selected before any I/O happens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportDescriptor {
    Network {
        host: String,
        #[serde(default = "default_network_port")]
        port: u16,
    },
    /// Serial-profile link. `device` is a MAC-style address or a device path.
    Bluetooth { device: String },
    Simulator,
}

impl TransportDescriptor {
    pub fn network(host: impl Into<String>, port: u16) -> Self {
        Self::Network {
            host: host.into(),
            port,
        }
    }

    pub fn bluetooth(device: impl Into<String>) -> Self {
        Self::Bluetooth {
            device: device.into(),
        }
    }

    pub fn kind(&self) -> TransportKind {
        match self {
            Self::Network { .. } => TransportKind::Network,
            Self::Bluetooth { .. } => TransportKind::Bluetooth,
            Self::Simulator => TransportKind::Simulator,
        }
    }

    /// Reject descriptors that can never be opened (empty host, port 0, ...)
    pub fn validate(&self) -> Result<(), ConnectError> {
        match self {
            Self::Network { host, port } => {
                if host.trim().is_empty() {
                    return Err(ConnectError::InvalidDescriptor(
                        "Network host is empty".to_string(),
                    ));
                }
                if *port == 0 {
                    return Err(ConnectError::InvalidDescriptor(
                        "Port must be between 1 and 65535".to_string(),
                    ));
                }
                Ok(())
            }
            Self::Bluetooth { device } => {
                if device.trim().is_empty() {
                    return Err(ConnectError::InvalidDescriptor(
                        "Bluetooth device identifier is empty".to_string(),
                    ));
                }
                Ok(())
            }
            Self::Simulator => Ok(()),
        }
    }
}

/// Validate a Bluetooth MAC address format (XX:XX:XX:XX:XX:XX).
pub fn is_valid_mac(mac: &str) -> bool {
    let parts: Vec<&str> = mac.split(':').collect();
    if parts.len() != 6 {
        return false;
    }
    parts
        .iter()
        .all(|part| part.len() == 2 && part.chars().all(|c| c.is_ascii_hexdigit()))
}

fn looks_like_device_path(s: &str) -> bool {
    if s.starts_with('/') {
        return true;
    }
    // Windows serial ports (COM3, COM12)
    match (s.get(..3), s.get(3..)) {
        (Some(prefix), Some(num)) => {
            prefix.eq_ignore_ascii_case("COM") && num.parse::<u16>().is_ok()
        }
        _ => false,
    }
}

fn parse_port(port: &str) -> Result<u16, ConnectError> {
    match port.parse::<u16>() {
        Ok(0) | Err(_) => Err(ConnectError::InvalidDescriptor(format!(
            "Invalid port: {}",
            port
        ))),
        Ok(p) => Ok(p),
    }
}

fn parse_host_port(s: &str) -> Result<TransportDescriptor, ConnectError> {
    // [v6-literal]:port
    if let Some(rest) = s.strip_prefix('[') {
        let (host, tail) = rest.split_once(']').ok_or_else(|| {
            ConnectError::InvalidDescriptor(format!("Unterminated IPv6 literal: {}", s))
        })?;
        let port = match tail.strip_prefix(':') {
            Some(p) => parse_port(p)?,
            None if tail.is_empty() => DEFAULT_NETWORK_PORT,
            None => {
                return Err(ConnectError::InvalidDescriptor(format!(
                    "Unexpected text after address: {}",
                    tail
                )));
            }
        };
        return Ok(TransportDescriptor::network(host, port));
    }

    let descriptor = match s.matches(':').count() {
        0 => TransportDescriptor::network(s, DEFAULT_NETWORK_PORT),
        1 => {
            let (host, port) = s.split_once(':').unwrap_or((s, ""));
            TransportDescriptor::network(host, parse_port(port)?)
        }
        // Bare IPv6 address without a port
        _ => TransportDescriptor::network(s, DEFAULT_NETWORK_PORT),
    };
    Ok(descriptor)
}

impl FromStr for TransportDescriptor {
    type Err = ConnectError;

    /// Formats:
    /// - `tcp://host[:port]`, `host[:port]` → network (port defaults to 9100)
    /// - `bt://<id>`, a MAC address or a device path → bluetooth
    /// - `sim://` → simulator
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ConnectError::InvalidDescriptor(
                "Empty transport descriptor".to_string(),
            ));
        }

        let descriptor = if let Some(rest) = s.strip_prefix("tcp://") {
            parse_host_port(rest)?
        } else if let Some(rest) = s.strip_prefix("bt://") {
            Self::bluetooth(rest)
        } else if s == "sim://" || s.eq_ignore_ascii_case("simulator") {
            Self::Simulator
        } else if is_valid_mac(s) || looks_like_device_path(s) {
            Self::bluetooth(s)
        } else {
            parse_host_port(s)?
        };

        descriptor.validate()?;
        Ok(descriptor)
    }
}

impl fmt::Display for TransportDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network { host, port } if host.contains(':') => {
                write!(f, "tcp://[{}]:{}", host, port)
            }
            Self::Network { host, port } => write!(f, "tcp://{}:{}", host, port),
            Self::Bluetooth { device } => write!(f, "bt://{}", device),
            Self::Simulator => f.write_str("sim://"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_host_with_default_port() {
        let d: TransportDescriptor = "192.168.1.50".parse().unwrap();
        assert_eq!(d, TransportDescriptor::network("192.168.1.50", 9100));
        assert_eq!(d.kind(), TransportKind::Network);
    }

    #[test]
    fn test_parse_tcp_scheme_with_port() {
        let d: TransportDescriptor = "tcp://printer.local:6101".parse().unwrap();
        assert_eq!(d, TransportDescriptor::network("printer.local", 6101));
    }

    #[test]
    fn test_parse_ipv6_literal() {
        let d: TransportDescriptor = "[::1]:9200".parse().unwrap();
        assert_eq!(d, TransportDescriptor::network("::1", 9200));
        assert_eq!(d.to_string(), "tcp://[::1]:9200");
    }

    #[test]
    fn test_parse_mac_is_bluetooth() {
        let d: TransportDescriptor = "00:11:22:AA:BB:CC".parse().unwrap();
        assert_eq!(d, TransportDescriptor::bluetooth("00:11:22:AA:BB:CC"));
    }

    #[test]
    fn test_parse_device_path_is_bluetooth() {
        let d: TransportDescriptor = "/dev/rfcomm0".parse().unwrap();
        assert_eq!(d.kind(), TransportKind::Bluetooth);

        let d: TransportDescriptor = "COM7".parse().unwrap();
        assert_eq!(d, TransportDescriptor::bluetooth("COM7"));
    }

    #[test]
    fn test_parse_bt_scheme_keeps_identifier() {
        let d: TransportDescriptor = "bt://XXRBJ151200195".parse().unwrap();
        assert_eq!(d, TransportDescriptor::bluetooth("XXRBJ151200195"));
    }

    #[test]
    fn test_parse_simulator() {
        let d: TransportDescriptor = "sim://".parse().unwrap();
        assert_eq!(d, TransportDescriptor::Simulator);
    }

    #[test]
    fn test_rejects_port_zero_and_garbage() {
        assert!(matches!(
            "printer:0".parse::<TransportDescriptor>(),
            Err(ConnectError::InvalidDescriptor(_))
        ));
        assert!(matches!(
            "printer:abc".parse::<TransportDescriptor>(),
            Err(ConnectError::InvalidDescriptor(_))
        ));
        assert!(matches!(
            "printer:70000".parse::<TransportDescriptor>(),
            Err(ConnectError::InvalidDescriptor(_))
        ));
        assert!("".parse::<TransportDescriptor>().is_err());
        assert!("bt://".parse::<TransportDescriptor>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for d in [
            TransportDescriptor::network("10.0.0.5", 9100),
            TransportDescriptor::bluetooth("/dev/rfcomm1"),
            TransportDescriptor::Simulator,
        ] {
            let parsed: TransportDescriptor = d.to_string().parse().unwrap();
            assert_eq!(parsed, d);
        }
    }

    #[test]
    fn test_deserialize_defaults_port() {
        let d: TransportDescriptor =
            serde_json::from_str(r#"{"kind":"network","host":"10.1.1.1"}"#).unwrap();
        assert_eq!(d, TransportDescriptor::network("10.1.1.1", 9100));
    }

    #[test]
    fn test_valid_mac_addresses() {
        assert!(is_valid_mac("00:11:22:33:44:55"));
        assert!(is_valid_mac("aa:bb:cc:dd:ee:ff"));
        assert!(!is_valid_mac("00:11:22:33:44"));
        assert!(!is_valid_mac("00-11-22-33-44-55"));
        assert!(!is_valid_mac("GG:HH:II:JJ:KK:LL"));
    }
}
