use serde::{Deserialize, Serialize};

/// Where a printer connection is in its open/close cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ConnectionState {
    /// Never opened, closed by the caller, or dropped by the printer
    #[default]
    Disconnected,
    /// An open attempt is in flight
    Connecting,
    Connected,
    /// The last open attempt failed; opening again is allowed
    Failed,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_disconnected() {
        let state = ConnectionState::default();
        assert_eq!(state, ConnectionState::Disconnected);
        assert!(!state.is_connected());
    }

    #[test]
    fn test_only_connected_is_usable() {
        assert!(ConnectionState::Connected.is_connected());
        assert!(!ConnectionState::Connecting.is_connected());
        assert!(!ConnectionState::Failed.is_connected());
    }
}
