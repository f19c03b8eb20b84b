//! Infrastructure layer - concrete printer links and configuration loading

pub mod config;
pub mod transport;

pub use config::{AppConfig, TimeoutConfig};
pub use transport::{
    BluetoothTransport, NetworkTransport, ScriptedTransport, SimulatorTransport, TransportFactory,
};
