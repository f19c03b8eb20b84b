mod bluetooth;
mod network;
mod scripted;
mod simulator;

pub use bluetooth::{BluetoothConfig, BluetoothTransport, parse_rfcomm_table};
pub use network::NetworkTransport;
pub use scripted::{Reply, ScriptedTransport};
pub use simulator::{
    HEAD_OPEN_SETTING, PAPER_OUT_SETTING, PAUSE_SETTING, SimulatorConfig, SimulatorState,
    SimulatorTransport,
};

use domain::ConnectError;
use domain::transport::{Transport, TransportDescriptor};

use crate::config::AppConfig;

/// Factory for creating transports
pub struct TransportFactory;

impl TransportFactory {
    /// Create an unopened transport for `descriptor`.
    ///
    /// Only the descriptor is checked here; reaching the device happens on `open`.
    pub fn create(
        descriptor: &TransportDescriptor,
        config: &AppConfig,
    ) -> Result<Box<dyn Transport>, ConnectError> {
        descriptor.validate()?;

        match descriptor {
            TransportDescriptor::Network { host, port } => Ok(Box::new(
                NetworkTransport::new(host, *port).with_connect_timeout(config.timeouts.connect()),
            ) as Box<dyn Transport>),
            TransportDescriptor::Bluetooth { device } => Ok(Box::new(BluetoothTransport::new(
                device,
                config.bluetooth.clone(),
            )) as Box<dyn Transport>),
            TransportDescriptor::Simulator => {
                Ok(Box::new(SimulatorTransport::new(config.simulator.clone()))
                    as Box<dyn Transport>)
            }
        }
    }
}
