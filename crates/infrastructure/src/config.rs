use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use domain::{StatusLayouts, TransportDescriptor};
use serde::{Deserialize, Serialize};

use crate::transport::{BluetoothConfig, SimulatorConfig};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Bound on establishing a connection
    #[serde(default = "default_connect_ms")]
    pub connect_ms: u64,
    /// Silence after which a partial response is considered finished
    #[serde(default = "default_read_idle_ms")]
    pub read_idle_ms: u64,
    /// Overall bound on collecting one response
    #[serde(default = "default_read_window_ms")]
    pub read_window_ms: u64,
}

fn default_connect_ms() -> u64 {
    5000
}
fn default_read_idle_ms() -> u64 {
    500
}
fn default_read_window_ms() -> u64 {
    3000
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: default_connect_ms(),
            read_idle_ms: default_read_idle_ms(),
            read_window_ms: default_read_window_ms(),
        }
    }
}

impl TimeoutConfig {
    pub fn connect(&self) -> Duration {
        Duration::from_millis(self.connect_ms)
    }

    pub fn read_idle(&self) -> Duration {
        Duration::from_millis(self.read_idle_ms)
    }

    pub fn read_window(&self) -> Duration {
        Duration::from_millis(self.read_window_ms)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Printer used when none is given on the command line
    #[serde(default)]
    pub target: Option<TransportDescriptor>,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub status: StatusLayouts,
    #[serde(default)]
    pub bluetooth: BluetoothConfig,
    #[serde(default)]
    pub simulator: SimulatorConfig,
}

impl AppConfig {
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .set_default("timeouts.connect_ms", default_connect_ms())?
            .set_default("timeouts.read_idle_ms", default_read_idle_ms())?
            .set_default("timeouts.read_window_ms", default_read_window_ms())?
            // Local config file, e.g. config/default.toml
            .add_source(File::with_name(&format!("{}/default", config_dir)).required(false))
            // Per-environment overrides, e.g. config/production.toml
            .add_source(File::with_name(&format!("{}/{}", config_dir, run_mode)).required(false))
            // Environment variables (e.g. PRINTER__TIMEOUTS__CONNECT_MS=2000)
            .add_source(
                Environment::with_prefix("PRINTER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }
}
