use async_trait::async_trait;
use domain::printer::{Dialect, FIRMWARE_SETTING, HEAD_TEMPERATURE_SETTING, LANGUAGES_SETTING};
use domain::printer::{PRODUCT_NAME_SETTING, UNIQUE_ID_SETTING};
use domain::transport::{Transport, TransportKind};
use domain::{ConnectError, IoError};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

pub const PAPER_OUT_SETTING: &str = "head.paper_out";
pub const HEAD_OPEN_SETTING: &str = "head.open";
pub const PAUSE_SETTING: &str = "device.pause";

const SGD_PREFIX: &[u8] = b"! U1 ";
const ZPL_STATUS: &[u8] = b"~HS";
const CPCL_STATUS: &[u8] = &[0x1B, 0x68];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    #[serde(default = "default_dialect")]
    pub dialect: Dialect,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_serial")]
    pub serial_number: String,
    #[serde(default)]
    pub paper_out: bool,
    #[serde(default)]
    pub head_open: bool,
    #[serde(default)]
    pub paused: bool,
}

fn default_dialect() -> Dialect {
    Dialect::Zpl
}
fn default_model() -> String {
    "ZD421-203dpi".to_string()
}
fn default_serial() -> String {
    "D2J000000001".to_string()
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            dialect: default_dialect(),
            model: default_model(),
            serial_number: default_serial(),
            paper_out: false,
            head_open: false,
            paused: false,
        }
    }
}

fn flag(on: bool) -> String {
    if on { "1" } else { "0" }.to_string()
}

/// Printer state shared between the transport and whoever inspects it
#[derive(Debug)]
pub struct SimulatorState {
    pub dialect: Dialect,
    pub settings: HashMap<String, String>,
    /// Bytes that were not recognised as a query (label data)
    pub printed: Vec<u8>,
    /// Next read reports an orderly close
    pub hang_up: bool,
    inbox: Vec<u8>,
    outbox: VecDeque<u8>,
}

impl SimulatorState {
    fn from_config(config: &SimulatorConfig) -> Self {
        let languages = match config.dialect {
            Dialect::Zpl => "zpl",
            Dialect::Cpcl => "line_print",
        };
        let settings = [
            (LANGUAGES_SETTING, languages.to_string()),
            (PRODUCT_NAME_SETTING, config.model.clone()),
            (UNIQUE_ID_SETTING, config.serial_number.clone()),
            (FIRMWARE_SETTING, "V93.21.15Z".to_string()),
            (HEAD_TEMPERATURE_SETTING, "24".to_string()),
            (PAPER_OUT_SETTING, flag(config.paper_out)),
            (HEAD_OPEN_SETTING, flag(config.head_open)),
            (PAUSE_SETTING, flag(config.paused)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            dialect: config.dialect,
            settings,
            printed: Vec::new(),
            hang_up: false,
            inbox: Vec::new(),
            outbox: VecDeque::new(),
        }
    }

    fn is_set(&self, setting: &str) -> bool {
        self.settings.get(setting).map(String::as_str) == Some("1")
    }

    fn host_status(&self) -> Vec<u8> {
        format!(
            "\x02030,{},{},1245,000,0,0,0,000,0,0,0\x03\r\n\
             \x02000,0,{},0,0,2,4,0,00000000,1,000\x03\r\n\
             \x021234,0\x03\r\n",
            flag(self.is_set(PAPER_OUT_SETTING)),
            flag(self.is_set(PAUSE_SETTING)),
            flag(self.is_set(HEAD_OPEN_SETTING)),
        )
        .into_bytes()
    }

    fn status_byte(&self) -> u8 {
        let mut status = 0u8;
        if self.is_set(PAPER_OUT_SETTING) {
            status |= 0x02;
        }
        if self.is_set(HEAD_OPEN_SETTING) {
            status |= 0x04;
        }
        status
    }

    /// Consume complete commands from the inbox, queueing any answers
    fn process(&mut self) {
        loop {
            if self.inbox.is_empty() {
                return;
            }

            if self.inbox.starts_with(SGD_PREFIX) {
                let Some(end) = self.inbox.iter().position(|&b| b == b'\n') else {
                    return; // wait for the rest of the line
                };
                let line: Vec<u8> = self.inbox.drain(..=end).collect();
                self.handle_sgd(&String::from_utf8_lossy(&line));
            } else if self.inbox.starts_with(ZPL_STATUS) && self.dialect == Dialect::Zpl {
                self.inbox.drain(..ZPL_STATUS.len());
                let reply = self.host_status();
                self.outbox.extend(reply);
            } else if self.inbox.starts_with(CPCL_STATUS) && self.dialect == Dialect::Cpcl {
                self.inbox.drain(..CPCL_STATUS.len());
                let reply = self.status_byte();
                self.outbox.push_back(reply);
            } else if is_prefix_of_command(&self.inbox) {
                return;
            } else {
                let byte = self.inbox.remove(0);
                self.printed.push(byte);
            }
        }
    }

    fn handle_sgd(&mut self, line: &str) {
        let body = line.trim_end_matches(['\r', '\n']);
        let body = body.strip_prefix("! U1 ").unwrap_or(body);
        let (verb, rest) = body.split_once(' ').unwrap_or((body, ""));
        let args = quoted_args(rest);

        match (verb, args.as_slice()) {
            ("getvar", [name, ..]) => {
                let value = self.settings.get(name).cloned().unwrap_or_default();
                self.outbox.extend(format!("\"{}\"\r\n", value).into_bytes());
            }
            ("setvar", [name, value, ..]) => {
                self.settings.insert(name.clone(), value.clone());
            }
            ("do", [name, ..]) => {
                info!(command = %name, "Simulator received SGD do");
            }
            _ => {
                debug!(line = %body, "Simulator ignored malformed SGD line");
            }
        }
    }
}

fn is_prefix_of_command(bytes: &[u8]) -> bool {
    [SGD_PREFIX, ZPL_STATUS, CPCL_STATUS]
        .iter()
        .any(|cmd| bytes.len() < cmd.len() && cmd.starts_with(bytes))
}

/// Values between successive pairs of double quotes
fn quoted_args(text: &str) -> Vec<String> {
    text.split('"')
        .skip(1)
        .step_by(2)
        .map(str::to_string)
        .collect()
}

/// In-process printer that answers SGD and status inquiries.
///
/// Used for dry runs and tests. Clones of the returned state handle see
/// every command the transport receives.
pub struct SimulatorTransport {
    config: SimulatorConfig,
    state: Arc<Mutex<SimulatorState>>,
    open: bool,
}

impl SimulatorTransport {
    pub fn new(config: SimulatorConfig) -> Self {
        let state = SimulatorState::from_config(&config);
        Self {
            config,
            state: Arc::new(Mutex::new(state)),
            open: false,
        }
    }

    /// Shared handle to the simulated printer's state
    pub fn state(&self) -> Arc<Mutex<SimulatorState>> {
        self.state.clone()
    }

    fn lock(&self) -> MutexGuard<'_, SimulatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Transport for SimulatorTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Simulator
    }

    fn endpoint(&self) -> String {
        format!("simulator ({})", self.config.model)
    }

    async fn open(&mut self) -> Result<(), ConnectError> {
        // Instant connection
        info!(model = %self.config.model, dialect = %self.config.dialect, "Simulator connected");
        self.lock().hang_up = false;
        self.open = true;
        Ok(())
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<usize, IoError> {
        if !self.open {
            return Err(IoError::NotConnected);
        }
        let mut state = self.lock();
        state.inbox.extend_from_slice(bytes);
        state.process();
        Ok(bytes.len())
    }

    async fn read(&mut self, buffer: &mut [u8]) -> Result<usize, IoError> {
        if !self.open {
            return Err(IoError::NotConnected);
        }

        let n = {
            let mut state = self.lock();
            if state.hang_up {
                drop(state);
                self.open = false;
                return Ok(0);
            }
            let n = buffer.len().min(state.outbox.len());
            for (slot, byte) in buffer.iter_mut().zip(state.outbox.drain(..n)) {
                *slot = byte;
            }
            n
        };

        if n == 0 {
            // A real printer stays silent; the caller's timeout decides
            std::future::pending::<()>().await;
        }
        Ok(n)
    }

    async fn close(&mut self) {
        if self.open {
            info!("Simulator disconnected");
        }
        self.open = false;
    }

    fn release(&mut self) {
        self.open = false;
    }

    fn is_connected(&self) -> bool {
        self.open
    }
}
