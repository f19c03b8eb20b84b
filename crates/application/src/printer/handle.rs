use std::sync::{Arc, Weak};

use domain::printer::{
    FIRMWARE_SETTING, HEAD_TEMPERATURE_SETTING, LANGUAGES_SETTING, PRODUCT_NAME_SETTING,
    StatusReport, UNIQUE_ID_SETTING,
};
use domain::{
    Dialect, IoError, PrinterError, PrinterInfo, PrinterStatus, SgdError, StatusError,
    StatusLayouts,
};
use infrastructure::AppConfig;
use tracing::{debug, info, warn};

use super::response::{ReadTimeouts, read_response};
use super::sgd;
use crate::connection::Connection;

/// Status layouts and read deadlines used by a handle
#[derive(Debug, Clone, Default)]
pub struct HandleOptions {
    pub layouts: StatusLayouts,
    pub timeouts: ReadTimeouts,
}

impl From<&AppConfig> for HandleOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            layouts: config.status.clone(),
            timeouts: ReadTimeouts::from(&config.timeouts),
        }
    }
}

/// A printer reached through a connection it does not own.
///
/// The dialect is fixed when the handle is built. Once the connection is
/// gone every operation reports the not-connected class of error.
#[derive(Debug, Clone)]
pub struct PrinterHandle {
    connection: Weak<Connection>,
    dialect: Dialect,
    options: HandleOptions,
}

impl PrinterHandle {
    /// Probe the printer's dialect over `connection` and build a handle
    pub async fn open(
        connection: &Arc<Connection>,
        options: HandleOptions,
    ) -> Result<Self, PrinterError> {
        let languages = match sgd::get(connection, LANGUAGES_SETTING, &options.timeouts).await {
            Ok(value) => value,
            Err(SgdError::UnknownSetting(_)) => {
                return Err(PrinterError::UnknownDialect(format!(
                    "{} not reported",
                    LANGUAGES_SETTING
                )));
            }
            Err(e) => return Err(e.into()),
        };

        let dialect = Dialect::from_languages(&languages).ok_or_else(|| {
            warn!(languages = %languages, "Unsupported printer language");
            PrinterError::UnknownDialect(languages.clone())
        })?;

        info!(endpoint = %connection.endpoint(), dialect = %dialect, "🖨️ Printer language detected");
        Ok(Self::with_dialect(connection, dialect, options))
    }

    /// Build a handle for a printer whose dialect is already known
    pub fn with_dialect(connection: &Arc<Connection>, dialect: Dialect, options: HandleOptions) -> Self {
        Self {
            connection: Arc::downgrade(connection),
            dialect,
            options,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The connection, if it is still alive
    pub fn connection(&self) -> Option<Arc<Connection>> {
        self.connection.upgrade()
    }

    fn open_connection(&self) -> Result<Arc<Connection>, IoError> {
        self.connection
            .upgrade()
            .filter(|c| c.is_connected())
            .ok_or(IoError::NotConnected)
    }

    /// Query the printer's status flags. Never answers from a cache.
    pub async fn current_status(&self) -> Result<PrinterStatus, StatusError> {
        let connection = self.open_connection()?;
        let layouts = &self.options.layouts;
        let dialect = self.dialect;

        let mut guard = connection.acquire()?;
        guard.write_all(layouts.inquiry(dialect)).await?;
        let response = read_response(&mut guard, &self.options.timeouts, |bytes| {
            layouts.is_complete(dialect, bytes)
        })
        .await?;
        drop(guard);

        let status = layouts.decode(dialect, &response)?;
        debug!(
            head_open = status.is_head_open(),
            paper_out = status.is_paper_out(),
            paused = status.is_paused(),
            "Status decoded"
        );
        Ok(status)
    }

    /// Send command bytes untouched
    pub async fn send_raw(&self, bytes: &[u8]) -> Result<(), IoError> {
        self.open_connection()?.write_all(bytes).await
    }

    pub async fn get_setting(&self, name: &str) -> Result<String, SgdError> {
        let connection = self.open_connection()?;
        sgd::get(&connection, name, &self.options.timeouts).await
    }

    pub async fn set_setting(&self, name: &str, value: &str) -> Result<(), SgdError> {
        let connection = self.open_connection()?;
        sgd::set(&connection, name, value).await
    }

    pub async fn do_action(&self, name: &str, value: &str) -> Result<(), SgdError> {
        let connection = self.open_connection()?;
        sgd::execute(&connection, name, value).await
    }

    /// Like `get_setting`, but a setting the printer does not know is `None`
    async fn optional_setting(&self, name: &str) -> Result<Option<String>, SgdError> {
        match self.get_setting(name).await {
            Ok(value) => Ok(Some(value)),
            Err(SgdError::UnknownSetting(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Model, serial number, firmware and language of the printer
    pub async fn info(&self) -> Result<PrinterInfo, SgdError> {
        Ok(PrinterInfo {
            model: self.optional_setting(PRODUCT_NAME_SETTING).await?,
            serial_number: self.optional_setting(UNIQUE_ID_SETTING).await?,
            firmware: self.optional_setting(FIRMWARE_SETTING).await?,
            dialect: self.dialect,
        })
    }

    /// Status plus print head temperature when the printer reports one
    pub async fn status_report(&self) -> Result<StatusReport, PrinterError> {
        let status = self.current_status().await?;
        let temperature = self.optional_setting(HEAD_TEMPERATURE_SETTING).await?;
        Ok(StatusReport {
            status,
            temperature,
        })
    }
}
