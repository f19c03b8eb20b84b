//! Operations exposed to printing applications.
//!
//! Settings and raw sends take the connection returned by [`connect`].
//! Status and info take the [`PrinterHandle`] from [`open_printer`], which
//! holds the dialect detected when it was built.

use std::sync::Arc;

use domain::{
    ConnectError, IoError, PrinterError, PrinterInfo, PrinterStatus, SgdError, StatusError,
    TransportDescriptor,
};
use infrastructure::{AppConfig, TransportFactory};

use crate::connection::Connection;
use crate::printer::{HandleOptions, PrinterHandle, ReadTimeouts, sgd};

/// Build the transport for `descriptor` and open it
pub async fn connect(
    descriptor: &TransportDescriptor,
    config: &AppConfig,
) -> Result<Arc<Connection>, ConnectError> {
    let transport = TransportFactory::create(descriptor, config)?;
    let connection = Arc::new(Connection::new(transport));
    connection.open().await?;
    Ok(connection)
}

/// Probe the printer behind `connection` and return a handle to it
pub async fn open_printer(
    connection: &Arc<Connection>,
    config: &AppConfig,
) -> Result<PrinterHandle, PrinterError> {
    PrinterHandle::open(connection, HandleOptions::from(config)).await
}

/// Query the printer's current status flags
pub async fn get_status(printer: &PrinterHandle) -> Result<PrinterStatus, StatusError> {
    printer.current_status().await
}

pub async fn get_setting(
    connection: &Connection,
    name: &str,
    config: &AppConfig,
) -> Result<String, SgdError> {
    sgd::get(connection, name, &ReadTimeouts::from(&config.timeouts)).await
}

pub async fn set_setting(connection: &Connection, name: &str, value: &str) -> Result<(), SgdError> {
    sgd::set(connection, name, value).await
}

pub async fn do_action(connection: &Connection, name: &str, value: &str) -> Result<(), SgdError> {
    sgd::execute(connection, name, value).await
}

pub async fn send_raw(connection: &Connection, bytes: &[u8]) -> Result<(), IoError> {
    connection.write_all(bytes).await
}

pub async fn printer_info(printer: &PrinterHandle) -> Result<PrinterInfo, SgdError> {
    printer.info().await
}

pub async fn disconnect(connection: &Connection) {
    connection.close().await;
}
