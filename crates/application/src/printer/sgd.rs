//! SGD exchanges over an open connection.
//!
//! Nothing here retries: a failed exchange is reported as-is.

use domain::SgdError;
use domain::printer::SgdCommand;
use domain::printer::sgd::{parse_get_response, response_complete, split_lines, value_complete};
use tracing::debug;

use super::response::{ReadTimeouts, read_response};
use crate::connection::Connection;

/// Read a setting's value
pub async fn get(
    connection: &Connection,
    name: &str,
    timeouts: &ReadTimeouts,
) -> Result<String, SgdError> {
    let command = SgdCommand::get(name)?;

    let mut guard = connection.acquire()?;
    guard.write_all(&command.encode()).await?;
    // A printer that omits the line ending is cut off by the idle deadline
    let response = read_response(&mut guard, timeouts, response_complete).await?;

    if !value_complete(&response) {
        debug!(setting = %name, bytes = response.len(), "Incomplete SGD response");
        return Err(SgdError::Timeout);
    }

    let value = parse_get_response(name, &response)?;
    debug!(setting = %name, value = %value, "SGD get");
    Ok(value)
}

/// Read a multi-line setting as individual lines
pub async fn get_lines(
    connection: &Connection,
    name: &str,
    timeouts: &ReadTimeouts,
) -> Result<Vec<String>, SgdError> {
    let value = get(connection, name, timeouts).await?;
    Ok(split_lines(&value))
}

/// Change a setting. The printer does not acknowledge.
pub async fn set(connection: &Connection, name: &str, value: &str) -> Result<(), SgdError> {
    send(connection, SgdCommand::set(name, value)?).await
}

/// Run a device action (`do`). The printer does not acknowledge.
pub async fn execute(connection: &Connection, name: &str, value: &str) -> Result<(), SgdError> {
    send(connection, SgdCommand::action(name, value)?).await
}

async fn send(connection: &Connection, command: SgdCommand) -> Result<(), SgdError> {
    connection.write_all(&command.encode()).await?;
    debug!(setting = %command.name(), "SGD command sent");
    Ok(())
}
