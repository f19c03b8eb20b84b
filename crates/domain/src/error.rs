use thiserror::Error;

/// Failures while establishing a transport connection
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    #[error("Printer unreachable: {0}")]
    Unreachable(String),

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Connection attempt timed out")]
    Timeout,

    #[error("Connection is in use by another caller")]
    Busy,

    #[error("Invalid transport descriptor: {0}")]
    InvalidDescriptor(String),
}

/// Byte-stream I/O failures on an open transport
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IoError {
    #[error("Remote end closed the connection")]
    Disconnected,

    #[error("I/O timed out")]
    Timeout,

    #[error("Short write: {written} of {expected} bytes sent")]
    ShortWrite { written: usize, expected: usize },

    #[error("Not connected")]
    NotConnected,

    #[error("Connection is in use by another caller")]
    Busy,

    #[error("I/O error: {0}")]
    Other(String),
}

impl IoError {
    /// Errors after which the transport can no longer be used
    pub fn is_disconnect(&self) -> bool {
        matches!(self, Self::Disconnected)
    }
}

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        use std::io::ErrorKind;
        match e.kind() {
            ErrorKind::BrokenPipe
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected
            | ErrorKind::UnexpectedEof => Self::Disconnected,
            ErrorKind::TimedOut | ErrorKind::WouldBlock => Self::Timeout,
            _ => Self::Other(e.to_string()),
        }
    }
}

/// Failures of a status inquiry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatusError {
    #[error("Not connected")]
    NotConnected,

    #[error("Unparseable status response: {0}")]
    Unparseable(String),

    #[error("Status inquiry timed out")]
    Timeout,

    #[error(transparent)]
    Io(IoError),
}

impl From<IoError> for StatusError {
    fn from(e: IoError) -> Self {
        match e {
            IoError::Disconnected | IoError::NotConnected => Self::NotConnected,
            IoError::Timeout => Self::Timeout,
            other => Self::Io(other),
        }
    }
}

/// Failures of an SGD (Set-Get-Do) exchange
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SgdError {
    #[error("SGD response timed out")]
    Timeout,

    #[error("Unknown setting: {0}")]
    UnknownSetting(String),

    #[error("Not connected")]
    NotConnected,

    #[error("Invalid SGD argument: {0}")]
    InvalidArgument(String),

    #[error("Malformed SGD response: {0}")]
    Malformed(String),

    #[error(transparent)]
    Io(IoError),
}

impl From<IoError> for SgdError {
    fn from(e: IoError) -> Self {
        match e {
            IoError::Disconnected | IoError::NotConnected => Self::NotConnected,
            IoError::Timeout => Self::Timeout,
            other => Self::Io(other),
        }
    }
}

/// Umbrella error for the public printer operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrinterError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error(transparent)]
    Io(#[from] IoError),

    #[error(transparent)]
    Status(#[from] StatusError),

    #[error(transparent)]
    Sgd(#[from] SgdError),

    #[error("Unknown printer dialect: {0}")]
    UnknownDialect(String),

    #[error("Printer session has shut down")]
    SessionClosed,
}
