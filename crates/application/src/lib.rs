//! Application layer - connection lifecycle, printer handles and SGD exchanges

pub mod api;
pub mod connection;
pub mod printer;

pub use connection::{Connection, ConnectionGuard};
pub use printer::{HandleOptions, PrinterHandle, PrinterSession, ReadTimeouts, SessionClient};
