//! Domain layer - printer communication model with no I/O
//!
//! This crate contains:
//! - Error taxonomy (connect, I/O, status, SGD)
//! - Transport contract (trait) and transport descriptors
//! - Printer status model and per-dialect status layouts
//! - SGD command framing and response parsing
//!
//! Principles:
//! - No dependencies on infrastructure
//! - Pure, testable parsing and framing
//! - Failures are typed, never defaulted

pub mod error;
pub mod printer;
pub mod transport;

// Re-export commonly used types
pub use error::{ConnectError, IoError, PrinterError, SgdError, StatusError};
pub use printer::{Dialect, PrinterInfo, PrinterStatus, StatusLayouts};
pub use transport::{ConnectionState, Transport, TransportDescriptor, TransportKind};
