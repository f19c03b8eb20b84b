mod byte_stream;
mod connection_state;
mod descriptor;
mod transport_kind;

#[cfg(any(test, feature = "mock"))]
pub use byte_stream::MockTransport;
pub use byte_stream::Transport;
pub use connection_state::ConnectionState;
pub use descriptor::{DEFAULT_NETWORK_PORT, TransportDescriptor, is_valid_mac};
pub use transport_kind::TransportKind;
