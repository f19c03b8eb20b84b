mod handle;
pub mod response;
pub mod sgd;
mod session;

pub use handle::{HandleOptions, PrinterHandle};
pub use response::ReadTimeouts;
pub use session::{PrinterSession, SessionClient, SessionCommand};
