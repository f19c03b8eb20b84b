use std::sync::{Mutex as StdMutex, MutexGuard as StdGuard, PoisonError};

use domain::transport::{ConnectionState, Transport, TransportKind};
use domain::{ConnectError, IoError, PrinterError};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Lifecycle wrapper that exclusively owns one transport.
///
/// Every operation takes the transport without waiting: a second caller
/// racing an in-flight exchange gets `Busy` instead of interleaving bytes.
pub struct Connection {
    kind: TransportKind,
    endpoint: String,
    transport: Mutex<Box<dyn Transport>>,
    state: StdMutex<ConnectionState>,
    last_error: StdMutex<Option<PrinterError>>,
}

impl Connection {
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self {
            kind: transport.kind(),
            endpoint: transport.endpoint(),
            transport: Mutex::new(transport),
            state: StdMutex::new(ConnectionState::default()),
            last_error: StdMutex::new(None),
        }
    }

    pub fn kind(&self) -> TransportKind {
        self.kind
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn state(&self) -> ConnectionState {
        *self.lock_state()
    }

    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Most recent failure seen on this connection, if any
    pub fn last_error(&self) -> Option<PrinterError> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn lock_state(&self) -> StdGuard<'_, ConnectionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: ConnectionState) {
        *self.lock_state() = state;
    }

    fn record(&self, error: impl Into<PrinterError>) {
        *self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(error.into());
    }

    /// Open the transport. Already open is a no-op.
    pub async fn open(&self) -> Result<(), ConnectError> {
        let mut transport = self.transport.try_lock().map_err(|_| ConnectError::Busy)?;

        if self.is_connected() && transport.is_connected() {
            debug!(endpoint = %self.endpoint, "Connection already open");
            return Ok(());
        }

        // A stale Connected state (transport dropped underneath) reopens too
        self.set_state(ConnectionState::Connecting);

        match transport.open().await {
            Ok(()) => {
                self.set_state(ConnectionState::Connected);
                info!(kind = %self.kind, endpoint = %self.endpoint, "✅ Connection open");
                Ok(())
            }
            Err(e) => {
                self.set_state(ConnectionState::Failed);
                warn!(kind = %self.kind, endpoint = %self.endpoint, error = %e, "❌ Connection failed");
                self.record(e.clone());
                Err(e)
            }
        }
    }

    /// Take exclusive use of the transport for one request/response exchange
    pub fn acquire(&self) -> Result<ConnectionGuard<'_>, IoError> {
        if !self.is_connected() {
            return Err(IoError::NotConnected);
        }
        let transport = self.transport.try_lock().map_err(|_| IoError::Busy)?;
        Ok(ConnectionGuard {
            connection: self,
            transport,
        })
    }

    pub async fn write(&self, bytes: &[u8]) -> Result<usize, IoError> {
        self.acquire()?.write(bytes).await
    }

    /// Write every byte or fail
    pub async fn write_all(&self, bytes: &[u8]) -> Result<(), IoError> {
        self.acquire()?.write_all(bytes).await
    }

    pub async fn read(&self, buffer: &mut [u8]) -> Result<usize, IoError> {
        self.acquire()?.read(buffer).await
    }

    /// Close the transport. Safe to call any number of times.
    pub async fn close(&self) {
        let mut transport = self.transport.lock().await;
        if self.is_connected() || transport.is_connected() {
            transport.close().await;
            info!(endpoint = %self.endpoint, "🔌 Connection closed");
        }
        self.set_state(ConnectionState::Disconnected);
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("kind", &self.kind)
            .field("endpoint", &self.endpoint)
            .field("state", &self.state())
            .finish()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        let connected = self.is_connected();
        let transport = self.transport.get_mut();
        if connected || transport.is_connected() {
            debug!(endpoint = %self.endpoint, "Releasing connection still open at drop");
            transport.release();
        }
    }
}

/// Exclusive access to an open connection's transport
pub struct ConnectionGuard<'a> {
    connection: &'a Connection,
    transport: MutexGuard<'a, Box<dyn Transport>>,
}

impl ConnectionGuard<'_> {
    fn check_open(&self) -> Result<(), IoError> {
        if self.connection.is_connected() {
            Ok(())
        } else {
            Err(IoError::NotConnected)
        }
    }

    /// Record the failure; a dropped link closes the connection
    async fn fail(&mut self, error: IoError) -> IoError {
        self.connection.record(error.clone());
        if error.is_disconnect() {
            warn!(endpoint = %self.connection.endpoint, "⚠️ Printer disconnected");
            self.transport.close().await;
            self.connection.set_state(ConnectionState::Disconnected);
        }
        error
    }

    pub async fn write(&mut self, bytes: &[u8]) -> Result<usize, IoError> {
        self.check_open()?;
        match self.transport.write(bytes).await {
            Ok(n) => Ok(n),
            Err(e) => Err(self.fail(e).await),
        }
    }

    pub async fn write_all(&mut self, bytes: &[u8]) -> Result<(), IoError> {
        let mut written = 0;
        while written < bytes.len() {
            let n = self.write(&bytes[written..]).await?;
            if n == 0 {
                let e = IoError::ShortWrite {
                    written,
                    expected: bytes.len(),
                };
                return Err(self.fail(e).await);
            }
            written += n;
        }
        debug!(endpoint = %self.connection.endpoint, bytes = written, "Sent");
        Ok(())
    }

    /// Read into `buffer`. An orderly remote close is reported as `Disconnected`.
    pub async fn read(&mut self, buffer: &mut [u8]) -> Result<usize, IoError> {
        self.check_open()?;
        match self.transport.read(buffer).await {
            Ok(0) if !buffer.is_empty() => Err(self.fail(IoError::Disconnected).await),
            Ok(n) => Ok(n),
            Err(e) => Err(self.fail(e).await),
        }
    }
}
