use async_trait::async_trait;
use domain::transport::{Transport, TransportKind};
use domain::{ConnectError, IoError};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

/// Raw TCP socket to a network printer (port 9100 by default)
pub struct NetworkTransport {
    host: String,
    port: u16,
    stream: Option<TcpStream>,
    timeout: Duration,
}

impl NetworkTransport {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
            stream: None,
            timeout: Duration::from_secs(5),
        }
    }

    /// Bound on the connect attempt (resolution included)
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    fn on_io_error(&mut self, e: std::io::Error) -> IoError {
        let err = IoError::from(e);
        if err.is_disconnect() {
            warn!(endpoint = %self.address(), "Printer closed the connection");
            self.stream = None; // Invalidate connection
        }
        err
    }
}

#[async_trait]
impl Transport for NetworkTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Network
    }

    fn endpoint(&self) -> String {
        self.address()
    }

    async fn open(&mut self) -> Result<(), ConnectError> {
        if self.stream.is_some() {
            return Ok(());
        }
        if self.port == 0 {
            return Err(ConnectError::InvalidDescriptor(
                "Port must be between 1 and 65535".to_string(),
            ));
        }

        let address = self.address();
        info!(endpoint = %address, "Connecting to printer");
        match tokio::time::timeout(self.timeout, TcpStream::connect(&address)).await {
            Ok(Ok(stream)) => {
                if let Err(e) = stream.set_nodelay(true) {
                    debug!(error = %e, "Could not disable Nagle on printer socket");
                }
                info!(endpoint = %address, "Connected to printer");
                self.stream = Some(stream);
                Ok(())
            }
            Ok(Err(e)) => {
                warn!(endpoint = %address, error = %e, "Printer unreachable");
                Err(ConnectError::Unreachable(format!("{}: {}", address, e)))
            }
            Err(_) => {
                warn!(endpoint = %address, timeout = ?self.timeout, "Connection timed out");
                Err(ConnectError::Timeout)
            }
        }
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<usize, IoError> {
        let stream = self.stream.as_mut().ok_or(IoError::NotConnected)?;
        match stream.write(bytes).await {
            Ok(n) => Ok(n),
            Err(e) => Err(self.on_io_error(e)),
        }
    }

    async fn read(&mut self, buffer: &mut [u8]) -> Result<usize, IoError> {
        let stream = self.stream.as_mut().ok_or(IoError::NotConnected)?;
        match stream.read(buffer).await {
            Ok(0) if !buffer.is_empty() => {
                debug!(endpoint = %self.address(), "Orderly close from printer");
                self.stream = None;
                Ok(0)
            }
            Ok(n) => Ok(n),
            Err(e) => Err(self.on_io_error(e)),
        }
    }

    async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.flush().await;
            let _ = stream.shutdown().await;
            info!(endpoint = %self.address(), "Printer connection closed");
        }
    }

    fn release(&mut self) {
        self.stream = None;
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn listener() -> (TcpListener, u16) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        (listener, port)
    }

    #[tokio::test]
    async fn test_open_write_read_close() {
        let (listener, port) = listener().await;
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 3];
            socket.read_exact(&mut buf).await.unwrap();
            assert_eq!(&buf, b"~HS");
            socket.write_all(b"ack").await.unwrap();
        });

        let mut transport = NetworkTransport::new("127.0.0.1", port);
        transport.open().await.unwrap();
        assert!(transport.is_connected());

        assert_eq!(transport.write(b"~HS").await.unwrap(), 3);
        let mut buf = [0u8; 8];
        let n = transport.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"ack");

        server.await.unwrap();
        transport.close().await;
        assert!(!transport.is_connected());

        // second close is a no-op
        transport.close().await;
    }

    #[tokio::test]
    async fn test_orderly_remote_close_reads_zero() {
        let (listener, port) = listener().await;
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            drop(socket);
        });

        let mut transport = NetworkTransport::new("127.0.0.1", port);
        transport.open().await.unwrap();
        server.await.unwrap();

        let mut buf = [0u8; 8];
        assert_eq!(transport.read(&mut buf).await.unwrap(), 0);
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn test_refused_connection_is_unreachable() {
        let (listener, port) = listener().await;
        drop(listener);

        let mut transport = NetworkTransport::new("127.0.0.1", port);
        let result = transport.open().await;
        assert!(matches!(result, Err(ConnectError::Unreachable(_))));
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn test_io_before_open_is_not_connected() {
        let mut transport = NetworkTransport::new("127.0.0.1", 9100);
        assert_eq!(transport.write(b"x").await, Err(IoError::NotConnected));
        let mut buf = [0u8; 1];
        assert_eq!(transport.read(&mut buf).await, Err(IoError::NotConnected));
    }

    #[test]
    fn test_ipv6_endpoint_is_bracketed() {
        let transport = NetworkTransport::new("::1", 9100);
        assert_eq!(transport.endpoint(), "[::1]:9100");
        assert_eq!(transport.kind(), TransportKind::Network);
    }
}
