use async_trait::async_trait;
use domain::transport::{Transport, TransportKind};
use domain::{ConnectError, IoError};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// One scripted answer to a `read` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Hand out these bytes (split across reads if the buffer is small)
    Bytes(Vec<u8>),
    /// Orderly remote close: `read` returns 0
    Eof,
    /// Fail the read
    Error(IoError),
}

/// Transport that replays scripted replies and records everything written.
///
/// Clones share state, so a test can keep one clone for inspection while
/// the connection owns another. A read with nothing scripted never returns,
/// which lets callers exercise their own timeouts.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    pub sent_data: Arc<Mutex<Vec<u8>>>,
    replies: Arc<Mutex<VecDeque<Reply>>>,
    open_error: Arc<Mutex<Option<ConnectError>>>,
    connected: Arc<AtomicBool>,
    pub open_calls: Arc<AtomicUsize>,
    pub write_calls: Arc<AtomicUsize>,
    pub close_calls: Arc<AtomicUsize>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for a future `read`
    pub async fn push_reply(&self, reply: Reply) {
        self.replies.lock().await.push_back(reply);
    }

    pub async fn push_bytes(&self, bytes: &[u8]) {
        self.push_reply(Reply::Bytes(bytes.to_vec())).await;
    }

    /// Make every subsequent `open` fail with `error`
    pub async fn fail_open_with(&self, error: ConnectError) {
        *self.open_error.lock().await = Some(error);
    }

    pub fn opens(&self) -> usize {
        self.open_calls.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Simulator
    }

    fn endpoint(&self) -> String {
        "scripted".to_string()
    }

    async fn open(&mut self) -> Result<(), ConnectError> {
        self.open_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = self.open_error.lock().await.clone() {
            return Err(e);
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<usize, IoError> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        if !self.connected.load(Ordering::SeqCst) {
            return Err(IoError::NotConnected);
        }
        let mut data = self.sent_data.lock().await;
        data.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    async fn read(&mut self, buffer: &mut [u8]) -> Result<usize, IoError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(IoError::NotConnected);
        }

        let next = self.replies.lock().await.pop_front();
        match next {
            Some(Reply::Bytes(bytes)) => {
                let n = bytes.len().min(buffer.len());
                buffer[..n].copy_from_slice(&bytes[..n]);
                if n < bytes.len() {
                    self.replies
                        .lock()
                        .await
                        .push_front(Reply::Bytes(bytes[n..].to_vec()));
                }
                Ok(n)
            }
            Some(Reply::Eof) => {
                self.connected.store(false, Ordering::SeqCst);
                Ok(0)
            }
            Some(Reply::Error(e)) => {
                if e.is_disconnect() {
                    self.connected.store(false, Ordering::SeqCst);
                }
                Err(e)
            }
            None => std::future::pending().await,
        }
    }

    async fn close(&mut self) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.connected.store(false, Ordering::SeqCst);
    }

    fn release(&mut self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}
