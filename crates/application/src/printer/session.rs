use std::sync::Arc;

use domain::{IoError, PrinterError, PrinterInfo, PrinterStatus, SgdError, StatusError};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::handle::PrinterHandle;
use crate::connection::Connection;

const QUEUE_DEPTH: usize = 32;

/// Requests served by a session worker, each with its own reply channel
#[derive(Debug)]
pub enum SessionCommand {
    Status {
        reply: oneshot::Sender<Result<PrinterStatus, StatusError>>,
    },
    GetSetting {
        name: String,
        reply: oneshot::Sender<Result<String, SgdError>>,
    },
    SetSetting {
        name: String,
        value: String,
        reply: oneshot::Sender<Result<(), SgdError>>,
    },
    SendRaw {
        bytes: Vec<u8>,
        reply: oneshot::Sender<Result<(), IoError>>,
    },
    Info {
        reply: oneshot::Sender<Result<PrinterInfo, SgdError>>,
    },
    Shutdown,
}

/// Worker task that owns a printer and runs its requests one at a time
pub struct PrinterSession {
    connection: Arc<Connection>,
    handle: PrinterHandle,
    commands: mpsc::Receiver<SessionCommand>,
    cancel_token: CancellationToken,
}

impl PrinterSession {
    /// Start the worker. It stops on `Shutdown`, on cancellation, or when
    /// every client is dropped, and closes the connection on the way out.
    pub fn spawn(
        connection: Arc<Connection>,
        handle: PrinterHandle,
    ) -> (SessionClient, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        let cancel_token = CancellationToken::new();

        let session = Self {
            connection,
            handle,
            commands: rx,
            cancel_token: cancel_token.clone(),
        };
        let task = tokio::spawn(session.run());

        (SessionClient { tx, cancel_token }, task)
    }

    async fn run(mut self) {
        info!(endpoint = %self.connection.endpoint(), "🖨️ Printer session started");

        loop {
            tokio::select! {
                _ = self.cancel_token.cancelled() => {
                    debug!("Session cancelled");
                    break;
                }
                command = self.commands.recv() => {
                    match command {
                        Some(SessionCommand::Shutdown) | None => break,
                        Some(command) => self.serve(command).await,
                    }
                }
            }
        }

        self.connection.close().await;
        info!(endpoint = %self.connection.endpoint(), "🖨️ Printer session stopped");
    }

    async fn serve(&self, command: SessionCommand) {
        // A caller that gave up waiting has dropped its receiver; nothing to do
        match command {
            SessionCommand::Status { reply } => {
                let _ = reply.send(self.handle.current_status().await);
            }
            SessionCommand::GetSetting { name, reply } => {
                let _ = reply.send(self.handle.get_setting(&name).await);
            }
            SessionCommand::SetSetting { name, value, reply } => {
                let _ = reply.send(self.handle.set_setting(&name, &value).await);
            }
            SessionCommand::SendRaw { bytes, reply } => {
                let _ = reply.send(self.handle.send_raw(&bytes).await);
            }
            SessionCommand::Info { reply } => {
                let _ = reply.send(self.handle.info().await);
            }
            SessionCommand::Shutdown => {}
        }
    }
}

/// Cloneable caller side of a `PrinterSession`
#[derive(Clone)]
pub struct SessionClient {
    tx: mpsc::Sender<SessionCommand>,
    cancel_token: CancellationToken,
}

impl SessionClient {
    async fn request<T, E>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T, E>>) -> SessionCommand,
    ) -> Result<T, PrinterError>
    where
        PrinterError: From<E>,
    {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| PrinterError::SessionClosed)?;
        let result = rx.await.map_err(|_| PrinterError::SessionClosed)?;
        result.map_err(PrinterError::from)
    }

    pub async fn status(&self) -> Result<PrinterStatus, PrinterError> {
        self.request(|reply| SessionCommand::Status { reply }).await
    }

    pub async fn get_setting(&self, name: &str) -> Result<String, PrinterError> {
        let name = name.to_string();
        self.request(|reply| SessionCommand::GetSetting { name, reply })
            .await
    }

    pub async fn set_setting(&self, name: &str, value: &str) -> Result<(), PrinterError> {
        let (name, value) = (name.to_string(), value.to_string());
        self.request(|reply| SessionCommand::SetSetting { name, value, reply })
            .await
    }

    pub async fn send_raw(&self, bytes: Vec<u8>) -> Result<(), PrinterError> {
        self.request(|reply| SessionCommand::SendRaw { bytes, reply })
            .await
    }

    pub async fn info(&self) -> Result<PrinterInfo, PrinterError> {
        self.request(|reply| SessionCommand::Info { reply }).await
    }

    /// Ask the worker to stop after the requests already queued
    pub async fn shutdown(&self) {
        if self.tx.send(SessionCommand::Shutdown).await.is_err() {
            debug!("Session already stopped");
        }
    }

    /// Stop the worker without draining the queue
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
