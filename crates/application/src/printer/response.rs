use std::time::Duration;

use domain::IoError;
use infrastructure::TimeoutConfig;
use tokio::time::{Instant, timeout};
use tracing::debug;

use crate::connection::ConnectionGuard;

const CHUNK: usize = 512;

/// Deadlines for collecting one response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadTimeouts {
    /// Silence after some bytes arrived that ends the response
    pub idle: Duration,
    /// Upper bound for the whole response
    pub window: Duration,
}

impl Default for ReadTimeouts {
    fn default() -> Self {
        Self::from(&TimeoutConfig::default())
    }
}

impl From<&TimeoutConfig> for ReadTimeouts {
    fn from(config: &TimeoutConfig) -> Self {
        Self {
            idle: config.read_idle(),
            window: config.read_window(),
        }
    }
}

/// Read until `complete` accepts the buffer or a deadline passes.
///
/// Returns whatever arrived, possibly incomplete, once the printer goes
/// quiet. Fails with `Timeout` only when nothing arrived at all.
pub async fn read_response<F>(
    guard: &mut ConnectionGuard<'_>,
    timeouts: &ReadTimeouts,
    complete: F,
) -> Result<Vec<u8>, IoError>
where
    F: Fn(&[u8]) -> bool,
{
    let deadline = Instant::now() + timeouts.window;
    let mut response = Vec::new();
    let mut chunk = [0u8; CHUNK];

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let wait = if response.is_empty() {
            remaining
        } else {
            remaining.min(timeouts.idle)
        };

        match timeout(wait, guard.read(&mut chunk)).await {
            Ok(Ok(n)) => {
                response.extend_from_slice(&chunk[..n]);
                if complete(&response) {
                    return Ok(response);
                }
            }
            Ok(Err(e)) => return Err(e),
            Err(_) if response.is_empty() => return Err(IoError::Timeout),
            Err(_) => {
                debug!(bytes = response.len(), "Response ended without terminator");
                return Ok(response);
            }
        }
    }
}
