//! Per-client policy delivery.
//!
//! # Responsibilities
//! - Write the whole policy buffer, resuming after partial writes
//! - Abandon the client on a failed or zero-length write
//! - Close the connection afterwards, whatever happened
//!
//! Nothing is ever read from the client.

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::observability::logging::log_os_error;
use crate::policy::PolicyBuffer;

/// How delivery to one client ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeOutcome {
    /// Every byte was handed to the kernel.
    Complete { sent: usize },
    /// A write returned an error; the rest of the payload was dropped.
    WriteFailed { sent: usize },
    /// A write accepted zero bytes with data still pending.
    WriteZero { sent: usize },
}

impl ServeOutcome {
    pub fn sent(&self) -> usize {
        match *self {
            ServeOutcome::Complete { sent }
            | ServeOutcome::WriteFailed { sent }
            | ServeOutcome::WriteZero { sent } => sent,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, ServeOutcome::Complete { .. })
    }
}

/// Write the policy to `conn`, then close it.
pub async fn serve<W>(mut conn: W, policy: &PolicyBuffer) -> ServeOutcome
where
    W: AsyncWrite + Unpin,
{
    let outcome = write_policy(&mut conn, policy.as_bytes()).await;

    if !outcome.is_complete() {
        tracing::debug!(sent = outcome.sent(), total = policy.len(), "Client abandoned");
    }

    // Close regardless; a peer that already left makes shutdown fail, which is fine.
    let _ = conn.shutdown().await;
    drop(conn);

    outcome
}

async fn write_policy<W>(conn: &mut W, data: &[u8]) -> ServeOutcome
where
    W: AsyncWrite + Unpin,
{
    let mut sent = 0;

    while sent < data.len() {
        match conn.write(&data[sent..]).await {
            Ok(0) => {
                tracing::warn!(sent, "Wrote 0 bytes?");
                return ServeOutcome::WriteZero { sent };
            }
            Ok(n) => sent += n,
            Err(e) => {
                log_os_error("write", &e);
                return ServeOutcome::WriteFailed { sent };
            }
        }
    }

    ServeOutcome::Complete { sent }
}
