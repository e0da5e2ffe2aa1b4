//! Shutdown coordination for the daemon.

use std::sync::Arc;
use tokio::sync::watch;

/// Termination request that stops the accept loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSignal {
    Interrupt,
    Terminate,
}

impl StopSignal {
    pub fn name(&self) -> &'static str {
        match self {
            StopSignal::Interrupt => "SIGINT",
            StopSignal::Terminate => "SIGTERM",
        }
    }
}

impl std::fmt::Display for StopSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Coordinator for graceful shutdown.
///
/// Records the first stop request only; later requests are no-ops. The
/// requester never logs; whoever observes the request does.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<Option<StopSignal>>>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Request shutdown. Returns `true` if this was the first request.
    pub fn trigger(&self, signal: StopSignal) -> bool {
        self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(signal);
            true
        })
    }

    /// The pending stop request, if any.
    #[cfg(test)]
    pub fn requested(&self) -> Option<StopSignal> {
        *self.tx.borrow()
    }

    /// Resolve once shutdown has been requested.
    pub async fn wait(&self) -> StopSignal {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close under us.
        let observed = rx.wait_for(Option::is_some).await.map(|signal| *signal);
        match observed {
            Ok(Some(signal)) => signal,
            _ => std::future::pending().await,
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
