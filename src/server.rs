//! The accept loop.
//!
//! # Responsibilities
//! - Accept clients one at a time, in arrival order
//! - Log each peer and hand it the policy before accepting the next
//! - Classify accept failures as transient (keep going) or fatal (stop)
//! - Stop when shutdown is requested, logging the reason once

use std::io;

use crate::lifecycle::shutdown::{Shutdown, StopSignal};
use crate::net::connection::serve;
use crate::net::listener::{Acceptor, Listener};
use crate::observability::logging::{log_os_error, log_peer};
use crate::policy::PolicyBuffer;

/// Why the accept loop returned.
#[derive(Debug)]
pub enum StopReason {
    /// A termination signal was observed.
    Signal(StopSignal),
    /// `accept` failed with a non-transient error.
    AcceptFailed(io::Error),
}

/// Serves one policy document on one listener.
pub struct PolicyServer<A = Listener> {
    acceptor: A,
    policy: PolicyBuffer,
}

impl<A: Acceptor> PolicyServer<A> {
    pub fn new(acceptor: A, policy: PolicyBuffer) -> Self {
        Self { acceptor, policy }
    }

    /// Run until shutdown is requested or accept fails fatally.
    ///
    /// A client being served is never interrupted; shutdown is only
    /// observed while waiting for the next connection.
    pub async fn run(self, shutdown: Shutdown) -> StopReason {
        tracing::debug!(policy_len = self.policy.len(), "Accept loop starting");

        loop {
            let accepted = tokio::select! {
                biased;
                signal = shutdown.wait() => {
                    tracing::info!("caught {}, shutting down", signal);
                    return StopReason::Signal(signal);
                }
                result = self.acceptor.accept() => result,
            };

            match accepted {
                Ok((conn, peer)) => {
                    log_peer(peer);
                    serve(conn, &self.policy).await;
                }
                Err(e) => {
                    log_os_error("accept", &e);
                    if is_transient(&e) {
                        continue;
                    }
                    return StopReason::AcceptFailed(e);
                }
            }
        }
    }
}

/// Accept errors the loop retries instead of stopping on.
pub fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
    )
}
