//! OS signal handling.
//!
//! # Responsibilities
//! - Register handlers for SIGINT, SIGTERM and SIGHUP
//! - Translate termination signals into a shutdown request
//! - Log and otherwise ignore SIGHUP (the policy is never reloaded)
//!
//! # Design Decisions
//! - Uses Tokio's signal handling; nothing runs in async-signal context
//! - Termination is logged by the accept loop, once, when it observes it
//! - SIGPIPE needs no handler: the Rust runtime ignores it, so a vanished
//!   peer surfaces as a write error

use std::io;

use tokio::signal::unix::{signal, SignalKind};
use tokio::task::JoinHandle;

use crate::lifecycle::shutdown::{Shutdown, StopSignal};

/// Register signal handlers and spawn the task that services them.
///
/// Registration happens before this returns, so a signal delivered right
/// after is already routed to `shutdown`. Must run inside a runtime.
pub fn install(shutdown: Shutdown) -> io::Result<JoinHandle<()>> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    Ok(tokio::spawn(async move {
        loop {
            tokio::select! {
                Some(()) = sigint.recv() => {
                    shutdown.trigger(StopSignal::Interrupt);
                }
                Some(()) = sigterm.recv() => {
                    shutdown.trigger(StopSignal::Terminate);
                }
                Some(()) = sighup.recv() => {
                    tracing::info!("caught SIGHUP, ignoring");
                }
                else => break,
            }
        }
    }))
}
