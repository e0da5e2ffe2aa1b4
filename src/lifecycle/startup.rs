//! Startup orchestration.
//!
//! # Responsibilities
//! - Open the log, load the policy, bind the listener (in that order)
//! - Optionally fork into the background
//! - Start the runtime, install signal handling, run the accept loop
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal and nothing is served
//! - The policy is loaded before binding, so a bad path never binds a port
//! - The fork happens before any runtime thread exists

use std::fs::OpenOptions;
use std::os::fd::AsRawFd;

use nix::libc;
use nix::unistd::{dup2, fork, setsid, ForkResult, Pid};

use crate::config::validation::ValidationError;
use crate::config::{ConfigError, DaemonConfig};
use crate::error::{DaemonError, Result};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals;
use crate::net::listener::BoundListener;
use crate::observability::logging;
use crate::policy::{PolicyBuffer, MAX_POLICY_LEN};
use crate::server::{PolicyServer, StopReason};

/// How `run` ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// The accept loop stopped on a termination signal.
    Stopped,
    /// This is the parent of a daemonized child; it should exit now.
    Detached(Pid),
}

/// Drive the daemon from a validated config until it stops.
pub fn run(config: DaemonConfig) -> Result<Exit> {
    logging::init(&config.logging);

    let policy_path = config
        .server
        .policy_file
        .as_deref()
        .ok_or_else(|| {
            DaemonError::Config(ConfigError::Validation(vec![
                ValidationError::MissingPolicyFile,
            ]))
        })?;

    let policy = PolicyBuffer::load(policy_path)?;
    if policy.is_truncated() {
        tracing::warn!(
            "policy file {} exceeds {} bytes, serving the first {}",
            policy_path.display(),
            MAX_POLICY_LEN,
            MAX_POLICY_LEN
        );
    }

    let listener = BoundListener::bind_and_listen(config.server.port)?;
    tracing::info!(
        "serving {} ({} bytes) on port {}",
        policy_path.display(),
        policy.len(),
        config.server.port
    );

    if config.server.daemonize {
        if let Some(child) = daemonize()? {
            return Ok(Exit::Detached(child));
        }
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(DaemonError::Runtime)?;

    runtime.block_on(serve_until_stopped(listener, policy))
}

/// Listening state: signals installed, accept loop running.
async fn serve_until_stopped(listener: BoundListener, policy: PolicyBuffer) -> Result<Exit> {
    let listener = listener.into_async()?;
    let shutdown = Shutdown::new();
    signals::install(shutdown.clone()).map_err(DaemonError::Signals)?;

    let reason = PolicyServer::new(listener, policy).run(shutdown).await;
    tracing::info!("pcfpd stopped");

    exit_for(reason)
}

/// A signal-driven stop is success; a fatal accept error exits non-zero.
fn exit_for(reason: StopReason) -> Result<Exit> {
    match reason {
        StopReason::Signal(_) => Ok(Exit::Stopped),
        StopReason::AcceptFailed(e) => Err(DaemonError::Accept(e)),
    }
}

/// Fork and detach. Returns the child's pid in the parent, `None` in the child.
fn daemonize() -> Result<Option<Pid>> {
    // SAFETY: no runtime has been built and no threads have been spawned,
    // so the child starts from a consistent single-threaded state.
    match unsafe { fork() }.map_err(DaemonError::Daemonize)? {
        ForkResult::Parent { child } => Ok(Some(child)),
        ForkResult::Child => {
            setsid().map_err(DaemonError::Daemonize)?;
            detach_stdio()?;
            Ok(None)
        }
    }
}

/// Point stdin, stdout and stderr at /dev/null.
fn detach_stdio() -> Result<()> {
    let devnull = OpenOptions::new()
        .read(true)
        .write(true)
        .open("/dev/null")
        .map_err(DaemonError::Detach)?;

    for fd in [libc::STDIN_FILENO, libc::STDOUT_FILENO, libc::STDERR_FILENO] {
        dup2(devnull.as_raw_fd(), fd).map_err(DaemonError::Daemonize)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::shutdown::StopSignal;
    use std::io;

    #[test]
    fn signal_stop_is_clean_exit() {
        let exit = exit_for(StopReason::Signal(StopSignal::Terminate)).unwrap();
        assert_eq!(exit, Exit::Stopped);
    }

    #[test]
    fn fatal_accept_error_is_failure() {
        let reason = StopReason::AcceptFailed(io::Error::from_raw_os_error(24));
        match exit_for(reason) {
            Err(DaemonError::Accept(e)) => assert_eq!(e.raw_os_error(), Some(24)),
            other => panic!("expected accept failure, got {:?}", other),
        }
    }
}
