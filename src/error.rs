//! Error types for the policy daemon.

use thiserror::Error;

use crate::config::loader::ConfigError;
use crate::net::listener::ListenerError;
use crate::policy::PolicyError;

/// Result type alias for daemon operations.
pub type Result<T> = std::result::Result<T, DaemonError>;

/// Top-level error. Every variant ends the process with a nonzero status.
#[derive(Error, Debug)]
pub enum DaemonError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to read policy file: {0}")]
    Policy(#[from] PolicyError),

    #[error("failed to create listener: {0}")]
    Listener(#[from] ListenerError),

    #[error("daemonize failed: {0}")]
    Daemonize(#[source] nix::Error),

    #[error("failed to detach standard descriptors: {0}")]
    Detach(#[source] std::io::Error),

    #[error("failed to install signal handlers: {0}")]
    Signals(#[source] std::io::Error),

    #[error("failed to start runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("accept loop stopped: {0}")]
    Accept(#[source] std::io::Error),
}
