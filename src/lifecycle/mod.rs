//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Open log → Load policy → Bind listener → (fork) → Start runtime
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Request shutdown
//!     SIGHUP → Log, nothing else
//!
//! Shutdown (shutdown.rs):
//!     Request recorded → Accept loop wakes → Logs once → Exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: a bad policy path fails before any port is bound
//! - An in-progress client write is never cancelled by shutdown
//! - No drain phase: there is at most one client in flight

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, StopSignal};
pub use startup::Exit;
