//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (bind, listen, accept)
//!     → connection.rs (write whole policy, close)
//! ```
//!
//! # Design Decisions
//! - Backlog of 5; the kernel queues clients while one is being served
//! - Address reuse is best-effort
//! - The protocol is write-only: clients are never read from

pub mod connection;
pub mod listener;

pub use connection::{serve, ServeOutcome};
pub use listener::{Acceptor, BoundListener, Listener, ListenerError};
