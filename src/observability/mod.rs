//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce tracing events:
//!     → logging.rs (timestamped lines, flushed per event)
//!
//! Consumers:
//!     → Append-mode log file, or stdout when none is configured
//! ```
//!
//! # Design Decisions
//! - One line per event: startup, each accepted peer, each error
//! - Durability over throughput; the log is low traffic

pub mod logging;

pub use logging::{LogSink, LineFormat};
