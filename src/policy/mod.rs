//! Policy document storage.
//!
//! # Data Flow
//! ```text
//! policy file on disk
//!     → buffer.rs (bounded read, once, at startup)
//!     → PolicyBuffer (immutable)
//!     → borrowed by every connection handler
//! ```
//!
//! # Design Decisions
//! - The document is opaque bytes; nothing parses it
//! - Capacity is fixed, so memory use does not depend on the file
//! - There is no reload path

pub mod buffer;

pub use buffer::{PolicyBuffer, PolicyError, MAX_POLICY_LEN};
