//! Cross-domain policy file daemon library.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod policy;
pub mod server;

pub use config::DaemonConfig;
pub use error::DaemonError;
pub use lifecycle::Shutdown;
pub use policy::PolicyBuffer;
pub use server::PolicyServer;
