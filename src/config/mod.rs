//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → cli.rs (flag overrides: -f -p -d -l)
//!     → validation.rs (semantic checks)
//!     → DaemonConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde/clap) from semantic checks

pub mod cli;
pub mod loader;
pub mod schema;
pub mod validation;

pub use cli::Args;
pub use loader::ConfigError;
pub use schema::{DaemonConfig, LoggingConfig, ServerConfig, DEFAULT_PORT};
