//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (port non-zero, known log level)
//! - Check that required values ended up set after CLI overrides
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DaemonConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;

use crate::config::schema::DaemonConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem with a configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required policy file (-f)")]
    MissingPolicyFile,

    #[error("invalid port 0")]
    ZeroPort,

    #[error("unknown log level {0:?}")]
    UnknownLogLevel(String),
}

/// Check a merged configuration before startup uses it.
pub fn validate_config(config: &DaemonConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.policy_file.is_none() {
        errors.push(ValidationError::MissingPolicyFile);
    }

    if config.server.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(config.logging.level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
