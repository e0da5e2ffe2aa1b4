//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Every field has a default so an empty file is a valid config.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Port the policy is served on unless overridden.
pub const DEFAULT_PORT: u16 = 843;

/// Root configuration for the daemon.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DaemonConfig {
    /// What to serve and where.
    pub server: ServerConfig,

    /// Log destination and verbosity.
    pub logging: LoggingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// File whose bytes become the served payload. Required.
    pub policy_file: Option<PathBuf>,

    /// TCP port bound on all IPv4 interfaces.
    pub port: u16,

    /// Fork into the background after startup.
    pub daemonize: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            policy_file: None,
            port: DEFAULT_PORT,
            daemonize: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append log lines here; standard output when unset.
    pub file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: None,
            level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: DaemonConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert!(config.server.policy_file.is_none());
        assert!(!config.server.daemonize);
        assert!(config.logging.file.is_none());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: DaemonConfig = toml::from_str(
            r#"
            [server]
            policy_file = "/etc/pcfpd/crossdomain.xml"

            [logging]
            file = "/var/log/pcfpd.log"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.server.policy_file.as_deref(),
            Some(std::path::Path::new("/etc/pcfpd/crossdomain.xml"))
        );
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.logging.level, "info");
    }
}
