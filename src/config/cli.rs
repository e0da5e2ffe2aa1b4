//! Command-line arguments.

use clap::Parser;
use std::path::PathBuf;

use crate::config::loader::{finalize_config, load_config, ConfigError};
use crate::config::schema::{DaemonConfig, DEFAULT_PORT};

/// Serve a cross-domain policy file to every TCP client, then hang up.
#[derive(Parser, Debug, Clone)]
#[command(name = "pcfpd")]
#[command(version, about, long_about = None)]
#[command(after_help = format!("Default port is {}", DEFAULT_PORT))]
#[command(override_usage = "pcfpd -f POLICY [-p PORT] [-d] [-l FILE] [-c CONFIG]")]
#[command(args_override_self = true)]
pub struct Args {
    /// Policy file to serve.
    #[arg(short = 'f', value_name = "POLICY")]
    pub policy: Option<PathBuf>,

    /// TCP port to listen on.
    #[arg(short = 'p', value_name = "PORT")]
    pub port: Option<u16>,

    /// Fork into the background.
    #[arg(short = 'd')]
    pub daemonize: bool,

    /// Append log lines to FILE instead of standard output.
    #[arg(short = 'l', value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// TOML configuration file. Flags override its values.
    #[arg(short = 'c', value_name = "CONFIG")]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Merge the optional config file with flag overrides and validate.
    pub fn into_config(self) -> Result<DaemonConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => DaemonConfig::default(),
        };

        if let Some(policy) = self.policy {
            config.server.policy_file = Some(policy);
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.daemonize {
            config.server.daemonize = true;
        }
        if let Some(log_file) = self.log_file {
            config.logging.file = Some(log_file);
        }

        finalize_config(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validation::ValidationError;
    use std::io::Write;

    fn parse(argv: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("pcfpd").chain(argv.iter().copied()))
    }

    #[test]
    fn minimal_invocation_uses_default_port() {
        let config = parse(&["-f", "policy.xml"]).unwrap().into_config().unwrap();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(
            config.server.policy_file.as_deref(),
            Some(std::path::Path::new("policy.xml"))
        );
        assert!(!config.server.daemonize);
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn all_flags() {
        let config = parse(&["-f", "p.xml", "-p", "8430", "-d", "-l", "/tmp/pcfpd.log"])
            .unwrap()
            .into_config()
            .unwrap();
        assert_eq!(config.server.port, 8430);
        assert!(config.server.daemonize);
        assert_eq!(
            config.logging.file.as_deref(),
            Some(std::path::Path::new("/tmp/pcfpd.log"))
        );
    }

    #[test]
    fn missing_policy_is_rejected() {
        let err = parse(&["-p", "8430"]).unwrap().into_config().unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert_eq!(errors, vec![ValidationError::MissingPolicyFile])
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn zero_port_is_rejected() {
        let err = parse(&["-f", "p.xml", "-p", "0"]).unwrap().into_config().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e == &[ValidationError::ZeroPort]));
    }

    #[test]
    fn garbage_port_and_unknown_flag_fail_to_parse() {
        assert!(parse(&["-f", "p.xml", "-p", "http"]).is_err());
        assert!(parse(&["-f", "p.xml", "-x"]).is_err());
    }

    #[test]
    fn flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\npolicy_file = \"from-file.xml\"\nport = 9000\n\n[logging]\nlevel = \"debug\""
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config = parse(&["-c", &path, "-p", "8430"]).unwrap().into_config().unwrap();
        assert_eq!(config.server.port, 8430);
        assert_eq!(
            config.server.policy_file.as_deref(),
            Some(std::path::Path::new("from-file.xml"))
        );
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn repeated_flags_keep_the_last_value() {
        let config = parse(&["-f", "a.xml", "-f", "b.xml", "-p", "900", "-p", "8430"])
            .unwrap()
            .into_config()
            .unwrap();
        assert_eq!(
            config.server.policy_file.as_deref(),
            Some(std::path::Path::new("b.xml"))
        );
        assert_eq!(config.server.port, 8430);
    }

    #[test]
    fn usage_names_required_policy_flag() {
        use clap::CommandFactory;

        let usage = Args::command().render_usage().to_string();
        assert!(
            usage.contains("pcfpd -f POLICY [-p PORT] [-d] [-l FILE] [-c CONFIG]"),
            "usage: {}",
            usage
        );
    }
}
