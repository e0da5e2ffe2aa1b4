//! Cross-domain policy file daemon.
//!
//! Every client that connects receives the same policy document, byte for
//! byte, and is then disconnected. Nothing is read from the client.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌───────────────────────────────────────────────┐
//!                    │                    PCFPD                      │
//!                    │                                               │
//!   TCP client ──────┼─▶ net::listener ──▶ server ──▶ net::connection│
//!                    │    (0.0.0.0:843)   (accept     (write policy, │
//!   ◀── policy, EOF ─┼─────────────────── loop)       close)         │
//!                    │                      ▲              │         │
//!                    │                      │              ▼         │
//!                    │   lifecycle ─────────┘        policy::buffer  │
//!                    │   (startup, signals,          (≤ 64 KiB,      │
//!                    │    shutdown)                   loaded once)   │
//!                    │                                               │
//!                    │   config (flags + TOML)   observability (log) │
//!                    └───────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```bash
//! pcfpd -f /etc/pcfpd/crossdomain.xml
//! pcfpd -f crossdomain.xml -p 8430 -l /var/log/pcfpd.log -d
//! pcfpd -c /etc/pcfpd/pcfpd.toml
//! ```

use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use pcfpd::config::Args;
use pcfpd::lifecycle::{startup, Exit};

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(1),
            };
        }
    };

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("pcfpd: {}", e);
            eprintln!("{}", Args::command().render_usage());
            return ExitCode::from(1);
        }
    };

    match startup::run(config) {
        Ok(Exit::Stopped) => ExitCode::SUCCESS,
        Ok(Exit::Detached(child)) => {
            println!("{}", child);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("pcfpd: {}", e);
            ExitCode::from(1)
        }
    }
}
