//! Line-oriented event log.
//!
//! # Responsibilities
//! - Open the log sink once (append-mode file, or standard output)
//! - Render each tracing event as `[YYYY/MM/DD HH:MM:SS +ZZZZ] message`
//! - Flush every line as it is written
//!
//! # Design Decisions
//! - Uses tracing crate for events, tracing-subscriber for rendering
//! - Level configurable via config, overridden by `RUST_LOG`
//! - A second open is a warning, never a reopen

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Local, TimeZone};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::{DefaultFields, Writer};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Printed in place of the timestamp when local time cannot be determined.
pub const TIMESTAMP_PLACEHOLDER: &str = "[----/--/-- --:--:-- -----]";

static LOG_OPEN: AtomicBool = AtomicBool::new(false);

/// Where log lines go.
#[derive(Debug, Clone)]
pub enum LogSink {
    Stdout,
    File(Arc<Mutex<File>>),
}

impl LogSink {
    /// Open `path` for append, or fall back to standard output.
    pub fn open(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return LogSink::Stdout;
        };

        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => LogSink::File(Arc::new(Mutex::new(file))),
            Err(e) => {
                eprintln!(
                    "Failed to open log file {}: {}, logging to stdout",
                    path.display(),
                    e
                );
                LogSink::Stdout
            }
        }
    }

    #[cfg(test)]
    pub fn is_stdout(&self) -> bool {
        matches!(self, LogSink::Stdout)
    }
}

/// Writer handed out per event. Each formatted line arrives in one
/// `write_all` and is flushed before returning.
pub struct SinkWriter<'a> {
    sink: &'a LogSink,
}

impl Write for SinkWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.sink {
            LogSink::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(buf)?;
                out.flush()?;
            }
            LogSink::File(file) => {
                let mut file = file.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                file.write_all(buf)?;
                file.flush()?;
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogSink {
    type Writer = SinkWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        SinkWriter { sink: self }
    }
}

/// Event format: timestamp, message, then any structured fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(writer, "{} ", timestamp())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// A fmt layer that renders [`LineFormat`] lines into `sink`.
pub fn layer<S>(
    sink: LogSink,
) -> tracing_subscriber::fmt::Layer<S, DefaultFields, LineFormat, LogSink>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .event_format(LineFormat)
        .with_writer(sink)
        .with_ansi(false)
}

/// Open the process log and emit the startup banner.
///
/// Returns `false` without touching the existing sink if the log is
/// already open.
pub fn init(config: &LoggingConfig) -> bool {
    if LOG_OPEN.swap(true, Ordering::SeqCst) {
        tracing::warn!("log already open, ignoring");
        return false;
    }

    let sink = LogSink::open(config.file.as_deref());
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if let Err(e) = tracing_subscriber::registry()
        .with(filter)
        .with(layer(sink))
        .try_init()
    {
        eprintln!("Failed to install log subscriber: {}", e);
        return false;
    }

    tracing::info!(
        "pcfpd {} starting, pid {}",
        env!("CARGO_PKG_VERSION"),
        std::process::id()
    );
    true
}

/// Current local time as a log prefix.
pub fn timestamp() -> String {
    format_timestamp(local_now())
}

/// Render a log prefix, or the dashed placeholder when there is no time.
pub fn format_timestamp<Tz>(time: Option<DateTime<Tz>>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    match time {
        Some(time) => time.format("[%Y/%m/%d %H:%M:%S %z]").to_string(),
        None => TIMESTAMP_PLACEHOLDER.to_string(),
    }
}

fn local_now() -> Option<DateTime<Local>> {
    let since_epoch = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
    let secs = i64::try_from(since_epoch.as_secs()).ok()?;
    Local
        .timestamp_opt(secs, since_epoch.subsec_nanos())
        .single()
}

/// Log an accepted client by dotted-decimal address.
pub fn log_peer(peer: SocketAddr) {
    tracing::info!(port = peer.port(), "connection from {}", peer.ip());
}

/// Log a failed system call by name with the OS error description.
pub fn log_os_error(call: &str, err: &io::Error) {
    tracing::error!("{}: {}", call, err);
}
