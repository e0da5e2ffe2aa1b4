//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{Ipv4Addr, SocketAddr, TcpStream as StdTcpStream};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use pcfpd::lifecycle::Shutdown;
use pcfpd::net::BoundListener;
use pcfpd::server::{PolicyServer, StopReason};
use pcfpd::PolicyBuffer;
use tempfile::NamedTempFile;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

pub const CROSSDOMAIN: &[u8] = br#"<?xml version="1.0"?><cross-domain-policy><allow-access-from domain="*" /></cross-domain-policy>"#;

/// Write `bytes` to a fresh temporary policy file.
pub fn policy_file(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

/// A port that was free a moment ago.
pub fn free_port() -> u16 {
    std::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// In-process server on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub task: JoinHandle<StopReason>,
}

/// Load `path` and serve it from a spawned accept loop.
pub async fn start_server(path: &Path) -> TestServer {
    let policy = PolicyBuffer::load(path).unwrap();
    let listener = BoundListener::bind_and_listen(0).unwrap().into_async().unwrap();
    let port = listener.local_addr().unwrap().port();

    let shutdown = Shutdown::new();
    let server = PolicyServer::new(listener, policy);
    let task = tokio::spawn(server.run(shutdown.clone()));

    TestServer {
        addr: (Ipv4Addr::LOCALHOST, port).into(),
        shutdown,
        task,
    }
}

/// Connect and read until the server closes the connection.
pub async fn fetch(addr: SocketAddr) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let mut buf = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut buf))
        .await
        .expect("server did not close the connection")
        .unwrap();
    buf
}

/// Blocking variant of [`fetch`] for process-level tests.
pub fn fetch_blocking(port: u16) -> std::io::Result<Vec<u8>> {
    let mut stream = StdTcpStream::connect((Ipv4Addr::LOCALHOST, port))?;
    stream.set_read_timeout(Some(Duration::from_secs(5)))?;
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Poll `check` until it holds or `timeout` passes.
pub fn eventually(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(25));
    }
    check()
}

pub fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_pcfpd"))
}

/// The daemon binary running in the foreground, killed on drop.
pub struct Daemon {
    pub child: Child,
    pub port: u16,
    pub log: PathBuf,
    _dir: tempfile::TempDir,
}

impl Daemon {
    /// Start the binary serving `policy` and wait until it answers.
    pub fn start(policy: &Path, port: u16) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("pcfpd.log");

        let child = bin()
            .arg("-f")
            .arg(policy)
            .arg("-p")
            .arg(port.to_string())
            .arg("-l")
            .arg(&log)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .unwrap();

        let daemon = Self {
            child,
            port,
            log,
            _dir: dir,
        };

        // A served payload means signal handlers are installed and the loop runs.
        assert!(
            eventually(Duration::from_secs(10), || fetch_blocking(port).is_ok()),
            "daemon never started serving"
        );
        daemon
    }

    pub fn signal(&self, signal: Signal) {
        kill(Pid::from_raw(self.child.id() as i32), signal).unwrap();
    }

    pub fn log_text(&self) -> String {
        std::fs::read_to_string(&self.log).unwrap_or_default()
    }

    pub fn wait_exit(&mut self, timeout: Duration) -> Option<ExitStatus> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Some(status) = self.child.try_wait().unwrap() {
                return Some(status);
            }
            std::thread::sleep(Duration::from_millis(25));
        }
        None
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
