//! TCP listener for policy clients.
//!
//! # Responsibilities
//! - Create the IPv4 socket, enable address reuse, bind 0.0.0.0:port
//! - Listen with a fixed backlog of 5
//! - Hand the socket to the async runtime once it exists
//! - Accept incoming TCP connections
//!
//! The socket is built with plain system calls so it can exist before the
//! tokio runtime does; daemonizing forks between the two steps.

use std::future::Future;
use std::io;
use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::os::fd::{AsRawFd, OwnedFd};

use nix::sys::socket::{
    bind, listen, setsockopt, socket, sockopt, AddressFamily, Backlog, SockFlag, SockType,
    SockaddrIn,
};
use tokio::io::AsyncWrite;
use tokio::net::{TcpListener, TcpStream};

/// Pending connections the kernel queues before `accept`.
pub const LISTEN_BACKLOG: i32 = 5;

/// Error type for listener operations.
#[derive(Debug)]
pub enum ListenerError {
    /// Failed to create the socket.
    Socket(nix::Error),
    /// Failed to bind to the port.
    Bind(nix::Error),
    /// Failed to mark the socket listening.
    Listen(nix::Error),
    /// Failed to register the socket with the runtime.
    Register(io::Error),
}

impl std::fmt::Display for ListenerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenerError::Socket(e) => write!(f, "socket: {}", e),
            ListenerError::Bind(e) => write!(f, "bind: {}", e),
            ListenerError::Listen(e) => write!(f, "listen: {}", e),
            ListenerError::Register(e) => write!(f, "register: {}", e),
        }
    }
}

impl std::error::Error for ListenerError {}

/// A bound, listening socket not yet attached to a runtime.
#[derive(Debug)]
pub struct BoundListener {
    inner: StdTcpListener,
}

impl BoundListener {
    /// Bind the wildcard address at `port` and start listening.
    ///
    /// Failing to set `SO_REUSEADDR` is logged and ignored; every other
    /// failure is returned. Port 0 picks an ephemeral port.
    pub fn bind_and_listen(port: u16) -> Result<Self, ListenerError> {
        let fd: OwnedFd = socket(
            AddressFamily::Inet,
            SockType::Stream,
            SockFlag::empty(),
            None,
        )
        .map_err(ListenerError::Socket)?;

        if let Err(e) = setsockopt(&fd, sockopt::ReuseAddr, &true) {
            tracing::warn!("warning, setsockopt: {}", e);
        }

        let addr = SockaddrIn::new(0, 0, 0, 0, port);
        bind(fd.as_raw_fd(), &addr).map_err(ListenerError::Bind)?;

        let backlog = Backlog::new(LISTEN_BACKLOG).map_err(ListenerError::Listen)?;
        listen(&fd, backlog).map_err(ListenerError::Listen)?;

        let inner = StdTcpListener::from(fd);

        if let Ok(local_addr) = inner.local_addr() {
            tracing::debug!(
                address = %local_addr,
                backlog = LISTEN_BACKLOG,
                "Listener bound"
            );
        }

        Ok(Self { inner })
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.inner.local_addr()
    }

    /// Register with the current tokio runtime.
    ///
    /// Must be called from within a runtime context.
    pub fn into_async(self) -> Result<Listener, ListenerError> {
        self.inner
            .set_nonblocking(true)
            .map_err(ListenerError::Register)?;
        let inner = TcpListener::from_std(self.inner).map_err(ListenerError::Register)?;
        Ok(Listener { inner })
    }
}

/// Source of client connections for the accept loop.
pub trait Acceptor {
    type Conn: AsyncWrite + Unpin + Send;

    /// Wait for the next completed connection.
    fn accept(&self) -> impl Future<Output = io::Result<(Self::Conn, SocketAddr)>> + Send;
}

/// The listening socket, driven by the async runtime.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
}

impl Listener {
    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.inner.local_addr()
    }
}

impl Acceptor for Listener {
    type Conn = TcpStream;

    fn accept(&self) -> impl Future<Output = io::Result<(TcpStream, SocketAddr)>> + Send {
        self.inner.accept()
    }
}
