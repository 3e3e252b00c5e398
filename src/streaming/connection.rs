//! connection.rs
//! Connection Manager: owns the single outbound TCP connection of a run.
//!
//! Lifecycle: `Unopened -> Connecting -> Open -> Closed`. `Closed` is final;
//! a connection that failed to open, hit a write error, or was shut down is
//! never reopened.

use std::{
    fmt,
    io::{self, Write},
    net::{SocketAddr, TcpStream, ToSocketAddrs},
};

use log::{debug, info, warn};
use socket2::{Domain, Protocol, SockAddr, Socket, Type};

use crate::streaming::error::{StreamError, StreamResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Unopened,
    Connecting,
    Open,
    Closed,
}

/// Remote consumer address as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: String,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: port.into(),
        }
    }

    /// Resolves host and port to candidate socket addresses.
    pub fn resolve(&self) -> StreamResult<Vec<SocketAddr>> {
        let port: u16 = self.port.parse().map_err(|e| StreamError::AddressResolution {
            endpoint: self.to_string(),
            source: io::Error::new(io::ErrorKind::InvalidInput, e),
        })?;

        let addrs: Vec<SocketAddr> = (self.host.as_str(), port)
            .to_socket_addrs()
            .map_err(|source| StreamError::AddressResolution {
                endpoint: self.to_string(),
                source,
            })?
            .collect();

        if addrs.is_empty() {
            return Err(StreamError::AddressResolution {
                endpoint: self.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "no addresses returned"),
            });
        }
        Ok(addrs)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.host, self.port)
    }
}

/// Exclusive owner of the outbound stream.
///
/// Generic over the writer so the sender can be driven by any `Write`;
/// production code always uses `TcpStream`.
pub struct Connection<S: Write = TcpStream> {
    endpoint: Endpoint,
    state: ConnectionState,
    stream: Option<S>,
}

impl Connection<TcpStream> {
    /// Resolves and connects in one step. On failure nothing is left open.
    pub fn open(endpoint: Endpoint) -> StreamResult<Self> {
        let mut conn = Self::unopened(endpoint);
        conn.connect()?;
        Ok(conn)
    }

    /// `Unopened -> Connecting -> Open`, or `-> Closed` on any failure.
    pub fn connect(&mut self) -> StreamResult<()> {
        if self.state != ConnectionState::Unopened {
            return Err(StreamError::InvalidState(self.state));
        }
        self.state = ConnectionState::Connecting;

        match dial(&self.endpoint) {
            Ok(stream) => {
                info!("Successful connection with server at {}", self.endpoint);
                self.stream = Some(stream);
                self.state = ConnectionState::Open;
                Ok(())
            }
            Err(e) => {
                self.state = ConnectionState::Closed;
                Err(e)
            }
        }
    }
}

impl<S: Write> Connection<S> {
    pub fn unopened(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            state: ConnectionState::Unopened,
            stream: None,
        }
    }

    /// Wraps an already connected writer in `Open` state.
    pub fn from_stream(endpoint: Endpoint, stream: S) -> Self {
        Self {
            endpoint,
            state: ConnectionState::Open,
            stream: Some(stream),
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    /// The live writer, or `InvalidState` when not open.
    pub fn stream_mut(&mut self) -> StreamResult<&mut S> {
        match (self.state, self.stream.as_mut()) {
            (ConnectionState::Open, Some(stream)) => Ok(stream),
            (state, _) => Err(StreamError::InvalidState(state)),
        }
    }

    /// Drops the writer after an I/O error. No flush is attempted.
    pub fn mark_broken(&mut self) {
        if self.stream.take().is_some() {
            warn!("Connection with {} lost", self.endpoint);
        }
        self.state = ConnectionState::Closed;
    }

    /// Idempotent. Flushes best-effort and releases the socket.
    pub fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.flush() {
                debug!("flush on close failed: {}", e);
            }
            info!("Connection with {} closed", self.endpoint);
        }
        self.state = ConnectionState::Closed;
    }
}

impl<S: Write> Drop for Connection<S> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Tries each resolved address in turn with the platform connect timeout.
fn dial(endpoint: &Endpoint) -> StreamResult<TcpStream> {
    let addrs = endpoint.resolve()?;
    let mut last_err = None;

    for addr in addrs {
        match connect_addr(addr) {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                debug!("connect to {} failed: {}", addr, e);
                last_err = Some(e);
            }
        }
    }

    Err(StreamError::Connect {
        endpoint: endpoint.to_string(),
        source: last_err
            .unwrap_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "no address tried")),
    })
}

fn connect_addr(addr: SocketAddr) -> io::Result<TcpStream> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    // Frames are tiny and latency matters more than packet count.
    socket.set_nodelay(true)?;
    socket.connect(&SockAddr::from(addr))?;
    Ok(socket.into())
}
