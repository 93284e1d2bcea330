//! Connection establishment over a fixed port range.
//!
//! Both peers know the range in advance. The listener binds the first free
//! port, the connector tries each port in ascending order until one answers.

use cc_core::error::ConnectError;
use std::net::{IpAddr, SocketAddr};
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    pub first: u16,
    pub count: u16,
}

impl PortRange {
    pub fn new(first: u16, count: u16) -> Self {
        Self { first, count }
    }

    /// Candidate ports in ascending order; ports past 65535 are skipped.
    pub fn iter(&self) -> impl Iterator<Item = u16> {
        let start = u32::from(self.first);
        let end = start + u32::from(self.count);
        (start..end).filter_map(|port| u16::try_from(port).ok())
    }

    pub fn last(&self) -> u16 {
        self.iter().last().unwrap_or(self.first)
    }

    fn no_socket(&self, target: impl Into<String>) -> ConnectError {
        ConnectError::NoSocket {
            target: target.into(),
            first_port: self.first,
            last_port: self.last(),
        }
    }
}

impl Default for PortRange {
    fn default() -> Self {
        Self::new(
            cc_core::config::DEFAULT_FIRST_PORT,
            cc_core::config::DEFAULT_PORTS_TRIED,
        )
    }
}

/// Connect to `host` on the first port of `range` that accepts.
pub async fn connect(host: &str, range: PortRange) -> Result<(TcpStream, u16), ConnectError> {
    info!(
        host = %host,
        first_port = range.first,
        last_port = range.last(),
        "starting client"
    );

    for port in range.iter() {
        match TcpStream::connect((host, port)).await {
            Ok(stream) => {
                info!(host = %host, port = port, "connected");
                return Ok((stream, port));
            }
            Err(e) => {
                debug!(host = %host, port = port, error = %e, "connect failed");
            }
        }
    }

    warn!(host = %host, "could not open socket");
    Err(range.no_socket(host))
}

/// Bind the first free port of `range` on `bind` with a backlog of one.
pub async fn listen(bind: IpAddr, range: PortRange) -> Result<(TcpListener, u16), ConnectError> {
    for port in range.iter() {
        let addr = SocketAddr::new(bind, port);
        match bind_one(addr) {
            Ok(listener) => {
                info!(addr = %addr, "listening");
                return Ok((listener, port));
            }
            Err(e) => {
                debug!(addr = %addr, error = %e, "bind failed");
            }
        }
    }

    warn!(bind = %bind, "could not open socket");
    Err(range.no_socket(bind.to_string()))
}

fn bind_one(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.bind(addr)?;
    socket.listen(1)
}

/// A single accepted peer.
#[derive(Debug)]
pub struct Accepted {
    pub stream: TcpStream,
    pub peer: SocketAddr,
    pub port: u16,
}

/// Bind like [`listen`], then wait for exactly one peer.
pub async fn listen_and_accept(bind: IpAddr, range: PortRange) -> Result<Accepted, ConnectError> {
    let (listener, port) = listen(bind, range).await?;
    accept_one(listener, port).await
}

pub async fn accept_one(listener: TcpListener, port: u16) -> Result<Accepted, ConnectError> {
    let (stream, peer) = listener
        .accept()
        .await
        .map_err(|e| ConnectError::Accept {
            port,
            reason: e.to_string(),
        })?;
    info!(peer = %peer, port = port, "connected by peer");
    Ok(Accepted { stream, peer, port })
}
