//! Destination addresses and the outbound message queue item.
//!
//! The network layer itself lives outside this crate: a transaction only
//! pushes [`OutgoingMessage`]s onto a channel that the transport drains.

use std::fmt;
use std::net::SocketAddr;

use crate::error::{Result, TransactionError};
use crate::message::Message;

/// Transport protocol of a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransportKind {
    Udp,
    Tcp,
    #[default]
    Unknown,
}

impl TransportKind {
    /// Returns the name used in `Via` headers.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportKind::Udp => "UDP",
            TransportKind::Tcp => "TCP",
            TransportKind::Unknown => "",
        }
    }

    /// Stream transports do not need retransmissions.
    pub fn is_reliable(&self) -> bool {
        matches!(self, TransportKind::Tcp)
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A socket address together with the transport used to reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Addr {
    socket: SocketAddr,
    kind: TransportKind,
}

impl Addr {
    pub fn new(socket: SocketAddr, kind: TransportKind) -> Self {
        Self { socket, kind }
    }

    /// Parses `ip:port` as an UDP destination.
    ///
    /// ```
    /// # use sipcore::transport::Addr;
    /// let addr = Addr::udp("10.0.0.1:5060").unwrap();
    /// assert!(addr.is_udp());
    /// assert!(!addr.is_reliable());
    /// ```
    pub fn udp(addr: &str) -> Result<Self> {
        Self::parse(addr, TransportKind::Udp)
    }

    /// Parses `ip:port` as a TCP destination.
    pub fn tcp(addr: &str) -> Result<Self> {
        Self::parse(addr, TransportKind::Tcp)
    }

    fn parse(addr: &str, kind: TransportKind) -> Result<Self> {
        let socket = addr
            .parse::<SocketAddr>()
            .map_err(|_| TransactionError::InvalidAddress)?;

        Ok(Self { socket, kind })
    }

    pub fn socket(&self) -> SocketAddr {
        self.socket
    }

    pub fn transport(&self) -> TransportKind {
        self.kind
    }

    pub fn is_udp(&self) -> bool {
        self.kind == TransportKind::Udp
    }

    pub fn is_tcp(&self) -> bool {
        self.kind == TransportKind::Tcp
    }

    pub fn is_reliable(&self) -> bool {
        self.kind.is_reliable()
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TransportKind::Unknown => write!(f, "{}", self.socket),
            kind => write!(f, "{}/{}", self.socket, kind),
        }
    }
}

/// A message waiting to be sent to `addr`.
#[derive(Debug, Clone)]
pub struct OutgoingMessage {
    pub message: Message,
    pub addr: Addr,
}

impl OutgoingMessage {
    pub fn new(message: Message, addr: Addr) -> Self {
        Self { message, addr }
    }
}
