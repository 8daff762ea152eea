//! SIP Transaction Layer.
//!
//! Only the client side of the INVITE transaction (RFC 3261 17.1.1) is
//! provided. A transaction runs as a single task that owns its state; the
//! owner talks to it through channels.

use crate::error::Error;
use crate::message::Message;

pub mod client;
pub mod timer;

pub use client::ClientTransaction;
pub use timer::Timers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
/// Defines the possible states of a client INVITE transaction.
pub enum State {
    #[default]
    /// The request was sent and no response has arrived yet.
    Calling,
    /// A provisional response was received.
    Proceeding,
    /// A final failure response was received and acknowledged.
    Completed,
    /// Terminated state
    Terminated,
}

impl State {
    pub fn is_terminated(&self) -> bool {
        matches!(self, State::Terminated)
    }
}

/// What a transaction hands back to its owner.
#[derive(Debug, Clone)]
pub enum TransactionEvent {
    /// A response received from the peer, or the `408 Request Timeout`
    /// built locally when timer B fires.
    Response(Message),
    /// The transaction could not build a message it needed (the timeout
    /// response or an ACK) and has terminated.
    Failed(Error),
}

impl TransactionEvent {
    pub fn response(&self) -> Option<&Message> {
        match self {
            TransactionEvent::Response(message) => Some(message),
            TransactionEvent::Failed(_) => None,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        self.response().and_then(Message::status_code)
    }
}
