//! # sipcore
//!
//! SIP (RFC 3261) message model and the client INVITE transaction.
//!
//! Messages keep the bytes they were parsed from; header models are spans
//! into those bytes. Builders write the text first and parse it back, so a
//! built message reads exactly like a received one.
//!
//! ```
//! use sipcore::Message;
//!
//! let msg = Message::parse(
//!     b"SIP/2.0 180 Ringing\r\n\
//!       Via: SIP/2.0/UDP pc33.atlanta.com;branch=z9hG4bK776asdhds\r\n\
//!       To: Bob <sip:bob@biloxi.com>;tag=a6c85cf\r\n\
//!       From: Alice <sip:alice@atlanta.com>;tag=1928301774\r\n\
//!       Call-ID: a84b4c76e66710@pc33.atlanta.com\r\n\
//!       CSeq: 314159 INVITE\r\n\
//!       Content-Length: 0\r\n\r\n",
//! )
//! .unwrap();
//!
//! assert_eq!(msg.status_code(), Some(180));
//! assert_eq!(msg.to().unwrap().tag(), Some("a6c85cf"));
//! ```

pub mod error;
pub mod headers;
pub mod ids;
pub mod message;
pub mod transaction;
pub mod transport;

pub(crate) mod macros;
pub(crate) mod parser;

#[cfg(test)]
pub(crate) mod test_utils;

#[cfg(test)]
#[macro_use]
extern crate assert_matches;

pub use error::{Error, Result};
pub use ids::IdGenerator;
pub use message::{Message, RequestConfig, SipMethod};
pub use transaction::{ClientTransaction, TransactionEvent};
pub use transport::{Addr, OutgoingMessage};
