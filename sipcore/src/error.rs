use std::fmt;
use std::str::Utf8Error;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Error on parsing
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SipParserError {
    /// Message in error
    pub message: String,
}

impl fmt::Display for SipParserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SipParserError {}

#[allow(missing_docs)]
impl SipParserError {
    pub fn new<T>(s: T) -> Self
    where
        T: AsRef<str>,
    {
        Self {
            message: s.as_ref().to_string(),
        }
    }

    /// Appends the raw text the error was found in.
    pub(crate) fn in_line(self, line: &str) -> Self {
        Self {
            message: format!("{}: '{}'", self.message, line),
        }
    }
}

impl std::convert::From<&str> for SipParserError {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl std::convert::From<String> for SipParserError {
    fn from(value: String) -> Self {
        Self { message: value }
    }
}

impl std::convert::From<Utf8Error> for SipParserError {
    fn from(value: Utf8Error) -> Self {
        SipParserError {
            message: format!("invalid UTF-8 in message head ({value})"),
        }
    }
}

impl std::convert::From<util::Error> for SipParserError {
    fn from(err: util::Error) -> Self {
        SipParserError {
            message: format!(
                "Failed to parse at line:{} column:{} kind:{:?}",
                err.line, err.col, err.kind,
            ),
        }
    }
}

impl std::convert::From<util::Error> for Error {
    fn from(err: util::Error) -> Self {
        Self::ParseError(err.into())
    }
}

/// Failures of the client transaction layer.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum TransactionError {
    #[error("invalid sip message: {0}")]
    InvalidMessage(&'static str),

    #[error("invalid transport address")]
    InvalidAddress,

    #[error("sip request expected")]
    RequestExpected,

    #[error("sip response expected")]
    ResponseExpected,

    #[error("INVITE request expected, got {0}")]
    InviteExpected(String),

    #[error("transaction terminated")]
    Terminated,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    ParseError(#[from] SipParserError),

    #[error("Missing required '{0}' header")]
    MissingRequiredHeader(&'static str),

    #[error("CSeq number {0} out of range")]
    InvalidCSeq(u32),

    #[error("Max-Forwards {0} out of range")]
    InvalidMaxForwards(u32),

    #[error("Invalid status code {0}")]
    InvalidStatusCode(u16),

    #[error("Port {0} out of range")]
    InvalidPort(u32),

    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("Tag already exists")]
    TagExists,

    #[error("Parameter '{0}' already exists")]
    ParamExists(String),

    #[error("Header '{0}' already exists")]
    HeaderExists(String),

    #[error("Operation not supported for absolute URI")]
    UnsupportedUri,

    #[error("Unsupported digest challenge: {0}")]
    UnsupportedDigest(String),

    #[error(transparent)]
    TransactionError(#[from] TransactionError),

    #[error("Channel closed")]
    ChannelClosed,
}
