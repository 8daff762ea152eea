use std::fmt;

use crate::headers::SipHeaderParse;
use crate::message::buffer::{Buf, Span};
use crate::parser::{PResult, Parser};

/// Largest sequence number a `CSeq` may carry, exclusive.
pub(crate) const CSEQ_LIMIT: u32 = 1 << 31;

/// The `CSeq` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CSeq {
    raw: Buf,
    number: u32,
    method: Span,
}

impl CSeq {
    pub fn number(&self) -> u32 {
        self.number
    }

    /// The method name as written.
    pub fn method(&self) -> &str {
        self.raw.get(self.method)
    }

    pub fn buf(&self) -> &Buf {
        &self.raw
    }
}

impl SipHeaderParse for CSeq {
    /*
     * CSeq  =  "CSeq" HCOLON 1*DIGIT LWS Method
     */
    fn parse(raw: &Buf, parser: &mut Parser) -> PResult<Self> {
        let number = parser.read_u32()?;
        if number >= CSEQ_LIMIT {
            return parser.error("CSeq number out of range");
        }
        if !parser.skip_lws() {
            return parser.error("expected white space after CSeq number");
        }
        let method = parser.token()?;
        parser.end()?;

        Ok(CSeq {
            raw: raw.clone(),
            number,
            method,
        })
    }
}

impl fmt::Display for CSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.number, self.method())
    }
}
