use std::fmt;

use crate::headers::SipHeaderParse;
use crate::message::buffer::{Buf, Span};
use crate::parser::{is_word, PResult, Parser};

/// The `Call-ID` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallId {
    raw: Buf,
    value: Span,
}

impl CallId {
    pub fn as_str(&self) -> &str {
        self.raw.get(self.value)
    }
}

impl SipHeaderParse for CallId {
    /*
     * callid   =  word [ "@" word ]
     */
    fn parse(raw: &Buf, parser: &mut Parser) -> PResult<Self> {
        let start = parser.offset();
        if parser.read_span(is_word).is_empty() {
            return parser.error("empty Call-ID");
        }
        if parser.advance_if_eq(b'@') && parser.read_span(is_word).is_empty() {
            return parser.error("expected word after '@'");
        }
        let value = Span::new(start, parser.offset());
        parser.end()?;

        Ok(CallId {
            raw: raw.clone(),
            value,
        })
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
