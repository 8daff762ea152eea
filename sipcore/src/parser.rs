//! SIP Parser
//!
//! Character classes of the RFC 3261 grammar and [`Parser`], a cursor over
//! one header value (or URI) that hands out [`Span`]s relative to the start
//! of the text it scans.

use util::ascii::is_space;
use util::{Scanner, Snapshot};

use crate::error::SipParserError;
use crate::macros::lookup_table;
use crate::message::buffer::{Buf, Span};

pub(crate) type PResult<T> = std::result::Result<T, SipParserError>;

pub(crate) const SIPV2: &str = "SIP/2.0";

const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

const UNRESERVED: &[u8] = b"-_.!~*'()%";

const ESCAPED: &[u8] = b"%";

const USER_UNRESERVED: &[u8] = b"&=+$,;?/";

const TOKEN: &[u8] = b"-.!%*_`'~+";

const PASS: &[u8] = b"&=+$,";

const HOST: &[u8] = b"_-.";

// word = 1*(alphanum / "-" / "." / "!" / "%" / "*" / "_" / "+" / "`" /
//        "'" / "~" / "(" / ")" / "<" / ">" / ":" / "\" / DQUOTE / "/" /
//        "[" / "]" / "?" / "{" / "}")
const WORD: &[u8] = b"-.!%*_+`'~()<>:\\\"/[]?{}";

lookup_table!(USER_TAB => ALPHANUMERIC, UNRESERVED, USER_UNRESERVED, ESCAPED);

lookup_table!(PASS_TAB => ALPHANUMERIC, UNRESERVED, ESCAPED, PASS);

lookup_table!(HOST_TAB => ALPHANUMERIC, HOST);

lookup_table!(PARAM_TAB => b"[]/:&+$", ALPHANUMERIC, UNRESERVED, ESCAPED);

lookup_table!(HDR_TAB => b"[]/?:+$", ALPHANUMERIC, UNRESERVED, ESCAPED);

lookup_table!(TOKEN_TAB => ALPHANUMERIC, TOKEN);

lookup_table!(VIA_PARAM_TAB => b"[:]", ALPHANUMERIC, TOKEN);

lookup_table!(WORD_TAB => ALPHANUMERIC, WORD);

lookup_table!(SCHEME_TAB => ALPHANUMERIC, b"+-.");

/// A `name[=value]` parameter. Quoted values are stored without quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Param {
    pub(crate) name: Span,
    pub(crate) value: Option<Span>,
}

/// Case-insensitive lookup; a valueless parameter yields `Some("")`.
pub(crate) fn find_param<'a>(buf: &'a Buf, params: &[Param], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|p| buf.get(p.name).eq_ignore_ascii_case(name))
        .map(|p| p.value.map_or("", |v| buf.get(v)))
}

pub(crate) fn iter_params<'a>(
    buf: &'a Buf,
    params: &'a [Param],
) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
    params
        .iter()
        .map(move |p| (buf.get(p.name), p.value.map_or("", |v| buf.get(v))))
}

/// Cursor over SIP text.
pub(crate) struct Parser<'a> {
    src: &'a str,
    scanner: Scanner<'a>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Self {
            src,
            scanner: Scanner::new(src.as_bytes()),
        }
    }

    /// A parser positioned at `offset`; spans stay relative to `src`.
    pub(crate) fn at(src: &'a str, offset: usize) -> Self {
        Self {
            src,
            scanner: Scanner::with_offset(src.as_bytes(), offset),
        }
    }

    #[inline]
    pub(crate) fn offset(&self) -> usize {
        self.scanner.offset()
    }

    #[inline]
    pub(crate) fn is_eof(&self) -> bool {
        self.scanner.is_eof()
    }

    #[inline]
    pub(crate) fn peek(&self) -> Option<u8> {
        self.scanner.peek()
    }

    #[inline]
    pub(crate) fn advance(&mut self) -> Option<u8> {
        self.scanner.next()
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        self.scanner.snapshot()
    }

    pub(crate) fn restore(&mut self, snapshot: Snapshot) {
        self.scanner.restore(snapshot)
    }

    #[inline]
    pub(crate) fn advance_if_eq(&mut self, byte: u8) -> bool {
        self.scanner.consume_if(|b| b == byte).is_some()
    }

    pub(crate) fn must_read(&mut self, byte: u8) -> PResult<()> {
        if self.advance_if_eq(byte) {
            Ok(())
        } else {
            self.error(format!("expected '{}'", byte as char))
        }
    }

    /// Skips `SP`, `HTAB` and line folds (`CRLF` followed by `SP`/`HTAB`).
    ///
    /// Returns `true` if anything was skipped.
    pub(crate) fn skip_lws(&mut self) -> bool {
        let start = self.offset();
        loop {
            util::space!(self.scanner);
            if self.scanner.starts_with(b"\r\n") && self.scanner.peek_at(2).is_some_and(is_space) {
                self.scanner.bump_n(2);
                continue;
            }
            break;
        }
        self.offset() > start
    }

    pub(crate) fn read_span<F>(&mut self, func: F) -> Span
    where
        F: Fn(u8) -> bool,
    {
        let start = self.offset();
        self.scanner.read_while(func);
        Span::new(start, self.offset())
    }

    pub(crate) fn token(&mut self) -> PResult<Span> {
        let span = self.read_span(is_token);
        if span.is_empty() {
            return self.error("expected token");
        }
        Ok(span)
    }

    pub(crate) fn read_u32(&mut self) -> PResult<u32> {
        Ok(self.scanner.read_num()?)
    }

    pub(crate) fn read_u16(&mut self) -> PResult<u16> {
        Ok(self.scanner.read_num()?)
    }

    /// Reads a quoted string, the returned span includes the quotes.
    pub(crate) fn quoted_string(&mut self) -> PResult<Span> {
        let start = self.offset();
        self.must_read(b'"')?;
        loop {
            // A fold is LWS; any other CR or LF ends the line.
            if self.scanner.starts_with(b"\r\n") && self.scanner.peek_at(2).is_some_and(is_space) {
                self.scanner.bump_n(2);
                continue;
            }
            match self.advance() {
                Some(b'"') => return Ok(Span::new(start, self.offset())),
                Some(b'\\') => match self.advance() {
                    Some(b'\r' | b'\n') => return self.error("line break in quoted string"),
                    Some(_) => {}
                    None => break,
                },
                Some(b'\r' | b'\n') => return self.error("line break in quoted string"),
                Some(_) => {}
                None => break,
            }
        }
        self.error("unterminated quoted string")
    }

    /// Parses `name [= (value / quoted-string)]` after a `;`.
    pub(crate) fn param<F>(&mut self, is_value: F) -> PResult<Param>
    where
        F: Fn(u8) -> bool,
    {
        self.skip_lws();
        let name = self.read_span(is_token);
        if name.is_empty() {
            return self.error("empty parameter name");
        }
        let snapshot = self.snapshot();
        self.skip_lws();
        if !self.advance_if_eq(b'=') {
            self.restore(snapshot);
            return Ok(Param { name, value: None });
        }
        self.skip_lws();
        let value = if self.peek() == Some(b'"') {
            let quoted = self.quoted_string()?;
            Span::new(quoted.start() + 1, quoted.end() - 1)
        } else {
            let value = self.read_span(is_value);
            if value.is_empty() {
                return self.error("empty parameter value");
            }
            value
        };

        Ok(Param {
            name,
            value: Some(value),
        })
    }

    /// Parses `*(LWS ";" param)`.
    pub(crate) fn params<F>(&mut self, is_value: F) -> PResult<Vec<Param>>
    where
        F: Fn(u8) -> bool + Copy,
    {
        let mut params = Vec::new();
        loop {
            let snapshot = self.snapshot();
            self.skip_lws();
            if !self.advance_if_eq(b';') {
                self.restore(snapshot);
                return Ok(params);
            }
            params.push(self.param(is_value)?);
        }
    }

    /// Requires that only white space is left.
    pub(crate) fn end(&mut self) -> PResult<()> {
        self.skip_lws();
        if !self.is_eof() {
            return self.error("unexpected trailing characters");
        }
        Ok(())
    }

    pub(crate) fn str(&self, span: Span) -> &'a str {
        self.src.get(span.range()).unwrap_or_default()
    }

    pub(crate) fn error<T>(&self, msg: impl AsRef<str>) -> PResult<T> {
        Err(SipParserError::new(format!(
            "{} at column {}",
            msg.as_ref(),
            self.scanner.position().col()
        )))
    }
}

#[inline(always)]
pub(crate) fn is_via_param(b: u8) -> bool {
    VIA_PARAM_TAB[b as usize]
}

#[inline(always)]
pub(crate) fn is_host(b: u8) -> bool {
    HOST_TAB[b as usize]
}

#[inline(always)]
pub(crate) fn is_token(b: u8) -> bool {
    TOKEN_TAB[b as usize]
}

#[inline(always)]
pub(crate) fn is_user(b: u8) -> bool {
    USER_TAB[b as usize]
}

#[inline(always)]
pub(crate) fn is_pass(b: u8) -> bool {
    PASS_TAB[b as usize]
}

#[inline(always)]
pub(crate) fn is_param(b: u8) -> bool {
    PARAM_TAB[b as usize]
}

#[inline(always)]
pub(crate) fn is_hdr_uri(b: u8) -> bool {
    HDR_TAB[b as usize]
}

#[inline(always)]
pub(crate) fn is_word(b: u8) -> bool {
    WORD_TAB[b as usize]
}

#[inline(always)]
pub(crate) fn is_scheme(b: u8) -> bool {
    SCHEME_TAB[b as usize]
}

#[cfg(test)]
mod tests;
