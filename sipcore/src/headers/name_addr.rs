use util::ascii::{is_newline, is_space};

use crate::message::buffer::Span;
use crate::message::uri::Uri;
use crate::parser::{is_token, PResult, Parser};

/// `[display-name] "<" addr-spec ">"` or a bare `addr-spec`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NameAddr {
    /// Display name as written, quotes included. Empty when absent.
    pub(crate) display: Span,
    /// The URI text, without angle brackets.
    pub(crate) addr: Span,
}

/*
 * name-addr    =  [ display-name ] LAQUOT addr-spec RAQUOT
 * display-name =  *(token LWS)/ quoted-string
 *
 * In a list (Contact, Route) a bare addr-spec also stops at ','.
 */
pub(crate) fn parse_name_addr(parser: &mut Parser, list: bool) -> PResult<NameAddr> {
    parser.skip_lws();
    let start = parser.offset();

    let display = match parser.peek() {
        Some(b'"') => {
            let display = parser.quoted_string()?;
            parser.skip_lws();
            if parser.peek() != Some(b'<') {
                return parser.error("expected '<' after display name");
            }
            display
        }
        Some(b'<') => Span::new(start, start),
        _ => {
            let snapshot = parser.snapshot();
            let mut end = start;
            while !parser.read_span(is_token).is_empty() {
                end = parser.offset();
                parser.skip_lws();
            }
            if end == start || parser.peek() != Some(b'<') {
                parser.restore(snapshot);
                return parse_addr_spec(parser, list);
            }
            Span::new(start, end)
        }
    };

    parser.must_read(b'<')?;
    let addr = parser.read_span(|b| b != b'>' && !is_space(b) && !is_newline(b));
    if !parser.advance_if_eq(b'>') {
        return parser.error("expected '>' closing the address");
    }
    check_uri(parser, addr)?;

    Ok(NameAddr { display, addr })
}

fn parse_addr_spec(parser: &mut Parser, list: bool) -> PResult<NameAddr> {
    let start = parser.offset();
    let addr = parser.read_span(|b| {
        !(b == b';' || b == b'?' || (list && b == b',') || is_space(b) || is_newline(b))
    });
    check_uri(parser, addr)?;

    Ok(NameAddr {
        display: Span::new(start, start),
        addr,
    })
}

fn check_uri(parser: &Parser, addr: Span) -> PResult<()> {
    let text = parser.str(addr);
    if Uri::parse(text).is_err() {
        return parser.error(format!("invalid URI '{text}'"));
    }
    Ok(())
}
