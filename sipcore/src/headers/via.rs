use std::fmt;
use std::fmt::Write;

use util::ascii::{is_newline, is_space};

use crate::error::{Error, Result};
use crate::headers::{check_single_line, write_params, Header, SipHeaderParse, TypedHeader, BRANCH_PARAM};
use crate::ids::IdGenerator;
use crate::message::buffer::{Buf, Span};
use crate::parser::{find_param, is_host, is_via_param, iter_params, PResult, Param, Parser, SIPV2};

const TTL_PARAM: &str = "ttl";
const MADDR_PARAM: &str = "maddr";
const RECEIVED_PARAM: &str = "received";

/// One entry of a `Via` header.
///
/// A `Via` line may carry several comma separated entries; each entry
/// shares the buffer of the line and covers its own part of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Via {
    raw: Buf,
    entry: Span,
    transport: Span,
    host: Span,
    port: Option<u16>,
    params: Vec<Param>,
}

impl Via {
    /// Builds a `Via` line with a single entry.
    ///
    /// A port of 0 is left out. The `branch` parameter is always written
    /// first, taken from `params` when present and generated otherwise.
    pub fn new(
        transport: &str,
        host: &str,
        port: u32,
        params: &[(&str, &str)],
        ids: &mut IdGenerator,
    ) -> Result<Via> {
        if port > u32::from(u16::MAX) {
            return Err(Error::InvalidPort(port));
        }
        check_single_line([transport, host].into_iter().chain(params.iter().flat_map(|&(name, value)| [name, value])))?;

        let branch = match params.iter().find(|(name, _)| name.eq_ignore_ascii_case(BRANCH_PARAM)) {
            Some((_, value)) if !value.is_empty() => value.to_string(),
            _ => ids.branch(),
        };
        let others: Vec<(&str, &str)> = params
            .iter()
            .filter(|(name, _)| !name.eq_ignore_ascii_case(BRANCH_PARAM))
            .copied()
            .collect();

        let mut line = format!("Via: {SIPV2}/{transport} {host}");
        if port != 0 {
            let _ = write!(line, ":{port}");
        }
        let _ = write!(line, ";{BRANCH_PARAM}={branch}");
        write_params(&mut line, &others);

        match Header::parse(Buf::from(line))?.into_typed() {
            TypedHeader::Via(vias) => vias.into_iter().next().ok_or(Error::InvalidArgument("empty Via")),
            _ => Err(Error::InvalidArgument("not a Via header")),
        }
    }

    /// Transport of the sent-protocol, e.g. `UDP`.
    pub fn transport(&self) -> &str {
        self.raw.get(self.transport)
    }

    /// Host of sent-by; IPv6 references keep their brackets.
    pub fn host(&self) -> &str {
        self.raw.get(self.host)
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn branch(&self) -> Option<&str> {
        self.param(BRANCH_PARAM)
    }

    pub fn ttl(&self) -> Option<&str> {
        self.param(TTL_PARAM)
    }

    pub fn maddr(&self) -> Option<&str> {
        self.param(MADDR_PARAM)
    }

    pub fn received(&self) -> Option<&str> {
        self.param(RECEIVED_PARAM)
    }

    /// Case-insensitive parameter lookup.
    pub fn param(&self, name: &str) -> Option<&str> {
        find_param(&self.raw, &self.params, name)
    }

    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        iter_params(&self.raw, &self.params)
    }

    /// The text of this entry, without the header name.
    pub fn as_str(&self) -> &str {
        self.raw.get(self.entry)
    }

    /// The whole line this entry was read from.
    pub fn buf(&self) -> &Buf {
        &self.raw
    }
}

fn slash(parser: &mut Parser) -> PResult<()> {
    parser.skip_lws();
    parser.must_read(b'/')?;
    parser.skip_lws();
    Ok(())
}

impl SipHeaderParse for Via {
    /*
     * via-parm      =  sent-protocol LWS sent-by *( SEMI via-params )
     * sent-protocol =  protocol-name SLASH protocol-version
     *                  SLASH transport
     * sent-by       =  host [ COLON port ]
     */
    fn parse(raw: &Buf, parser: &mut Parser) -> PResult<Self> {
        let start = parser.offset();

        let name = parser.token()?;
        slash(parser)?;
        let version = parser.token()?;
        if !parser.str(name).eq_ignore_ascii_case("SIP") || parser.str(version) != "2.0" {
            return parser.error("expected SIP/2.0 protocol");
        }
        slash(parser)?;
        let transport = parser.token()?;

        if !parser.skip_lws() {
            return parser.error("expected white space before sent-by");
        }

        let host = if parser.peek() == Some(b'[') {
            let host_start = parser.offset();
            parser.read_span(|b| b != b']' && !is_space(b) && !is_newline(b));
            parser.must_read(b']')?;
            Span::new(host_start, parser.offset())
        } else {
            parser.read_span(is_host)
        };
        if host.is_empty() {
            return parser.error("expected sent-by host");
        }

        let snapshot = parser.snapshot();
        parser.skip_lws();
        let port = if parser.advance_if_eq(b':') {
            parser.skip_lws();
            Some(parser.read_u16()?)
        } else {
            parser.restore(snapshot);
            None
        };

        let params = parser.params(is_via_param)?;

        Ok(Via {
            raw: raw.clone(),
            entry: Span::new(start, parser.offset()),
            transport,
            host,
            port,
            params,
        })
    }
}

impl fmt::Display for Via {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
