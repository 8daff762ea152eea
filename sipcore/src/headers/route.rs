use std::fmt;

use crate::error::{Error, Result};
use crate::headers::name_addr::{parse_name_addr, NameAddr};
use crate::headers::{write_name_addr, Header, HeaderKind, SipHeaderParse, TypedHeader};
use crate::message::buffer::{Buf, Span};
use crate::message::uri::Uri;
use crate::parser::{find_param, is_via_param, iter_params, PResult, Param, Parser};

/// One entry of a `Route` or `Record-Route` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    raw: Buf,
    entry: Span,
    name_addr: NameAddr,
    params: Vec<Param>,
}

impl Route {
    /// Builds `Route: <uri>`.
    pub fn route(uri: &str) -> Result<Route> {
        Self::build(HeaderKind::Route, uri)
    }

    /// Builds `Record-Route: <uri>`.
    pub fn record_route(uri: &str) -> Result<Route> {
        Self::build(HeaderKind::RecordRoute, uri)
    }

    fn build(kind: HeaderKind, uri: &str) -> Result<Route> {
        Uri::parse(uri)?;
        let routes = match Header::parse(Buf::from(write_name_addr(kind, "", uri, &[])?))?.into_typed() {
            TypedHeader::Route(routes) | TypedHeader::RecordRoute(routes) => routes,
            _ => return Err(Error::InvalidArgument("not a Route header")),
        };
        routes.into_iter().next().ok_or(Error::InvalidArgument("empty Route"))
    }

    pub fn display_name(&self) -> &str {
        self.raw.get(self.name_addr.display)
    }

    pub fn addr(&self) -> &str {
        self.raw.get(self.name_addr.addr)
    }

    /// Parses the address.
    pub fn uri(&self) -> Result<Uri> {
        Uri::from_buf(self.raw.slice(self.name_addr.addr))
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        find_param(&self.raw, &self.params, name)
    }

    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        iter_params(&self.raw, &self.params)
    }

    pub fn as_str(&self) -> &str {
        self.raw.get(self.entry)
    }

    /// The whole line this entry was read from.
    pub fn buf(&self) -> &Buf {
        &self.raw
    }
}

impl SipHeaderParse for Route {
    /*
     * route-param = name-addr *( SEMI rr-param )
     */
    fn parse(raw: &Buf, parser: &mut Parser) -> PResult<Self> {
        let start = parser.offset();
        let name_addr = parse_name_addr(parser, true)?;
        let params = parser.params(is_via_param)?;

        Ok(Route {
            raw: raw.clone(),
            entry: Span::new(start, parser.offset()),
            name_addr,
            params,
        })
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
