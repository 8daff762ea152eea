use std::fmt;

use crate::error::{Error, Result};
use crate::headers::{Header, SipHeaderParse, TypedHeader};
use crate::message::buffer::{Buf, Span};
use crate::parser::{find_param, is_token, iter_params, PResult, Param, Parser};

/// The `Content-Type` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    raw: Buf,
    value: Span,
    mtype: Span,
    subtype: Span,
    params: Vec<Param>,
}

impl ContentType {
    /// Parses a media type such as `text/html; charset=utf8`.
    ///
    /// ```
    /// # use sipcore::headers::ContentType;
    /// let ct = ContentType::from_value("application/sdp").unwrap();
    /// assert!(ct.is_sdp());
    /// assert!(ContentType::from_value("application bar").is_err());
    /// ```
    pub fn from_value(value: &str) -> Result<ContentType> {
        match Header::new("Content-Type", value)?.into_typed() {
            TypedHeader::ContentType(ct) => Ok(ct),
            _ => Err(Error::InvalidArgument("not a Content-Type header")),
        }
    }

    pub fn media_type(&self) -> &str {
        self.raw.get(self.mtype)
    }

    pub fn media_subtype(&self) -> &str {
        self.raw.get(self.subtype)
    }

    /// `true` for `application/sdp`, ignoring case.
    pub fn is_sdp(&self) -> bool {
        self.media_type().eq_ignore_ascii_case("application") && self.media_subtype().eq_ignore_ascii_case("sdp")
    }

    /// A parameter value, quotes removed.
    pub fn param(&self, name: &str) -> Option<&str> {
        find_param(&self.raw, &self.params, name)
    }

    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        iter_params(&self.raw, &self.params)
    }

    /// The media type with its parameters, as written.
    pub fn as_str(&self) -> &str {
        self.raw.get(self.value)
    }
}

impl SipHeaderParse for ContentType {
    /*
     * media-type  =  m-type SLASH m-subtype *(SEMI m-parameter)
     */
    fn parse(raw: &Buf, parser: &mut Parser) -> PResult<Self> {
        let start = parser.offset();
        let mtype = parser.token()?;
        parser.skip_lws();
        parser.must_read(b'/')?;
        parser.skip_lws();
        let subtype = parser.token()?;
        let params = parser.params(is_token)?;
        let value = Span::new(start, parser.offset());
        parser.end()?;

        Ok(ContentType {
            raw: raw.clone(),
            value,
            mtype,
            subtype,
            params,
        })
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
