use std::fmt;

use crate::error::{Error, Result};
use crate::headers::name_addr::{parse_name_addr, NameAddr};
use crate::headers::{write_name_addr, Header, HeaderKind, SipHeaderParse, TypedHeader, TAG_PARAM};
use crate::ids::IdGenerator;
use crate::message::buffer::{Buf, Span};
use crate::message::uri::Uri;
use crate::parser::{find_param, is_via_param, iter_params, PResult, Param, Parser};

/// The `From` or `To` header.
///
/// The `tag` parameter is kept apart from the other parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FromTo {
    raw: Buf,
    name_addr: NameAddr,
    tag: Option<Span>,
    params: Vec<Param>,
}

impl FromTo {
    /// Builds a `To` header.
    ///
    /// ```
    /// # use sipcore::headers::FromTo;
    /// let to = FromTo::to("Alice Smith", "sips:55521@ssl.tower.com", &[]).unwrap();
    ///
    /// assert_eq!(to.to_string(), "To: \"Alice Smith\" <sips:55521@ssl.tower.com>");
    /// assert_eq!(to.display_name(), "\"Alice Smith\"");
    /// ```
    pub fn to(display: &str, uri: &str, params: &[(&str, &str)]) -> Result<FromTo> {
        Self::build(HeaderKind::To, display, uri, params)
    }

    /// Builds a `From` header. A tag is added by [`FromTo::add_tag`].
    pub fn from(display: &str, uri: &str, params: &[(&str, &str)]) -> Result<FromTo> {
        Self::build(HeaderKind::From, display, uri, params)
    }

    fn build(kind: HeaderKind, display: &str, uri: &str, params: &[(&str, &str)]) -> Result<FromTo> {
        Uri::parse(uri)?;
        Self::from_line(Buf::from(write_name_addr(kind, display, uri, params)?))
    }

    fn from_line(line: Buf) -> Result<FromTo> {
        match Header::parse(line)?.into_typed() {
            TypedHeader::From(v) | TypedHeader::To(v) => Ok(v),
            _ => Err(Error::InvalidArgument("not a From or To header")),
        }
    }

    /// Appends a random `tag` parameter.
    pub fn add_tag(&mut self, ids: &mut IdGenerator) -> Result<()> {
        if self.tag.is_some() {
            return Err(Error::TagExists);
        }
        let line = format!("{};{}={}", self.raw, TAG_PARAM, ids.tag());
        *self = Self::from_line(Buf::from(line))?;
        Ok(())
    }

    /// Display name as written, quotes included.
    pub fn display_name(&self) -> &str {
        self.raw.get(self.name_addr.display)
    }

    /// The address text.
    pub fn addr(&self) -> &str {
        self.raw.get(self.name_addr.addr)
    }

    /// Parses the address.
    pub fn uri(&self) -> Result<Uri> {
        Uri::from_buf(self.raw.slice(self.name_addr.addr))
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.map(|tag| self.raw.get(tag))
    }

    /// A parameter other than `tag`, `Some("")` when it has no value.
    pub fn param(&self, name: &str) -> Option<&str> {
        find_param(&self.raw, &self.params, name)
    }

    /// Parameters other than `tag`, in order.
    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        iter_params(&self.raw, &self.params)
    }

    /// The whole header line.
    pub fn as_str(&self) -> &str {
        self.raw.as_str()
    }

    pub fn buf(&self) -> &Buf {
        &self.raw
    }
}

impl SipHeaderParse for FromTo {
    /*
     * From/To = ( name-addr / addr-spec ) *( SEMI from-param )
     * tag-param = "tag" EQUAL token
     */
    fn parse(raw: &Buf, parser: &mut Parser) -> PResult<Self> {
        let name_addr = parse_name_addr(parser, false)?;

        let mut tag = None;
        let mut params = Vec::new();
        for param in parser.params(is_via_param)? {
            if parser.str(param.name).eq_ignore_ascii_case(TAG_PARAM) {
                let Some(value) = param.value else {
                    return parser.error("tag without value");
                };
                tag = Some(value);
            } else {
                params.push(param);
            }
        }
        parser.end()?;

        Ok(FromTo {
            raw: raw.clone(),
            name_addr,
            tag,
            params,
        })
    }
}

impl fmt::Display for FromTo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<FromTo> {
        FromTo::from_line(Buf::from(line))
    }

    #[test]
    fn test_builder_rejects_line_breaks() {
        let err = FromTo::to("Bob\r\nX-Injected: evil", "sip:bob@biloxi.com", &[]).unwrap_err();
        assert!(err.to_string().contains("line break"));

        assert!(FromTo::from("Alice", "sip:alice@atlanta.com", &[("x", "a\nb")]).is_err());
    }

    #[test]
    fn test_parse_folded_to() {
        let to = parse("TO :\r\n sip:vivekg@chair-dnrc.example.com ;   tag    = 1918181833n").unwrap();

        assert_eq!(to.addr(), "sip:vivekg@chair-dnrc.example.com");
        assert_eq!(to.tag(), Some("1918181833n"));
        assert_eq!(to.display_name(), "");
    }

    #[test]
    fn test_parse_params_and_tag() {
        let from = parse(
            "From: token1~` token2'+_ token3*%!.- <sip:mundane@example.com>\
             ;fromParam''~+*_!.-%=\"работающий\";tag=_token~1'+`*%!-.",
        )
        .unwrap();

        assert_eq!(from.display_name(), "token1~` token2'+_ token3*%!.-");
        assert_eq!(from.tag(), Some("_token~1'+`*%!-."));
        assert_eq!(from.param("FROMPARAM''~+*_!.-%"), Some("работающий"));
        assert_eq!(from.params().count(), 1);
        assert_eq!(from.uri().unwrap().user(), "mundane");
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("To: \"Mr. J. User <sip:j.user@example.com>").is_err());
        assert!(parse("From:    Bell, Alexander <sip:a.g.bell@example.com>;tag=43").is_err());
        assert!(parse("To: <sip:a@b.com>;;").is_err());
        assert!(parse("To: <sip:a@b.com> trailing").is_err());
    }

    #[test]
    fn test_create_to() {
        let to = FromTo::to("", "sip:alice@voip.com", &[]).unwrap();
        assert_eq!(to.addr(), "sip:alice@voip.com");
        assert_eq!(to.display_name(), "");
        assert_eq!(to.as_str(), "To: <sip:alice@voip.com>");

        let to = FromTo::to("", "sip:bob@atlanta.com", &[("foo", "bar"), ("lr", "lr")]).unwrap();
        assert_eq!(to.param("foo"), Some("bar"));
        assert_eq!(to.param("lr"), Some(""));

        assert!(FromTo::to("", "not a uri", &[]).is_err());
    }

    #[test]
    fn test_create_from_and_tag() {
        let mut ids = IdGenerator::seeded(9);
        let mut from = FromTo::from("", "sip:alice@voip.com", &[("user", "phone")]).unwrap();
        assert_eq!(from.as_str(), "From: <sip:alice@voip.com>;user=phone");
        assert_eq!(from.tag(), None);

        from.add_tag(&mut ids).unwrap();
        let tag = from.tag().unwrap().to_owned();
        assert!(!tag.is_empty());
        assert_eq!(from.as_str(), format!("From: <sip:alice@voip.com>;user=phone;tag={tag}"));

        assert_matches!(from.add_tag(&mut ids), Err(Error::TagExists));

        let from = FromTo::from("Carl", "sip:225@atlanta.com", &[]).unwrap();
        assert_eq!(from.display_name(), "\"Carl\"");
        assert_eq!(from.to_string(), "From: \"Carl\" <sip:225@atlanta.com>");
    }
}
