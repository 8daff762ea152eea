use std::fmt;

use crate::error::{Error, Result};
use crate::headers::name_addr::{parse_name_addr, NameAddr};
use crate::headers::{write_name_addr, Header, HeaderKind, SipHeaderParse, TypedHeader};
use crate::macros::comma_separated_value;
use crate::message::buffer::{Buf, Span};
use crate::message::uri::Uri;
use crate::parser::{find_param, is_via_param, iter_params, PResult, Param, Parser};

/// One address of a `Contact` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    raw: Buf,
    entry: Span,
    name_addr: NameAddr,
    params: Vec<Param>,
}

impl Contact {
    /// Builds a `Contact` line holding one address.
    ///
    /// ```
    /// # use sipcore::headers::Contact;
    /// let contact = Contact::new("Alice", "sip:alice@voip.com", &[("q", "0.7")]).unwrap();
    ///
    /// assert_eq!(contact.buf().as_str(), "Contact: \"Alice\" <sip:alice@voip.com>;q=0.7");
    /// assert_eq!(contact.param("q"), Some("0.7"));
    /// ```
    pub fn new(display: &str, uri: &str, params: &[(&str, &str)]) -> Result<Contact> {
        Uri::parse(uri)?;
        let line = write_name_addr(HeaderKind::Contact, display, uri, params)?;
        match Header::parse(Buf::from(line))?.into_typed() {
            TypedHeader::Contact(contacts) => contacts
                .entries
                .into_iter()
                .next()
                .ok_or(Error::InvalidArgument("empty Contact")),
            _ => Err(Error::InvalidArgument("not a Contact header")),
        }
    }

    /// Display name as written, quotes included.
    pub fn display_name(&self) -> &str {
        self.raw.get(self.name_addr.display)
    }

    /// The address text.
    pub fn addr(&self) -> &str {
        self.raw.get(self.name_addr.addr)
    }

    pub fn uri(&self) -> Result<Uri> {
        Uri::from_buf(self.raw.slice(self.name_addr.addr))
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        find_param(&self.raw, &self.params, name)
    }

    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        iter_params(&self.raw, &self.params)
    }

    /// The `expires` parameter, if it is a number.
    pub fn expires(&self) -> Option<u32> {
        self.param("expires").and_then(|v| v.parse().ok())
    }

    /// The text of this entry.
    pub fn as_str(&self) -> &str {
        self.raw.get(self.entry)
    }

    /// The whole line this entry was read from.
    pub fn buf(&self) -> &Buf {
        &self.raw
    }
}

impl SipHeaderParse for Contact {
    fn parse(raw: &Buf, parser: &mut Parser) -> PResult<Self> {
        let start = parser.offset();
        let name_addr = parse_name_addr(parser, true)?;
        let params = parser.params(is_via_param)?;

        Ok(Contact {
            raw: raw.clone(),
            entry: Span::new(start, parser.offset()),
            name_addr,
            params,
        })
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The addresses of one or more `Contact` headers, or the `*` wildcard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contacts {
    star: bool,
    entries: Vec<Contact>,
}

impl Contacts {
    /// `true` for `Contact: *`.
    pub fn is_star(&self) -> bool {
        self.star
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first(&self) -> Option<&Contact> {
        self.entries.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Contact> {
        self.entries.iter()
    }

    /// Appends the contacts of another line.
    pub(crate) fn extend(&mut self, other: &Contacts) {
        self.star |= other.star;
        self.entries.extend(other.entries.iter().cloned());
    }

    /// `*` may not be combined with addresses.
    pub(crate) fn is_valid(&self) -> bool {
        !self.star || self.entries.is_empty()
    }
}

impl SipHeaderParse for Contacts {
    /*
     * Contact = ("Contact" / "m" ) HCOLON
     *           ( STAR / (contact-param *(COMMA contact-param)))
     */
    fn parse(raw: &Buf, parser: &mut Parser) -> PResult<Self> {
        if parser.advance_if_eq(b'*') {
            parser.end()?;
            return Ok(Contacts {
                star: true,
                entries: Vec::new(),
            });
        }

        let entries = comma_separated_value!(parser => Contact::parse(raw, parser)?);

        Ok(Contacts { star: false, entries })
    }
}

impl<'a> IntoIterator for &'a Contacts {
    type Item = &'a Contact;
    type IntoIter = std::slice::Iter<'a, Contact>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
