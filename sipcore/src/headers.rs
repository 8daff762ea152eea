//! SIP Headers types
//!
//! Every header line is kept verbatim in a [`Header`]: its kind, its raw
//! bytes and the spans of its name and value. Headers with a grammar this
//! crate models are also parsed into a [`TypedHeader`] when the line is
//! read, so a malformed `Via` or `CSeq` is rejected up front.

mod call_id;
mod contact;
mod content_type;
mod cseq;
mod from_to;
mod name_addr;
mod route;
mod via;

pub use call_id::CallId;
pub use contact::{Contact, Contacts};
pub use content_type::ContentType;
pub use cseq::CSeq;
pub use from_to::FromTo;
pub use route::Route;
pub use via::Via;

pub(crate) use cseq::CSEQ_LIMIT;

use std::fmt;
use std::fmt::Write;

use enum_as_inner::EnumAsInner;
use itertools::Itertools;

use crate::error::{Result, SipParserError};
use crate::macros::comma_separated_value;
use crate::message::buffer::{Buf, Span};
use crate::parser::{is_token, PResult, Parser};

/// The tag parameter of [`FromTo`] headers.
pub(crate) const TAG_PARAM: &str = "tag";

/// The branch parameter of [`Via`] headers.
pub(crate) const BRANCH_PARAM: &str = "branch";

/// Parses the value of one header kind.
///
/// `parser` runs over the whole header line and starts at the first byte
/// of the value; spans in the result point into `raw`.
pub(crate) trait SipHeaderParse: Sized {
    fn parse(raw: &Buf, parser: &mut Parser) -> PResult<Self>;
}

macro_rules! header_kinds {
    ($($kind:ident => $name:literal $(, $compact:literal)?;)*) => {
        /// Kind of a SIP header line.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum HeaderKind {
            RequestLine,
            StatusLine,
            $($kind,)*
            /// Any header not defined by RFC 3261.
            Other,
        }

        impl HeaderKind {
            /// Canonical name, empty for the first lines and [`HeaderKind::Other`].
            pub const fn name(&self) -> &'static str {
                match self {
                    $(HeaderKind::$kind => $name,)*
                    HeaderKind::RequestLine | HeaderKind::StatusLine | HeaderKind::Other => "",
                }
            }

            /// Compact form, if the header has one.
            pub const fn compact(&self) -> Option<&'static str> {
                match self {
                    $($(HeaderKind::$kind => Some($compact),)?)*
                    _ => None,
                }
            }

            /// Resolves a header name, full or compact, ignoring case.
            pub fn from_name(name: &str) -> HeaderKind {
                $(
                    if name.eq_ignore_ascii_case($name) $(|| name.eq_ignore_ascii_case($compact))? {
                        return HeaderKind::$kind;
                    }
                )*
                HeaderKind::Other
            }
        }
    };
}

header_kinds! {
    Accept => "Accept";
    AcceptEncoding => "Accept-Encoding";
    AcceptLanguage => "Accept-Language";
    AlertInfo => "Alert-Info";
    Allow => "Allow";
    AuthenticationInfo => "Authentication-Info";
    Authorization => "Authorization";
    CallId => "Call-ID", "i";
    CallInfo => "Call-Info";
    Contact => "Contact", "m";
    ContentDisposition => "Content-Disposition";
    ContentEncoding => "Content-Encoding", "e";
    ContentLanguage => "Content-Language";
    ContentLength => "Content-Length", "l";
    ContentType => "Content-Type", "c";
    CSeq => "CSeq";
    Date => "Date";
    ErrorInfo => "Error-Info";
    Expires => "Expires";
    From => "From", "f";
    InReplyTo => "In-Reply-To";
    MaxForwards => "Max-Forwards";
    MimeVersion => "MIME-Version";
    MinExpires => "Min-Expires";
    Organization => "Organization";
    Priority => "Priority";
    ProxyAuthenticate => "Proxy-Authenticate";
    ProxyAuthorization => "Proxy-Authorization";
    ProxyRequire => "Proxy-Require";
    RecordRoute => "Record-Route";
    ReplyTo => "Reply-To";
    Require => "Require";
    RetryAfter => "Retry-After";
    Route => "Route";
    Server => "Server";
    Subject => "Subject", "s";
    Supported => "Supported", "k";
    Timestamp => "Timestamp";
    To => "To", "t";
    Unsupported => "Unsupported";
    UserAgent => "User-Agent";
    Via => "Via", "v";
    Warning => "Warning";
    WwwAuthenticate => "WWW-Authenticate";
}

impl fmt::Display for HeaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The parsed value of a header this crate has a grammar for.
#[derive(Debug, Clone, PartialEq, Eq, EnumAsInner)]
pub enum TypedHeader {
    From(FromTo),
    To(FromTo),
    Via(Vec<Via>),
    Contact(Contacts),
    Route(Vec<Route>),
    RecordRoute(Vec<Route>),
    CSeq(CSeq),
    CallId(CallId),
    ContentLength(u32),
    MaxForwards(u32),
    Expires(u32),
    ContentType(ContentType),
    /// Accepted verbatim.
    Other,
}

/// One header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    kind: HeaderKind,
    raw: Buf,
    name: Span,
    value: Span,
    typed: TypedHeader,
}

impl Header {
    /// Builds and parses the line `name: value`.
    ///
    /// `name` must be a token and `value` a single line.
    pub fn new(name: &str, value: &str) -> Result<Header> {
        if name.is_empty() || !name.bytes().all(is_token) {
            return Err(SipParserError::new("invalid header name").in_line(name).into());
        }
        check_single_line([value])?;
        Header::parse(Buf::from(format!("{name}: {value}")))
    }

    /// Parses one header line, without its terminating CRLF.
    ///
    /// Folded continuation lines are part of `raw`. Errors name the line.
    pub fn parse(raw: Buf) -> Result<Header> {
        Ok(Self::parse_line(&raw).map_err(|err| err.in_line(raw.as_str()))?)
    }

    fn parse_line(raw: &Buf) -> PResult<Header> {
        let line = raw.as_str();
        let Some(colon) = line.find(':') else {
            return Err(SipParserError::new("missing ':' in header"));
        };

        let name = line[..colon].trim_end_matches([' ', '\t']);
        if name.is_empty() || !name.bytes().all(is_token) {
            return Err(SipParserError::new("invalid header name"));
        }
        let kind = HeaderKind::from_name(name);

        let mut parser = Parser::at(line, colon + 1);
        parser.skip_lws();
        let start = parser.offset();
        let end = line.trim_end_matches([' ', '\t', '\r', '\n']).len().max(start);

        let typed = match kind {
            HeaderKind::From => TypedHeader::From(FromTo::parse(raw, &mut parser)?),
            HeaderKind::To => TypedHeader::To(FromTo::parse(raw, &mut parser)?),
            HeaderKind::Via => TypedHeader::Via(comma_separated_value!(parser => Via::parse(raw, &mut parser)?)),
            HeaderKind::Contact => TypedHeader::Contact(Contacts::parse(raw, &mut parser)?),
            HeaderKind::Route => {
                TypedHeader::Route(comma_separated_value!(parser => Route::parse(raw, &mut parser)?))
            }
            HeaderKind::RecordRoute => {
                TypedHeader::RecordRoute(comma_separated_value!(parser => Route::parse(raw, &mut parser)?))
            }
            HeaderKind::CSeq => TypedHeader::CSeq(CSeq::parse(raw, &mut parser)?),
            HeaderKind::CallId => TypedHeader::CallId(CallId::parse(raw, &mut parser)?),
            HeaderKind::ContentLength => TypedHeader::ContentLength(parse_u32(&mut parser)?),
            HeaderKind::MaxForwards => TypedHeader::MaxForwards(parse_u32(&mut parser)?),
            HeaderKind::Expires => TypedHeader::Expires(parse_u32(&mut parser)?),
            HeaderKind::ContentType => TypedHeader::ContentType(ContentType::parse(raw, &mut parser)?),
            _ => TypedHeader::Other,
        };

        Ok(Header {
            kind,
            raw: raw.clone(),
            name: Span::new(0, name.len()),
            value: Span::new(start, end),
            typed,
        })
    }

    pub fn kind(&self) -> HeaderKind {
        self.kind
    }

    /// The name as written in the line.
    pub fn name(&self) -> &str {
        self.raw.get(self.name)
    }

    /// The value as written, without surrounding white space. Folds inside
    /// the value are kept.
    pub fn value(&self) -> &str {
        self.raw.get(self.value)
    }

    /// The value without copying it.
    pub fn value_buf(&self) -> Buf {
        self.raw.slice(self.value)
    }

    /// The whole line.
    pub fn as_str(&self) -> &str {
        self.raw.as_str()
    }

    pub fn raw(&self) -> &Buf {
        &self.raw
    }

    pub fn typed(&self) -> &TypedHeader {
        &self.typed
    }

    pub fn into_typed(self) -> TypedHeader {
        self.typed
    }

    /// `true` if the header is called `name`, full or compact form.
    pub fn is_named(&self, name: &str) -> bool {
        match HeaderKind::from_name(name) {
            HeaderKind::Other => self.kind == HeaderKind::Other && self.name().eq_ignore_ascii_case(name),
            kind => kind == self.kind,
        }
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A collection of SIP Headers, in message order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<Header>);

impl Headers {
    #[inline]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// First header of `kind`.
    pub fn find(&self, kind: HeaderKind) -> Option<&Header> {
        self.0.iter().find(|h| h.kind == kind)
    }

    /// First header called `name`; compact forms and case are resolved.
    ///
    /// ```
    /// # use sipcore::headers::{Header, Headers};
    /// let mut headers = Headers::new();
    /// headers.push(Header::new("Subject", "lunch").unwrap());
    ///
    /// assert_eq!(headers.find_by_name("s").unwrap().value(), "lunch");
    /// ```
    pub fn find_by_name(&self, name: &str) -> Option<&Header> {
        self.0.iter().find(|h| h.is_named(name))
    }

    #[inline]
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Header> {
        self.0.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn push(&mut self, header: Header) {
        self.0.push(header);
    }

    /// Removes every header called `name`, returning `true` if any was.
    pub fn remove(&mut self, name: &str) -> bool {
        let len = self.0.len();
        self.0.retain(|h| !h.is_named(name));
        self.0.len() != len
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Header> {
        self.0.get(index)
    }

    /// Replaces the header at `index`.
    pub(crate) fn replace(&mut self, index: usize, header: Header) {
        if let Some(slot) = self.0.get_mut(index) {
            *slot = header;
        }
    }

    pub(crate) fn last_position(&self, kind: HeaderKind) -> Option<usize> {
        self.0.iter().rposition(|h| h.kind == kind)
    }
}

impl From<Vec<Header>> for Headers {
    fn from(headers: Vec<Header>) -> Self {
        Self(headers)
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = &'a Header;
    type IntoIter = std::slice::Iter<'a, Header>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

fn parse_u32(parser: &mut Parser) -> PResult<u32> {
    let value = parser.read_u32()?;
    parser.end()?;
    Ok(value)
}

/// Writes `"display"` with `"` and `\` escaped.
pub(crate) fn write_quoted(line: &mut String, display: &str) {
    line.push('"');
    for c in display.chars() {
        if c == '"' || c == '\\' {
            line.push('\\');
        }
        line.push(c);
    }
    line.push('"');
}

/// Writes `;name=value`, or `;name` when the value is empty or repeats the
/// name.
pub(crate) fn write_params(line: &mut String, params: &[(&str, &str)]) {
    let formatted = params.iter().format_with("", |(name, value), f| {
        if value.is_empty() || value == name {
            f(&format_args!(";{name}"))
        } else {
            f(&format_args!(";{name}={value}"))
        }
    });
    let _ = write!(line, "{formatted}");
}

/// Fails when one of `parts` holds a CR or LF.
pub(crate) fn check_single_line<'a>(parts: impl IntoIterator<Item = &'a str>) -> Result<()> {
    match parts.into_iter().find(|part| part.contains(['\r', '\n'])) {
        Some(part) => Err(SipParserError::new("line break in header value").in_line(part).into()),
        None => Ok(()),
    }
}

/// Writes `Name: ["display" ]<uri>;params`.
pub(crate) fn write_name_addr(
    kind: HeaderKind,
    display: &str,
    uri: &str,
    params: &[(&str, &str)],
) -> Result<String> {
    check_single_line([display, uri].into_iter().chain(params.iter().flat_map(|&(name, value)| [name, value])))?;

    let mut line = String::with_capacity(kind.name().len() + display.len() + uri.len() + 8);
    line.push_str(kind.name());
    line.push_str(": ");
    if !display.is_empty() {
        write_quoted(&mut line, display);
        line.push(' ');
    }
    line.push('<');
    line.push_str(uri);
    line.push('>');
    write_params(&mut line, params);
    Ok(line)
}
