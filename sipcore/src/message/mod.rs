//! SIP Message types
//!
//! A [`Message`] is a start line, the ordered header lines and a body.
//! Typed views such as [`Message::from`] or [`Message::vias`] are read from
//! the header list each time they are asked for, so they always agree with
//! what [`Message::to_bytes`] writes.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};
use util::ascii::is_digit;
use util::Scanner;

use crate::error::{Error, Result, SipParserError};
use crate::headers::{
    CSeq, CallId, Contacts, ContentType, FromTo, Header, HeaderKind, Headers, Route, TypedHeader, Via,
    CSEQ_LIMIT,
};
use crate::ids::IdGenerator;
use crate::parser::{is_token, SIPV2};

pub mod auth;
pub mod buffer;
mod method;
pub mod uri;

pub use method::SipMethod;

use auth::{Challenge, Credentials};
use buffer::{Buf, Span};
use uri::Uri;

const MAX_FORWARDS_LIMIT: u32 = 255;

const CRLF: &[u8] = b"\r\n";

/// `Method SP Request-URI SP SIP-Version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    raw: Buf,
    method: Span,
    uri: Uri,
}

impl RequestLine {
    /// Single spaces only; the URI may not be enclosed in `<>`.
    fn parse(raw: Buf) -> Result<RequestLine> {
        let line = raw.as_str();
        let invalid = || Error::from(SipParserError::new("invalid request line").in_line(line));

        let mut parts = line.split(' ');
        let (Some(method), Some(uri), Some(version), None) = (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        if method.is_empty() || !method.bytes().all(is_token) || uri.starts_with('<') || version != SIPV2 {
            return Err(invalid());
        }

        let method = Span::new(0, method.len());
        let start = method.end() + 1;
        let uri = Uri::from_buf(raw.slice(Span::new(start, start + uri.len()))).map_err(|_| invalid())?;

        Ok(RequestLine { raw, method, uri })
    }

    /// The method as written.
    pub fn method(&self) -> &str {
        self.raw.get(self.method)
    }

    pub fn sip_method(&self) -> SipMethod {
        SipMethod::from(self.method())
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn as_str(&self) -> &str {
        self.raw.as_str()
    }
}

/// `SIP-Version SP Status-Code SP Reason-Phrase`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    raw: Buf,
    code: u16,
    reason: Span,
}

impl StatusLine {
    /// The reason phrase may be empty, with or without the space before it.
    fn parse(raw: Buf) -> Result<StatusLine> {
        let line = raw.as_str();
        let invalid = || Error::from(SipParserError::new("invalid status line").in_line(line));

        let Some(rest) = line.strip_prefix("SIP/2.0 ") else {
            return Err(invalid());
        };
        let bytes = rest.as_bytes();
        if bytes.len() < 3 || bytes[0] == b'0' || !bytes[..3].iter().all(|b| is_digit(*b)) {
            return Err(invalid());
        }
        let code = Scanner::new(&bytes[..3]).read_num::<u16>()?;

        let reason_start = line.len() - rest.len() + 3;
        let reason = match &rest[3..] {
            "" => Span::new(reason_start, reason_start),
            tail if tail.starts_with(' ') && !tail.contains(['\r', '\n']) => Span::new(reason_start + 1, line.len()),
            _ => return Err(invalid()),
        };

        Ok(StatusLine { raw, code, reason })
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn reason(&self) -> &str {
        self.raw.get(self.reason)
    }

    pub fn as_str(&self) -> &str {
        self.raw.as_str()
    }
}

/// The first line of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartLine {
    Request(RequestLine),
    Response(StatusLine),
}

impl StartLine {
    pub fn kind(&self) -> HeaderKind {
        match self {
            StartLine::Request(_) => HeaderKind::RequestLine,
            StartLine::Response(_) => HeaderKind::StatusLine,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            StartLine::Request(line) => line.as_str(),
            StartLine::Response(line) => line.as_str(),
        }
    }
}

/// Everything [`Message::new_request`] needs.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub method: SipMethod,
    pub uri: Uri,
    /// Left out when `None`; the transport layer adds its own.
    pub via: Option<Via>,
    pub to: FromTo,
    /// A tag is added when the header has none.
    pub from: FromTo,
    pub cseq: u32,
    pub max_forwards: u32,
}

/// A SIP request or response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    start_line: StartLine,
    headers: Headers,
    body: Bytes,
}

impl Message {
    /// Parses a copy of `data`.
    pub fn parse(data: &[u8]) -> Result<Message> {
        Self::from_bytes(Bytes::copy_from_slice(data))
    }

    /// Parses `data`; header lines and body share its storage.
    ///
    /// Folded continuation lines are joined to the header they continue.
    /// The body is everything after the empty line and is not checked
    /// against `Content-Length`.
    pub fn from_bytes(data: Bytes) -> Result<Message> {
        let first_end = find_crlf(&data, 0).ok_or_else(|| SipParserError::new("missing first line terminator"))?;
        let first = text_at(&data, 0, first_end)?;
        let start_line = if first.as_str().starts_with("SIP/") {
            StartLine::Response(StatusLine::parse(first)?)
        } else {
            StartLine::Request(RequestLine::parse(first)?)
        };

        let mut headers = Headers::new();
        let mut pos = first_end + CRLF.len();
        loop {
            if data[pos..].starts_with(CRLF) {
                pos += CRLF.len();
                break;
            }
            let missing_end = || SipParserError::new("missing empty line after headers");
            let mut end = find_crlf(&data, pos).ok_or_else(missing_end)?;
            while matches!(data.get(end + CRLF.len()), Some(b' ' | b'\t')) {
                end = find_crlf(&data, end + CRLF.len()).ok_or_else(missing_end)?;
            }
            headers.push(Header::parse(text_at(&data, pos, end)?)?);
            pos = end + CRLF.len();
        }

        let msg = Message {
            start_line,
            headers,
            body: data.slice(pos..),
        };
        if !msg.contacts().is_valid() {
            return Err(SipParserError::new("Contact '*' combined with other contacts").into());
        }
        log::trace!("parsed {} with {} headers", msg.start_line.as_str(), msg.headers.len());

        Ok(msg)
    }

    /// Builds a request.
    ///
    /// The Call-ID is generated and `From` gets a tag when it has none.
    /// Headers are written in the order Via, Max-Forwards, To, From,
    /// Call-ID, CSeq, Content-Length.
    pub fn new_request(config: RequestConfig, ids: &mut IdGenerator) -> Result<Message> {
        let RequestConfig {
            method,
            uri,
            via,
            to,
            mut from,
            cseq,
            max_forwards,
        } = config;

        if method == SipMethod::Unknown {
            return Err(Error::InvalidArgument("unknown method"));
        }
        if cseq >= CSEQ_LIMIT {
            return Err(Error::InvalidCSeq(cseq));
        }
        if max_forwards > MAX_FORWARDS_LIMIT {
            return Err(Error::InvalidMaxForwards(max_forwards));
        }
        if from.tag().is_none() {
            from.add_tag(ids)?;
        }

        let request_line = RequestLine::parse(Buf::from(format!("{method} {uri} {SIPV2}")))?;

        let mut headers = Headers::with_capacity(7);
        if let Some(via) = via {
            headers.push(header_line(format!("Via: {via}"))?);
        }
        headers.push(header_line(format!("Max-Forwards: {max_forwards}"))?);
        headers.push(line_of_kind(to.buf(), HeaderKind::To)?);
        headers.push(line_of_kind(from.buf(), HeaderKind::From)?);
        headers.push(header_line(format!("Call-ID: {}", ids.call_id()))?);
        headers.push(header_line(format!("CSeq: {cseq} {method}"))?);
        headers.push(header_line("Content-Length: 0".to_owned())?);

        Ok(Message {
            start_line: StartLine::Request(request_line),
            headers,
            body: Bytes::new(),
        })
    }

    /// Builds a response to this request.
    ///
    /// Every Via line is copied in order, then From, To, Call-ID and CSeq.
    pub fn new_response(&self, code: u16, reason: &str) -> Result<Message> {
        if !self.is_request() {
            return Err(Error::InvalidArgument("response requires a request"));
        }
        if !(100..=699).contains(&code) {
            return Err(Error::InvalidStatusCode(code));
        }

        let status = if reason.is_empty() {
            format!("{SIPV2} {code}")
        } else {
            format!("{SIPV2} {code} {reason}")
        };
        let status_line = StatusLine::parse(Buf::from(status))?;

        let mut headers = Headers::new();
        for via in self.headers.iter().filter(|h| h.kind() == HeaderKind::Via) {
            headers.push(via.clone());
        }
        for kind in [HeaderKind::From, HeaderKind::To, HeaderKind::CallId, HeaderKind::CSeq] {
            headers.push(self.required(kind)?.clone());
        }
        headers.push(header_line("Content-Length: 0".to_owned())?);

        Ok(Message {
            start_line: StartLine::Response(status_line),
            headers,
            body: Bytes::new(),
        })
    }

    /// Builds the ACK for a final `response` to this request.
    ///
    /// Call-ID, From, Max-Forwards and Route come from the request, To from
    /// the response. Only the topmost Via entry is kept.
    pub fn new_ack(&self, response: &Message) -> Result<Message> {
        let Some(request_line) = self.request_line() else {
            return Err(Error::InvalidArgument("ACK requires a request"));
        };
        if !response.is_response() {
            return Err(Error::InvalidArgument("ACK requires a response"));
        }

        let via = self.vias().next().ok_or(Error::MissingRequiredHeader("Via"))?;
        let cseq = self.cseq().ok_or(Error::MissingRequiredHeader("CSeq"))?;
        let to = response.required(HeaderKind::To)?;

        let ack_line = RequestLine::parse(Buf::from(format!(
            "{} {} {SIPV2}",
            SipMethod::Ack,
            request_line.uri()
        )))?;

        let mut headers = Headers::new();
        headers.push(header_line(format!("Via: {via}"))?);
        if let Some(max_forwards) = self.last(HeaderKind::MaxForwards) {
            headers.push(max_forwards.clone());
        }
        headers.push(to.clone());
        headers.push(self.required(HeaderKind::From)?.clone());
        headers.push(self.required(HeaderKind::CallId)?.clone());
        headers.push(header_line(format!("CSeq: {} {}", cseq.number(), SipMethod::Ack))?);
        for route in self.headers.iter().filter(|h| h.kind() == HeaderKind::Route) {
            headers.push(route.clone());
        }
        headers.push(header_line("Content-Length: 0".to_owned())?);

        Ok(Message {
            start_line: StartLine::Request(ack_line),
            headers,
            body: Bytes::new(),
        })
    }

    /// Adds a random tag to the `To` header.
    pub fn add_to_tag(&mut self, ids: &mut IdGenerator) -> Result<()> {
        let index = self
            .headers
            .last_position(HeaderKind::To)
            .ok_or(Error::MissingRequiredHeader("To"))?;
        let Some(TypedHeader::To(to)) = self.headers.get(index).map(Header::typed) else {
            return Err(Error::MissingRequiredHeader("To"));
        };

        let mut to = to.clone();
        to.add_tag(ids)?;
        let header = Header::parse(to.buf().clone())?;
        self.headers.replace(index, header);

        Ok(())
    }

    /// Appends the header `name: value`.
    ///
    /// Known headers must match their grammar, so a bad `Via` is refused
    /// here rather than when it is read back.
    pub fn add_header(&mut self, name: &str, value: &str) -> Result<()> {
        let header = Header::new(name, value)?;
        if let TypedHeader::Contact(added) = header.typed() {
            let mut contacts = self.contacts();
            contacts.extend(added);
            if !contacts.is_valid() {
                return Err(SipParserError::new("Contact '*' combined with other contacts")
                    .in_line(header.as_str())
                    .into());
            }
        }
        self.headers.push(header);
        Ok(())
    }

    /// Removes every header called `name`, returning `true` if one was.
    pub fn remove_header(&mut self, name: &str) -> bool {
        self.headers.remove(name)
    }

    /// Replaces the body, its `Content-Type` and its `Content-Length`.
    pub fn set_body(&mut self, content_type: &str, body: impl Into<Bytes>) -> Result<()> {
        let body = body.into();
        let content_type = Header::new(HeaderKind::ContentType.name(), content_type)?;
        let content_length = Header::new(HeaderKind::ContentLength.name(), &body.len().to_string())?;

        self.headers.remove(HeaderKind::ContentType.name());
        self.headers.remove(HeaderKind::ContentLength.name());
        self.headers.push(content_type);
        self.headers.push(content_length);
        self.body = body;

        Ok(())
    }

    pub fn is_request(&self) -> bool {
        matches!(self.start_line, StartLine::Request(_))
    }

    pub fn is_response(&self) -> bool {
        matches!(self.start_line, StartLine::Response(_))
    }

    pub fn start_line(&self) -> &StartLine {
        &self.start_line
    }

    pub fn request_line(&self) -> Option<&RequestLine> {
        match &self.start_line {
            StartLine::Request(line) => Some(line),
            StartLine::Response(_) => None,
        }
    }

    pub fn status_line(&self) -> Option<&StatusLine> {
        match &self.start_line {
            StartLine::Response(line) => Some(line),
            StartLine::Request(_) => None,
        }
    }

    /// The request method, `None` for responses.
    pub fn method(&self) -> Option<&str> {
        self.request_line().map(RequestLine::method)
    }

    pub fn request_uri(&self) -> Option<&Uri> {
        self.request_line().map(RequestLine::uri)
    }

    pub fn status_code(&self) -> Option<u16> {
        self.status_line().map(StatusLine::code)
    }

    pub fn reason(&self) -> Option<&str> {
        self.status_line().map(StatusLine::reason)
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    fn last(&self, kind: HeaderKind) -> Option<&Header> {
        self.headers.iter().rev().find(|h| h.kind() == kind)
    }

    fn required(&self, kind: HeaderKind) -> Result<&Header> {
        self.last(kind).ok_or(Error::MissingRequiredHeader(kind.name()))
    }

    fn typed(&self, kind: HeaderKind) -> Option<&TypedHeader> {
        self.last(kind).map(Header::typed)
    }

    /// The last `From` header.
    pub fn from(&self) -> Option<&FromTo> {
        match self.typed(HeaderKind::From)? {
            TypedHeader::From(from) => Some(from),
            _ => None,
        }
    }

    /// The last `To` header.
    pub fn to(&self) -> Option<&FromTo> {
        match self.typed(HeaderKind::To)? {
            TypedHeader::To(to) => Some(to),
            _ => None,
        }
    }

    pub fn cseq(&self) -> Option<&CSeq> {
        match self.typed(HeaderKind::CSeq)? {
            TypedHeader::CSeq(cseq) => Some(cseq),
            _ => None,
        }
    }

    pub fn call_id(&self) -> Option<&CallId> {
        match self.typed(HeaderKind::CallId)? {
            TypedHeader::CallId(call_id) => Some(call_id),
            _ => None,
        }
    }

    pub fn content_length(&self) -> Option<u32> {
        match self.typed(HeaderKind::ContentLength)? {
            TypedHeader::ContentLength(len) => Some(*len),
            _ => None,
        }
    }

    pub fn max_forwards(&self) -> Option<u32> {
        match self.typed(HeaderKind::MaxForwards)? {
            TypedHeader::MaxForwards(n) => Some(*n),
            _ => None,
        }
    }

    pub fn expires(&self) -> Option<u32> {
        match self.typed(HeaderKind::Expires)? {
            TypedHeader::Expires(secs) => Some(*secs),
            _ => None,
        }
    }

    pub fn content_type(&self) -> Option<&ContentType> {
        match self.typed(HeaderKind::ContentType)? {
            TypedHeader::ContentType(ct) => Some(ct),
            _ => None,
        }
    }

    /// `true` when the body is `application/sdp`.
    pub fn is_sdp(&self) -> bool {
        self.content_type().is_some_and(ContentType::is_sdp)
    }

    /// Every Via entry, topmost first.
    pub fn vias(&self) -> impl Iterator<Item = &Via> {
        self.headers
            .iter()
            .filter_map(|h| match h.typed() {
                TypedHeader::Via(vias) => Some(vias.iter()),
                _ => None,
            })
            .flatten()
    }

    /// Addresses of every Contact header.
    pub fn contacts(&self) -> Contacts {
        let mut all = Contacts::default();
        for header in &self.headers {
            if let TypedHeader::Contact(contacts) = header.typed() {
                all.extend(contacts);
            }
        }
        all
    }

    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.headers
            .iter()
            .filter_map(|h| match h.typed() {
                TypedHeader::Route(routes) => Some(routes.iter()),
                _ => None,
            })
            .flatten()
    }

    pub fn record_routes(&self) -> impl Iterator<Item = &Route> {
        self.headers
            .iter()
            .filter_map(|h| match h.typed() {
                TypedHeader::RecordRoute(routes) => Some(routes.iter()),
                _ => None,
            })
            .flatten()
    }

    /// The first `WWW-Authenticate` challenge.
    pub fn www_authenticate(&self) -> Result<Option<Challenge>> {
        self.challenge(HeaderKind::WwwAuthenticate)
    }

    /// The first `Proxy-Authenticate` challenge.
    pub fn proxy_authenticate(&self) -> Result<Option<Challenge>> {
        self.challenge(HeaderKind::ProxyAuthenticate)
    }

    pub fn authorization(&self) -> Result<Option<Credentials>> {
        self.credentials(HeaderKind::Authorization)
    }

    pub fn proxy_authorization(&self) -> Result<Option<Credentials>> {
        self.credentials(HeaderKind::ProxyAuthorization)
    }

    fn challenge(&self, kind: HeaderKind) -> Result<Option<Challenge>> {
        self.headers
            .find(kind)
            .map(|h| Challenge::from_buf(h.value_buf()))
            .transpose()
    }

    fn credentials(&self, kind: HeaderKind) -> Result<Option<Credentials>> {
        self.headers
            .find(kind)
            .map(|h| Credentials::from_buf(h.value_buf()))
            .transpose()
    }

    /// Serializes the message: start line, headers in order, an empty line
    /// and the body.
    pub fn to_bytes(&self) -> Bytes {
        let head: usize = self.headers.iter().map(|h| h.as_str().len() + CRLF.len()).sum();
        let mut out = BytesMut::with_capacity(self.start_line.as_str().len() + head + 2 * CRLF.len() + self.body.len());

        out.put_slice(self.start_line.as_str().as_bytes());
        out.put_slice(CRLF);
        for header in &self.headers {
            out.put_slice(header.as_str().as_bytes());
            out.put_slice(CRLF);
        }
        out.put_slice(CRLF);
        out.put_slice(&self.body);

        out.freeze()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\r\n", self.start_line.as_str())?;
        for header in &self.headers {
            write!(f, "{header}\r\n")?;
        }
        f.write_str("\r\n")?;
        f.write_str(&String::from_utf8_lossy(&self.body))
    }
}

fn find_crlf(data: &[u8], from: usize) -> Option<usize> {
    data.get(from..)?
        .windows(CRLF.len())
        .position(|w| w == CRLF)
        .map(|i| i + from)
}

fn text_at(data: &Bytes, start: usize, end: usize) -> Result<Buf> {
    std::str::from_utf8(&data[start..end]).map_err(SipParserError::from)?;
    Ok(Buf::from_utf8_bytes(data.slice(start..end)))
}

fn header_line(line: String) -> Result<Header> {
    Header::parse(Buf::from(line))
}

fn line_of_kind(line: &Buf, kind: HeaderKind) -> Result<Header> {
    let header = Header::parse(line.clone())?;
    if header.kind() != kind {
        return Err(Error::InvalidArgument("header of the wrong kind"));
    }
    Ok(header)
}
