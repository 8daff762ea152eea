//! SIP, SIPS and absolute URIs.

use std::fmt;
use std::str::FromStr;

use util::ascii::is_hex;
use util::Scanner;

use crate::error::{Error, Result, SipParserError};
use crate::message::buffer::{Buf, BufWriter, Span};
use crate::parser::{is_hdr_uri, is_host, is_param, is_pass, is_scheme, is_user};

const MAX_PORT: u32 = u16::MAX as u32;

/// The scheme family of a [`Uri`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UriKind {
    Sip,
    Sips,
    /// Any other scheme (`tel:`, `https:`, `urn:`...).
    Absolute,
}

/// A parsed URI.
///
/// The text lives in one [`Buf`]; every component is a span into it.
#[derive(Clone)]
pub struct Uri {
    buf: Buf,
    kind: UriKind,
    scheme: Span,
    user: Span,
    password: Span,
    host: Span,
    port: Span,
    params: Span,
    headers: Span,
}

impl Uri {
    /// Parses a copy of `s`.
    pub fn parse(s: &str) -> Result<Uri> {
        Self::from_buf(Buf::copy_from_str(s))
    }

    /// Parses `buf` in place.
    pub fn from_buf(buf: Buf) -> Result<Uri> {
        let mut uri = Uri {
            buf,
            kind: UriKind::Absolute,
            scheme: Span::EMPTY,
            user: Span::EMPTY,
            password: Span::EMPTY,
            host: Span::EMPTY,
            port: Span::EMPTY,
            params: Span::EMPTY,
            headers: Span::EMPTY,
        };
        uri.parse_in_place()
            .map_err(|err| err.in_line(uri.buf.as_str()))?;

        Ok(uri)
    }

    /// `sip:host[:port]`; a port of 0 is omitted.
    pub fn new_sip(host: &str, port: u32) -> Result<Uri> {
        Self::new_with_scheme(UriKind::Sip, host, port)
    }

    /// `sips:host[:port]`; a port of 0 is omitted.
    pub fn new_sips(host: &str, port: u32) -> Result<Uri> {
        Self::new_with_scheme(UriKind::Sips, host, port)
    }

    fn new_with_scheme(kind: UriKind, host: &str, port: u32) -> Result<Uri> {
        if host.is_empty() {
            return Err(Error::InvalidArgument("empty host"));
        }
        let port = check_port(port)?;
        let scheme = if kind == UriKind::Sips { "sips" } else { "sip" };

        Ok(Self::render(kind, scheme, "", "", host, port, "", ""))
    }

    pub fn kind(&self) -> UriKind {
        self.kind
    }

    /// `true` for `sip:` and `sips:` URIs.
    pub fn is_sip(&self) -> bool {
        self.kind != UriKind::Absolute
    }

    pub fn scheme(&self) -> &str {
        self.buf.get(self.scheme)
    }

    pub fn user(&self) -> &str {
        self.buf.get(self.user)
    }

    pub fn password(&self) -> &str {
        self.buf.get(self.password)
    }

    pub fn host(&self) -> &str {
        self.buf.get(self.host)
    }

    /// The port, if one is written.
    pub fn port(&self) -> Option<u16> {
        self.buf.get(self.port).parse().ok()
    }

    /// Raw parameter text including the leading `;`.
    pub fn params(&self) -> &str {
        self.buf.get(self.params)
    }

    /// Raw header text including the leading `?`.
    pub fn headers(&self) -> &str {
        self.buf.get(self.headers)
    }

    /// Value of the parameter `name`, `Some("")` when it has no value.
    pub fn param(&self, name: &str) -> Option<&str> {
        lookup(self.params(), ';', name)
    }

    /// Value of the header `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        lookup(self.headers(), '&', name)
    }

    pub fn as_str(&self) -> &str {
        self.buf.as_str()
    }

    pub fn buf(&self) -> &Buf {
        &self.buf
    }

    /// Replaces the userinfo. Empty `user` and `password` remove it.
    pub fn set_userinfo(&mut self, user: &str, password: &str) -> Result<()> {
        self.check_mutable()?;
        if user.is_empty() && !password.is_empty() {
            return Err(Error::InvalidArgument("password without user"));
        }
        check_chars(user, is_user, "invalid character in URI user")?;
        check_chars(password, is_pass, "invalid character in URI password")?;
        *self = Self::render(
            self.kind,
            self.scheme(),
            user,
            password,
            self.host(),
            self.port(),
            self.params(),
            self.headers(),
        );
        Ok(())
    }

    /// Sets the port, 0 removes it.
    pub fn set_port(&mut self, port: u32) -> Result<()> {
        self.check_mutable()?;
        let port = check_port(port)?;
        *self = Self::render(
            self.kind,
            self.scheme(),
            self.user(),
            self.password(),
            self.host(),
            port,
            self.params(),
            self.headers(),
        );
        Ok(())
    }

    /// Appends `;name=value`, or `;name` when `value` is empty or equal to
    /// `name`.
    pub fn add_param(&mut self, name: &str, value: &str) -> Result<()> {
        self.check_mutable()?;
        if name.is_empty() {
            return Err(Error::InvalidArgument("empty parameter name"));
        }
        check_chars(name, is_param, "invalid character in URI parameter")?;
        check_chars(value, is_param, "invalid character in URI parameter")?;
        if self.param(name).is_some() {
            return Err(Error::ParamExists(name.to_owned()));
        }
        let params = if value.is_empty() || value == name {
            format!("{};{}", self.params(), name)
        } else {
            format!("{};{}={}", self.params(), name, value)
        };
        *self = Self::render(
            self.kind,
            self.scheme(),
            self.user(),
            self.password(),
            self.host(),
            self.port(),
            &params,
            self.headers(),
        );
        Ok(())
    }

    /// Appends a `name=value` URI header.
    pub fn add_header(&mut self, name: &str, value: &str) -> Result<()> {
        self.check_mutable()?;
        if name.is_empty() {
            return Err(Error::InvalidArgument("empty header name"));
        }
        check_chars(name, is_hdr_uri, "invalid character in URI header")?;
        check_chars(value, is_hdr_uri, "invalid character in URI header")?;
        if self.header(name).is_some() {
            return Err(Error::HeaderExists(name.to_owned()));
        }
        let sep = if self.headers().is_empty() { '?' } else { '&' };
        let headers = format!("{}{}{}={}", self.headers(), sep, name, value);
        *self = Self::render(
            self.kind,
            self.scheme(),
            self.user(),
            self.password(),
            self.host(),
            self.port(),
            self.params(),
            &headers,
        );
        Ok(())
    }

    fn check_mutable(&self) -> Result<()> {
        if self.is_sip() {
            Ok(())
        } else {
            Err(Error::UnsupportedUri)
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn render(
        kind: UriKind,
        scheme: &str,
        user: &str,
        password: &str,
        host: &str,
        port: Option<u16>,
        params: &str,
        headers: &str,
    ) -> Uri {
        let mut w = BufWriter::with_capacity(
            scheme.len() + user.len() + password.len() + host.len() + params.len() + headers.len() + 16,
        );
        let scheme = w.write(scheme);
        w.write(":");

        let (user, password) = if user.is_empty() {
            (Span::EMPTY, Span::EMPTY)
        } else {
            let user = w.write(user);
            let password = if password.is_empty() {
                Span::EMPTY
            } else {
                w.write(":");
                w.write(password)
            };
            w.write("@");
            (user, password)
        };

        let host = w.write(host);
        let port = match port {
            Some(port) => {
                w.write(":");
                write!(w, "{port}")
            }
            None => Span::EMPTY,
        };
        let params = w.write(params);
        let headers = w.write(headers);

        Uri {
            buf: w.freeze(),
            kind,
            scheme,
            user,
            password,
            host,
            port,
            params,
            headers,
        }
    }

    fn parse_in_place(&mut self) -> std::result::Result<(), SipParserError> {
        let buf = self.buf.clone();
        let mut scanner = Scanner::new(buf.as_bytes());

        if !scanner.cur_is_some_and(|b| b.is_ascii_alphabetic()) {
            return Err("invalid URI scheme".into());
        }
        let scheme = span_of(&mut scanner, is_scheme);
        if scanner.consume_if(|b| b == b':').is_none() {
            return Err("missing ':' after URI scheme".into());
        }
        self.scheme = scheme;
        let scheme = buf.get(scheme);

        if scheme.eq_ignore_ascii_case("sip") {
            self.kind = UriKind::Sip;
            self.parse_sip(&mut scanner)
        } else if scheme.eq_ignore_ascii_case("sips") {
            self.kind = UriKind::Sips;
            self.parse_sip(&mut scanner)
        } else {
            self.kind = UriKind::Absolute;
            self.parse_absolute(&mut scanner)
        }
    }

    fn parse_sip(&mut self, scanner: &mut Scanner) -> std::result::Result<(), SipParserError> {
        self.parse_userinfo(scanner)?;

        self.host = parse_host(scanner)?;

        if scanner.consume_if(|b| b == b':').is_some() {
            self.port = parse_port(scanner)?;
        }

        let start = scanner.offset();
        while scanner.consume_if(|b| b == b';').is_some() {
            if span_of(scanner, is_param).is_empty() {
                return Err("empty URI parameter name".into());
            }
            if scanner.consume_if(|b| b == b'=').is_some() {
                span_of(scanner, is_param);
            }
        }
        self.params = Span::new(start, scanner.offset());

        let start = scanner.offset();
        if scanner.consume_if(|b| b == b'?').is_some() {
            loop {
                if span_of(scanner, is_hdr_uri).is_empty() {
                    return Err("empty URI header name".into());
                }
                if scanner.consume_if(|b| b == b'=').is_none() {
                    return Err("expected '=' in URI header".into());
                }
                span_of(scanner, is_hdr_uri);
                if scanner.consume_if(|b| b == b'&').is_none() {
                    break;
                }
            }
        }
        self.headers = Span::new(start, scanner.offset());

        if !scanner.is_eof() {
            return Err("unexpected character in URI".into());
        }
        Ok(())
    }

    fn parse_userinfo(&mut self, scanner: &mut Scanner) -> std::result::Result<(), SipParserError> {
        let snapshot = scanner.snapshot();
        let user = span_of(scanner, is_user);

        match scanner.peek() {
            Some(b'@') => {}
            Some(b':') => {
                scanner.next();
                let password = span_of(scanner, is_pass);
                if scanner.peek() != Some(b'@') {
                    scanner.restore(snapshot);
                    return Ok(());
                }
                self.password = password;
            }
            _ => {
                scanner.restore(snapshot);
                return Ok(());
            }
        }
        if user.is_empty() {
            return Err("empty URI user".into());
        }
        scanner.next();
        self.user = user;
        Ok(())
    }

    fn parse_absolute(&mut self, scanner: &mut Scanner) -> std::result::Result<(), SipParserError> {
        if scanner.is_eof() {
            return Err("empty URI".into());
        }
        if scanner.starts_with(b"//") {
            scanner.bump_n(2);
            let authority = span_of(scanner, |b| !matches!(b, b'/' | b'?' | b'#') && is_uric(b));
            let text = self.buf.get(authority);

            let host_start = match text.rfind('@') {
                Some(at) => {
                    self.user = Span::new(authority.start(), authority.start() + at);
                    authority.start() + at + 1
                }
                None => authority.start(),
            };
            let host_text = self.buf.get(Span::new(host_start, authority.end()));
            let port_sep = if host_text.starts_with('[') {
                host_text.find("]:").map(|i| i + 1)
            } else {
                host_text.rfind(':')
            };
            match port_sep {
                Some(sep) => {
                    self.host = Span::new(host_start, host_start + sep);
                    self.port = Span::new(host_start + sep + 1, authority.end());
                }
                None => self.host = Span::new(host_start, authority.end()),
            }
        }
        scanner.read_while(is_uric);

        if !scanner.is_eof() {
            return Err("unexpected character in URI".into());
        }
        Ok(())
    }
}

fn check_chars<F>(text: &str, class: F, msg: &'static str) -> Result<()>
where
    F: Fn(u8) -> bool,
{
    if text.bytes().all(class) {
        Ok(())
    } else {
        Err(Error::InvalidArgument(msg))
    }
}

fn check_port(port: u32) -> Result<Option<u16>> {
    if port > MAX_PORT {
        return Err(Error::InvalidPort(port));
    }
    Ok(u16::try_from(port).ok().filter(|p| *p != 0))
}

fn span_of<F>(scanner: &mut Scanner, func: F) -> Span
where
    F: Fn(u8) -> bool,
{
    let start = scanner.offset();
    scanner.read_while(func);
    Span::new(start, scanner.offset())
}

fn parse_host(scanner: &mut Scanner) -> std::result::Result<Span, SipParserError> {
    let start = scanner.offset();
    if scanner.consume_if(|b| b == b'[').is_some() {
        scanner.read_while(|b| is_hex(b) || b == b':' || b == b'.');
        if scanner.consume_if(|b| b == b']').is_none() {
            return Err("unterminated IPv6 reference".into());
        }
        return Ok(Span::new(start, scanner.offset()));
    }
    let host = span_of(scanner, is_host);
    if host.is_empty() {
        return Err("missing URI host".into());
    }
    Ok(host)
}

fn parse_port(scanner: &mut Scanner) -> std::result::Result<Span, SipParserError> {
    let start = scanner.offset();
    if scanner.read_num::<u16>().is_err() {
        return Err("invalid URI port".into());
    }
    Ok(Span::new(start, scanner.offset()))
}

// Printable ASCII and UTF-8 without the delimiters that end a URI in a
// header value.
#[inline]
fn is_uric(b: u8) -> bool {
    b > b' ' && b != 0x7f && !matches!(b, b'<' | b'>' | b'"')
}

fn lookup<'a>(list: &'a str, sep: char, name: &str) -> Option<&'a str> {
    list.get(1..)?.split(sep).find_map(|item| {
        let (n, v) = item.split_once('=').unwrap_or((item, ""));
        n.eq_ignore_ascii_case(name).then_some(v)
    })
}

impl FromStr for Uri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Uri::parse(s)
    }
}

impl PartialEq for Uri {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Uri {}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Uri").field(&self.as_str()).finish()
    }
}
