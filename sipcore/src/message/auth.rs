//! HTTP digest authentication (RFC 2617) as used by SIP.
//!
//! [`Challenge`] models `WWW-Authenticate`/`Proxy-Authenticate` values and
//! [`Credentials`] models `Authorization`/`Proxy-Authorization` values.

use std::fmt;
use std::ops::BitOr;

use crate::error::{Error, Result, SipParserError};
use crate::ids::IdGenerator;
use crate::macros::comma_separated;
use crate::message::buffer::{Buf, Span};
use crate::parser::{is_via_param, PResult, Parser};

const DIGEST: &str = "Digest";

/// Nonce count written by [`Challenge::authorize`]; a fresh nonce is
/// answered once.
const NONCE_COUNT: u32 = 1;

/// The `algorithm` of a digest exchange.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Algorithm {
    #[default]
    Md5,
    Md5Sess,
    /// An algorithm this crate cannot compute, kept as written.
    Other(String),
}

impl Algorithm {
    fn from_name(s: &str) -> Self {
        if s.eq_ignore_ascii_case("MD5") {
            Algorithm::Md5
        } else if s.eq_ignore_ascii_case("MD5-sess") {
            Algorithm::Md5Sess
        } else {
            Algorithm::Other(s.to_owned())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Algorithm::Md5 => "MD5",
            Algorithm::Md5Sess => "MD5-sess",
            Algorithm::Other(other) => other,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of `qop` options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Qop(u8);

impl Qop {
    pub const NONE: Qop = Qop(0);
    pub const AUTH: Qop = Qop(1);
    pub const AUTH_INT: Qop = Qop(2);

    pub fn contains(&self, other: Qop) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Parses one value or a comma separated list (`"auth,auth-int"`).
    fn from_list(s: &str) -> Self {
        s.split(',').map(str::trim).fold(Qop::NONE, |acc, q| {
            if q.eq_ignore_ascii_case("auth") {
                acc | Qop::AUTH
            } else if q.eq_ignore_ascii_case("auth-int") {
                acc | Qop::AUTH_INT
            } else {
                acc
            }
        })
    }
}

impl BitOr for Qop {
    type Output = Qop;

    fn bitor(self, rhs: Qop) -> Qop {
        Qop(self.0 | rhs.0)
    }
}

impl fmt::Display for Qop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.contains(Qop::AUTH) {
            f.write_str("auth")
        } else if self.contains(Qop::AUTH_INT) {
            f.write_str("auth-int")
        } else {
            Ok(())
        }
    }
}

/// Walks `Digest name=value, name="value", ...`, calling `on_param` with
/// the parameter name and the span of its unquoted value.
fn parse_digest<F>(text: &str, mut on_param: F) -> PResult<()>
where
    F: FnMut(&str, Span),
{
    let mut p = Parser::new(text);
    p.skip_lws();

    let scheme = p.token()?;
    if !p.str(scheme).eq_ignore_ascii_case(DIGEST) {
        return p.error("expected Digest scheme");
    }
    if !p.skip_lws() {
        return p.error("expected white space after Digest");
    }

    comma_separated!(p => {
        let name = p.token()?;
        p.skip_lws();
        p.must_read(b'=')?;
        p.skip_lws();
        let value = if p.peek() == Some(b'"') {
            let quoted = p.quoted_string()?;
            Span::new(quoted.start() + 1, quoted.end() - 1)
        } else {
            let value = p.read_span(is_via_param);
            if value.is_empty() {
                return p.error("empty digest parameter");
            }
            value
        };
        on_param(p.str(name), value);
    });

    Ok(())
}

fn md5_hex(data: String) -> String {
    format!("{:x}", md5::compute(data))
}

/// A digest challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    buf: Buf,
    realm: Span,
    domain: Span,
    nonce: Span,
    opaque: Span,
    stale: bool,
    algorithm: Algorithm,
    qop: Qop,
}

impl Challenge {
    pub fn parse(value: &str) -> Result<Challenge> {
        Self::from_buf(Buf::copy_from_str(value))
    }

    /// Parses `buf` without copying it.
    pub fn from_buf(buf: Buf) -> Result<Challenge> {
        let mut realm = None;
        let mut domain = Span::EMPTY;
        let mut nonce = None;
        let mut opaque = Span::EMPTY;
        let mut stale = false;
        let mut algorithm = Algorithm::Md5;
        let mut qop = Qop::NONE;

        parse_digest(buf.as_str(), |name, value| {
            let text = buf.get(value);
            match name.to_ascii_lowercase().as_str() {
                "realm" => realm = Some(value),
                "domain" => domain = value,
                "nonce" => nonce = Some(value),
                "opaque" => opaque = value,
                "stale" => stale = text.eq_ignore_ascii_case("true"),
                "algorithm" => algorithm = Algorithm::from_name(text),
                "qop" => qop = Qop::from_list(text),
                _ => {}
            }
        })
        .map_err(|err| err.in_line(buf.as_str()))?;

        let Some(realm) = realm else {
            return Err(SipParserError::new("missing realm in challenge").into());
        };
        let Some(nonce) = nonce else {
            return Err(SipParserError::new("missing nonce in challenge").into());
        };

        Ok(Challenge {
            buf,
            realm,
            domain,
            nonce,
            opaque,
            stale,
            algorithm,
            qop,
        })
    }

    pub fn realm(&self) -> &str {
        self.buf.get(self.realm)
    }

    pub fn domain(&self) -> &str {
        self.buf.get(self.domain)
    }

    pub fn nonce(&self) -> &str {
        self.buf.get(self.nonce)
    }

    pub fn opaque(&self) -> &str {
        self.buf.get(self.opaque)
    }

    pub fn stale(&self) -> bool {
        self.stale
    }

    pub fn algorithm(&self) -> &Algorithm {
        &self.algorithm
    }

    pub fn qop(&self) -> Qop {
        self.qop
    }

    /// Answers the challenge for `method` on `uri`.
    ///
    /// Challenges offering `qop=auth` are answered with `qop=auth` and a
    /// cnonce taken from `ids`. Challenges that only offer `auth-int`, or
    /// name an algorithm other than MD5/MD5-sess, are rejected.
    pub fn authorize(
        &self,
        method: &str,
        uri: &str,
        user: &str,
        password: &str,
        ids: &mut IdGenerator,
    ) -> Result<Credentials> {
        let sess = match &self.algorithm {
            Algorithm::Md5 => false,
            Algorithm::Md5Sess => true,
            Algorithm::Other(other) => {
                return Err(Error::UnsupportedDigest(format!("algorithm {other}")))
            }
        };
        let qop = if self.qop.is_empty() {
            Qop::NONE
        } else if self.qop.contains(Qop::AUTH) {
            Qop::AUTH
        } else {
            return Err(Error::UnsupportedDigest("qop auth-int".to_owned()));
        };
        let cnonce = if sess || !qop.is_empty() {
            ids.cnonce()
        } else {
            String::new()
        };
        let nonce = self.nonce();

        let mut ha1 = md5_hex(format!("{}:{}:{}", user, self.realm(), password));
        if sess {
            ha1 = md5_hex(format!("{ha1}:{nonce}:{cnonce}"));
        }
        let ha2 = md5_hex(format!("{method}:{uri}"));
        let response = if qop.is_empty() {
            md5_hex(format!("{ha1}:{nonce}:{ha2}"))
        } else {
            md5_hex(format!("{ha1}:{nonce}:{NONCE_COUNT:08x}:{cnonce}:{qop}:{ha2}"))
        };

        let mut text = String::new();
        // Writing into a `String` cannot fail.
        let _ = write_credentials(
            &mut text,
            &Fields {
                username: user,
                realm: self.realm(),
                nonce,
                uri,
                response: &response,
                algorithm: &self.algorithm,
                cnonce: &cnonce,
                opaque: self.opaque(),
                qop,
                nc: NONCE_COUNT,
            },
        );

        Credentials::from_buf(Buf::from(text))
    }
}

struct Fields<'a> {
    username: &'a str,
    realm: &'a str,
    nonce: &'a str,
    uri: &'a str,
    response: &'a str,
    algorithm: &'a Algorithm,
    cnonce: &'a str,
    opaque: &'a str,
    qop: Qop,
    nc: u32,
}

fn write_credentials(w: &mut impl fmt::Write, f: &Fields) -> fmt::Result {
    write!(
        w,
        "{DIGEST} username=\"{}\", realm=\"{}\", nonce=\"{}\", uri=\"{}\", response=\"{}\", algorithm={}",
        f.username, f.realm, f.nonce, f.uri, f.response, f.algorithm
    )?;
    if !f.cnonce.is_empty() {
        write!(w, ", cnonce=\"{}\"", f.cnonce)?;
    }
    if !f.opaque.is_empty() {
        write!(w, ", opaque=\"{}\"", f.opaque)?;
    }
    if !f.qop.is_empty() {
        write!(w, ", qop={}, nc={:08x}", f.qop, f.nc)?;
    }
    Ok(())
}

/// Digest credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    buf: Buf,
    username: Span,
    realm: Span,
    nonce: Span,
    uri: Span,
    response: Span,
    cnonce: Span,
    opaque: Span,
    algorithm: Algorithm,
    qop: Qop,
    nc: u32,
}

impl Credentials {
    pub fn parse(value: &str) -> Result<Credentials> {
        Self::from_buf(Buf::copy_from_str(value))
    }

    /// Parses `buf` without copying it.
    pub fn from_buf(buf: Buf) -> Result<Credentials> {
        let mut username = None;
        let mut realm = None;
        let mut nonce = None;
        let mut uri = Span::EMPTY;
        let mut response = Span::EMPTY;
        let mut cnonce = Span::EMPTY;
        let mut opaque = Span::EMPTY;
        let mut algorithm = Algorithm::Md5;
        let mut qop = Qop::NONE;
        let mut nc = None;

        parse_digest(buf.as_str(), |name, value| {
            let text = buf.get(value);
            match name.to_ascii_lowercase().as_str() {
                "username" => username = Some(value),
                "realm" => realm = Some(value),
                "nonce" => nonce = Some(value),
                "uri" => uri = value,
                "response" => response = value,
                "cnonce" => cnonce = value,
                "opaque" => opaque = value,
                "algorithm" => algorithm = Algorithm::from_name(text),
                "qop" => qop = Qop::from_list(text),
                "nc" => nc = Some(u32::from_str_radix(text, 16)),
                _ => {}
            }
        })
        .map_err(|err| err.in_line(buf.as_str()))?;

        let missing = |field: &str| -> Error {
            SipParserError::new(format!("missing {field} in credentials"))
                .in_line(buf.as_str())
                .into()
        };
        let username = username.ok_or_else(|| missing("username"))?;
        let realm = realm.ok_or_else(|| missing("realm"))?;
        let nonce = nonce.ok_or_else(|| missing("nonce"))?;
        let nc = match nc {
            Some(Ok(nc)) => nc,
            Some(Err(_)) => {
                return Err(SipParserError::new("invalid nonce count")
                    .in_line(buf.as_str())
                    .into())
            }
            None => 0,
        };

        Ok(Credentials {
            buf,
            username,
            realm,
            nonce,
            uri,
            response,
            cnonce,
            opaque,
            algorithm,
            qop,
            nc,
        })
    }

    pub fn username(&self) -> &str {
        self.buf.get(self.username)
    }

    pub fn realm(&self) -> &str {
        self.buf.get(self.realm)
    }

    pub fn nonce(&self) -> &str {
        self.buf.get(self.nonce)
    }

    pub fn uri(&self) -> &str {
        self.buf.get(self.uri)
    }

    pub fn response(&self) -> &str {
        self.buf.get(self.response)
    }

    pub fn cnonce(&self) -> &str {
        self.buf.get(self.cnonce)
    }

    pub fn opaque(&self) -> &str {
        self.buf.get(self.opaque)
    }

    pub fn algorithm(&self) -> &Algorithm {
        &self.algorithm
    }

    pub fn qop(&self) -> Qop {
        self.qop
    }

    /// The nonce count, 0 when absent.
    pub fn nonce_count(&self) -> u32 {
        self.nc
    }
}

impl fmt::Display for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_credentials(
            f,
            &Fields {
                username: self.username(),
                realm: self.realm(),
                nonce: self.nonce(),
                uri: self.uri(),
                response: self.response(),
                algorithm: &self.algorithm,
                cnonce: self.cnonce(),
                opaque: self.opaque(),
                qop: self.qop,
                nc: self.nc,
            },
        )
    }
}
