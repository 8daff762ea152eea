//! Owned text buffers and the spans that point into them.
//!
//! Every parsed or built SIP element keeps its bytes in a [`Buf`] and
//! describes its fields as [`Span`]s. A `Buf` is immutable once frozen,
//! so spans can never be invalidated by a later write; mutators build a
//! new buffer with a [`BufWriter`] and get a fresh set of spans back.

use std::fmt;
use std::ops::Range;

use bytes::Bytes;

/// A `start..end` byte range into a [`Buf`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    /// The empty span at offset 0.
    pub const EMPTY: Span = Span { start: 0, end: 0 };

    /// Creates a span, `start` must not be greater than `end`.
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    #[inline]
    pub const fn start(&self) -> usize {
        self.start
    }

    #[inline]
    pub const fn end(&self) -> usize {
        self.end
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub(crate) fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Immutable, cheaply clonable UTF-8 text.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Buf(Bytes);

impl Buf {
    /// Wraps bytes that were already checked to be UTF-8.
    pub(crate) fn from_utf8_bytes(bytes: Bytes) -> Self {
        debug_assert!(std::str::from_utf8(&bytes).is_ok());
        Buf(bytes)
    }

    /// Copies `s` into a new buffer.
    pub fn copy_from_str(s: &str) -> Self {
        Buf(Bytes::copy_from_slice(s.as_bytes()))
    }

    /// The whole buffer.
    #[inline]
    pub fn as_str(&self) -> &str {
        // SAFETY: a `Buf` is only built from `&str`, `String` or bytes that
        // were validated as UTF-8, and spans handed out by the parsers and
        // `BufWriter` always fall on character boundaries.
        unsafe { std::str::from_utf8_unchecked(&self.0) }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The text bracketed by `span`, empty if the span is out of range.
    #[inline]
    pub fn get(&self, span: Span) -> &str {
        self.as_str().get(span.range()).unwrap_or_default()
    }

    /// Zero-copy sub buffer.
    pub fn slice(&self, span: Span) -> Buf {
        if self.as_str().get(span.range()).is_none() {
            return Buf::default();
        }
        Buf(self.0.slice(span.range()))
    }

    /// Span covering the whole buffer.
    #[inline]
    pub fn full(&self) -> Span {
        Span::new(0, self.0.len())
    }
}

impl From<String> for Buf {
    fn from(value: String) -> Self {
        Buf(Bytes::from(value))
    }
}

impl From<&str> for Buf {
    fn from(value: &str) -> Self {
        Buf::copy_from_str(value)
    }
}

impl AsRef<str> for Buf {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Buf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Buf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

/// Append-only builder of a [`Buf`].
///
/// Each write returns the span of what was written.
#[derive(Debug, Default)]
pub struct BufWriter {
    buf: String,
}

impl BufWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: String::with_capacity(capacity),
        }
    }

    /// Appends `s`, returning its span.
    pub fn write(&mut self, s: &str) -> Span {
        let start = self.buf.len();
        self.buf.push_str(s);
        Span::new(start, self.buf.len())
    }

    /// Appends formatted text, returning its span.
    pub fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> Span {
        let start = self.buf.len();
        // Writing into a `String` cannot fail.
        let _ = fmt::Write::write_fmt(&mut self.buf, args);
        Span::new(start, self.buf.len())
    }

    /// Current length, the start of the next write.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Text written so far.
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn freeze(self) -> Buf {
        Buf::from(self.buf)
    }
}
