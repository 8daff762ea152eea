use std::fmt;

use crate::ascii::is_digit;

type Result<T> = std::result::Result<T, Error>;

/// Line and column of the next byte to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    line: usize,
    col: usize,
}

impl Position {
    /// Current line, starting at 1.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Current column, starting at 1.
    pub fn col(&self) -> usize {
        self.col
    }
}

/// Saved scanner state, see [`Scanner::snapshot`].
#[derive(Debug, Clone, Copy)]
pub struct Snapshot {
    idx: usize,
    pos: Position,
}

/// Reading byte slice while keep the line and column.
#[derive(Debug)]
pub struct Scanner<'a> {
    /// The input bytes slice to be read.
    src: &'a [u8],
    /// Current position
    pos: Position,
    /// Current index.
    idx: usize,
}

impl<'a> Scanner<'a> {
    /// Create a `Scanner` from a byte slice.
    ///
    /// The `line` and `col` will always start from 1.
    pub const fn new(src: &'a [u8]) -> Self {
        Scanner {
            src,
            pos: Position { line: 1, col: 1 },
            idx: 0,
        }
    }

    /// Create a `Scanner` that starts reading at `offset`.
    ///
    /// Offsets returned by [`Scanner::offset`] stay relative to the
    /// start of `src`.
    pub fn with_offset(src: &'a [u8], offset: usize) -> Self {
        let mut scanner = Self::new(src);
        scanner.bump_n(offset.min(src.len()));
        scanner
    }

    /// The whole input, including what was already read.
    pub fn src(&self) -> &'a [u8] {
        self.src
    }

    /// Current line and column.
    pub fn position(&self) -> &Position {
        &self.pos
    }

    /// Index of the next byte to be read.
    #[inline]
    pub fn offset(&self) -> usize {
        self.idx
    }

    /// Saves the current state so it can be restored after a failed
    /// lookahead.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            idx: self.idx,
            pos: self.pos,
        }
    }

    /// Restores a state saved with [`Scanner::snapshot`].
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.idx = snapshot.idx;
        self.pos = snapshot.pos;
    }

    /// Returns `true` if all bytes where read
    #[inline(always)]
    pub fn is_eof(&self) -> bool {
        self.idx >= self.src.len()
    }

    /// Get next byte without advance
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.src.get(self.idx).copied()
    }

    /// Get the byte `n` positions ahead without advance.
    #[inline]
    pub fn peek_at(&self, n: usize) -> Option<u8> {
        self.src.get(self.idx + n).copied()
    }

    /// Moves to the next character n times
    pub fn bump_n(&mut self, n: usize) {
        for _ in 0..n {
            self.next();
        }
    }

    /// Same as [Scanner::peek] but will return an `Result`
    /// instead a `Option`.
    #[inline]
    pub fn lookahead(&self) -> Result<u8> {
        match self.peek() {
            Some(b) => Ok(b),
            None => self.error(ErrorKind::Eof),
        }
    }

    /// Returns `true` if the remaining input starts with `pat`.
    #[inline]
    pub fn starts_with(&self, pat: &[u8]) -> bool {
        self.remaining().starts_with(pat)
    }

    /// `read_while()` will call the `func` closure for
    /// each element in the slice and advance
    /// while the closure returns `true`.
    ///
    /// # Returns
    ///
    /// A slice of bytes from the starting position to the position
    /// where the closure `func` returns `false` or the end of the slice
    /// is reached.
    #[inline(always)]
    pub fn read_while<F>(&mut self, func: F) -> &'a [u8]
    where
        F: Fn(u8) -> bool,
    {
        let start = self.idx;
        let src = self.src;

        while self.idx < src.len() && func(src[self.idx]) {
            self.bump(src[self.idx]);
        }

        &src[start..self.idx]
    }

    /// Read next byte if equals to `b`.
    ///
    /// # Errors
    ///
    /// This method will return an error if the byte is not
    /// equal to `b`.
    ///
    /// If the slice reached the end, then an error will
    /// also be returned.
    pub fn must_read(&mut self, b: u8) -> Result<()> {
        let Some(n) = self.peek() else {
            return self.error(ErrorKind::Eof);
        };
        if b != n {
            return self.error(ErrorKind::Char { expected: b, found: n });
        }
        self.next();
        Ok(())
    }

    /// Read number in the slice.
    ///
    /// This method read until an invalid digit is found.
    pub fn read_num<N>(&mut self) -> Result<N>
    where
        N: lexical_core::FromLexical,
    {
        // Signs are not part of any SIP numeric grammar.
        if !self.peek().is_some_and(is_digit) {
            return self.error(ErrorKind::Num);
        }
        match lexical_core::parse_partial::<N>(self.remaining()) {
            Ok((value, read)) if read > 0 => {
                self.bump_n(read);
                Ok(value)
            }
            _ => self.error(ErrorKind::Num),
        }
    }

    /// Call the `func` closure for next byte and read it if
    /// the closure returns `true`.
    ///
    /// # Returns
    ///
    /// The byte readed.
    #[inline(always)]
    pub fn consume_if<F>(&mut self, func: F) -> Option<u8>
    where
        F: FnOnce(u8) -> bool,
    {
        match self.peek() {
            Some(matched) if func(matched) => {
                self.bump(matched);
                Some(matched)
            }
            _ => None,
        }
    }

    /// Returns `true` if the next byte exists and `func` holds for it.
    pub fn cur_is_some_and<F>(&self, func: F) -> bool
    where
        F: FnOnce(u8) -> bool,
    {
        self.peek().is_some_and(func)
    }

    /// Bytes not read yet.
    #[inline]
    pub fn remaining(&self) -> &'a [u8] {
        &self.src[self.idx.min(self.src.len())..]
    }

    #[inline(always)]
    fn bump(&mut self, byte: u8) {
        if byte == b'\n' {
            self.pos.col = 1;
            self.pos.line += 1;
        } else {
            self.pos.col += 1;
        }
        self.idx += 1;
    }

    /// An error of `kind` at the current position.
    pub fn error<T>(&self, kind: ErrorKind) -> Result<T> {
        Err(Error {
            kind,
            line: self.pos.line,
            col: self.pos.col,
        })
    }
}

impl AsRef<[u8]> for Scanner<'_> {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self.remaining()
    }
}

impl Iterator for Scanner<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<Self::Item> {
        self.src.get(self.idx).copied().inspect(|&byte| self.bump(byte))
    }
}

/// Errors that can occur while reading the src.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum ErrorKind {
    /// End of file reached.
    Eof,
    /// A byte other than the expected one was found.
    Char {
        /// The byte required by the grammar.
        expected: u8,
        /// The byte in the input.
        found: u8,
    },
    /// No number could be read.
    Num,
}

/// A scanning failure with the position where it happened.
#[derive(Debug, PartialEq)]
pub struct Error {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Line of the failure.
    pub line: usize,
    /// Column of the failure.
    pub col: usize,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ErrorKind::Eof => write!(f, "unexpected end of input")?,
            ErrorKind::Char { expected, found } => write!(
                f,
                "expected '{}', found '{}'",
                expected.escape_ascii(),
                found.escape_ascii()
            )?,
            ErrorKind::Num => write!(f, "invalid number")?,
        }
        write!(f, " at line:{} column:{}", self.line, self.col)
    }
}

impl std::error::Error for Error {}
