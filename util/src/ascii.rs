//! Character classes used while scanning SIP text.

/// `SP` or `HTAB`.
#[inline(always)]
pub fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t')
}

/// `CR` or `LF`.
#[inline(always)]
pub fn is_newline(b: u8) -> bool {
    matches!(b, b'\r' | b'\n')
}

/// ASCII decimal digit.
#[inline(always)]
pub fn is_digit(b: u8) -> bool {
    b.is_ascii_digit()
}

/// ASCII hexadecimal digit.
#[inline(always)]
pub fn is_hex(b: u8) -> bool {
    b.is_ascii_hexdigit()
}
