//! Shorthands over [`Scanner`](crate::Scanner) reads.

/// Skips `SP` and `HTAB`.
#[macro_export]
macro_rules! space {
    ($scanner:expr) => {{
        $scanner.read_while($crate::ascii::is_space);
    }};
}
