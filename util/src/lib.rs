#![deny(missing_docs)]
//! Byte scanning utilities shared by the `sipcore` parsers.

pub mod ascii;
pub mod macros;
mod scanner;

pub use scanner::*;
