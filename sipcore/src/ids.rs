//! Random identifiers: tags, branches, Call-IDs and cnonces.

use rand::distr::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Magic cookie that starts every RFC 3261 branch.
pub const BRANCH_MAGIC_COOKIE: &str = "z9hG4bK";

const TAG_LEN: usize = 10;
const BRANCH_LEN: usize = 16;
const CNONCE_LEN: usize = 16;

/// Source of every random identifier the crate writes.
///
/// Owned by the caller and passed by `&mut` to the builders that need it,
/// so tests can use a seeded generator and get repeatable output.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    rng: StdRng,
}

impl IdGenerator {
    /// A generator seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// A deterministic generator.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn alphanumeric(&mut self, len: usize) -> String {
        (&mut self.rng)
            .sample_iter(Alphanumeric)
            .take(len)
            .map(char::from)
            .collect()
    }

    /// A `From`/`To` tag.
    pub fn tag(&mut self) -> String {
        self.alphanumeric(TAG_LEN)
    }

    /// A Via branch starting with [`BRANCH_MAGIC_COOKIE`].
    pub fn branch(&mut self) -> String {
        format!("{}{}", BRANCH_MAGIC_COOKIE, self.alphanumeric(BRANCH_LEN))
    }

    /// A globally unique Call-ID.
    pub fn call_id(&mut self) -> String {
        uuid::Builder::from_random_bytes(self.rng.random())
            .into_uuid()
            .simple()
            .to_string()
    }

    /// A client nonce for digest responses.
    pub fn cnonce(&mut self) -> String {
        self.alphanumeric(CNONCE_LEN)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
