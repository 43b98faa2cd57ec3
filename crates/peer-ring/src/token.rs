//! Ring tokens.
//!
//! A token is a position on the ring. Keys and virtual nodes are hashed into
//! the same `u64` space; a key belongs to the first virtual node at or after
//! its token, wrapping around at the end.

use std::fmt;
use std::hash::Hasher;

use siphasher::sip::SipHasher13;

/// Position on the hash ring.
///
/// Hashing uses SipHash-1-3 with fixed zero keys, so every process computes
/// the same token for the same bytes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Token(pub u64);

impl Token {
    /// Minimum token value (start of ring).
    pub const MIN: Token = Token(0);
    /// Maximum token value (end of ring).
    pub const MAX: Token = Token(u64::MAX);

    /// Creates a token by hashing raw bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut hasher = SipHasher13::new();
        hasher.write(data);
        Token(hasher.finish())
    }

    /// Creates a token from a string key.
    pub fn from_key(key: &str) -> Self {
        Self::from_bytes(key.as_bytes())
    }

    /// Clockwise distance from `self` to `other` on the ring.
    pub fn distance_to(&self, other: &Self) -> Self {
        Token(other.0.wrapping_sub(self.0))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
