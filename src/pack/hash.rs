//! SHA-1 pack hashes.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of a SHA-1 digest in bytes.
pub const HASH_LEN: usize = 20;

/// Hash parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashError {
    #[error("expected {expected} hex characters, got {0}", expected = HASH_LEN * 2)]
    InvalidLength(usize),
    #[error("invalid hex digit '{0}'")]
    InvalidDigit(char),
}

/// SHA-1 digest of a pack archive, kept as raw bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackHash([u8; HASH_LEN]);

impl PackHash {
    pub const fn from_bytes(raw: [u8; HASH_LEN]) -> Self {
        Self(raw)
    }

    /// Parse a 40 character hex string (either case).
    pub fn from_hex(hex: &str) -> Result<Self, HashError> {
        let hex = hex.trim();
        if let Some(bad) = hex.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(HashError::InvalidDigit(bad));
        }
        if hex.len() != HASH_LEN * 2 {
            return Err(HashError::InvalidLength(hex.len()));
        }
        let mut raw = [0u8; HASH_LEN];
        for (i, pair) in hex.as_bytes().chunks(2).enumerate() {
            raw[i] = (nibble(pair[0]) << 4) | nibble(pair[1]);
        }
        Ok(Self(raw))
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    /// Lowercase hex form, as sent on the wire.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

/// Value of an ASCII hex digit already checked by the caller.
fn nibble(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        _ => c - b'A' + 10,
    }
}

impl FromStr for PackHash {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for PackHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for PackHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PackHash({})", self.to_hex())
    }
}
