//! Fixed-size hash type used for content hashes and back-pointers.

use std::fmt;
use thiserror::Error;

/// Hash parsing error
#[derive(Debug, Error)]
pub enum HashError {
    /// Invalid hex string
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    /// Invalid length
    #[error("invalid hash length: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },
}

/// 256-bit hash (32 bytes), as produced by SHA-256.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hash256([u8; 32]);

impl Hash256 {
    /// Size in bytes
    pub const LEN: usize = 32;

    /// Zero hash
    pub const ZERO: Hash256 = Hash256([0u8; 32]);

    /// Create from bytes
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Hash256(bytes)
    }

    /// Create from slice
    pub fn from_slice(slice: &[u8]) -> Result<Self, HashError> {
        if slice.len() != 32 {
            return Err(HashError::InvalidLength {
                expected: 32,
                got: slice.len(),
            });
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(slice);
        Ok(Hash256(bytes))
    }

    /// Parse from hex string (with or without a `0x` prefix)
    pub fn from_hex(s: &str) -> Result<Self, HashError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| HashError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Get as bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Final hex character of the digest, used by the block-acceptance predicate.
    pub fn last_hex_char(&self) -> char {
        self.to_hex_no_prefix()
            .chars()
            .last()
            .expect("hex encoding of 32 bytes is never empty")
    }

    fn to_hex_no_prefix(&self) -> String {
        hex::encode(self.0)
    }

    /// Convert to a `0x`-prefixed hex string
    pub fn to_hex(&self) -> String {
        format!("0x{}", self.to_hex_no_prefix())
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash256({})", self.to_hex())
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(bytes: [u8; 32]) -> Self {
        Hash256(bytes)
    }
}

impl AsRef<[u8]> for Hash256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::Hash256;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for Hash256 {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&self.to_hex_no_prefix())
        }
    }

    impl<'de> Deserialize<'de> for Hash256 {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            Hash256::from_hex(&s).map_err(D::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_hex_roundtrip() {
        let original = "abcdef0123456789abcdef0123456789abcdef0123456789abcdef01234567";
        let hash = Hash256::from_hex(original).unwrap();
        assert_eq!(hash.to_hex_no_prefix(), original);
    }

    #[test]
    fn from_hex_accepts_0x_prefix() {
        let a = Hash256::from_hex("0xabcdef0123456789abcdef0123456789abcdef0123456789abcdef01234567").unwrap();
        let b = Hash256::from_hex("abcdef0123456789abcdef0123456789abcdef0123456789abcdef01234567").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_wrong_length() {
        let err = Hash256::from_slice(&[0u8; 31]).unwrap_err();
        matches!(err, HashError::InvalidLength { expected: 32, got: 31 });
    }

    #[test]
    fn rejects_invalid_hex() {
        let err = Hash256::from_hex("zz").unwrap_err();
        matches!(err, HashError::InvalidHex(_));
    }

    #[test]
    fn last_hex_char_matches_predicate_alphabet() {
        let hash = Hash256::from_bytes([0xAB; 32]);
        assert_eq!(hash.last_hex_char(), 'b');
    }

    #[test]
    fn zero_is_default() {
        assert_eq!(Hash256::default(), Hash256::ZERO);
    }

    #[test]
    fn debug_and_display_agree() {
        let hash = Hash256::from_bytes([0x01; 32]);
        assert_eq!(format!("{}", hash), format!("{:?}", hash).trim_start_matches("Hash256(").trim_end_matches(')'));
    }
}
