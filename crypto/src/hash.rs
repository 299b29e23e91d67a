//! Fixed-size 256-bit hash values
//!
//! A `HashValue` is the output of the sortition hash and the generic hash
//! container used across the node. It always holds exactly 32 bytes and can
//! be viewed as raw bytes or as an unsigned big-endian integer.

use crate::CryptoError;
use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

/// Length of a hash value in bytes
pub const HASH_LENGTH: usize = 32;

/// A 32-byte hash value
///
/// Ordering is byte-lexicographic, which for fixed-width big-endian values
/// is the same as comparing `to_big_uint()` results.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HashValue([u8; HASH_LENGTH]);

impl HashValue {
    /// Parse an externally supplied byte sequence
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let raw: [u8; HASH_LENGTH] =
            bytes
                .try_into()
                .map_err(|_| CryptoError::LengthMismatch {
                    expected: HASH_LENGTH,
                    actual: bytes.len(),
                })?;
        Ok(Self(raw))
    }

    /// Parse a hex-encoded hash value
    pub fn from_hex(hex_str: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(hex_str.trim().trim_start_matches("0x"))
            .map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// SHA-256 of `data`
    pub fn sha256(data: &[u8]) -> Self {
        Self::sha256_concat(&[data])
    }

    /// SHA-256 over the concatenation of `parts`, in order
    pub fn sha256_concat(parts: &[&[u8]]) -> Self {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part);
        }
        Self(hasher.finalize().into())
    }

    /// Owned copy of the bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Copy of the fixed-size array
    pub fn raw_bytes(&self) -> [u8; HASH_LENGTH] {
        self.0
    }

    /// Unsigned integer formed by reading the bytes big-endian
    pub fn to_big_uint(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<[u8; HASH_LENGTH]> for HashValue {
    fn from(raw: [u8; HASH_LENGTH]) -> Self {
        Self(raw)
    }
}

impl TryFrom<&[u8]> for HashValue {
    type Error = CryptoError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(bytes)
    }
}

impl fmt::Display for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashValue({})", self.to_hex())
    }
}

impl Serialize for HashValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for HashValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Self::from_hex(&encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bytes() -> Vec<u8> {
        (0u8..32).collect()
    }

    #[test]
    fn test_from_bytes_round_trip() {
        let bytes = sample_bytes();
        let value = HashValue::from_bytes(&bytes).unwrap();
        assert_eq!(value.to_bytes(), bytes);
        assert_eq!(value.raw_bytes().to_vec(), bytes);
    }

    #[test]
    fn test_from_bytes_rejects_wrong_length() {
        for len in [0usize, 1, 31, 33, 64] {
            let err = HashValue::from_bytes(&vec![7u8; len]).unwrap_err();
            assert_eq!(
                err,
                CryptoError::LengthMismatch {
                    expected: HASH_LENGTH,
                    actual: len
                }
            );
        }
    }

    #[test]
    fn test_big_uint_is_big_endian() {
        let mut raw = [0u8; HASH_LENGTH];
        raw[31] = 0x01;
        raw[30] = 0x02;
        assert_eq!(HashValue::from(raw).to_big_uint(), BigUint::from(0x0201u32));

        let max = HashValue::from([0xff; HASH_LENGTH]);
        let expected = (BigUint::from(1u8) << 256usize) - BigUint::from(1u8);
        assert_eq!(max.to_big_uint(), expected);
    }

    #[test]
    fn test_ordering_matches_integer_ordering() {
        let mut low = [0u8; HASH_LENGTH];
        low[0] = 0x01;
        let mut high = [0u8; HASH_LENGTH];
        high[0] = 0x01;
        high[31] = 0x01;

        let low = HashValue::from(low);
        let high = HashValue::from(high);
        assert!(low < high);
        assert!(low.to_big_uint() < high.to_big_uint());
    }

    #[test]
    fn test_returned_bytes_are_copies() {
        let value = HashValue::from([9u8; HASH_LENGTH]);
        let mut bytes = value.to_bytes();
        bytes[0] = 0;
        let mut raw = value.raw_bytes();
        raw[1] = 0;
        assert_ne!(bytes, value.to_bytes());
        assert_ne!(raw, value.raw_bytes());
        assert_eq!(value, HashValue::from([9u8; HASH_LENGTH]));
    }

    #[test]
    fn test_sha256_concat_matches_single_buffer() {
        let joined = HashValue::sha256(b"beacon-output");
        let chunks: [&[u8]; 3] = [b"beacon", b"-", b"output"];
        let parts = HashValue::sha256_concat(&chunks);
        assert_eq!(joined, parts);
        assert_eq!(
            HashValue::sha256(b"").to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_hex_round_trip() {
        let value = HashValue::sha256(b"seed");
        assert_eq!(HashValue::from_hex(&value.to_hex()).unwrap(), value);
        assert_eq!(
            HashValue::from_hex(&format!("0x{}", value)).unwrap(),
            value
        );
        assert!(matches!(
            HashValue::from_hex("zz"),
            Err(CryptoError::InvalidHex(_))
        ));
    }
}
