//! Challenge and response vectors.

use crate::noise::Block256;
use std::str::FromStr;
use thiserror::Error;

/// Challenge width in bytes (128 bits).
pub const CHALLENGE_BYTES: usize = 16;

/// Errors that can occur when parsing a challenge from text.
#[derive(Debug, Error)]
pub enum ChallengeParseError {
    /// Not hexadecimal.
    #[error("challenge is not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    /// Wrong number of bytes.
    #[error("challenge must be {expected} bytes, got {got}")]
    WrongLength { expected: usize, got: usize },
}

/// A 128-bit challenge selecting which oscillator paths contribute to
/// a response. Not secret.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Challenge([u8; CHALLENGE_BYTES]);

impl Challenge {
    /// The all-zero challenge.
    pub const ZERO: Self = Self([0; CHALLENGE_BYTES]);

    /// Builds a challenge from raw bytes.
    pub const fn from_bytes(bytes: [u8; CHALLENGE_BYTES]) -> Self {
        Self(bytes)
    }

    /// Raw challenge bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; CHALLENGE_BYTES] {
        &self.0
    }

    /// Byte `index` of the challenge (0..16).
    #[inline]
    pub fn byte(&self, index: usize) -> u8 {
        self.0[index]
    }
}

impl FromStr for Challenge {
    type Err = ChallengeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim())?;
        let array: [u8; CHALLENGE_BYTES] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| ChallengeParseError::WrongLength {
                    expected: CHALLENGE_BYTES,
                    got: bytes.len(),
                })?;
        Ok(Self(array))
    }
}

impl std::fmt::Display for Challenge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl std::fmt::Debug for Challenge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Challenge({})", self)
    }
}

/// A 256-bit device response.
///
/// Raw key-derivation input for upstream identity components; this
/// crate performs no key derivation itself.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Response(Block256);

impl Response {
    /// The cleared response.
    pub const ZERO: Self = Self(Block256::ZERO);

    pub(crate) fn from_block(block: Block256) -> Self {
        Self(block)
    }

    /// Returns the response as a 256-bit block.
    #[inline]
    pub fn as_block(&self) -> &Block256 {
        &self.0
    }

    /// Returns the response bytes, least significant first.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_le_bytes()
    }

    /// Number of differing bit positions between two responses.
    pub fn hamming_distance(&self, other: &Self) -> u32 {
        self.0.hamming_distance(&other.0)
    }

    /// Returns true if the response is cleared.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(self.to_bytes()))
    }
}

impl std::fmt::Debug for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Response({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let text = "000102030405060708090a0b0c0d0e0f";
        let challenge: Challenge = text.parse().unwrap();

        assert_eq!(challenge.byte(0), 0x00);
        assert_eq!(challenge.byte(15), 0x0f);
        assert_eq!(challenge.to_string(), text);
    }

    #[test]
    fn test_wrong_length_rejected() {
        let result = "0011".parse::<Challenge>();
        assert!(matches!(
            result,
            Err(ChallengeParseError::WrongLength {
                expected: 16,
                got: 2
            })
        ));
    }

    #[test]
    fn test_invalid_hex_rejected() {
        let result = "zz".repeat(16).parse::<Challenge>();
        assert!(matches!(result, Err(ChallengeParseError::InvalidHex(_))));
    }

    #[test]
    fn test_response_hex_is_64_digits() {
        let response = Response::from_block(Block256::from_limbs([1, 0, 0, 0]));
        let text = response.to_string();

        assert_eq!(text.len(), 64);
        assert!(text.starts_with("01"));
    }
}
