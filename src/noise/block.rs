//! 256-bit vector type shared by noise samples, accumulators and responses.

use std::ops::{BitXor, BitXorAssign};

/// A 256-bit vector stored as four little-endian 64-bit limbs.
///
/// Limb 0 holds bits 0..64 (least significant). Bit `i` of the vector
/// corresponds to oscillator `i` when the block is a noise sample.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Block256([u64; 4]);

impl Block256 {
    /// The all-zero vector.
    pub const ZERO: Self = Self([0; 4]);

    /// Width in bits.
    pub const BITS: u32 = 256;

    /// Creates a block from four limbs, least significant first.
    pub const fn from_limbs(limbs: [u64; 4]) -> Self {
        Self(limbs)
    }

    /// Creates a block from 32 little-endian bytes.
    pub fn from_le_bytes(bytes: [u8; 32]) -> Self {
        let mut limbs = [0u64; 4];
        for (limb, chunk) in limbs.iter_mut().zip(bytes.chunks_exact(8)) {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            *limb = u64::from_le_bytes(word);
        }
        Self(limbs)
    }

    /// Returns the 32 little-endian bytes of this block.
    pub fn to_le_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for (chunk, limb) in bytes.chunks_exact_mut(8).zip(self.0.iter()) {
            chunk.copy_from_slice(&limb.to_le_bytes());
        }
        bytes
    }

    /// Returns the limbs, least significant first.
    #[inline]
    pub fn limbs(&self) -> &[u64; 4] {
        &self.0
    }

    /// Returns 32-bit group `index` (0..8), group 0 being the lowest bits.
    #[inline]
    pub fn word32(&self, index: usize) -> u32 {
        let limb = self.0[index / 2];
        if index % 2 == 0 {
            limb as u32
        } else {
            (limb >> 32) as u32
        }
    }

    /// Returns bit `index` (0..256).
    #[inline]
    pub fn bit(&self, index: usize) -> bool {
        (self.0[index / 64] >> (index % 64)) & 1 == 1
    }

    /// Rotates the full 256-bit vector left by `n` bits.
    pub fn rotate_left(self, n: u32) -> Self {
        let n = n % Self::BITS;
        let limb_shift = (n / 64) as usize;
        let bit_shift = n % 64;

        let mut out = [0u64; 4];
        for (i, slot) in out.iter_mut().enumerate() {
            let src = (i + 4 - limb_shift) % 4;
            let below = (src + 3) % 4;
            *slot = if bit_shift == 0 {
                self.0[src]
            } else {
                (self.0[src] << bit_shift) | (self.0[below] >> (64 - bit_shift))
            };
        }
        Self(out)
    }

    /// Number of set bits.
    #[inline]
    pub fn count_ones(&self) -> u32 {
        self.0.iter().map(|l| l.count_ones()).sum()
    }

    /// Number of bit positions in which `self` and `other` differ.
    #[inline]
    pub fn hamming_distance(&self, other: &Self) -> u32 {
        (*self ^ *other).count_ones()
    }

    /// Returns true if every bit is clear.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&l| l == 0)
    }
}

impl BitXor for Block256 {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self {
        Self([
            self.0[0] ^ rhs.0[0],
            self.0[1] ^ rhs.0[1],
            self.0[2] ^ rhs.0[2],
            self.0[3] ^ rhs.0[3],
        ])
    }
}

impl BitXorAssign for Block256 {
    fn bitxor_assign(&mut self, rhs: Self) {
        *self = *self ^ rhs;
    }
}

impl std::fmt::Debug for Block256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Block256({})", self)
    }
}

impl std::fmt::Display for Block256 {
    /// Big-endian hex, most significant limb first.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for limb in self.0.iter().rev() {
            write!(f, "{:016x}", limb)?;
        }
        Ok(())
    }
}
