//! Probabilistic membership filter
//!
//! A standard bloom filter: rare false positives at the configured rate,
//! never a false negative. Bit positions come from double hashing a
//! SHA-256 digest of the item.

use sha2::{Digest, Sha256};

const LN2: f64 = std::f64::consts::LN_2;

/// Bloom filter sized for a target capacity and false-positive rate.
#[derive(Debug, Clone)]
pub struct BloomFilter {
    bits: Vec<u64>,
    bit_count: u64,
    hash_count: u32,
}

impl BloomFilter {
    /// Creates a filter sized for `capacity` items at `error_rate`.
    ///
    /// Uses the standard sizing formulas: `m = -n ln p / (ln 2)^2` bits
    /// and `k = (m / n) ln 2` hash functions.
    pub fn new(error_rate: f64, capacity: usize) -> Self {
        let n = capacity.max(1) as f64;
        let p = error_rate.clamp(f64::MIN_POSITIVE, 0.5);

        let m = (-(n * p.ln()) / (LN2 * LN2)).ceil().max(64.0);
        let k = ((m / n) * LN2).round().max(1.0);

        let bit_count = m as u64;
        let word_count = bit_count.div_ceil(64) as usize;

        Self {
            bits: vec![0; word_count],
            bit_count,
            hash_count: k as u32,
        }
    }

    /// Marks an item as seen.
    pub fn insert(&mut self, item: &str) {
        let (h1, h2) = Self::hash_pair(item);
        for i in 0..self.hash_count {
            let bit = self.position(h1, h2, i);
            self.bits[(bit / 64) as usize] |= 1 << (bit % 64);
        }
    }

    /// Returns whether an item may have been seen before.
    pub fn contains(&self, item: &str) -> bool {
        let (h1, h2) = Self::hash_pair(item);
        (0..self.hash_count).all(|i| {
            let bit = self.position(h1, h2, i);
            self.bits[(bit / 64) as usize] & (1 << (bit % 64)) != 0
        })
    }

    fn position(&self, h1: u64, h2: u64, i: u32) -> u64 {
        h1.wrapping_add((i as u64).wrapping_mul(h2)) % self.bit_count
    }

    fn hash_pair(item: &str) -> (u64, u64) {
        let digest = Sha256::digest(item.as_bytes());
        let h1 = u64::from_be_bytes(digest[0..8].try_into().unwrap());
        let h2 = u64::from_be_bytes(digest[8..16].try_into().unwrap());
        // h2 must be odd so strides cover the bit array
        (h1, h2 | 1)
    }
}
