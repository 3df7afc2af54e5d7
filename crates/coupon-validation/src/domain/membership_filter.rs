//! Membership (Bloom) filter
//!
//! One filter is built per coupon source at load time and is read-only
//! afterwards.
//!
//! INVARIANTS:
//! - No false negatives: once inserted, `contains()` MUST return true
//! - FPR = (1 - e^(-kn/m))^k, which stays at or below the target while the
//!   number of inserted keys does not exceed the sizing hint

use bitvec::prelude::*;

use super::hash_functions::hash_positions;
use super::parameters::{calculate_fpr, calculate_optimal_parameters, FilterParams};

/// Space-efficient probabilistic set over byte-string keys
///
/// A `true` from [`contains`](Self::contains) means "maybe present"; a
/// `false` means "definitely absent".
#[derive(Clone, Debug)]
pub struct MembershipFilter {
    /// Bit array storing the filter state
    bits: BitVec<u64, Lsb0>,
    /// Number of hash functions (k)
    k: usize,
    /// Size in bits (m)
    m: usize,
    /// Number of keys inserted (n)
    n: usize,
}

impl MembershipFilter {
    /// Create an empty filter with `m` bits and `k` hash functions
    pub fn new(m: usize, k: usize) -> Self {
        let m = m.max(1);
        Self {
            bits: bitvec![u64, Lsb0; 0; m],
            k: k.max(1),
            m,
            n: 0,
        }
    }

    /// Create an empty filter sized for `expected_elements` at `target_fpr`
    pub fn new_with_fpr(expected_elements: usize, target_fpr: f64) -> Self {
        Self::with_params(&calculate_optimal_parameters(expected_elements, target_fpr))
    }

    pub fn with_params(params: &FilterParams) -> Self {
        Self::new(params.size_bits, params.hash_count)
    }

    /// Build a filter from a fallible stream of keys
    ///
    /// The first error aborts the build; a partially populated filter is
    /// never returned.
    pub fn build<I, K, E>(keys: I, expected_elements: usize, target_fpr: f64) -> Result<Self, E>
    where
        I: IntoIterator<Item = Result<K, E>>,
        K: AsRef<[u8]>,
    {
        let mut filter = Self::new_with_fpr(expected_elements, target_fpr);
        for key in keys {
            filter.insert(key?.as_ref());
        }
        Ok(filter)
    }

    /// Insert a key
    ///
    /// After insertion, `contains(key)` is guaranteed to return true.
    pub fn insert(&mut self, key: &[u8]) {
        for pos in hash_positions(key, self.k, self.m) {
            self.bits.set(pos, true);
        }
        self.n += 1;
    }

    /// Test whether a key might be present
    ///
    /// Returns:
    /// - `true` if the key might be in the set (could be a false positive)
    /// - `false` if the key is definitely NOT in the set
    pub fn contains(&self, key: &[u8]) -> bool {
        hash_positions(key, self.k, self.m).all(|pos| self.bits[pos])
    }

    /// False positive rate at the current fill level
    ///
    /// Formula: FPR = (1 - e^(-kn/m))^k
    pub fn false_positive_rate(&self) -> f64 {
        calculate_fpr(self.m, self.n, self.k)
    }

    /// Get the number of bits set in the filter
    pub fn bits_set(&self) -> usize {
        self.bits.count_ones()
    }

    /// Get the filter size in bits
    pub fn size_bits(&self) -> usize {
        self.m
    }

    /// Memory held by the bit array
    pub fn size_bytes(&self) -> usize {
        self.bits.as_raw_slice().len() * std::mem::size_of::<u64>()
    }

    /// Get the number of hash functions
    pub fn hash_count(&self) -> usize {
        self.k
    }

    /// Get the number of keys inserted (duplicates counted)
    pub fn elements_inserted(&self) -> usize {
        self.n
    }
}
