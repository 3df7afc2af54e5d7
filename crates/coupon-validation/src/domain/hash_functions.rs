//! Hash functions for the membership filter
//!
//! Uses MurmurHash3 (x64, 128-bit). The two 64-bit halves of a single hash
//! feed the double hashing scheme `h(i) = h1 + i * h2`, so one pass over the
//! key yields all k positions.

use std::io::Cursor;

/// Seed shared by every filter. Filters are never merged or compared across
/// seeds, so a constant is enough.
const MURMUR_SEED: u32 = 0;

/// Hash an element with MurmurHash3 and split the result into two halves
pub fn murmur_hash_pair(element: &[u8]) -> (u64, u64) {
    let mut cursor = Cursor::new(element);
    // Reading from an in-memory cursor cannot fail
    let hash = murmur3::murmur3_x64_128(&mut cursor, MURMUR_SEED).unwrap_or(0);
    (hash as u64, (hash >> 64) as u64)
}

/// Iterator over the k bit positions of one element
#[derive(Clone, Debug)]
pub struct HashPositions {
    h1: u64,
    h2: u64,
    next: u64,
    k: u64,
    m: u64,
}

impl Iterator for HashPositions {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.next >= self.k {
            return None;
        }
        let hash = self.h1.wrapping_add(self.next.wrapping_mul(self.h2));
        self.next += 1;
        Some((hash % self.m) as usize)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.k - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for HashPositions {}

/// Compute the k hash positions of an element in a filter of m bits
///
/// Allocation-free; loading calls this once per record.
pub fn hash_positions(element: &[u8], k: usize, m: usize) -> HashPositions {
    let (h1, h2) = murmur_hash_pair(element);
    HashPositions {
        h1,
        h2,
        next: 0,
        k: k as u64,
        m: m.max(1) as u64,
    }
}
