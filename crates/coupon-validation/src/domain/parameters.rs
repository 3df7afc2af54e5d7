//! Optimal membership filter parameter calculation
//!
//! Formulas:
//! - m = ceil(-n*ln(p) / (ln(2)^2))  -- optimal bits
//! - k = round((m/n) * ln(2))        -- optimal hash functions
//! - FPR = (1 - e^(-kn/m))^k

use std::f64::consts::LN_2;

/// Upper bound on k; beyond this extra hashing buys nothing measurable
const MAX_HASH_COUNT: usize = 32;

/// Membership filter parameters
#[derive(Clone, Debug, PartialEq)]
pub struct FilterParams {
    /// Number of bits in the filter (m)
    pub size_bits: usize,
    /// Number of hash functions (k)
    pub hash_count: usize,
    /// Expected false positive rate at n elements
    pub expected_fpr: f64,
}

/// Calculate optimal filter parameters for `num_elements` keys at `target_fpr`
///
/// `target_fpr` is expected in (0, 1); configuration validation enforces it.
pub fn calculate_optimal_parameters(num_elements: usize, target_fpr: f64) -> FilterParams {
    if num_elements == 0 {
        return FilterParams {
            size_bits: 1,
            hash_count: 1,
            expected_fpr: 1.0,
        };
    }

    let n = num_elements as f64;
    let m = ((-n * target_fpr.ln() / (LN_2 * LN_2)).ceil() as usize).max(1);
    let k = ((m as f64 / n) * LN_2).round() as usize;
    let k = k.clamp(1, MAX_HASH_COUNT);

    FilterParams {
        size_bits: m,
        hash_count: k,
        expected_fpr: calculate_fpr(m, num_elements, k),
    }
}

/// Calculate the false positive rate for given parameters
///
/// Formula: FPR = (1 - e^(-kn/m))^k
pub fn calculate_fpr(m: usize, n: usize, k: usize) -> f64 {
    if m == 0 {
        return 1.0;
    }
    let exponent = -(k as f64) * (n as f64) / (m as f64);
    (1.0 - exponent.exp()).powi(k as i32)
}
