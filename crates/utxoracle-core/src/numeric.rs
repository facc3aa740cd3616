//! Reproducible floating-point summation.
//!
//! The histogram normalization sum and the geometric-median prefix sums run
//! over 10^3–10^5 terms; naive left-to-right `f64` summation accumulates
//! rounding error that depends on iteration order. Kahan summation tracks a
//! running compensation term so that two implementations fed the same
//! sequence in the same order produce byte-identical sums.

/// Sum `values` with Kahan compensation, preserving iteration order.
pub fn kahan_sum<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    let mut sum = 0.0_f64;
    let mut compensation = 0.0_f64;
    for value in values {
        let y = value - compensation;
        let t = sum + y;
        compensation = (t - sum) - y;
        sum = t;
    }
    sum
}
