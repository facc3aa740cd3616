//! Condense the intraday candidate cloud into a final price (`spec.md`
//! §4.7, §4.8): a two-pass 1-D geometric median anchored on the coarse
//! estimate, a dispersion band, and a confidence score.

use crate::numeric::kahan_sum;
use crate::types::CandidatePoint;

/// Tight-pass retention band around `rough`: candidates further than this
/// fraction from it are dropped before the first geometric median is
/// computed.
const TIGHT_BAND_FRACTION: f64 = 0.05;

/// Wide-pass retention band, applied to the *original* cloud around the
/// tight-pass result. Wider than the tight band so legitimate dispersion
/// (the intraday cloud is never a single point) isn't discarded twice.
const WIDE_BAND_FRACTION: f64 = 0.10;

/// The final, converged price plus the evidence behind it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceResult {
    pub price_usd: f64,
    pub price_lo: f64,
    pub price_hi: f64,
    pub deviation_pct: f64,
    pub confidence: f64,
    pub retained_count: usize,
}

/// The 1-D geometric median (the L1-distance minimizer) of `sorted_values`,
/// which must already be sorted ascending and non-empty.
///
/// Uses the O(n) prefix-sum identity: for sorted `p_0 <= ... <= p_{n-1}`
/// with prefix sums `prefix_sum[i] = sum_{j<i} p_j` and total `total`, the
/// total absolute deviation from `p_i` is
/// `p_i*(2i - n) - 2*prefix_sum[i] + total`. Ties favor the smaller index,
/// matching the standard lower-median convention for even-length inputs.
fn geometric_median_1d(sorted_values: &[f64]) -> f64 {
    let n = sorted_values.len();
    debug_assert!(n > 0);
    let total = kahan_sum(sorted_values.iter().copied());

    let mut prefix_sum = 0.0_f64;
    let mut best_index = 0;
    let mut best_cost = f64::INFINITY;
    for (i, &p_i) in sorted_values.iter().enumerate() {
        let cost = p_i * (2 * i) as f64 - p_i * n as f64 - 2.0 * prefix_sum + total;
        if cost < best_cost {
            best_cost = cost;
            best_index = i;
        }
        prefix_sum += p_i;
    }
    sorted_values[best_index]
}

/// Median absolute deviation of `sorted_values` around `center`.
fn median_absolute_deviation(sorted_values: &[f64], center: f64) -> f64 {
    let mut deviations: Vec<f64> = sorted_values.iter().map(|&p| (p - center).abs()).collect();
    deviations.sort_by(|a, b| a.partial_cmp(b).unwrap());
    median_of_sorted(&deviations)
}

fn median_of_sorted(sorted_values: &[f64]) -> f64 {
    let n = sorted_values.len();
    if n % 2 == 1 {
        sorted_values[n / 2]
    } else {
        (sorted_values[n / 2 - 1] + sorted_values[n / 2]) / 2.0
    }
}

/// Candidates of `values` whose price lies strictly inside
/// `center*(1-fraction) .. center*(1+fraction)`.
fn retain_within_fraction(values: &[f64], center: f64, fraction: f64) -> Vec<f64> {
    let lo = center * (1.0 - fraction);
    let hi = center * (1.0 + fraction);
    values.iter().copied().filter(|&p| p > lo && p < hi).collect()
}

/// Clamp `x` to `[0, 1]`.
fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// The visualization axis half-range implied by `deviation_pct` (`spec.md`
/// §4.7): widens linearly past 17% deviation, clamped to `[0.05, 0.20]`.
fn axis_range(deviation_pct: f64) -> f64 {
    (0.05 + (deviation_pct - 0.17) * (0.10 / 0.03)).clamp(0.05, 0.20)
}

/// Confidence is the product of two independent linear ramps: how many
/// candidates survived the tight pass, and how tight the wide-pass
/// survivors are around the converged price (`spec.md` §4.7, §9 Open
/// Question 3). Either one collapsing to zero (too few candidates, or wild
/// dispersion) drives confidence to zero; both maxing out drives it to one.
fn confidence_score(tight_count: usize, deviation_pct: f64) -> f64 {
    // 0 at <=100 candidates, 1 at >=1000 candidates (spec.md §4.7).
    let count_ramp = clamp01((tight_count as f64 - 100.0) / 900.0);
    // 1 at <=2% deviation, 0 at >=20% deviation (spec.md §4.7).
    let deviation_ramp = clamp01((0.20 - deviation_pct) / 0.18);
    count_ramp * deviation_ramp
}

/// Run the two-pass convergence over `candidates`, anchored on the coarse
/// estimate `rough` (`spec.md` §4.5). Returns `None` if the cloud is
/// empty - there is nothing to converge.
pub fn converge(candidates: &[CandidatePoint], rough: f64) -> Option<ConvergenceResult> {
    if candidates.is_empty() {
        return None;
    }
    let mut prices: Vec<f64> = candidates.iter().map(|c| c.price_usd).collect();
    prices.sort_by(|a, b| a.partial_cmp(b).unwrap());

    // Tight pass: rough * [0.95, 1.05].
    let mut tight = retain_within_fraction(&prices, rough, TIGHT_BAND_FRACTION);
    if tight.is_empty() {
        tight = prices.clone();
    }
    tight.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let central = geometric_median_1d(&tight);
    let tight_count = tight.len();

    // Wide pass: central * [0.90, 1.10], applied to the original cloud.
    let mut wide = retain_within_fraction(&prices, central, WIDE_BAND_FRACTION);
    if wide.is_empty() {
        wide = prices.clone();
    }
    wide.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let central_wide = geometric_median_1d(&wide);

    let mad = median_absolute_deviation(&wide, central_wide);
    let deviation_pct = if central_wide > 0.0 { mad / central_wide } else { 0.0 };

    let range = axis_range(deviation_pct);
    let price_lo = central_wide * (1.0 - range);
    let price_hi = central_wide * (1.0 + range);

    let confidence = confidence_score(tight_count, deviation_pct);

    Some(ConvergenceResult {
        price_usd: central_wide,
        price_lo,
        price_hi,
        deviation_pct,
        confidence,
        retained_count: wide.len(),
    })
}
