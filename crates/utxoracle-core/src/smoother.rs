//! Pre-convolution histogram conditioning (`spec.md` §4.3): round-BTC noise
//! suppression, active-range trimming, and normalization with a spike cap.
//!
//! Round-BTC amounts (0.01 BTC, 0.1 BTC, 1 BTC, ...) cluster in the
//! histogram for reasons that have nothing to do with fiat price - they are
//! denominated in BTC, not USD - and left alone they would out-compete the
//! genuine round-USD peaks the coarse estimator is looking for.

use crate::bingrid::{bin_lower_edge, BINS_PER_DECADE, BIN_COUNT};
use crate::numeric::kahan_sum;

/// The histogram bins the coarse estimator actually searches over: roughly
/// 0.0001 BTC to 1 BTC, the range retail payment and change outputs occupy.
/// Bins outside this range are zeroed before normalization so that
/// dust-level and whale-level outputs (already rare after filtering) cannot
/// perturb the round-dollar search.
pub const ACTIVE_RANGE: std::ops::Range<usize> = 200..1400;

/// Ceiling applied to every normalized bin after suppression, so a single
/// freak spike cannot dominate the convolution sum.
const NORMALIZED_CAP: f64 = 0.008;

/// Round-BTC amounts a user is likely to have typed directly, rather than
/// derived from a fiat target: round satoshi counts below a millibit, and
/// round BTC fractions above it. This is a fixed, calibrated list, not a
/// generic sweep over every power of ten.
const ROUND_BTC_AMOUNTS: [f64; 18] = [
    0.000_01, 0.000_1, 0.000_2, 0.000_3, 0.000_5, 0.001, 0.002, 0.003, 0.005, 0.01, 0.02, 0.03,
    0.04, 0.1, 0.2, 0.3, 0.5, 1.0,
];

/// Bin indices of [`ROUND_BTC_AMOUNTS`] within the histogram's representable
/// range.
fn round_btc_bin_indices() -> Vec<usize> {
    let mut indices: Vec<usize> = ROUND_BTC_AMOUNTS
        .iter()
        .filter_map(|&amount| crate::bingrid::bin_index(amount))
        .collect();
    indices.sort_unstable();
    indices.dedup();
    indices
}

/// Condition `counts` in place: replace round-BTC bins with the average of
/// their immediate neighbors, zero everything outside [`ACTIVE_RANGE`], then
/// normalize the active range to sum to 1 and clamp each bin to
/// [`NORMALIZED_CAP`].
pub fn condition(counts: &mut [f64; BIN_COUNT]) {
    suppress_round_btc_bins(counts);
    zero_outside_active_range(counts);
    normalize_and_cap(counts);
}

fn suppress_round_btc_bins(counts: &mut [f64; BIN_COUNT]) {
    // Snapshot first: every replacement reads only from the pre-suppression
    // histogram, so suppressing bin k never changes what bin k+1's
    // neighbor-average sees.
    let snapshot = *counts;
    for k in round_btc_bin_indices() {
        let lo = if k == 0 { snapshot[k] } else { snapshot[k - 1] };
        let hi = if k + 1 >= BIN_COUNT { snapshot[k] } else { snapshot[k + 1] };
        counts[k] = (lo + hi) / 2.0;
    }
}

fn zero_outside_active_range(counts: &mut [f64; BIN_COUNT]) {
    for (k, count) in counts.iter_mut().enumerate() {
        if !ACTIVE_RANGE.contains(&k) {
            *count = 0.0;
        }
    }
}

fn normalize_and_cap(counts: &mut [f64; BIN_COUNT]) {
    let total = kahan_sum(counts[ACTIVE_RANGE].iter().copied());
    if total <= 0.0 {
        return;
    }
    for count in counts[ACTIVE_RANGE].iter_mut() {
        *count = (*count / total).min(NORMALIZED_CAP);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bingrid::bin_index;

    #[test]
    fn active_range_spans_the_expected_decades() {
        // 200 bins/decade: bin 200 is 10^-5 BTC, bin 1400 is 10^1 BTC.
        assert!((bin_lower_edge(200) - 1e-5).abs() / 1e-5 < 1e-9);
        assert!((bin_lower_edge(1400) - 1e1).abs() / 1e1 < 1e-9);
        assert_eq!(BINS_PER_DECADE, 200);
    }

    #[test]
    fn round_btc_bin_is_replaced_with_neighbor_average() {
        let mut counts = [0.0; BIN_COUNT];
        let k = bin_index(0.1).expect("0.1 BTC is in range");
        counts[k - 1] = 10.0;
        counts[k] = 1000.0;
        counts[k + 1] = 20.0;

        suppress_round_btc_bins(&mut counts);

        assert_eq!(counts[k], 15.0);
    }

    #[test]
    fn bins_outside_active_range_are_zeroed() {
        let mut counts = [1.0; BIN_COUNT];
        zero_outside_active_range(&mut counts);
        assert_eq!(counts[0], 0.0);
        assert_eq!(counts[BIN_COUNT - 1], 0.0);
        assert_eq!(counts[ACTIVE_RANGE.start], 1.0);
        assert_eq!(counts[ACTIVE_RANGE.end - 1], 1.0);
    }

    #[test]
    fn normalization_sums_active_range_to_one_when_uncapped() {
        let mut counts = [0.0; BIN_COUNT];
        counts[500] = 3.0;
        counts[501] = 1.0;
        normalize_and_cap(&mut counts);
        let total: f64 = counts[ACTIVE_RANGE].iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn a_dominant_spike_is_capped() {
        let mut counts = [0.0; BIN_COUNT];
        counts[500] = 1_000_000.0;
        counts[501] = 1.0;
        normalize_and_cap(&mut counts);
        assert!(counts[500] <= NORMALIZED_CAP + 1e-12);
    }

    #[test]
    fn empty_histogram_is_left_at_zero() {
        let mut counts = [0.0; BIN_COUNT];
        condition(&mut counts);
        assert!(counts.iter().all(|&c| c == 0.0));
    }
}
