//! Intraday candidate-price extraction (`spec.md` §4.6).
//!
//! The coarse estimate picks out a rough price; this pass walks every
//! accepted output again and, for each one close enough in implied USD
//! value to a round-dollar target, derives the *exact* price that would
//! make it precisely that round amount. The resulting cloud of candidate
//! prices is what [`crate::convergence`] condenses into a final figure.

use crate::types::{CandidatePoint, Transaction};

/// Round-dollar retail price points the intraday pass hunts for, spanning
/// the range a single on-chain payment plausibly denominates in.
pub const INTRADAY_TARGETS_USD: [f64; 14] = [
    5.0, 10.0, 15.0, 20.0, 25.0, 30.0, 40.0, 50.0, 100.0, 150.0, 200.0, 300.0, 500.0, 1_000.0,
];

/// An output's implied USD value must fall within this fraction of a target
/// to be considered evidence for it. Wide enough to tolerate the coarse
/// estimate being off by a sizeable margin, narrow enough that two adjacent
/// targets (e.g. $20 and $25) can't both claim the same output.
const BAND_FRACTION: f64 = 0.25;

/// Satoshi ranges and the round-number increment within each one that marks
/// a "round-BTC artifact" amount: a value a wallet would produce by typing
/// a round satoshi/BTC quantity, not by denominating a round-dollar
/// purchase. The pattern is intentionally discontinuous — each bracket's
/// increment is tuned to that scale, not a single rule applied throughout.
const MICRO_ROUND_SATOSHI_BRACKETS: [(i64, i64, i64); 5] = [
    (50, 100, 10),
    (100, 1_000, 10),
    (1_000, 10_000, 100),
    (10_000, 100_000, 1_000),
    (100_000, 1_000_000, 10_000),
];

fn is_micro_round_satoshi(amount_btc: f64) -> bool {
    let sats = (amount_btc * 1.0e8).round() as i64;
    MICRO_ROUND_SATOSHI_BRACKETS
        .iter()
        .any(|&(lo, hi, increment)| sats >= lo && sats < hi && sats % increment == 0)
}

/// Derive the price implied by `amount_btc` for every round-dollar target it
/// is within [`BAND_FRACTION`] of, provided it isn't a micro-round-satoshi
/// artifact. `spec.md` §4.6: "A single output can produce up to 14
/// candidates" - adjacent targets' ±25% bands overlap by design, so more
/// than one target can match the same output and every match must be kept,
/// not just the first.
fn candidates_for_output(amount_btc: f64, coarse_price_usd: f64) -> Vec<f64> {
    if amount_btc <= 0.0 || !amount_btc.is_finite() || is_micro_round_satoshi(amount_btc) {
        return Vec::new();
    }
    let implied_usd = amount_btc * coarse_price_usd;
    INTRADAY_TARGETS_USD
        .iter()
        .filter(|&&target| (implied_usd - target).abs() / target < BAND_FRACTION)
        .map(|&target| target / amount_btc)
        .collect()
}

/// Walk every output of `transactions` (expected to be the accepted,
/// filter-passing subset) and emit a [`CandidatePoint`] for each round-dollar
/// target it matches under the coarse price.
pub fn extract_candidates<'a, I>(transactions: I, coarse_price_usd: f64) -> Vec<CandidatePoint>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut candidates = Vec::new();
    for tx in transactions {
        for output in &tx.outputs {
            for price_usd in candidates_for_output(output.amount_btc, coarse_price_usd) {
                candidates.push(CandidatePoint {
                    price_usd,
                    block_height: tx.block_height,
                    timestamp: tx.timestamp,
                });
            }
        }
    }
    candidates
}
