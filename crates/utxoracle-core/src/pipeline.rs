//! Top-level orchestration: wire filtering, histogramming, smoothing,
//! coarse estimation, intraday extraction and convergence into the single
//! entry point callers use (`spec.md` §4, §7).

use std::collections::HashSet;

use crate::coarse;
use crate::convergence;
use crate::error::CoreError;
use crate::filter::{self, FilterOutcome};
use crate::histogram::Histogram;
use crate::intraday;
use crate::smoother;
use crate::types::{Diagnostics, PriceResult, Transaction, Window};

/// Run the full pipeline over `window` and return a price estimate.
///
/// Never panics and never returns `Err` for data-quality problems - an
/// empty window, a window with no retail-shaped transactions, or a
/// histogram with no discernible round-dollar structure all produce
/// [`PriceResult::no_signal`] rather than an error. `Err` is reserved for
/// [`Window::validate`] contract violations.
pub fn calculate_price(window: Window) -> Result<PriceResult, CoreError> {
    calculate_price_inner(window, false)
}

/// As [`calculate_price`], but additionally populates
/// [`PriceResult::intraday_cloud`] with the full candidate-price cloud, for
/// callers that want to visualize or audit the convergence step.
pub fn calculate_price_with_cloud(window: Window) -> Result<PriceResult, CoreError> {
    calculate_price_inner(window, true)
}

fn calculate_price_inner(window: Window, keep_cloud: bool) -> Result<PriceResult, CoreError> {
    window.validate()?;

    let mut diagnostics = Diagnostics::default();
    let accepted = accept_transactions(&window, &mut diagnostics);
    let tx_count = accepted.len() as u64;

    let histogram = Histogram::accumulate(accepted.iter().copied(), &mut diagnostics);
    let output_count = histogram.output_count;

    let mut counts = histogram.counts;
    smoother::condition(&mut counts);

    let Some(coarse_estimate) = coarse::estimate(&counts) else {
        return Ok(PriceResult::no_signal(tx_count, output_count, diagnostics));
    };

    let candidates = intraday::extract_candidates(accepted.iter().copied(), coarse_estimate.price_usd);

    let Some(converged) = convergence::converge(&candidates, coarse_estimate.price_usd) else {
        return Ok(PriceResult::no_signal(tx_count, output_count, diagnostics));
    };

    Ok(PriceResult {
        price_usd: Some(converged.price_usd),
        confidence: converged.confidence,
        tx_count,
        output_count,
        price_lo: Some(converged.price_lo),
        price_hi: Some(converged.price_hi),
        deviation_pct: Some(converged.deviation_pct),
        diagnostics,
        intraday_cloud: if keep_cloud { Some(candidates) } else { None },
    })
}

/// Evaluate R1-R6 (and the malformed-amount precheck) against every
/// transaction in `window`, recording rejections in `diagnostics` and
/// returning the accepted subset.
fn accept_transactions<'a>(window: &'a Window, diagnostics: &mut Diagnostics) -> Vec<&'a Transaction> {
    let window_txids: &HashSet<_> = &window.window_txids;
    let mut accepted = Vec::new();
    for tx in &window.transactions {
        if tx.is_malformed() {
            diagnostics.malformed_transactions += 1;
            continue;
        }
        let outcome = filter::evaluate(tx, window_txids);
        outcome.record(diagnostics);
        if outcome == FilterOutcome::Accepted {
            accepted.push(tx);
        }
    }
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{retail_tx, tx_with_outputs, txid_from_byte};

    #[test]
    fn empty_window_yields_no_signal() {
        let window = Window::new(vec![]);
        let result = calculate_price(window).expect("validation passes for an empty window");
        assert!(result.price_usd.is_none());
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.tx_count, 0);
    }

    #[test]
    fn window_with_only_rejected_transactions_yields_no_signal() {
        let tx = tx_with_outputs(txid_from_byte(1), vec![], 800_000, 0);
        let window = Window::new(vec![tx]);
        let result = calculate_price(window).expect("validation passes");
        assert!(result.price_usd.is_none());
        assert_eq!(result.diagnostics.rejected_wrong_output_count, 1);
    }

    #[test]
    fn inconsistent_window_is_rejected_with_an_error() {
        let tx = tx_with_outputs(txid_from_byte(1), vec![], 800_000, 0);
        let window = Window::with_txids(vec![tx], Default::default());
        assert!(calculate_price(window).is_err());
    }

    #[test]
    fn a_calibration_bundle_of_round_hundred_dollar_payments_recovers_the_price() {
        let mut rng = crate::test_util::DeterministicRng::new(42);
        let target_price = 80_000.0;
        let mut transactions = Vec::new();
        for i in 0..500u32 {
            let payment_btc = 100.0 / target_price * rng.next_range(0.98, 1.02);
            let change_btc = rng.next_range(0.0001, 0.01);
            transactions.push(retail_tx(
                txid_from_byte((i % 250) as u8),
                payment_btc,
                change_btc,
                800_000 + i,
                1_700_000_000 + i as i64,
            ));
        }
        let window = Window::new(transactions);
        let result = calculate_price(window).expect("validation passes");
        let price = result.price_usd.expect("signal recovered from a calibration bundle");
        assert!(
            (price - target_price).abs() / target_price < 0.10,
            "recovered price={price}, expected near {target_price}"
        );
    }

    #[test]
    fn coinbase_transactions_never_reach_the_histogram() {
        let coinbase = crate::test_util::make_tx(
            txid_from_byte(1),
            true,
            vec![crate::test_util::coinbase_input()],
            vec![crate::test_util::output(6.25), crate::test_util::output(0.0)],
            800_000,
            0,
        );
        let window = Window::new(vec![coinbase]);
        let result = calculate_price(window).expect("validation passes");
        assert_eq!(result.output_count, 0);
        assert_eq!(result.diagnostics.rejected_coinbase, 1);
        // tx_count counts only accepted transactions (spec.md §3, §8
        // invariant 6) - a lone coinbase transaction contributes zero.
        assert_eq!(result.tx_count, 0);
    }

    #[test]
    fn tx_count_excludes_coinbase_from_a_calibration_bundle() {
        // spec.md §8 scenario 6: the 1000-tx calibration bundle plus one
        // coinbase transaction must report tx_count = 1000, not 1001.
        let mut rng = crate::test_util::DeterministicRng::new(7);
        let target_price = 80_000.0;
        let mut transactions = Vec::new();
        for i in 0..1000u32 {
            let payment_btc = 100.0 / target_price * rng.next_range(0.98, 1.02);
            let change_btc = rng.next_range(0.0001, 0.01);
            transactions.push(retail_tx(
                txid_from_byte((i % 250) as u8),
                payment_btc,
                change_btc,
                800_000 + i,
                1_700_000_000 + i as i64,
            ));
        }
        transactions.push(crate::test_util::make_tx(
            txid_from_byte(251),
            true,
            vec![crate::test_util::coinbase_input()],
            vec![crate::test_util::output(6.25), crate::test_util::output(0.0)],
            800_000,
            0,
        ));
        let window = Window::new(transactions);
        let result = calculate_price(window).expect("validation passes");

        assert_eq!(result.diagnostics.rejected_coinbase, 1);
        assert_eq!(result.tx_count, 1000);
        // spec.md §8 invariant 6: rejection counters + tx_count == input count.
        let d = &result.diagnostics;
        let rejected_total = d.rejected_too_many_inputs
            + d.rejected_wrong_output_count
            + d.rejected_coinbase
            + d.rejected_op_return
            + d.rejected_witness_too_large
            + d.rejected_self_spend
            + d.malformed_transactions;
        assert_eq!(rejected_total + result.tx_count, 1001);
    }

    #[test]
    fn intraday_cloud_is_only_populated_when_requested() {
        let tx = retail_tx(txid_from_byte(1), 0.00125, 0.0005, 800_000, 0);
        let window = Window::new(vec![tx.clone()]);
        let without_cloud = calculate_price(window).expect("validation passes");
        assert!(without_cloud.intraday_cloud.is_none());

        let window = Window::new(vec![tx]);
        let with_cloud = calculate_price_with_cloud(window).expect("validation passes");
        assert!(with_cloud.intraday_cloud.is_some());
    }
}
