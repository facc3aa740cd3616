//! Domain value objects for the price-discovery core.
//!
//! Everything here is a plain value object: no persistent identity beyond
//! `Txid`, no shared mutation, no lifecycle. A [`Window`] is built once,
//! handed to [`crate::calculate_price`], and discarded.

use std::collections::HashSet;

use bitcoin::Txid;
use serde::{Deserialize, Serialize};

// ==============================================================================
// Transaction Input / Output
// ==============================================================================

/// One input of a decoded transaction.
///
/// `prevout_txid` is `None` for a coinbase input. `witness_byte_size` is the
/// serialized byte size of this input's witness stack (0 for a legacy,
/// non-segwit input).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    pub prevout_txid: Option<Txid>,
    pub sequence: u32,
    pub witness_byte_size: u32,
}

/// One output of a decoded transaction.
///
/// `amount_btc` must already be converted from satoshis by the producer
/// (see `spec.md` §6) — this crate never divides by `1e8`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TxOutput {
    pub amount_btc: f64,
    pub is_op_return: bool,
}

impl TxOutput {
    /// A malformed output has a non-finite or negative amount.
    fn is_malformed(&self) -> bool {
        !self.amount_btc.is_finite() || self.amount_btc < 0.0
    }
}

// ==============================================================================
// Transaction
// ==============================================================================

/// A fully decoded Bitcoin transaction, already resolved by an external
/// collaborator (block/indexer client). The core never parses raw
/// transaction bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub txid: Txid,
    pub is_coinbase: bool,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    /// Height of the block this transaction was confirmed in.
    pub block_height: u32,
    /// Block timestamp, Unix seconds.
    pub timestamp: i64,
}

impl Transaction {
    /// A malformed transaction has any output with a non-finite or
    /// negative amount. Per `spec.md` §4.1, such a transaction is skipped
    /// and counted once under a generic diagnostic, without evaluating
    /// R1–R6.
    pub(crate) fn is_malformed(&self) -> bool {
        self.outputs.iter().any(TxOutput::is_malformed)
    }
}

// ==============================================================================
// Window
// ==============================================================================

/// The contiguous set of transactions to analyze, plus the set of txids
/// present in the same window (drives the R6 same-window-spend filter).
///
/// Typically one UTC day (~144 blocks), but any contiguous block range is
/// acceptable — the core never inspects block boundaries itself.
#[derive(Debug, Clone, Default)]
pub struct Window {
    pub transactions: Vec<Transaction>,
    pub window_txids: HashSet<Txid>,
}

impl Window {
    /// Build a window, deriving `window_txids` from `transactions` itself.
    /// This is the common case: the caller doesn't know of any txids in the
    /// window beyond the transactions it is handing over.
    pub fn new(transactions: Vec<Transaction>) -> Self {
        let window_txids = transactions.iter().map(|tx| tx.txid).collect();
        Self {
            transactions,
            window_txids,
        }
    }

    /// Build a window with an explicit txid set, for callers that know of
    /// window-resident txids beyond the transactions they could decode
    /// (e.g. a transaction that failed to decode but whose txid is known
    /// from the block's tx list, so same-window self-spends against it
    /// still count).
    pub fn with_txids(transactions: Vec<Transaction>, window_txids: HashSet<Txid>) -> Self {
        Self {
            transactions,
            window_txids,
        }
    }

    /// `window_txids` must be a superset of the txids of `transactions`.
    /// Violating this is a caller programming error (`spec.md` §7's last
    /// row), not a data-quality event.
    pub(crate) fn validate(&self) -> Result<(), crate::error::CoreError> {
        for tx in &self.transactions {
            if !self.window_txids.contains(&tx.txid) {
                return Err(crate::error::CoreError::InconsistentWindow(tx.txid));
            }
        }
        Ok(())
    }
}

// ==============================================================================
// Diagnostics
// ==============================================================================

/// Per-filter rejection counters, surfaced for auditability. The sum of
/// every field here plus the accepted transaction count equals the number
/// of input transactions (`spec.md` §8, invariant 6).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// R1: more than 5 inputs.
    pub rejected_too_many_inputs: u64,
    /// R2: output count is not exactly 2.
    pub rejected_wrong_output_count: u64,
    /// R3: coinbase transaction.
    pub rejected_coinbase: u64,
    /// R4: at least one OP_RETURN output.
    pub rejected_op_return: u64,
    /// R5: an input's witness exceeds 500 bytes.
    pub rejected_witness_too_large: u64,
    /// R6: an input spends a transaction from the same window.
    pub rejected_self_spend: u64,
    /// Transaction had a non-finite or negative output amount.
    pub malformed_transactions: u64,
    /// An accepted transaction's output amount fell outside
    /// `(1e-6, 1e6)` BTC and was dropped before entering the histogram.
    pub outputs_out_of_bin_range: u64,
}

// ==============================================================================
// Candidate price cloud
// ==============================================================================

/// One price implied by pairing a single output amount with a round USD
/// target (`spec.md` §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidatePoint {
    pub price_usd: f64,
    pub block_height: u32,
    pub timestamp: i64,
}

// ==============================================================================
// Result
// ==============================================================================

/// The core's single output type.
///
/// `price_usd` (and the fields that depend on it) are `None` when the
/// pipeline aborts for lack of signal (`spec.md` §4.5, §7) — never a
/// panic, never an exception.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceResult {
    pub price_usd: Option<f64>,
    pub confidence: f64,
    pub tx_count: u64,
    pub output_count: u64,
    pub price_lo: Option<f64>,
    pub price_hi: Option<f64>,
    pub deviation_pct: Option<f64>,
    pub diagnostics: Diagnostics,
    /// Present only when the caller asked for it (`calculate_price_with_cloud`);
    /// the intraday candidate cloud for visualization (`spec.md` §3, §6).
    pub intraday_cloud: Option<Vec<CandidatePoint>>,
}

impl PriceResult {
    /// The "no signal" result: empty input, or the coarse estimator found
    /// nothing to work with. Confidence zero, price undefined, diagnostics
    /// still populated from whatever filtering happened before the abort.
    pub(crate) fn no_signal(tx_count: u64, output_count: u64, diagnostics: Diagnostics) -> Self {
        Self {
            price_usd: None,
            confidence: 0.0,
            tx_count,
            output_count,
            price_lo: None,
            price_hi: None,
            deviation_pct: None,
            diagnostics,
            intraday_cloud: None,
        }
    }
}
