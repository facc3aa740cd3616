//! The six retail-transaction filter rules, R1–R6 (`spec.md` §4.1).
//!
//! A transaction must pass every rule to contribute outputs to the
//! histogram. Rules are evaluated in a fixed order and the first failing
//! rule is the one counted — a transaction that fails on multiple counts is
//! not double-counted in [`crate::types::Diagnostics`].

use std::collections::HashSet;

use bitcoin::Txid;

use crate::types::{Diagnostics, Transaction};

/// Maximum number of inputs a retail transaction may have (R1).
const MAX_INPUTS: usize = 5;

/// The exact output count a retail transaction must have (R2): one payment,
/// one change.
const REQUIRED_OUTPUT_COUNT: usize = 2;

/// Maximum witness byte size of a single input (R5). A witness larger than
/// this suggests a multisig/script-heavy spend, not a simple retail wallet.
const MAX_WITNESS_BYTES: u32 = 500;

/// Why a transaction was excluded from the histogram, in evaluation order.
/// `Accepted` is not a rejection; it means the transaction contributes its
/// outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOutcome {
    Accepted,
    RejectedTooManyInputs,
    RejectedWrongOutputCount,
    RejectedCoinbase,
    RejectedOpReturn,
    RejectedWitnessTooLarge,
    RejectedSelfSpend,
}

/// Evaluate R1–R6 against `tx`, given the set of txids present in the same
/// window (for R6). Malformed transactions are the caller's concern
/// ([`Transaction::is_malformed`][crate::types::Transaction] is checked
/// before this function is called, per `spec.md` §4.1's ordering).
pub fn evaluate(tx: &Transaction, window_txids: &HashSet<Txid>) -> FilterOutcome {
    // R3 first: a coinbase transaction's "inputs" aren't prevout spends at
    // all, so checking input count/self-spend against it first would be
    // meaningless.
    if tx.is_coinbase {
        return FilterOutcome::RejectedCoinbase;
    }
    if tx.inputs.len() > MAX_INPUTS {
        return FilterOutcome::RejectedTooManyInputs;
    }
    if tx.outputs.len() != REQUIRED_OUTPUT_COUNT {
        return FilterOutcome::RejectedWrongOutputCount;
    }
    if tx.outputs.iter().any(|o| o.is_op_return) {
        return FilterOutcome::RejectedOpReturn;
    }
    if tx.inputs.iter().any(|i| i.witness_byte_size > MAX_WITNESS_BYTES) {
        return FilterOutcome::RejectedWitnessTooLarge;
    }
    let self_spend = tx.inputs.iter().any(|i| {
        i.prevout_txid
            .is_some_and(|prevout| window_txids.contains(&prevout))
    });
    if self_spend {
        return FilterOutcome::RejectedSelfSpend;
    }
    FilterOutcome::Accepted
}

impl FilterOutcome {
    /// Increment the matching counter on `diagnostics`. No-op for
    /// `Accepted`.
    pub fn record(self, diagnostics: &mut Diagnostics) {
        match self {
            FilterOutcome::Accepted => {}
            FilterOutcome::RejectedTooManyInputs => diagnostics.rejected_too_many_inputs += 1,
            FilterOutcome::RejectedWrongOutputCount => diagnostics.rejected_wrong_output_count += 1,
            FilterOutcome::RejectedCoinbase => diagnostics.rejected_coinbase += 1,
            FilterOutcome::RejectedOpReturn => diagnostics.rejected_op_return += 1,
            FilterOutcome::RejectedWitnessTooLarge => diagnostics.rejected_witness_too_large += 1,
            FilterOutcome::RejectedSelfSpend => diagnostics.rejected_self_spend += 1,
        }
    }
}
