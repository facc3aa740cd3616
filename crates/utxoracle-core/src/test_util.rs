//! Shared test helpers for in-crate unit tests.
//!
//! Consolidates builder functions for [`Transaction`]/[`TxInput`]/
//! [`TxOutput`] so unit tests across modules share one source of truth for
//! constructing dummy data, instead of each module hand-rolling structs.

use bitcoin::hashes::Hash;
use bitcoin::Txid;

use crate::types::{TxInput, TxOutput, Transaction};

/// A deterministic `Txid` from a single distinguishing byte.
pub fn txid_from_byte(b: u8) -> Txid {
    let mut bytes = [0u8; 32];
    bytes[0] = b;
    Txid::from_byte_array(bytes)
}

/// A well-formed, non-coinbase input with no prevout reference (i.e. not a
/// same-window spend of anything), default witness size.
pub fn simple_input() -> TxInput {
    TxInput {
        prevout_txid: None,
        sequence: 0xFFFF_FFFE,
        witness_byte_size: 100,
    }
}

/// An input whose prevout is `funding_txid` — used to exercise R6
/// (same-window self-spend detection).
pub fn spending_input(funding_txid: Txid) -> TxInput {
    TxInput {
        prevout_txid: Some(funding_txid),
        sequence: 0xFFFF_FFFE,
        witness_byte_size: 100,
    }
}

/// The sole input of a coinbase transaction.
pub fn coinbase_input() -> TxInput {
    TxInput {
        prevout_txid: None,
        sequence: 0xFFFF_FFFF,
        witness_byte_size: 0,
    }
}

/// A plain (non-OP_RETURN) output carrying `amount_btc`.
pub fn output(amount_btc: f64) -> TxOutput {
    TxOutput {
        amount_btc,
        is_op_return: false,
    }
}

/// An OP_RETURN output (amount is conventionally zero, but not required).
pub fn op_return_output() -> TxOutput {
    TxOutput {
        amount_btc: 0.0,
        is_op_return: true,
    }
}

/// Build a transaction with explicit inputs/outputs/coinbase flag.
pub fn make_tx(
    txid: Txid,
    is_coinbase: bool,
    inputs: Vec<TxInput>,
    outputs: Vec<TxOutput>,
    block_height: u32,
    timestamp: i64,
) -> Transaction {
    Transaction {
        txid,
        is_coinbase,
        inputs,
        outputs,
        block_height,
        timestamp,
    }
}

/// A non-coinbase transaction with one default input and the given
/// outputs — the common case for tests that only care about output
/// amounts.
pub fn tx_with_outputs(
    txid: Txid,
    outputs: Vec<TxOutput>,
    block_height: u32,
    timestamp: i64,
) -> Transaction {
    make_tx(txid, false, vec![simple_input()], outputs, block_height, timestamp)
}

/// A retail-shaped transaction: one input, a payment output and a change
/// output — passes R1–R5 on its own (R6 depends on the surrounding window).
pub fn retail_tx(
    txid: Txid,
    payment_btc: f64,
    change_btc: f64,
    block_height: u32,
    timestamp: i64,
) -> Transaction {
    tx_with_outputs(
        txid,
        vec![output(payment_btc), output(change_btc)],
        block_height,
        timestamp,
    )
}

/// A tiny deterministic PRNG (xorshift64*) for reproducible "random" test
/// fixtures without pulling in the `rand` crate for a single test helper.
pub struct DeterministicRng(u64);

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self(seed | 1)
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.0 = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Uniform `f64` in `[lo, hi)`.
    pub fn next_range(&mut self, lo: f64, hi: f64) -> f64 {
        let unit = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        lo + unit * (hi - lo)
    }
}
