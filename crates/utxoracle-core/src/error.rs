//! Error types for utxoracle-core.
//!
//! Data-quality problems (no signal, degenerate candidate cloud, malformed
//! input) are never errors here — they surface as a low-confidence
//! [`crate::PriceResult`] with populated diagnostics, per the core's
//! contract. [`CoreError`] is reserved for contract violations by the
//! caller: shapes the pipeline's preconditions rule out entirely.

/// Programming-error conditions: the caller violated the core's contract.
///
/// These are never returned from [`crate::calculate_price`] in response to
/// "bad" transaction data — malformed transactions are filtered and
/// counted, not rejected with an error. `CoreError` exists for invariants a
/// conforming caller cannot violate by feeding us unusual but well-formed
/// data (e.g. a window whose declared txid set doesn't actually include
/// the window's own transactions).
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error(
        "window txid set does not contain transaction {0}: window.window_txids must be a \
         superset of the txids of window.transactions"
    )]
    InconsistentWindow(bitcoin::Txid),
}
