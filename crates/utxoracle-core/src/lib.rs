//! Deterministic BTC/USD price discovery from on-chain transaction output
//! clustering.
//!
//! [`calculate_price`] is the single entry point: hand it a [`Window`] of
//! decoded transactions and it runs the full pipeline - retail-transaction
//! filtering, histogramming, smoothing, coarse convolutional estimation,
//! intraday candidate extraction, and geometric-median convergence -
//! without consulting any external price source or exchange.

pub mod bingrid;
pub mod coarse;
pub mod convergence;
pub mod error;
pub mod filter;
pub mod histogram;
pub mod intraday;
pub mod numeric;
pub mod pipeline;
pub mod smoother;
pub mod stencil;
pub mod types;

#[cfg(test)]
pub(crate) mod test_util;

pub use error::CoreError;
pub use pipeline::{calculate_price, calculate_price_with_cloud};
pub use types::{CandidatePoint, Diagnostics, PriceResult, Transaction, TxInput, TxOutput, Window};
