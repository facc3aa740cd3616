//! Accumulate filtered transaction outputs into the 2400-bin histogram
//! (`spec.md` §4.2).

use crate::bingrid::{bin_index, BIN_COUNT};
use crate::types::{Diagnostics, Transaction};

/// A raw count histogram over [`crate::bingrid`]'s 2400 bins, plus the
/// number of outputs that contributed to it.
#[derive(Debug, Clone)]
pub struct Histogram {
    pub counts: [f64; BIN_COUNT],
    pub output_count: u64,
}

impl Histogram {
    fn empty() -> Self {
        Self {
            counts: [0.0; BIN_COUNT],
            output_count: 0,
        }
    }

    /// Build a histogram from the outputs of `transactions`, which must
    /// already be the accepted (filter-passing, non-malformed) subset.
    /// Outputs whose amount falls outside the bin grid's `(1e-6, 1e6)` BTC
    /// range are dropped and counted under
    /// [`Diagnostics::outputs_out_of_bin_range`].
    pub fn accumulate<'a, I>(transactions: I, diagnostics: &mut Diagnostics) -> Self
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut histogram = Self::empty();
        for tx in transactions {
            for output in &tx.outputs {
                match bin_index(output.amount_btc) {
                    Some(k) => {
                        histogram.counts[k] += 1.0;
                        histogram.output_count += 1;
                    }
                    None => diagnostics.outputs_out_of_bin_range += 1,
                }
            }
        }
        histogram
    }
}
