//! Load a transaction window from a JSON fixture file.
//!
//! The core crate never parses raw transaction bytes or talks to a node;
//! callers hand it already-decoded [`Transaction`] values. This module is
//! the CLI's stand-in for a real block/indexer client: a flat JSON file
//! listing the transactions to analyze.

use std::collections::HashSet;
use std::path::Path;

use bitcoin::Txid;
use eyre::Context;
use serde::Deserialize;
use utxoracle_core::{Transaction, Window};

/// The on-disk shape of a fixture file.
#[derive(Debug, Deserialize)]
struct FixtureFile {
    transactions: Vec<Transaction>,
    /// Txids present in the window beyond `transactions` itself — e.g. a
    /// transaction the indexer could list but not fully decode, whose txid
    /// still needs to count for same-window self-spend detection.
    #[serde(default)]
    extra_window_txids: Vec<Txid>,
}

/// Read and parse `path` into a [`Window`].
pub fn load_window(path: &Path) -> eyre::Result<Window> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("read fixture file `{}`", path.display()))?;
    let fixture: FixtureFile = serde_json::from_str(&contents)
        .with_context(|| format!("parse fixture file `{}` as JSON", path.display()))?;

    let mut window_txids: HashSet<Txid> = fixture.transactions.iter().map(|tx| tx.txid).collect();
    window_txids.extend(fixture.extra_window_txids);

    Ok(Window::with_txids(fixture.transactions, window_txids))
}
