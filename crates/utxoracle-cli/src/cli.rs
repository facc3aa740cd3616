use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Output format for the final report.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary.
    Text,
    /// The full `PriceResult` as JSON.
    Json,
}

/// utxoracle — derive a BTC/USD price estimate from a window of decoded
/// on-chain transactions, without consulting any external price source.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Path to a JSON fixture describing the transaction window to
    /// analyze. See `utxoracle-cli`'s README for the expected shape.
    #[arg(long, env = "UTXORACLE_INPUT")]
    pub input: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Include the full intraday candidate-price cloud in the output.
    #[arg(long)]
    pub cloud: bool,
}
