mod cli;
mod fixture;

use clap::Parser;
use eyre::Context;

use cli::OutputFormat;

/// Below this many filtered outputs, the histogram is thin enough that a
/// price estimate (if any) shouldn't be trusted on its own.
const MIN_RECOMMENDED_OUTPUTS: u64 = 1_000;

/// Below this confidence, flag the result rather than let it pass silently.
const LOW_CONFIDENCE_WARNING_THRESHOLD: f64 = 0.2;

fn main() -> eyre::Result<()> {
    let args = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    let window = fixture::load_window(&args.input)
        .with_context(|| format!("load transaction window from `{}`", args.input.display()))?;

    tracing::info!(
        tx_count = window.transactions.len(),
        "loaded transaction window"
    );

    let result = if args.cloud {
        utxoracle_core::calculate_price_with_cloud(window)
    } else {
        utxoracle_core::calculate_price(window)
    }
    .context("run price-discovery pipeline")?;

    tracing::info!(
        price_usd = ?result.price_usd,
        confidence = result.confidence,
        output_count = result.output_count,
        "price-discovery pipeline finished"
    );
    if result.output_count < MIN_RECOMMENDED_OUTPUTS {
        tracing::warn!(
            output_count = result.output_count,
            minimum = MIN_RECOMMENDED_OUTPUTS,
            "fewer filtered outputs than recommended; estimate may be unreliable"
        );
    }
    if result.confidence < LOW_CONFIDENCE_WARNING_THRESHOLD {
        tracing::warn!(confidence = result.confidence, "low-confidence estimate");
    }

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        OutputFormat::Text => print_text_report(&result),
    }

    Ok(())
}

fn print_text_report(result: &utxoracle_core::PriceResult) {
    println!();
    match result.price_usd {
        Some(price) => {
            println!("  Estimated price: ${price:.2}/BTC");
            if let (Some(lo), Some(hi)) = (result.price_lo, result.price_hi) {
                println!("  Range:           ${lo:.2} - ${hi:.2}");
            }
            if let Some(deviation_pct) = result.deviation_pct {
                println!("  Deviation:       {:.2}%", deviation_pct * 100.0);
            }
            println!("  Confidence:      {:.2}", result.confidence);
        }
        None => {
            println!("  No signal: not enough round-dollar structure to estimate a price.");
        }
    }
    println!();
    println!("  Transactions analyzed: {}", result.tx_count);
    println!("  Outputs histogrammed:  {}", result.output_count);
    println!();
    println!("  Diagnostics:");
    println!("    too many inputs:    {}", result.diagnostics.rejected_too_many_inputs);
    println!("    wrong output count: {}", result.diagnostics.rejected_wrong_output_count);
    println!("    coinbase:           {}", result.diagnostics.rejected_coinbase);
    println!("    OP_RETURN:          {}", result.diagnostics.rejected_op_return);
    println!("    witness too large:  {}", result.diagnostics.rejected_witness_too_large);
    println!("    same-window spend:  {}", result.diagnostics.rejected_self_spend);
    println!("    malformed:          {}", result.diagnostics.malformed_transactions);
    println!("    out of bin range:   {}", result.diagnostics.outputs_out_of_bin_range);
    println!();
}
