//! The two fixed 803-cell convolution stencils (`spec.md` §3, §4.4).
//!
//! Both stencils are indexed `0..=802` with center cell `402`, matching the
//! bin-grid's 200-bins-per-decade resolution: cell `402 + d` sits `d/200`
//! decades above the $100 anchor. Neither stencil depends on any
//! transaction data — both are process-wide constants, computed once.

use std::sync::LazyLock;

/// Width of each stencil array.
pub const STENCIL_WIDTH: usize = 803;

/// Index of the stencil's center cell, corresponding to the $100 anchor.
pub const STENCIL_CENTER: usize = 402;

/// The smooth stencil: a broad Gaussian core plus a shallow linear taper,
/// scored against the histogram alongside the spike stencil at every trial
/// shift. It captures the overall mass of spending at a given scale, with a
/// gentle bias toward larger amounts, rather than any single round-dollar
/// peak.
pub static SMOOTH_STENCIL: LazyLock<[f64; STENCIL_WIDTH]> = LazyLock::new(build_smooth_stencil);

/// The spike stencil: zero everywhere except at the offsets corresponding to
/// round-USD amounts ($1 through $10,000), where it carries a calibrated
/// weight. Scoring the histogram against this stencil at a trial shift
/// measures how well that shift's implied round-dollar grid lines up with
/// observed transaction-amount peaks.
pub static SPIKE_STENCIL: LazyLock<[f64; STENCIL_WIDTH]> = LazyLock::new(build_spike_stencil);

/// Gaussian core's center cell, in absolute stencil-array index terms
/// (`spec.md` §4.4). Distinct from [`STENCIL_CENTER`] — the smooth
/// stencil's hump and the spike stencil's $100 anchor are calibrated
/// independently and do not sit at the same cell.
const SMOOTH_STENCIL_CENTER: f64 = 411.0;

/// Gaussian standard deviation, in bins (`spec.md` §4.4). Wide relative to
/// the 803-cell width: this stencil captures the overall mass of spending
/// at a given scale, not a sharp round-dollar spike.
const SMOOTH_STENCIL_SIGMA: f64 = 201.0;

/// Slope of the shallow linear term that biases the smooth score toward
/// larger amounts (`spec.md` §4.4), calibrated against historical data.
const SMOOTH_STENCIL_LINEAR_SLOPE: f64 = 5.0e-7;

/// Peak amplitude of the smooth stencil's Gaussian core (`spec.md` §4.4).
const SMOOTH_STENCIL_AMPLITUDE: f64 = 0.001_50;

fn build_smooth_stencil() -> [f64; STENCIL_WIDTH] {
    let mut stencil = [0.0_f64; STENCIL_WIDTH];
    for (i, cell) in stencil.iter_mut().enumerate() {
        let d = i as f64 - SMOOTH_STENCIL_CENTER;
        let gaussian = SMOOTH_STENCIL_AMPLITUDE
            * (-d * d / (2.0 * SMOOTH_STENCIL_SIGMA * SMOOTH_STENCIL_SIGMA)).exp();
        let linear = SMOOTH_STENCIL_LINEAR_SLOPE * i as f64;
        *cell = gaussian + linear;
    }
    stencil
}

/// Round-USD amounts the spike stencil targets: the retail price points a
/// wallet's round-number change-making would actually produce, spanning the
/// full width of the 803-cell array around the $100 anchor ($1 at one edge,
/// $10,000 at the other).
const SPIKE_TARGETS_USD: [f64; 28] = [
    1.0, 2.0, 5.0, 10.0, 15.0, 20.0, 25.0, 30.0, 40.0, 50.0, 60.0, 75.0, 100.0, 125.0, 150.0,
    200.0, 250.0, 300.0, 400.0, 500.0, 600.0, 750.0, 1_000.0, 1_500.0, 2_000.0, 3_000.0, 5_000.0,
    10_000.0,
];

/// Offset (in stencil cells, relative to `STENCIL_CENTER`) of the round-USD
/// amount `usd` from the $100 anchor, at 200 cells per decade.
fn spike_offset(usd: f64) -> i64 {
    (200.0 * usd.log10() - 200.0 * 100f64.log10()).round() as i64
}

/// Weight assigned to a round-USD spike at `usd`, decreasing away from the
/// $100 anchor: a log-Gaussian envelope (peaked at $100) plus a shallow
/// linear term carrying weight out to the $1 and $10,000 extremes.
fn spike_weight(usd: f64) -> f64 {
    let log_u = usd.log10();
    0.0058 * (-(log_u - 2.0).powi(2) / 1.45).exp() + 0.000_19 * log_u
}

fn build_spike_stencil() -> [f64; STENCIL_WIDTH] {
    let mut stencil = [0.0_f64; STENCIL_WIDTH];
    for &usd in &SPIKE_TARGETS_USD {
        let offset = spike_offset(usd);
        let index = STENCIL_CENTER as i64 + offset;
        if index >= 0 && (index as usize) < STENCIL_WIDTH {
            stencil[index as usize] = spike_weight(usd);
        }
    }
    stencil
}
