//! Per-ticker analysis: filters, formulas, and the classification decision.
//!
//! [`analyze`] is a pure, total function from one ticker's bar series to an
//! [`Outcome`]. The stages run in a fixed order and each one short-circuits
//! into a [`Skip`] carrying the reason, so a scan can always account for why
//! a ticker produced no classification:
//!
//! 1. sufficiency: enough history for the trailing windows
//! 2. liquidity: turnover and price floors
//! 3. baseline: cumulative VWAP over the current calendar year (the
//!    "magnet" approximating institutional cost basis), falling back to a
//!    50-session SMA right after a year boundary
//! 4. consistency: share of green sessions in the trailing 20
//! 5. efficiency: net move divided by total path over the trailing 20
//! 6. classification: Diamond / Watchlist / optional Trending diagnostic

use chrono::Datelike;
use market_data::models::bar::Bar;
use serde::{Deserialize, Serialize};

use crate::config::AnalyzerConfig;

/// Sessions in the trailing consistency/efficiency windows.
const TREND_WINDOW: usize = 20;

/// Sessions in the trailing average-volume window for the turnover filter.
const VOLUME_WINDOW: usize = 5;

/// Sessions in the SMA fallback used when the current-year VWAP partition is
/// empty (scan run in the first sessions of a new year).
const SMA_FALLBACK_WINDOW: usize = 50;

/// Trade-setup grade assigned to a qualifying ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    /// Institutional-buy grade: above baseline with high consistency and an
    /// efficient price path.
    Diamond,
    /// Developing grade: above baseline with moderate consistency.
    Watchlist,
    /// Diagnostic only: above baseline, no further requirements. Used to
    /// verify the data pipeline is alive, never as a trade signal.
    Trending,
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Label::Diamond => "DIAMOND",
            Label::Watchlist => "WATCHLIST",
            Label::Trending => "TRENDING",
        })
    }
}

/// The classification record for one qualifying ticker.
///
/// All fields are raw numerics; display rounding happens at the presentation
/// boundary in [`crate::report`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Ticker symbol the analysis is for.
    pub symbol: String,
    /// Closing price of the most recent session.
    pub last_close: f64,
    /// Assigned setup grade.
    pub label: Label,
    /// Green-session percentage over the trailing window, in [0, 100].
    pub consistency_pct: u8,
    /// Net move over total path, in [0, 1].
    pub efficiency: f64,
    /// Yearly-VWAP baseline value (or its SMA fallback).
    pub baseline: f64,
    /// Percentage distance of the last close from the baseline.
    pub pct_from_baseline: f64,
}

/// Why a ticker produced no classification.
///
/// Carries only the data known at the stage that rejected the ticker; a skip
/// emitted by the liquidity filter has no baseline or consistency fields by
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SkipCause {
    /// Fewer bars than the configured minimum.
    InsufficientData {
        /// Number of bars that were available.
        bars: usize,
    },
    /// Turnover below the configured floor.
    Illiquid {
        /// The 5-session average volume × last close that failed the floor.
        turnover: f64,
    },
    /// Last close below the configured price floor.
    BelowPriceFloor {
        /// The offending last close.
        price: f64,
    },
    /// Above no threshold: the neutral, filtered-out outcome.
    FailedCriteria,
    /// The bar fetch failed or timed out.
    Fetch {
        /// Diagnostic detail; not used for control flow.
        detail: String,
    },
    /// A numeric stage produced a non-finite value or the task itself died.
    Computation {
        /// Diagnostic detail; not used for control flow.
        detail: String,
    },
}

impl SkipCause {
    /// Stable code used to group skips in diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            SkipCause::InsufficientData { .. } => "insufficient_data",
            SkipCause::Illiquid { .. } => "illiquid",
            SkipCause::BelowPriceFloor { .. } => "below_price_floor",
            SkipCause::FailedCriteria => "failed_criteria",
            SkipCause::Fetch { .. } => "fetch_error",
            SkipCause::Computation { .. } => "computation_error",
        }
    }
}

impl std::fmt::Display for SkipCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipCause::InsufficientData { bars } => write!(f, "insufficient data ({bars} bars)"),
            SkipCause::Illiquid { turnover } => write!(f, "illiquid (turnover {turnover:.0})"),
            SkipCause::BelowPriceFloor { price } => write!(f, "below price floor ({price:.2})"),
            SkipCause::FailedCriteria => f.write_str("failed all classification thresholds"),
            SkipCause::Fetch { detail } => write!(f, "fetch failed: {detail}"),
            SkipCause::Computation { detail } => write!(f, "computation failed: {detail}"),
        }
    }
}

/// One non-qualifying ticker and the reason it was skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skip {
    /// Ticker symbol the skip is for.
    pub symbol: String,
    /// Why the ticker was skipped.
    pub cause: SkipCause,
}

/// The tagged result of analyzing one ticker: exactly one of a
/// classification or a skip reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    /// The ticker qualified and carries a classification record.
    Classified(Analysis),
    /// The ticker was filtered out or failed; the reason is preserved.
    Skipped(Skip),
}

fn skipped(symbol: &str, cause: SkipCause) -> Outcome {
    Outcome::Skipped(Skip {
        symbol: symbol.to_string(),
        cause,
    })
}

/// Runs the full analysis pipeline for one ticker.
///
/// Deterministic and side-effect free: repeated invocation over the same
/// bars and config yields the same outcome. Bars must be ordered
/// oldest-to-newest (the fetcher's contract).
pub fn analyze(symbol: &str, bars: &[Bar], cfg: &AnalyzerConfig) -> Outcome {
    // Stage 1: sufficiency.
    if bars.len() < cfg.min_bars {
        return skipped(symbol, SkipCause::InsufficientData { bars: bars.len() });
    }
    let Some(last) = bars.last() else {
        return skipped(symbol, SkipCause::InsufficientData { bars: 0 });
    };
    let price = last.close;

    // Stage 2: liquidity and price floors.
    let turnover = average_volume(bars, VOLUME_WINDOW) * price;
    if !turnover.is_finite() {
        return skipped(
            symbol,
            SkipCause::Computation {
                detail: "non-finite turnover".to_string(),
            },
        );
    }
    if turnover < cfg.turnover_floor {
        return skipped(symbol, SkipCause::Illiquid { turnover });
    }
    if price < cfg.price_floor {
        return skipped(symbol, SkipCause::BelowPriceFloor { price });
    }

    // Stage 3: yearly-VWAP baseline, SMA fallback at a year boundary.
    let baseline = match yearly_vwap(bars, last.date.year()) {
        YearlyVwap::Value(v) => v,
        YearlyVwap::EmptyPartition => sma_close(bars, SMA_FALLBACK_WINDOW),
        YearlyVwap::ZeroVolume => {
            return skipped(
                symbol,
                SkipCause::Computation {
                    detail: "zero volume across current-year partition".to_string(),
                },
            );
        }
    };

    // Stages 4 and 5: the two trend formulas.
    let consistency_pct = consistency_pct(bars, TREND_WINDOW);
    let efficiency = efficiency_ratio(bars, TREND_WINDOW);

    if !(baseline.is_finite() && efficiency.is_finite()) {
        return skipped(
            symbol,
            SkipCause::Computation {
                detail: "non-finite baseline or efficiency".to_string(),
            },
        );
    }

    // Stage 6: ordered classification, first match wins.
    let Some(label) = classify(price, baseline, consistency_pct, efficiency, cfg) else {
        return skipped(symbol, SkipCause::FailedCriteria);
    };

    Outcome::Classified(Analysis {
        symbol: symbol.to_string(),
        last_close: price,
        label,
        consistency_pct,
        efficiency,
        baseline,
        pct_from_baseline: (price - baseline) / baseline * 100.0,
    })
}

/// The classification decision as a total function of the four computed
/// values. `None` is the neutral (filtered-out) outcome.
pub fn classify(
    price: f64,
    baseline: f64,
    consistency_pct: u8,
    efficiency: f64,
    cfg: &AnalyzerConfig,
) -> Option<Label> {
    if price <= baseline {
        return None;
    }
    if consistency_pct >= cfg.diamond_consistency && efficiency >= cfg.diamond_efficiency {
        Some(Label::Diamond)
    } else if consistency_pct >= cfg.watchlist_consistency {
        Some(Label::Watchlist)
    } else if cfg.include_trending {
        Some(Label::Trending)
    } else {
        None
    }
}

/// Mean volume over the trailing `window` sessions.
fn average_volume(bars: &[Bar], window: usize) -> f64 {
    let tail = &bars[bars.len().saturating_sub(window)..];
    if tail.is_empty() {
        return 0.0;
    }
    tail.iter().map(|b| b.volume as f64).sum::<f64>() / tail.len() as f64
}

enum YearlyVwap {
    Value(f64),
    /// No bar belongs to the current calendar year.
    EmptyPartition,
    /// The partition exists but traded no volume; the quotient is undefined.
    ZeroVolume,
}

/// Cumulative volume-weighted average close over the bars of `year`,
/// evaluated at the newest bar.
fn yearly_vwap(bars: &[Bar], year: i32) -> YearlyVwap {
    let mut weighted = 0.0_f64;
    let mut volume = 0.0_f64;
    let mut seen = false;
    for bar in bars.iter().filter(|b| b.date.year() == year) {
        seen = true;
        weighted += bar.close * bar.volume as f64;
        volume += bar.volume as f64;
    }
    if !seen {
        YearlyVwap::EmptyPartition
    } else if volume == 0.0 {
        YearlyVwap::ZeroVolume
    } else {
        YearlyVwap::Value(weighted / volume)
    }
}

/// Simple moving average of close over the trailing `window` sessions,
/// clamped to the available history.
fn sma_close(bars: &[Bar], window: usize) -> f64 {
    let tail = &bars[bars.len().saturating_sub(window)..];
    tail.iter().map(|b| b.close).sum::<f64>() / tail.len() as f64
}

/// Green sessions over the trailing `window`, as an integer percentage.
fn consistency_pct(bars: &[Bar], window: usize) -> u8 {
    let tail = &bars[bars.len().saturating_sub(window)..];
    if tail.is_empty() {
        return 0;
    }
    let green = tail.iter().filter(|b| b.is_green()).count();
    (green * 100 / tail.len()) as u8
}

/// Net directional move divided by total absolute path over the trailing
/// `window` single-session deltas. Exactly 0 for a flat path.
fn efficiency_ratio(bars: &[Bar], window: usize) -> f64 {
    let window = window.min(bars.len().saturating_sub(1));
    if window == 0 {
        return 0.0;
    }
    let last = bars.len() - 1;
    let net = (bars[last].close - bars[last - window].close).abs();
    let path: f64 = (last - window + 1..=last)
        .map(|i| (bars[i].close - bars[i - 1].close).abs())
        .sum();
    if path == 0.0 { 0.0 } else { net / path }
}
