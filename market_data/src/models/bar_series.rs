//! A collection of daily bars for a specific symbol and lookback window.

use crate::models::{bar::Bar, lookback::Lookback};

/// Represents a complete set of daily bars for a single symbol.
///
/// Bars are ordered oldest-to-newest with strictly increasing dates; the
/// producing provider is responsible for upholding that invariant.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    /// The symbol this data represents (e.g., "RELIANCE.NS").
    pub symbol: String,
    /// The trailing window the series was requested for.
    pub lookback: Lookback,
    /// The OHLCV bars, oldest first.
    pub bars: Vec<Bar>,
}

impl BarSeries {
    /// Number of sessions in the series.
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Whether the series holds no sessions at all.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Closing price of the most recent session, if any.
    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    /// Checks the oldest-to-newest, strictly-increasing-date invariant.
    pub fn is_chronological(&self) -> bool {
        self.bars.windows(2).all(|w| w[0].date < w[1].date)
    }
}
