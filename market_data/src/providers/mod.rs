//! Provider abstraction for market data sources.
//!
//! This module defines the [`BarProvider`] trait, the unified interface for
//! fetching daily bar series from any market data vendor. Each concrete
//! implementation (such as [`yahoo_chart::YahooChartProvider`]) handles
//! vendor-specific API logic and payload normalization.
//!
//! The trait is designed for async usage and supports dynamic dispatch
//! (`dyn BarProvider`) for runtime selection of providers.

pub mod errors;
pub mod yahoo_chart;

use async_trait::async_trait;

pub use errors::ProviderError;

use crate::models::{bar_series::BarSeries, lookback::Lookback};

/// Fetches a daily OHLCV series for one symbol over a trailing window.
///
/// Guarantees for implementors: the returned bars are sorted oldest-to-newest
/// with strictly increasing dates, and any vendor-specific nested column
/// layout has been flattened into plain [`crate::models::bar::Bar`] rows.
#[async_trait]
pub trait BarProvider: Send + Sync {
    /// Retrieves the daily bars for `symbol` covering `lookback`.
    async fn fetch_daily_bars(
        &self,
        symbol: &str,
        lookback: Lookback,
    ) -> Result<BarSeries, ProviderError>;
}
