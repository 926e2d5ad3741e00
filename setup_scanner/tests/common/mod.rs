//! Shared scaffolding for the pipeline integration tests: a scripted
//! in-memory provider and bar-series builders.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use market_data::models::{bar::Bar, bar_series::BarSeries, lookback::Lookback};
use market_data::providers::{BarProvider, errors::ProviderError};

/// What the scripted provider does when asked for a given symbol.
pub enum Script {
    Serve(Vec<Bar>),
    Fail(String),
    /// Sleep far past any configured timeout.
    Hang,
}

/// A provider whose per-symbol behavior is fixed up front. Symbols with no
/// script get an empty-data error.
pub struct ScriptedProvider {
    scripts: HashMap<String, Script>,
}

impl ScriptedProvider {
    pub fn new(scripts: impl IntoIterator<Item = (&'static str, Script)>) -> Self {
        Self {
            scripts: scripts
                .into_iter()
                .map(|(s, script)| (s.to_string(), script))
                .collect(),
        }
    }
}

#[async_trait]
impl BarProvider for ScriptedProvider {
    async fn fetch_daily_bars(
        &self,
        symbol: &str,
        lookback: Lookback,
    ) -> Result<BarSeries, ProviderError> {
        match self.scripts.get(symbol) {
            Some(Script::Serve(bars)) => Ok(BarSeries {
                symbol: symbol.to_string(),
                lookback,
                bars: bars.clone(),
            }),
            Some(Script::Fail(message)) => Err(ProviderError::Api(message.clone())),
            Some(Script::Hang) => {
                tokio::time::sleep(Duration::from_secs(86_400)).await;
                Err(ProviderError::Api("unreachable".to_string()))
            }
            None => Err(ProviderError::Empty {
                symbol: symbol.to_string(),
            }),
        }
    }
}

fn day(i: usize) -> NaiveDate {
    // All sessions inside one calendar year so the VWAP partition is the
    // whole series.
    NaiveDate::from_ymd_opt(2025, 1, 2).unwrap() + chrono::Days::new(i as u64)
}

/// `n` liquid green bars with closes rising one unit per session from
/// `start`. Classifies as Diamond under both presets.
pub fn rising_series(n: usize, start: f64) -> Vec<Bar> {
    (0..n)
        .map(|i| {
            let close = start + i as f64;
            Bar {
                date: day(i),
                open: close - 0.5,
                high: close + 1.0,
                low: close - 1.5,
                close,
                volume: 100_000,
            }
        })
        .collect()
}

/// `n` liquid flat red-ish bars (close == open); fails every trend gate.
pub fn flat_series(n: usize, price: f64) -> Vec<Bar> {
    (0..n)
        .map(|i| Bar {
            date: day(i),
            open: price,
            high: price + 1.0,
            low: price - 1.0,
            close: price,
            volume: 100_000,
        })
        .collect()
}
