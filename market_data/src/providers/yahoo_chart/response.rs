//! Deserialization of the Yahoo chart payload.
//!
//! Yahoo returns one `timestamp` array and, nested under
//! `indicators.quote[0]`, one parallel array per OHLCV field, each entry
//! nullable for halted sessions. [`flatten_bars`] turns that composite
//! layout into flat per-session [`Bar`] rows.

use chrono::DateTime;
use serde::Deserialize;

use crate::models::bar::Bar;
use crate::providers::errors::ProviderError;

#[derive(Deserialize, Debug)]
pub struct ChartEnvelope {
    pub chart: Chart,
}

#[derive(Deserialize, Debug)]
pub struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

#[derive(Deserialize, Debug)]
pub struct ChartResult {
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Deserialize, Debug)]
pub struct Indicators {
    pub quote: Vec<QuoteBlock>,
}

/// One parallel array per field; indices line up with `timestamp`.
#[derive(Deserialize, Debug, Default)]
pub struct QuoteBlock {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<u64>>,
}

/// Flattens one chart result into chronological [`Bar`] rows.
///
/// Sessions with any null field are skipped. Rows are sorted by date and
/// de-duplicated (first occurrence wins) so the strictly-increasing-date
/// invariant of a bar series holds on return.
pub fn flatten_bars(symbol: &str, result: &ChartResult) -> Result<Vec<Bar>, ProviderError> {
    let quote = result
        .indicators
        .quote
        .first()
        .ok_or_else(|| ProviderError::Malformed(format!("{symbol}: missing quote block")))?;

    let n = result.timestamp.len();
    for (name, len) in [
        ("open", quote.open.len()),
        ("high", quote.high.len()),
        ("low", quote.low.len()),
        ("close", quote.close.len()),
        ("volume", quote.volume.len()),
    ] {
        if len != n {
            return Err(ProviderError::Malformed(format!(
                "{symbol}: {name} has {len} entries for {n} timestamps"
            )));
        }
    }

    let mut bars = Vec::with_capacity(n);
    for i in 0..n {
        let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = (
            quote.open[i],
            quote.high[i],
            quote.low[i],
            quote.close[i],
            quote.volume[i],
        ) else {
            // Halted or partial session; the exchange published no trade.
            continue;
        };

        let date = DateTime::from_timestamp(result.timestamp[i], 0)
            .ok_or_else(|| {
                ProviderError::Malformed(format!(
                    "{symbol}: timestamp {} out of range",
                    result.timestamp[i]
                ))
            })?
            .date_naive();

        bars.push(Bar {
            date,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    bars.sort_by_key(|b| b.date);
    bars.dedup_by_key(|b| b.date);

    Ok(bars)
}
