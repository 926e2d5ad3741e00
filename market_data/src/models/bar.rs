//! Canonical in-memory representation of one daily OHLCV bar.
//!
//! This struct is the standard output row for all
//! [`BarProvider`](crate::providers::BarProvider) implementations, regardless
//! of which vendor the data came from.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single daily trading session for one symbol.
///
/// Vendor-agnostic: providers translate their own payload shapes into this
/// flat struct before returning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Calendar date of the session (exchange-local).
    pub date: NaiveDate,

    /// Opening price.
    pub open: f64,

    /// Highest price during the session.
    pub high: f64,

    /// Lowest price during the session.
    pub low: f64,

    /// Closing price.
    pub close: f64,

    /// Shares traded during the session.
    pub volume: u64,
}

impl Bar {
    /// Whether the session closed above its open.
    pub fn is_green(&self) -> bool {
        self.close > self.open
    }
}
