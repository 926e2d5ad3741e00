//! Supported trailing windows for daily bar requests.

use serde::{Deserialize, Serialize};

/// The trailing history window to fetch for one symbol.
///
/// The scanner only ever works on daily bars over one of these two windows,
/// so the window is an enum rather than a free-form amount/unit pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lookback {
    /// Roughly six months of daily sessions.
    SixMonths,
    /// Roughly one year of daily sessions.
    OneYear,
}

impl Lookback {
    /// The `range` query value understood by chart-style endpoints.
    pub fn range_param(self) -> &'static str {
        match self {
            Lookback::SixMonths => "6mo",
            Lookback::OneYear => "1y",
        }
    }

    /// Approximate number of trading sessions the window spans.
    pub fn approx_sessions(self) -> usize {
        match self {
            Lookback::SixMonths => 125,
            Lookback::OneYear => 250,
        }
    }
}

impl std::fmt::Display for Lookback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.range_param())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_params_match_chart_api_values() {
        assert_eq!(Lookback::SixMonths.range_param(), "6mo");
        assert_eq!(Lookback::OneYear.range_param(), "1y");
    }

    #[test]
    fn serde_round_trips_snake_case() {
        let json = serde_json::to_string(&Lookback::SixMonths).unwrap();
        assert_eq!(json, "\"six_months\"");
        let back: Lookback = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Lookback::SixMonths);
    }
}
