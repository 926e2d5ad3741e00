//! Aggregated scan output and the display-boundary formatting helpers.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::analyzer::{Analysis, Label, Outcome, Skip};

/// The full output of one scan.
///
/// Invariant: every targeted ticker lands in exactly one of `results` or
/// `skips`; [`ScanReport::is_fully_accounted`] checks the arithmetic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// Number of tickers submitted to the scan.
    pub targeted: usize,
    /// Classification records, in completion order (no ordering guarantee).
    pub results: Vec<Analysis>,
    /// Skip records, in completion order.
    pub skips: Vec<Skip>,
    /// When the scan started.
    pub started_at: DateTime<Utc>,
    /// When the scan finished.
    pub completed_at: DateTime<Utc>,
    /// Wall-clock scan duration in seconds.
    pub duration_secs: f64,
}

impl ScanReport {
    pub(crate) fn new(targeted: usize, started_at: DateTime<Utc>) -> Self {
        Self {
            targeted,
            results: Vec::new(),
            skips: Vec::new(),
            started_at,
            completed_at: started_at,
            duration_secs: 0.0,
        }
    }

    pub(crate) fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Classified(analysis) => self.results.push(analysis),
            Outcome::Skipped(skip) => self.skips.push(skip),
        }
    }

    pub(crate) fn finish(&mut self) {
        self.completed_at = Utc::now();
        self.duration_secs =
            (self.completed_at - self.started_at).num_milliseconds() as f64 / 1000.0;
    }

    /// Number of tickers that produced a classification.
    pub fn succeeded(&self) -> usize {
        self.results.len()
    }

    /// Whether every targeted ticker is accounted for exactly once.
    pub fn is_fully_accounted(&self) -> bool {
        self.results.len() + self.skips.len() == self.targeted
    }

    /// Classifications carrying the given label, in completion order.
    pub fn by_label(&self, label: Label) -> Vec<&Analysis> {
        self.results.iter().filter(|a| a.label == label).collect()
    }

    /// Skip counts grouped by reason code, in first-seen order.
    pub fn skip_breakdown(&self) -> IndexMap<&'static str, usize> {
        let mut counts = IndexMap::new();
        for skip in &self.skips {
            *counts.entry(skip.cause.code()).or_insert(0) += 1;
        }
        counts
    }

    /// One-line summary for logging.
    pub fn summary(&self) -> String {
        format!(
            "scanned {} tickers in {:.1}s: {} classified, {} skipped",
            self.targeted,
            self.duration_secs,
            self.results.len(),
            self.skips.len(),
        )
    }

    /// Explicit empty-state message when no ticker qualified, with the skip
    /// breakdown so an empty table is never ambiguous.
    pub fn empty_notice(&self) -> Option<String> {
        if !self.results.is_empty() {
            return None;
        }
        let breakdown = self
            .skip_breakdown()
            .iter()
            .map(|(code, n)| format!("{code}: {n}"))
            .collect::<Vec<_>>()
            .join(", ");
        Some(format!(
            "no tickers met the criteria ({} scanned; skips: {breakdown})",
            self.targeted
        ))
    }
}

/// Formats a price or baseline value for display (2 decimals).
pub fn format_price(value: f64) -> String {
    format!("{value:.2}")
}

/// Formats an efficiency ratio for display (2 decimals).
pub fn format_efficiency(value: f64) -> String {
    format!("{value:.2}")
}

/// Formats an integer consistency percentage for display.
pub fn format_consistency(pct: u8) -> String {
    format!("{pct}%")
}

/// Formats the signed distance from baseline for display (1 decimal).
pub fn format_baseline_distance(pct: f64) -> String {
    format!("{pct:+.1}%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::SkipCause;

    fn analysis(symbol: &str, label: Label) -> Analysis {
        Analysis {
            symbol: symbol.to_string(),
            last_close: 123.456,
            label,
            consistency_pct: 65,
            efficiency: 0.4567,
            baseline: 110.0,
            pct_from_baseline: 12.23,
        }
    }

    #[test]
    fn breakdown_groups_by_reason_code() {
        let mut report = ScanReport::new(4, Utc::now());
        report.record(Outcome::Classified(analysis("A.NS", Label::Diamond)));
        report.record(Outcome::Skipped(Skip {
            symbol: "B.NS".into(),
            cause: SkipCause::Illiquid { turnover: 5.0 },
        }));
        report.record(Outcome::Skipped(Skip {
            symbol: "C.NS".into(),
            cause: SkipCause::Illiquid { turnover: 9.0 },
        }));
        report.record(Outcome::Skipped(Skip {
            symbol: "D.NS".into(),
            cause: SkipCause::FailedCriteria,
        }));

        assert!(report.is_fully_accounted());
        let breakdown = report.skip_breakdown();
        assert_eq!(breakdown.get("illiquid"), Some(&2));
        assert_eq!(breakdown.get("failed_criteria"), Some(&1));
        assert_eq!(report.by_label(Label::Diamond).len(), 1);
        assert!(report.empty_notice().is_none());
    }

    #[test]
    fn empty_notice_lists_the_breakdown() {
        let mut report = ScanReport::new(1, Utc::now());
        report.record(Outcome::Skipped(Skip {
            symbol: "A.NS".into(),
            cause: SkipCause::Fetch {
                detail: "timed out".into(),
            },
        }));
        let notice = report.empty_notice().unwrap();
        assert!(notice.contains("fetch_error: 1"));
    }

    #[test]
    fn report_serializes_with_label_and_cause_tags() {
        let mut report = ScanReport::new(2, Utc::now());
        report.record(Outcome::Classified(analysis("A.NS", Label::Diamond)));
        report.record(Outcome::Skipped(Skip {
            symbol: "B.NS".into(),
            cause: SkipCause::InsufficientData { bars: 3 },
        }));
        report.finish();

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"Diamond\""));
        assert!(json.contains("\"InsufficientData\""));
    }

    #[test]
    fn display_rounding_stays_at_the_boundary() {
        let a = analysis("A.NS", Label::Watchlist);
        assert_eq!(format_price(a.last_close), "123.46");
        assert_eq!(format_efficiency(a.efficiency), "0.46");
        assert_eq!(format_consistency(a.consistency_pct), "65%");
        assert_eq!(format_baseline_distance(a.pct_from_baseline), "+12.2%");
        // The record itself keeps the raw values.
        assert_eq!(a.last_close, 123.456);
    }
}
