//! Scan configuration: TOML parsing, presets, and validation.
//!
//! The upstream scanner existed as several near-duplicate variants that
//! differed only in thresholds and window lengths. Those variants collapse
//! here into one [`ScanConfig`] plus two named presets:
//! - [`ScanConfig::strict`]: 1y history, 50-bar minimum, 50-lakh turnover
//!   floor, no diagnostic labels.
//! - [`ScanConfig::relaxed`]: 6mo history, 20-bar minimum, 25-lakh turnover
//!   floor, trending diagnostic enabled.
//!
//! Entrypoints:
//! - Parse + validate from a TOML string: [`load_config_str`]
//! - Parse + validate from a file path: [`load_config_path`]

use anyhow::{Context, bail};
use market_data::models::lookback::Lookback;
use serde::{Deserialize, Serialize};
use toml::from_str;

/// Top-level configuration for one scan run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScanConfig {
    /// Where the ticker universe comes from and how much of it to scan.
    #[serde(default)]
    pub universe: UniverseConfig,

    /// Maximum number of tickers fetched concurrently.
    ///
    /// This is the admission-control knob protecting the upstream data
    /// provider: observed presets are 8 (safe), 20 (fast), 50 (turbo).
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Log a progress line every N completed tickers.
    #[serde(default = "default_progress_every")]
    pub progress_every: usize,

    /// Per-ticker fetch timeout in seconds; a hung upstream call must not
    /// stall the batch.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Optional whole-scan deadline in seconds. `None` means no deadline.
    #[serde(default)]
    pub scan_timeout_secs: Option<u64>,

    /// The per-ticker analytical thresholds.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
}

/// Universe acquisition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UniverseConfig {
    /// Override for the exchange equity-list CSV URL.
    #[serde(default)]
    pub list_url: Option<String>,

    /// Scan only the first N tickers of the list; `None` scans the full
    /// universe.
    #[serde(default)]
    pub top_n: Option<usize>,

    /// Liquid large-caps used when the remote list cannot be fetched.
    #[serde(default = "default_fallback")]
    pub fallback: Vec<String>,
}

/// Thresholds and windows for the per-ticker analysis pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalyzerConfig {
    /// Trailing history window to fetch per ticker.
    pub lookback: Lookback,

    /// Minimum number of daily bars required to analyze at all.
    pub min_bars: usize,

    /// Minimum notional turnover (5-session average volume × last close),
    /// in currency units. Observed values range from 10 to 50 lakh.
    pub turnover_floor: f64,

    /// Minimum last close; prices below this are penny-stock territory.
    pub price_floor: f64,

    /// Minimum green-session percentage for the Diamond label.
    pub diamond_consistency: u8,

    /// Minimum efficiency ratio for the Diamond label.
    pub diamond_efficiency: f64,

    /// Minimum green-session percentage for the Watchlist label.
    pub watchlist_consistency: u8,

    /// Emit the Trending diagnostic label for tickers above baseline that
    /// fail both consistency gates. A pipeline-health view, not a signal.
    pub include_trending: bool,
}

fn default_concurrency() -> usize {
    8
}

fn default_progress_every() -> usize {
    10
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_fallback() -> Vec<String> {
    [
        "RELIANCE.NS",
        "HDFCBANK.NS",
        "INFY.NS",
        "TCS.NS",
        "ITC.NS",
        "SBIN.NS",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            list_url: None,
            top_n: Some(50),
            fallback: default_fallback(),
        }
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self::strict()
    }
}

impl AnalyzerConfig {
    /// The strict variant: full-year history and the tightest filters.
    pub fn strict() -> Self {
        Self {
            lookback: Lookback::OneYear,
            min_bars: 50,
            turnover_floor: 5_000_000.0,
            price_floor: 10.0,
            diamond_consistency: 60,
            diamond_efficiency: 0.30,
            watchlist_consistency: 50,
            include_trending: false,
        }
    }

    /// The relaxed variant: shorter history, looser liquidity floor, and the
    /// trending diagnostic enabled.
    pub fn relaxed() -> Self {
        Self {
            lookback: Lookback::SixMonths,
            min_bars: 20,
            turnover_floor: 2_500_000.0,
            price_floor: 10.0,
            diamond_consistency: 60,
            diamond_efficiency: 0.30,
            watchlist_consistency: 50,
            include_trending: true,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::strict()
    }
}

impl ScanConfig {
    /// Strict preset over the default universe slice.
    pub fn strict() -> Self {
        Self {
            universe: UniverseConfig::default(),
            concurrency: default_concurrency(),
            progress_every: default_progress_every(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            scan_timeout_secs: None,
            analyzer: AnalyzerConfig::strict(),
        }
    }

    /// Relaxed preset over the default universe slice.
    pub fn relaxed() -> Self {
        Self {
            analyzer: AnalyzerConfig::relaxed(),
            ..Self::strict()
        }
    }

    /// Rejects parameter combinations the pipeline cannot run with.
    ///
    /// Errors:
    /// - zero concurrency or progress cadence, zero fetch timeout
    /// - too few minimum bars for the trailing windows, or more than the
    ///   lookback window can return
    /// - non-positive or non-finite liquidity/price floors
    /// - consistency percentages above 100
    /// - Diamond gates looser than Watchlist gates
    /// - efficiency threshold outside (0, 1]
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.concurrency == 0 {
            bail!("concurrency must be at least 1");
        }
        if self.progress_every == 0 {
            bail!("progress_every must be at least 1");
        }
        if self.fetch_timeout_secs == 0 {
            bail!("fetch_timeout_secs must be at least 1");
        }
        if self.universe.top_n == Some(0) {
            bail!("universe.top_n must be at least 1 when set");
        }

        let a = &self.analyzer;
        if a.min_bars < 6 {
            bail!("analyzer.min_bars must be at least 6 (trailing 5-session volume window)");
        }
        if a.min_bars > a.lookback.approx_sessions() {
            bail!(
                "analyzer.min_bars exceeds the ~{} sessions a {} lookback can return",
                a.lookback.approx_sessions(),
                a.lookback
            );
        }
        if !(a.turnover_floor.is_finite() && a.turnover_floor > 0.0) {
            bail!("analyzer.turnover_floor must be positive");
        }
        if !(a.price_floor.is_finite() && a.price_floor > 0.0) {
            bail!("analyzer.price_floor must be positive");
        }
        if a.diamond_consistency > 100 || a.watchlist_consistency > 100 {
            bail!("consistency thresholds are percentages in [0, 100]");
        }
        if a.diamond_consistency < a.watchlist_consistency {
            bail!("diamond_consistency must not be looser than watchlist_consistency");
        }
        if !(a.diamond_efficiency > 0.0 && a.diamond_efficiency <= 1.0) {
            bail!("diamond_efficiency must lie in (0, 1]");
        }
        Ok(())
    }
}

/// Parse and validate a scan configuration from a TOML string.
pub fn load_config_str(toml_str: &str) -> anyhow::Result<ScanConfig> {
    let cfg: ScanConfig = from_str(toml_str).context("failed to parse scan config TOML")?;
    cfg.validate().context("invalid scan config")?;
    Ok(cfg)
}

/// Read a scan configuration TOML file from disk, parse, and validate it.
pub fn load_config_path(path: impl AsRef<std::path::Path>) -> anyhow::Result<ScanConfig> {
    let text = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("read config file {}", path.as_ref().display()))?;
    load_config_str(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_validate() {
        ScanConfig::strict().validate().unwrap();
        ScanConfig::relaxed().validate().unwrap();
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let cfg = load_config_str(
            r#"
            concurrency = 20

            [universe]
            top_n = 500

            [analyzer]
            lookback = "six_months"
            min_bars = 20
            turnover_floor = 1000000.0
            price_floor = 20.0
            diamond_consistency = 60
            diamond_efficiency = 0.25
            watchlist_consistency = 50
            include_trending = true
            "#,
        )
        .unwrap();

        assert_eq!(cfg.concurrency, 20);
        assert_eq!(cfg.universe.top_n, Some(500));
        assert_eq!(cfg.progress_every, 10);
        assert_eq!(cfg.analyzer.lookback, Lookback::SixMonths);
        assert_eq!(cfg.analyzer.price_floor, 20.0);
        assert!(cfg.analyzer.include_trending);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = load_config_str("threads = 50").unwrap_err();
        assert!(err.to_string().contains("parse scan config"));
    }

    #[test]
    fn inverted_consistency_gates_are_rejected() {
        let mut cfg = ScanConfig::strict();
        cfg.analyzer.diamond_consistency = 40;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("diamond_consistency"));
    }

    #[test]
    fn min_bars_beyond_the_lookback_window_is_rejected() {
        let mut cfg = ScanConfig::relaxed();
        cfg.analyzer.min_bars = 200;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("6mo"));
    }

    #[test]
    fn zero_knobs_are_rejected() {
        let mut cfg = ScanConfig::strict();
        cfg.concurrency = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = ScanConfig::strict();
        cfg.progress_every = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = ScanConfig::strict();
        cfg.analyzer.turnover_floor = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = ScanConfig::strict();
        cfg.analyzer.diamond_efficiency = 0.0;
        assert!(cfg.validate().is_err());
    }
}
