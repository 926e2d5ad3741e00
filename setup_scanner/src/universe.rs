//! Ticker universe acquisition.
//!
//! Pulls the exchange's official equity list CSV, keeps equity-series rows
//! only, and maps symbols to their data-provider form (`SYMBOL.NS`). Any
//! fetch or parse failure degrades to the configured fallback list of liquid
//! large-caps with a warning, so the scanner stays usable offline.

use std::time::Duration;

use reqwest::{Client, header};
use shared_utils::env::env_var_or;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::UniverseConfig;

const EQUITY_LIST_URL: &str = "https://nsearchives.nseindia.com/content/equities/EQUITY_L.csv";

/// The list endpoint rejects requests without a browser-like user agent.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors raised while fetching or parsing the remote equity list.
///
/// These never escape [`UniverseSource::load`]; they are logged and the
/// fallback list is used instead.
#[derive(Debug, Error)]
pub enum UniverseError {
    /// The HTTP request failed.
    #[error("equity list request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The CSV payload could not be parsed.
    #[error("equity list parse failed: {0}")]
    Parse(#[from] csv::Error),

    /// A required column is missing even after header normalization.
    #[error("equity list is missing the {0} column")]
    MissingColumn(&'static str),
}

/// Supplies the ordered ticker universe for one scan.
pub struct UniverseSource {
    client: Client,
    list_url: String,
    top_n: Option<usize>,
    fallback: Vec<String>,
}

impl UniverseSource {
    /// Builds a source from the universe section of the scan config.
    ///
    /// URL precedence: explicit config override, then the
    /// `EQUITY_LIST_URL` environment variable, then the exchange default.
    pub fn new(cfg: &UniverseConfig) -> Result<Self, UniverseError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::USER_AGENT, header::HeaderValue::from_static(USER_AGENT));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            list_url: cfg
                .list_url
                .clone()
                .unwrap_or_else(|| env_var_or("EQUITY_LIST_URL", EQUITY_LIST_URL)),
            top_n: cfg.top_n,
            fallback: cfg.fallback.clone(),
        })
    }

    /// Loads the universe, degraded to the fallback list on any failure.
    ///
    /// Applies the configured top-N slice after loading. Never fails: the
    /// degraded path is a warning, not an error.
    pub async fn load(&self) -> Vec<String> {
        let mut tickers = match self.fetch_remote().await {
            Ok(tickers) if !tickers.is_empty() => {
                info!(count = tickers.len(), "loaded equity universe");
                tickers
            }
            Ok(_) => {
                warn!("equity list was empty; using fallback universe");
                self.fallback.clone()
            }
            Err(err) => {
                warn!(error = %err, "equity list unavailable; using fallback universe");
                self.fallback.clone()
            }
        };
        if let Some(n) = self.top_n {
            tickers.truncate(n);
        }
        tickers
    }

    async fn fetch_remote(&self) -> Result<Vec<String>, UniverseError> {
        let text = self
            .client
            .get(&self.list_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_equity_csv(&text)
    }
}

/// Parses the equity-list CSV into provider-form tickers.
///
/// Header names are trimmed before lookup (the published file carries stray
/// whitespace), rows are filtered to `SERIES == "EQ"`, and each symbol gets
/// the `.NS` suffix.
fn parse_equity_csv(text: &str) -> Result<Vec<String>, UniverseError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let symbol_idx = headers
        .iter()
        .position(|h| h.trim() == "SYMBOL")
        .ok_or(UniverseError::MissingColumn("SYMBOL"))?;
    let series_idx = headers
        .iter()
        .position(|h| h.trim() == "SERIES")
        .ok_or(UniverseError::MissingColumn("SERIES"))?;

    let mut tickers = Vec::new();
    for record in reader.records() {
        let record = record?;
        let series = record.get(series_idx).map(str::trim);
        let symbol = record.get(symbol_idx).map(str::trim);
        if let (Some("EQ"), Some(symbol)) = (series, symbol)
            && !symbol.is_empty()
        {
            tickers.push(format!("{symbol}.NS"));
        }
    }
    Ok(tickers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_to_equity_series_and_suffixes_symbols() {
        let csv = "SYMBOL,NAME OF COMPANY,SERIES\n\
                   RELIANCE,Reliance Industries,EQ\n\
                   SOMEBOND,Some Bond,GB\n\
                   INFY,Infosys,EQ\n";
        let tickers = parse_equity_csv(csv).unwrap();
        assert_eq!(tickers, vec!["RELIANCE.NS", "INFY.NS"]);
    }

    #[test]
    fn tolerates_whitespace_in_headers_and_fields() {
        let csv = " SYMBOL , NAME OF COMPANY , SERIES \n\
                   RELIANCE , Reliance Industries , EQ \n";
        let tickers = parse_equity_csv(csv).unwrap();
        assert_eq!(tickers, vec!["RELIANCE.NS"]);
    }

    #[test]
    fn missing_series_column_is_an_error() {
        let csv = "SYMBOL,NAME OF COMPANY\nRELIANCE,Reliance Industries\n";
        let err = parse_equity_csv(csv).unwrap_err();
        assert!(matches!(err, UniverseError::MissingColumn("SERIES")));
    }

    #[tokio::test]
    async fn unreachable_list_degrades_to_fallback() {
        let cfg = UniverseConfig {
            list_url: Some("http://127.0.0.1:1/equity.csv".to_string()),
            top_n: Some(3),
            fallback: vec![
                "RELIANCE.NS".into(),
                "HDFCBANK.NS".into(),
                "INFY.NS".into(),
                "TCS.NS".into(),
            ],
        };
        let source = UniverseSource::new(&cfg).unwrap();
        let tickers = source.load().await;
        // Fallback applied, then the top-N slice.
        assert_eq!(tickers, vec!["RELIANCE.NS", "HDFCBANK.NS", "INFY.NS"]);
    }
}
