use std::time::Duration;

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::{Client, header};
use shared_utils::env::env_var_or;

use crate::{
    models::{bar_series::BarSeries, lookback::Lookback},
    providers::{
        BarProvider, ProviderError,
        yahoo_chart::response::{ChartEnvelope, flatten_bars},
    },
};

const BASE_URL: &str = "https://query1.finance.yahoo.com";

/// The endpoint rejects requests without a browser-like user agent.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Requests per second against the chart endpoint, independent of how many
/// scan workers are in flight. The upstream bans aggressive clients.
const REQUESTS_PER_SECOND: std::num::NonZeroU32 = nonzero!(10u32);

/// Daily-bar provider backed by the Yahoo Finance chart endpoint.
pub struct YahooChartProvider {
    client: Client,
    base_url: String,
    limiter: DefaultDirectRateLimiter,
}

impl YahooChartProvider {
    /// Creates a new provider with a shared HTTP client.
    ///
    /// The base URL can be overridden via the `BARS_BASE_URL` environment
    /// variable, which offline tests use to point at a local stub.
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_base_url(env_var_or("BARS_BASE_URL", BASE_URL))
    }

    /// Creates a provider against an explicit base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::USER_AGENT, header::HeaderValue::from_static(USER_AGENT));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            limiter: RateLimiter::direct(Quota::per_second(REQUESTS_PER_SECOND)),
        })
    }
}

#[async_trait]
impl BarProvider for YahooChartProvider {
    async fn fetch_daily_bars(
        &self,
        symbol: &str,
        lookback: Lookback,
    ) -> Result<BarSeries, ProviderError> {
        self.limiter.until_ready().await;

        let url = format!("{}/v8/finance/chart/{symbol}", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("range", lookback.range_param()), ("interval", "1d")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unreadable error body".to_string());
            return Err(ProviderError::Api(format!("{symbol}: HTTP {status}: {body}")));
        }

        let envelope = response.json::<ChartEnvelope>().await?;

        if let Some(err) = envelope.chart.error {
            return Err(ProviderError::Api(format!(
                "{symbol}: {}: {}",
                err.code, err.description
            )));
        }

        let result = envelope
            .chart
            .result
            .and_then(|mut rs| if rs.is_empty() { None } else { Some(rs.remove(0)) })
            .ok_or_else(|| ProviderError::Empty {
                symbol: symbol.to_string(),
            })?;

        let bars = flatten_bars(symbol, &result)?;
        if bars.is_empty() {
            return Err(ProviderError::Empty {
                symbol: symbol.to_string(),
            });
        }

        Ok(BarSeries {
            symbol: symbol.to_string(),
            lookback,
            bars,
        })
    }
}
