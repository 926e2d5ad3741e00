//! Yahoo Finance chart-endpoint provider.
//!
//! Fetches `/v8/finance/chart/{symbol}` and normalizes its nested
//! parallel-array payload into flat [`crate::models::bar::Bar`] rows.

pub mod provider;
pub mod response;

pub use provider::YahooChartProvider;
