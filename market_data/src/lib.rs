//! Market data retrieval for the setup scanner.
//!
//! This crate owns the canonical OHLCV models ([`models::bar::Bar`],
//! [`models::bar_series::BarSeries`]) and the [`providers::BarProvider`]
//! trait, the seam between the scan pipeline and any concrete market data
//! vendor. The bundled [`providers::yahoo_chart`] implementation talks to the
//! Yahoo Finance chart endpoint.

pub mod models;
pub mod providers;
