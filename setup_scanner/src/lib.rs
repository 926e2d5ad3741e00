//! Batch classifier for equity swing setups.
//!
//! The pipeline: a ticker universe ([`universe`]) is fanned out by the
//! [`coordinator`] over a bounded worker pool; each worker fetches a daily
//! bar series through a [`market_data::providers::BarProvider`] and runs the
//! deterministic [`analyzer`] formulas (yearly-VWAP baseline, consistency
//! ratio, efficiency ratio). Every ticker ends up in the [`report`] exactly
//! once, either classified or with a skip reason.

#![deny(missing_docs)]

pub mod analyzer;
pub mod config;
pub mod coordinator;
pub mod report;
pub mod universe;
