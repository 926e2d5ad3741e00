//! Loading and validating scan configs from disk.

use std::io::Write;

use market_data::models::lookback::Lookback;
use setup_scanner::config::load_config_path;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn loads_a_full_config_from_disk() {
    let file = write_config(
        r#"
        concurrency = 20
        progress_every = 25
        scan_timeout_secs = 900

        [universe]
        top_n = 200
        fallback = ["RELIANCE.NS", "TCS.NS"]

        [analyzer]
        lookback = "one_year"
        min_bars = 50
        turnover_floor = 5000000.0
        price_floor = 10.0
        diamond_consistency = 60
        diamond_efficiency = 0.30
        watchlist_consistency = 50
        include_trending = false
        "#,
    );

    let cfg = load_config_path(file.path()).unwrap();
    assert_eq!(cfg.concurrency, 20);
    assert_eq!(cfg.scan_timeout_secs, Some(900));
    assert_eq!(cfg.universe.top_n, Some(200));
    assert_eq!(cfg.universe.fallback, vec!["RELIANCE.NS", "TCS.NS"]);
    assert_eq!(cfg.analyzer.lookback, Lookback::OneYear);
}

#[test]
fn invalid_values_fail_validation_not_just_parsing() {
    let file = write_config(
        r#"
        [analyzer]
        lookback = "one_year"
        min_bars = 50
        turnover_floor = -1.0
        price_floor = 10.0
        diamond_consistency = 60
        diamond_efficiency = 0.30
        watchlist_consistency = 50
        include_trending = false
        "#,
    );

    let err = load_config_path(file.path()).unwrap_err();
    assert!(err.to_string().contains("invalid scan config"));
}

#[test]
fn missing_file_reports_the_path() {
    let err = load_config_path("/nonexistent/scan.toml").unwrap_err();
    assert!(err.to_string().contains("/nonexistent/scan.toml"));
}
