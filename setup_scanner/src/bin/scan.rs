use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use market_data::providers::yahoo_chart::YahooChartProvider;
use setup_scanner::analyzer::Label;
use setup_scanner::config::{AnalyzerConfig, ScanConfig, load_config_path};
use setup_scanner::coordinator::Scanner;
use setup_scanner::report::{
    ScanReport, format_baseline_distance, format_consistency, format_efficiency, format_price,
};
use setup_scanner::universe::UniverseSource;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    /// 1y history, 50-bar minimum, 50-lakh turnover floor.
    Strict,
    /// 6mo history, 20-bar minimum, 25-lakh floor, trending diagnostic on.
    Relaxed,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Speed {
    /// 8 concurrent fetches.
    Safe,
    /// 20 concurrent fetches.
    Fast,
    /// 50 concurrent fetches.
    Turbo,
}

impl Speed {
    fn concurrency(self) -> usize {
        match self {
            Speed::Safe => 8,
            Speed::Fast => 20,
            Speed::Turbo => 50,
        }
    }
}

#[derive(Parser)]
#[command(version, about = "Swing-setup scanner over the exchange equity list")]
struct Cli {
    /// TOML config file; flags below override its values.
    #[arg(long, value_name = "FILE")]
    config: Option<String>,

    /// Threshold preset to start from when no config file is given.
    #[arg(long, value_enum, default_value = "strict")]
    preset: Preset,

    /// Concurrency preset.
    #[arg(long, value_enum)]
    speed: Option<Speed>,

    /// Scan only the first N tickers of the universe.
    #[arg(long, value_name = "N", conflicts_with = "full")]
    top: Option<usize>,

    /// Scan the entire universe instead of the default slice.
    #[arg(long)]
    full: bool,

    /// Also report the Trending diagnostic label.
    #[arg(long)]
    include_trending: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;

    let universe = UniverseSource::new(&config.universe).context("build universe source")?;
    let tickers = universe.load().await;

    let provider = Arc::new(YahooChartProvider::new().context("build bar provider")?);
    let report = Scanner::new(provider, config.clone()).scan(tickers).await;

    print_report(&report, &config.analyzer);
    Ok(())
}

fn build_config(cli: &Cli) -> Result<ScanConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config_path(path)?,
        None => match cli.preset {
            Preset::Strict => ScanConfig::strict(),
            Preset::Relaxed => ScanConfig::relaxed(),
        },
    };

    if let Some(speed) = cli.speed {
        config.concurrency = speed.concurrency();
    }
    if cli.full {
        config.universe.top_n = None;
    } else if let Some(n) = cli.top {
        config.universe.top_n = Some(n);
    }
    if cli.include_trending {
        config.analyzer.include_trending = true;
    }

    config.validate().context("invalid scan config")?;
    Ok(config)
}

fn print_report(report: &ScanReport, analyzer: &AnalyzerConfig) {
    println!("{}", report.summary());
    println!();

    if let Some(notice) = report.empty_notice() {
        println!("{notice}");
        return;
    }

    let mut labels = vec![Label::Diamond, Label::Watchlist];
    if analyzer.include_trending {
        labels.push(Label::Trending);
    }

    for label in labels {
        let rows = report.by_label(label);
        println!("{label} ({})", rows.len());
        for a in rows {
            println!(
                "  {:<14} close {:>9}  baseline {:>9} ({:>6})  consistency {:>4}  efficiency {}",
                a.symbol,
                format_price(a.last_close),
                format_price(a.baseline),
                format_baseline_distance(a.pct_from_baseline),
                format_consistency(a.consistency_pct),
                format_efficiency(a.efficiency),
            );
        }
        println!();
    }

    if !report.skips.is_empty() {
        println!("skips:");
        for (code, count) in report.skip_breakdown() {
            println!("  {code:<18} {count}");
        }
    }
}
