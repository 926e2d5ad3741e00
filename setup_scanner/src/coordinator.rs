//! The scan coordinator: bounded concurrent fan-out over the ticker list.
//!
//! One task per ticker performs the fetch + analysis; a semaphore bounds how
//! many are in flight (the admission-control knob protecting the upstream
//! data provider). Results are collected in completion order; callers must
//! not rely on any cross-ticker ordering. The coordinator owns the only
//! mutable progress state; workers never touch shared counters.
//!
//! A single ticker can never abort the batch: fetch errors and timeouts
//! become fetch skips, and a worker panic is caught at join and downgraded
//! to a computation skip.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use market_data::providers::BarProvider;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{debug, info, warn};

use crate::analyzer::{self, Outcome, Skip, SkipCause};
use crate::config::ScanConfig;
use crate::report::ScanReport;

/// Incremental completion count, emitted at the configured cadence.
#[derive(Debug, Clone, Copy)]
pub struct ScanProgress {
    /// Tickers completed so far (classified or skipped).
    pub completed: usize,
    /// Tickers targeted by the scan.
    pub total: usize,
}

/// Drives fetch + analysis over a full ticker list.
pub struct Scanner<P> {
    provider: Arc<P>,
    config: ScanConfig,
    progress: Option<mpsc::UnboundedSender<ScanProgress>>,
}

impl<P: BarProvider + 'static> Scanner<P> {
    /// Creates a scanner over the given provider and configuration.
    pub fn new(provider: Arc<P>, config: ScanConfig) -> Self {
        Self {
            provider,
            config,
            progress: None,
        }
    }

    /// Mirrors progress updates to `tx` in addition to the log stream.
    pub fn with_progress(mut self, tx: mpsc::UnboundedSender<ScanProgress>) -> Self {
        self.progress = Some(tx);
        self
    }

    /// Scans every ticker and returns the aggregated report.
    ///
    /// Every input ticker appears in the report exactly once, as either a
    /// classification or a skip, including tickers whose task timed out,
    /// panicked, or was aborted by the whole-scan deadline.
    pub async fn scan(&self, tickers: Vec<String>) -> ScanReport {
        let total = tickers.len();
        let mut report = ScanReport::new(total, Utc::now());

        info!(
            total,
            concurrency = self.config.concurrency,
            lookback = %self.config.analyzer.lookback,
            "starting scan"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let fetch_timeout = Duration::from_secs(self.config.fetch_timeout_secs);
        let deadline = self
            .config
            .scan_timeout_secs
            .map(|secs| Instant::now() + Duration::from_secs(secs));

        let mut tasks: JoinSet<Outcome> = JoinSet::new();
        let mut symbol_of_task: HashMap<tokio::task::Id, String> = HashMap::new();

        for symbol in tickers {
            let provider = Arc::clone(&self.provider);
            let semaphore = Arc::clone(&semaphore);
            let analyzer_cfg = self.config.analyzer.clone();
            let task_symbol = symbol.clone();
            let handle = tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return Outcome::Skipped(Skip {
                        symbol: task_symbol,
                        cause: SkipCause::Computation {
                            detail: "scan cancelled".to_string(),
                        },
                    });
                };
                fetch_and_analyze(&*provider, &task_symbol, fetch_timeout, &analyzer_cfg).await
            });
            symbol_of_task.insert(handle.id(), symbol);
        }

        let mut completed = 0usize;
        let mut deadline_hit = false;
        loop {
            let next = match (deadline, deadline_hit) {
                (Some(at), false) => match timeout_at(at, tasks.join_next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        warn!(
                            outstanding = tasks.len(),
                            "scan deadline exceeded; aborting outstanding fetches"
                        );
                        deadline_hit = true;
                        tasks.abort_all();
                        continue;
                    }
                },
                _ => tasks.join_next().await,
            };
            let Some(joined) = next else { break };

            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(join_err) => {
                    let symbol = symbol_of_task
                        .get(&join_err.id())
                        .cloned()
                        .unwrap_or_else(|| "<unknown>".to_string());
                    let cause = if join_err.is_cancelled() {
                        SkipCause::Fetch {
                            detail: "aborted by scan deadline".to_string(),
                        }
                    } else {
                        SkipCause::Computation {
                            detail: join_err.to_string(),
                        }
                    };
                    Outcome::Skipped(Skip { symbol, cause })
                }
            };

            if let Outcome::Skipped(skip) = &outcome {
                debug!(symbol = %skip.symbol, cause = %skip.cause, "ticker skipped");
            }

            completed += 1;
            if completed % self.config.progress_every == 0 || completed == total {
                info!(completed, total, "scan progress");
            }
            if let Some(tx) = &self.progress {
                let _ = tx.send(ScanProgress { completed, total });
            }

            report.record(outcome);
        }

        report.finish();
        info!(
            classified = report.succeeded(),
            skipped = report.skips.len(),
            duration_secs = report.duration_secs,
            "scan complete"
        );
        report
    }
}

/// One worker's unit of work: bounded fetch, then the pure analysis.
async fn fetch_and_analyze<P: BarProvider + ?Sized>(
    provider: &P,
    symbol: &str,
    fetch_timeout: Duration,
    cfg: &crate::config::AnalyzerConfig,
) -> Outcome {
    let fetched = timeout(fetch_timeout, provider.fetch_daily_bars(symbol, cfg.lookback)).await;
    match fetched {
        Err(_) => Outcome::Skipped(Skip {
            symbol: symbol.to_string(),
            cause: SkipCause::Fetch {
                detail: format!("timed out after {}s", fetch_timeout.as_secs()),
            },
        }),
        Ok(Err(err)) => Outcome::Skipped(Skip {
            symbol: symbol.to_string(),
            cause: SkipCause::Fetch {
                detail: err.to_string(),
            },
        }),
        Ok(Ok(series)) => {
            if !series.is_chronological() {
                return Outcome::Skipped(Skip {
                    symbol: symbol.to_string(),
                    cause: SkipCause::Computation {
                        detail: "bars are not in chronological order".to_string(),
                    },
                });
            }
            analyzer::analyze(symbol, &series.bars, cfg)
        }
    }
}
