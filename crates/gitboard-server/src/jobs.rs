//! Background scheduler for the daily trending refresh.
//!
//! A single cron-triggered job: on every due tick, refresh all configured
//! categories through `TrendingService::refresh_all`. The scheduler checks
//! the cron expression on a fixed interval and fires when a scheduled time
//! falls inside the check window, so a tick delayed by a busy runtime does
//! not drop the run.

use std::time::Duration;

use chrono::{DateTime, Utc};
use croner::Cron;
use time::OffsetDateTime;
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{error, info};

use crate::config::JobsConfig;
use crate::trending::SharedTrending;

pub struct RefreshScheduler {
    trending: SharedTrending,
    cron: Cron,
    check_interval_secs: u64,
    last_run: Option<OffsetDateTime>,
}

impl RefreshScheduler {
    /// Build a scheduler from config. Fails when the cron expression does
    /// not parse; `AppConfig::validate` normally catches that earlier.
    pub fn new(trending: SharedTrending, cfg: &JobsConfig) -> Result<Self, String> {
        let cron = Cron::new(&cfg.cron)
            .parse()
            .map_err(|e| format!("invalid cron expression {:?}: {e}", cfg.cron))?;
        Ok(Self {
            trending,
            cron,
            check_interval_secs: cfg.check_interval_secs,
            last_run: None,
        })
    }

    /// Start the scheduler in a background task.
    ///
    /// Returns a shutdown sender that can be used to stop it.
    pub fn start(mut self) -> watch::Sender<bool> {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        tokio::spawn(async move {
            info!(
                check_interval_secs = self.check_interval_secs,
                "refresh scheduler started"
            );

            let mut ticker = interval(Duration::from_secs(self.check_interval_secs));

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.tick().await;
                    }
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            info!("refresh scheduler shutting down");
                            break;
                        }
                    }
                }
            }
        });

        shutdown_tx
    }

    async fn tick(&mut self) {
        let now = OffsetDateTime::now_utc();
        if !should_run(&self.cron, now, self.last_run, self.check_interval_secs) {
            return;
        }

        self.last_run = Some(now);
        info!("starting scheduled trending refresh");
        self.trending.refresh_all().await;
        info!("scheduled trending refresh finished");
    }
}

/// Whether a scheduled occurrence falls inside the current check window and
/// has not been run yet.
fn should_run(
    cron: &Cron,
    now: OffsetDateTime,
    last_run: Option<OffsetDateTime>,
    check_interval_secs: u64,
) -> bool {
    let Some(now_chrono) = DateTime::<Utc>::from_timestamp(now.unix_timestamp(), 0) else {
        error!("scheduler clock out of range");
        return false;
    };

    // Walk occurrences inside a two-window lookback and keep the most
    // recent one at or before now.
    let window = chrono::Duration::seconds(check_interval_secs as i64);
    let mut cursor = now_chrono - window * 2;
    let mut latest: Option<DateTime<Utc>> = None;
    while let Ok(next) = cron.find_next_occurrence(&cursor, false) {
        if next.timestamp() > now_chrono.timestamp() {
            break;
        }
        cursor = next;
        latest = Some(next);
    }

    let Some(prev) = latest else {
        return false;
    };

    let within_window = now_chrono.timestamp() - prev.timestamp() < window.num_seconds();
    match last_run {
        None => within_window,
        Some(last) => prev.timestamp() > last.unix_timestamp() && within_window,
    }
}
