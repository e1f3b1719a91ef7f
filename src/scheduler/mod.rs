use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{Local, NaiveDateTime, NaiveTime};
use log::{error, info, warn};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

use crate::config::{AppConfig, SchedulePolicy};
use crate::domain::CycleSummary;
use crate::services::CycleService;

/// Compute the delay until the next cycle for a policy, from `now`
///
/// Interval policy is a fixed delay. Daily policy targets the next
/// occurrence of the configured wall-clock time, rolling over to tomorrow
/// when today's occurrence has already passed.
pub fn next_cycle_delay(policy: &SchedulePolicy, now: NaiveDateTime) -> Duration {
    match policy {
        SchedulePolicy::Interval { seconds } => Duration::from_secs(*seconds),
        SchedulePolicy::Daily { time } => delay_until_daily(*time, now),
    }
}

fn delay_until_daily(time: f64, now: NaiveDateTime) -> Duration {
    let hours = time.trunc() as u32;
    let minutes = ((time - time.trunc()) * 60.0) as u32;
    let target_time = NaiveTime::from_hms_opt(hours, minutes, 0).unwrap_or(NaiveTime::MIN);

    let mut target = now.date().and_time(target_time);
    if target <= now {
        target = target + chrono::Duration::days(1);
    }

    let delay = (target - now).num_seconds().max(0) as u64;
    Duration::from_secs(delay)
}

/// Drives the aggregate-and-publish loop for the life of the process
///
/// Owns its pending task and in-flight guard; at most one cycle runs at a
/// time, and the next delay is only computed after the current cycle
/// completes. Stopping cancels a pending timer but lets an in-flight cycle
/// run to completion.
pub struct Scheduler {
    config_path: PathBuf,
    handle: Option<(JoinHandle<()>, watch::Sender<bool>)>,
    cycle_guard: Arc<Mutex<()>>,
}

impl Scheduler {
    pub fn new(config_path: PathBuf) -> Self {
        Self {
            config_path,
            handle: None,
            cycle_guard: Arc::new(Mutex::new(())),
        }
    }

    /// Arm the timer loop; a no-op when already running or disabled
    pub fn start(&mut self, config: &AppConfig) {
        if self.handle.is_some() {
            return;
        }
        if !config.schedule.enabled {
            info!("Schedule disabled, no timer armed");
            return;
        }

        let initial = next_cycle_delay(&config.schedule.policy, Local::now().naive_local());
        info!("Schedule armed, next update in {}s", initial.as_secs());

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = run_loop(
            self.config_path.clone(),
            Arc::clone(&self.cycle_guard),
            shutdown_rx,
            initial,
        );
        self.handle = Some((tokio::spawn(task), shutdown_tx));
    }

    /// Cancel the pending timer so no further cycle fires
    pub fn stop(&mut self) {
        if let Some((_, shutdown_tx)) = self.handle.take() {
            let _ = shutdown_tx.send(true);
            info!("Schedule stopped");
        }
    }

    /// Re-read configuration and schedule a fresh delay from now
    pub fn reload(&mut self) -> Result<()> {
        self.stop();
        let config = AppConfig::load(&self.config_path)?;
        self.start(&config);
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Run one cycle immediately, serialized behind the same in-flight
    /// guard as scheduled cycles
    pub async fn trigger_now(&self, config: &AppConfig) -> Result<CycleSummary> {
        let _lock = self.cycle_guard.lock().await;
        CycleService::new(config.clone()).run().await
    }
}

async fn run_loop(
    config_path: PathBuf,
    cycle_guard: Arc<Mutex<()>>,
    mut shutdown: watch::Receiver<bool>,
    initial: Duration,
) {
    let mut delay = initial;

    loop {
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = shutdown.changed() => {
                info!("Pending timer cancelled");
                return;
            }
        }

        {
            let _lock = cycle_guard.lock().await;
            match load_and_run(&config_path).await {
                Ok(summary) => info!("Scheduled update complete: {summary}"),
                // A failed cycle never stops the loop
                Err(e) => error!("Scheduled update failed: {e:#}"),
            }
        }

        if *shutdown.borrow() {
            return;
        }

        // Configuration may have changed between cycles; recompute fresh
        delay = match AppConfig::load(&config_path) {
            Ok(config) if config.schedule.enabled => {
                next_cycle_delay(&config.schedule.policy, Local::now().naive_local())
            }
            Ok(_) => {
                info!("Schedule disabled, stopping loop");
                return;
            }
            Err(e) => {
                warn!("Failed to reload config, keeping previous delay: {e:#}");
                delay
            }
        };
        info!("Next update in {}s", delay.as_secs());
    }
}

async fn load_and_run(config_path: &Path) -> Result<CycleSummary> {
    let config = AppConfig::load(config_path)?;
    CycleService::new(config).run().await
}
