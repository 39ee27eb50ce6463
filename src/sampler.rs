// Background sampler: every interval build a snapshot, project it and append to history.
// A failed tick is logged and dropped; the timer keeps running. Missed ticks are skipped.

use crate::error::StatsError;
use crate::history_repo::HistoryRepo;
use crate::models::{HistoryRecord, NewHistoryRecord};
use crate::snapshot_builder::SnapshotBuilder;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use tokio::sync::oneshot;
use tokio::time::{Duration, Instant, interval_at, timeout};
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    Idle,
    Sampling,
}

impl SamplerState {
    fn from_u8(v: u8) -> Self {
        if v == 1 { Self::Sampling } else { Self::Idle }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Sampling => 1,
        }
    }
}

/// Shared between the sampler task and its handle.
#[derive(Debug, Default)]
pub struct SamplerStats {
    state: AtomicU8,
    samples_saved_total: AtomicU64,
    ticks_failed_total: AtomicU64,
}

impl SamplerStats {
    pub fn state(&self) -> SamplerState {
        SamplerState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn samples_saved_total(&self) -> u64 {
        self.samples_saved_total.load(Ordering::Relaxed)
    }

    pub fn ticks_failed_total(&self) -> u64 {
        self.ticks_failed_total.load(Ordering::Relaxed)
    }

    fn set_state(&self, state: SamplerState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }
}

pub struct SamplerDeps {
    pub builder: Arc<SnapshotBuilder>,
    pub history_repo: Arc<HistoryRepo>,
}

pub struct SamplerConfig {
    pub interval: Duration,
    pub tick_timeout: Duration,
}

/// Owns the running sampler. `shutdown` stops it and waits for an in-flight tick;
/// dropping the handle also ends the loop at its next wake-up.
pub struct SamplerHandle {
    shutdown_tx: oneshot::Sender<()>,
    join: tokio::task::JoinHandle<()>,
    stats: Arc<SamplerStats>,
}

impl SamplerHandle {
    pub fn stats(&self) -> &Arc<SamplerStats> {
        &self.stats
    }

    pub async fn shutdown(self) {
        let SamplerHandle {
            shutdown_tx, join, ..
        } = self;
        let _ = shutdown_tx.send(());
        if let Err(e) = join.await {
            warn!(error = %e, "sampler task ended abnormally");
        }
    }
}

/// Runs one tick: snapshot -> projection -> append.
pub async fn run_one_tick(
    builder: &SnapshotBuilder,
    history_repo: &HistoryRepo,
) -> Result<HistoryRecord, StatsError> {
    let snapshot = builder.snapshot().await?;
    history_repo
        .append(&NewHistoryRecord::from(&snapshot))
        .await
}

pub fn spawn(deps: SamplerDeps, config: SamplerConfig) -> SamplerHandle {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let stats = Arc::new(SamplerStats::default());
    let join = tokio::spawn(run(deps, config, stats.clone(), shutdown_rx));
    SamplerHandle {
        shutdown_tx,
        join,
        stats,
    }
}

#[instrument(skip_all, fields(interval_secs = config.interval.as_secs()))]
async fn run(
    deps: SamplerDeps,
    config: SamplerConfig,
    stats: Arc<SamplerStats>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let SamplerDeps {
        builder,
        history_repo,
    } = deps;
    let SamplerConfig {
        interval,
        tick_timeout,
    } = config;

    // First sample one full period after start.
    let mut tick = interval_at(Instant::now() + interval, interval);
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    info!("sampler started");

    loop {
        tokio::select! {
            _ = tick.tick() => {
                stats.set_state(SamplerState::Sampling);
                let result = match timeout(tick_timeout, run_one_tick(&builder, &history_repo)).await {
                    Ok(r) => r,
                    Err(_) => Err(StatsError::TickTimeout(tick_timeout)),
                };
                match result {
                    Ok(record) => {
                        stats.samples_saved_total.fetch_add(1, Ordering::Relaxed);
                        tracing::debug!(
                            operation = "sample_tick",
                            id = record.id,
                            cpu = record.cpu,
                            "sample saved"
                        );
                    }
                    Err(e) => {
                        stats.ticks_failed_total.fetch_add(1, Ordering::Relaxed);
                        warn!(
                            error = %e,
                            operation = "sample_tick",
                            "sampling tick failed"
                        );
                    }
                }
                stats.set_state(SamplerState::Idle);
            }
            // Explicit shutdown, or the handle was dropped.
            _ = &mut shutdown_rx => break,
        }
    }
    info!(
        samples_saved_total = stats.samples_saved_total(),
        ticks_failed_total = stats.ticks_failed_total(),
        "sampler stopped"
    );
}
