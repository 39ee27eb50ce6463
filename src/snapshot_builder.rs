// Composes a StatsSnapshot from one round of host readings plus the shared rate tracker.

use chrono::{DateTime, Local, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use crate::error::StatsError;
use crate::models::{LoadAverage, MemoryReading, StatsSnapshot, bytes_to_gib};
use crate::rate_tracker::{RateTracker, Throughput};
use crate::sysinfo_repo::HostMetricsReader;

struct HostReadings {
    cpu_percent: f64,
    memory: MemoryReading,
    disk_percent: f64,
    boot_time: DateTime<Utc>,
    load_avg: LoadAverage,
}

fn read_host(reader: &dyn HostMetricsReader) -> Result<HostReadings, StatsError> {
    Ok(HostReadings {
        cpu_percent: reader.cpu_percent()?,
        memory: reader.memory()?,
        disk_percent: reader.disk_percent()?,
        boot_time: reader.boot_time()?,
        load_avg: reader.load_average()?,
    })
}

fn assemble(
    reader: &dyn HostMetricsReader,
    readings: HostReadings,
    throughput: Throughput,
    now: DateTime<Utc>,
) -> StatsSnapshot {
    let HostReadings {
        cpu_percent,
        memory,
        disk_percent,
        boot_time,
        load_avg,
    } = readings;
    let uptime = (now - boot_time).to_std().unwrap_or(Duration::ZERO);

    StatsSnapshot {
        timestamp: now.timestamp_millis(),
        cpu_percent,
        memory_percent: memory.usage_percent(),
        memory_used_gb: bytes_to_gib(memory.used_bytes),
        memory_total_gb: bytes_to_gib(memory.total_bytes),
        memory_cached_gb: bytes_to_gib(memory.cached_bytes),
        disk_percent,
        load_avg,
        net_up_kbps: throughput.up_kbps,
        net_down_kbps: throughput.down_kbps,
        uptime,
        boot_time: boot_time
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        os_info: reader.os_info(),
    }
}

/// One call per metric family, one tracker observation at `now`. Any reader
/// failure aborts the whole snapshot; nothing partial is returned.
pub fn build(
    reader: &dyn HostMetricsReader,
    tracker: &RateTracker,
    now: DateTime<Utc>,
) -> Result<StatsSnapshot, StatsError> {
    let readings = read_host(reader)?;
    let counters = reader.network_counters()?;
    let throughput = tracker.observe(counters.recv_bytes, counters.sent_bytes, now);
    Ok(assemble(reader, readings, throughput, now))
}

/// Like `build`, but the counters and the snapshot instant are taken inside the
/// tracker lock. Used when several callers share one tracker.
pub fn build_now(
    reader: &dyn HostMetricsReader,
    tracker: &RateTracker,
) -> Result<StatsSnapshot, StatsError> {
    let readings = read_host(reader)?;
    let throughput = tracker.observe_with(|| reader.network_counters())?;
    Ok(assemble(reader, readings, throughput, throughput.observed_at))
}

/// Owns the reader and the process-wide rate tracker. Shared (via Arc) by the
/// sampler and the query service so both advance the same baseline.
pub struct SnapshotBuilder {
    reader: Arc<dyn HostMetricsReader>,
    tracker: Arc<RateTracker>,
}

impl SnapshotBuilder {
    pub fn new(reader: Arc<dyn HostMetricsReader>, tracker: Arc<RateTracker>) -> Self {
        Self { reader, tracker }
    }

    /// Builder whose tracker is seeded from one throwaway reading of `reader`.
    pub fn seeded(reader: Arc<dyn HostMetricsReader>) -> Result<Self, StatsError> {
        let tracker = Arc::new(RateTracker::seeded(reader.as_ref())?);
        Ok(Self::new(reader, tracker))
    }

    pub fn tracker(&self) -> &Arc<RateTracker> {
        &self.tracker
    }

    /// Builds a snapshot on the blocking pool (reader calls may sleep briefly).
    #[instrument(skip(self), fields(operation = "build_snapshot"))]
    pub async fn snapshot(&self) -> Result<StatsSnapshot, StatsError> {
        let reader = self.reader.clone();
        let tracker = self.tracker.clone();
        tokio::task::spawn_blocking(move || build_now(reader.as_ref(), &tracker))
            .await
            .map_err(|e| StatsError::unavailable("snapshot", format!("task join: {}", e)))?
    }
}
