// Shared test helpers: scripted host reader and throwaway history stores

#![allow(dead_code)]

use chrono::{DateTime, TimeDelta, Utc};
use homestats::error::StatsError;
use homestats::history_repo::HistoryRepo;
use homestats::models::{LoadAverage, MemoryReading, NetworkCounters};
use homestats::sysinfo_repo::HostMetricsReader;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tempfile::TempDir;

pub const GIB: u64 = 1024 * 1024 * 1024;

/// Reader with fixed readings, adjustable network counters and a failure switch.
pub struct FakeReader {
    pub cpu: f64,
    pub boot_time: DateTime<Utc>,
    recv: AtomicU64,
    sent: AtomicU64,
    step: AtomicU64,
    failing: AtomicBool,
}

impl FakeReader {
    pub fn new() -> Self {
        Self {
            cpu: 25.0,
            boot_time: Utc::now() - TimeDelta::hours(2),
            recv: AtomicU64::new(0),
            sent: AtomicU64::new(0),
            step: AtomicU64::new(0),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_counters(&self, recv: u64, sent: u64) {
        self.recv.store(recv, Ordering::SeqCst);
        self.sent.store(sent, Ordering::SeqCst);
    }

    /// Every counter read first adds `step` bytes to both directions.
    pub fn set_counter_step(&self, step: u64) {
        self.step.store(step, Ordering::SeqCst);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl HostMetricsReader for FakeReader {
    fn cpu_percent(&self) -> Result<f64, StatsError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StatsError::unavailable("cpu", "scripted failure"));
        }
        Ok(self.cpu)
    }

    fn memory(&self) -> Result<MemoryReading, StatsError> {
        Ok(MemoryReading {
            total_bytes: 8 * GIB,
            used_bytes: 2 * GIB,
            cached_bytes: GIB,
        })
    }

    fn disk_percent(&self) -> Result<f64, StatsError> {
        Ok(60.0)
    }

    fn network_counters(&self) -> Result<NetworkCounters, StatsError> {
        let step = self.step.load(Ordering::SeqCst);
        Ok(NetworkCounters {
            recv_bytes: self.recv.fetch_add(step, Ordering::SeqCst) + step,
            sent_bytes: self.sent.fetch_add(step, Ordering::SeqCst) + step,
        })
    }

    fn boot_time(&self) -> Result<DateTime<Utc>, StatsError> {
        Ok(self.boot_time)
    }

    fn load_average(&self) -> Result<LoadAverage, StatsError> {
        Ok(LoadAverage {
            one: 0.5,
            five: 0.25,
            fifteen: 0.125,
        })
    }

    fn os_info(&self) -> String {
        "TestOS 1.0".into()
    }
}

/// Fresh initialized store in a temp dir; keep the TempDir alive for the test.
pub async fn temp_repo() -> (TempDir, Arc<HistoryRepo>) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.db");
    let repo = HistoryRepo::connect(path.to_str().unwrap(), 4)
        .await
        .unwrap();
    repo.init().await.unwrap();
    (dir, Arc::new(repo))
}
