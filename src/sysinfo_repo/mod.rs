// Host readings via sysinfo

mod linux;

use crate::error::StatsError;
use crate::models::{LoadAverage, MemoryReading, NetworkCounters};
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;
use sysinfo::{Disks, Networks, System};
use tracing::instrument;

/// Point-in-time OS readings. Calls may block briefly (local OS queries); async
/// callers run them on the blocking pool.
pub trait HostMetricsReader: Send + Sync {
    fn cpu_percent(&self) -> Result<f64, StatsError>;
    fn memory(&self) -> Result<MemoryReading, StatsError>;
    fn disk_percent(&self) -> Result<f64, StatsError>;
    fn network_counters(&self) -> Result<NetworkCounters, StatsError>;
    fn boot_time(&self) -> Result<DateTime<Utc>, StatsError>;
    fn load_average(&self) -> Result<LoadAverage, StatsError>;
    fn os_info(&self) -> String;
}

pub struct SysinfoRepo {
    sys: Mutex<System>,
    disks: Mutex<Disks>,
    networks: Mutex<Networks>,
    last_cpu_refresh: Mutex<Instant>,
    os_info: String,
}

impl Default for SysinfoRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoRepo {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_usage();
        sys.refresh_memory();
        let disks = Disks::new_with_refreshed_list();
        let networks = Networks::new_with_refreshed_list();
        let os_info = linux::read_os_pretty_name_linux()
            .or_else(System::long_os_version)
            .unwrap_or_else(|| std::env::consts::OS.into());
        Self {
            sys: Mutex::new(sys),
            disks: Mutex::new(disks),
            networks: Mutex::new(networks),
            last_cpu_refresh: Mutex::new(Instant::now()),
            os_info,
        }
    }
}

fn lock<'a, T>(m: &'a Mutex<T>, metric: &'static str) -> Result<MutexGuard<'a, T>, StatsError> {
    m.lock()
        .map_err(|e| StatsError::unavailable(metric, format!("sysinfo lock poisoned: {}", e)))
}

impl HostMetricsReader for SysinfoRepo {
    #[instrument(skip(self), fields(repo = "sysinfo", operation = "cpu_percent"))]
    fn cpu_percent(&self) -> Result<f64, StatsError> {
        let mut sys = lock(&self.sys, "cpu")?;
        let mut last = lock(&self.last_cpu_refresh, "cpu")?;
        // Usage is a delta between two refreshes; too short a gap reads as 0 or 100.
        let since = last.elapsed();
        if since < sysinfo::MINIMUM_CPU_UPDATE_INTERVAL {
            std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL - since);
        }
        sys.refresh_cpu_usage();
        *last = Instant::now();
        Ok((sys.global_cpu_usage() as f64).clamp(0.0, 100.0))
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "memory"))]
    fn memory(&self) -> Result<MemoryReading, StatsError> {
        let mut sys = lock(&self.sys, "memory")?;
        sys.refresh_memory();
        let total = sys.total_memory();
        if total == 0 {
            return Err(StatsError::unavailable("memory", "total memory reported as 0"));
        }
        let used = total.saturating_sub(sys.available_memory());
        Ok(MemoryReading {
            total_bytes: total,
            used_bytes: used,
            cached_bytes: linux::read_cached_bytes_linux().unwrap_or(0),
        })
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "disk_percent"))]
    fn disk_percent(&self) -> Result<f64, StatsError> {
        let mut disks = lock(&self.disks, "disk")?;
        disks.refresh(true);
        let list = disks.list();
        // Root filesystem when present, otherwise every mounted disk summed.
        let (total, available) = match list.iter().find(|d| d.mount_point() == Path::new("/")) {
            Some(root) => (root.total_space(), root.available_space()),
            None => list.iter().fold((0u64, 0u64), |(t, a), d| {
                (t + d.total_space(), a + d.available_space())
            }),
        };
        if total == 0 {
            return Err(StatsError::unavailable("disk", "no disk with non-zero size"));
        }
        let used = total.saturating_sub(available);
        Ok((used as f64 / total as f64) * 100.0)
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "network_counters"))]
    fn network_counters(&self) -> Result<NetworkCounters, StatsError> {
        let mut networks = lock(&self.networks, "network")?;
        networks.refresh(true);
        let counters = networks
            .list()
            .values()
            .fold(NetworkCounters::default(), |acc, data| NetworkCounters {
                recv_bytes: acc.recv_bytes.saturating_add(data.total_received()),
                sent_bytes: acc.sent_bytes.saturating_add(data.total_transmitted()),
            });
        Ok(counters)
    }

    fn boot_time(&self) -> Result<DateTime<Utc>, StatsError> {
        let secs = System::boot_time();
        if secs == 0 {
            return Err(StatsError::unavailable("boot_time", "not reported by host"));
        }
        DateTime::from_timestamp(secs as i64, 0)
            .ok_or_else(|| StatsError::unavailable("boot_time", format!("out of range: {}", secs)))
    }

    fn load_average(&self) -> Result<LoadAverage, StatsError> {
        // sysinfo reports zeros on platforms without a load average.
        let l = System::load_average();
        Ok(LoadAverage {
            one: l.one,
            five: l.five,
            fifteen: l.fifteen,
        })
    }

    fn os_info(&self) -> String {
        self.os_info.clone()
    }
}
