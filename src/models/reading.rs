// Raw point-in-time readings returned by a HostMetricsReader

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryReading {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub cached_bytes: u64,
}

impl MemoryReading {
    pub fn usage_percent(&self) -> f64 {
        if self.total_bytes > 0 {
            (self.used_bytes as f64 / self.total_bytes as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Cumulative byte counters summed over all interfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NetworkCounters {
    pub recv_bytes: u64,
    pub sent_bytes: u64,
}

/// 1/5/15 minute load. All zeros where the host does not report it, which is
/// indistinguishable from a genuinely idle host.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

impl From<[f64; 3]> for LoadAverage {
    fn from([one, five, fifteen]: [f64; 3]) -> Self {
        Self { one, five, fifteen }
    }
}

impl From<LoadAverage> for [f64; 3] {
    fn from(l: LoadAverage) -> Self {
        [l.one, l.five, l.fifteen]
    }
}
