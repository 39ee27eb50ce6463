// Live stats snapshot (GET /api/stats)

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::LoadAverage;

/// One composed observation of every tracked metric. Built fresh per request or
/// tick and never mutated afterwards. Keys match the dashboard script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Milliseconds since the Unix epoch at which the snapshot was computed.
    pub timestamp: i64,
    #[serde(rename = "cpu")]
    pub cpu_percent: f64,
    pub memory_percent: f64,
    #[serde(rename = "memory_used")]
    pub memory_used_gb: f64,
    #[serde(rename = "memory_total")]
    pub memory_total_gb: f64,
    #[serde(rename = "memory_cached")]
    pub memory_cached_gb: f64,
    pub disk_percent: f64,
    pub load_avg: LoadAverage,
    #[serde(rename = "net_up")]
    pub net_up_kbps: f64,
    #[serde(rename = "net_down")]
    pub net_down_kbps: f64,
    #[serde(rename = "uptime_secs", with = "duration_secs")]
    pub uptime: Duration,
    /// Local boot time, `%Y-%m-%d %H:%M:%S`.
    pub boot_time: String,
    pub os_info: String,
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}
