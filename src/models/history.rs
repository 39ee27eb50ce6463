// Persisted history rows (system_history table)

use serde::{Deserialize, Serialize};

use super::StatsSnapshot;

/// Row as stored and returned by GET /api/history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: i64,
    /// Milliseconds since the Unix epoch, assigned by the store on insert.
    pub timestamp: i64,
    pub cpu: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
    pub net_up: f64,
    pub net_down: f64,
}

/// Row to insert. `timestamp: None` lets the store assign it.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHistoryRecord {
    pub timestamp: Option<i64>,
    pub cpu: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
    pub net_up: f64,
    pub net_down: f64,
}

/// Lossy projection: memory breakdown, load average, uptime and OS info are not persisted.
/// The snapshot's own timestamp is dropped too, the store stamps the row.
impl From<&StatsSnapshot> for NewHistoryRecord {
    fn from(s: &StatsSnapshot) -> Self {
        Self {
            timestamp: None,
            cpu: s.cpu_percent,
            memory_percent: s.memory_percent,
            disk_percent: s.disk_percent,
            net_up: s.net_up_kbps,
            net_down: s.net_down_kbps,
        }
    }
}
