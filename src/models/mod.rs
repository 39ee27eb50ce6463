// Domain models: live snapshot, host readings, persisted history rows

mod history;
mod reading;
mod snapshot;

pub use history::{HistoryRecord, NewHistoryRecord};
pub use reading::{LoadAverage, MemoryReading, NetworkCounters};
pub use snapshot::StatsSnapshot;

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Bytes to GiB, rounded to two decimals for display.
pub fn bytes_to_gib(bytes: u64) -> f64 {
    ((bytes as f64 / BYTES_PER_GIB) * 100.0).round() / 100.0
}
