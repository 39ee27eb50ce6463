// Cumulative network counters -> instantaneous throughput.
// One tracker is shared by the sampler and live API reads; every observe() consumes
// the previous baseline, so back-to-back callers see short intervals.

use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard};

use crate::error::StatsError;
use crate::models::NetworkCounters;
use crate::sysinfo_repo::HostMetricsReader;

const BYTES_PER_KIB: f64 = 1024.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Throughput {
    pub up_kbps: f64,
    pub down_kbps: f64,
    /// A counter went backwards since the last observation; the affected rate is floored at 0.
    pub counter_reset: bool,
    /// Instant the rates were computed for.
    pub observed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
struct RateTrackerState {
    last_recv_bytes: u64,
    last_sent_bytes: u64,
    last_observed_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct RateTracker {
    state: Mutex<RateTrackerState>,
}

impl RateTracker {
    /// Tracker with an explicit baseline.
    pub fn new(baseline: NetworkCounters, observed_at: DateTime<Utc>) -> Self {
        Self {
            state: Mutex::new(RateTrackerState {
                last_recv_bytes: baseline.recv_bytes,
                last_sent_bytes: baseline.sent_bytes,
                last_observed_at: observed_at,
            }),
        }
    }

    /// Seeds the baseline with one throwaway reading so the first observe() is not a spike.
    pub fn seeded(reader: &dyn HostMetricsReader) -> Result<Self, StatsError> {
        let counters = reader.network_counters()?;
        Ok(Self::new(counters, Utc::now()))
    }

    pub fn observe(&self, recv_bytes: u64, sent_bytes: u64, now: DateTime<Utc>) -> Throughput {
        let mut state = self.lock();
        state.advance(recv_bytes, sent_bytes, now)
    }

    /// Reads the counters and the clock while holding the tracker lock, so concurrent
    /// callers are applied in the order their readings were taken. A failed read
    /// leaves the baseline untouched.
    pub fn observe_with<F>(&self, read_counters: F) -> Result<Throughput, StatsError>
    where
        F: FnOnce() -> Result<NetworkCounters, StatsError>,
    {
        let mut state = self.lock();
        let counters = read_counters()?;
        Ok(state.advance(counters.recv_bytes, counters.sent_bytes, Utc::now()))
    }

    fn lock(&self) -> MutexGuard<'_, RateTrackerState> {
        // A poisoned lock still holds three plain numbers; keep going with them.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RateTrackerState {
    fn advance(&mut self, recv_bytes: u64, sent_bytes: u64, now: DateTime<Utc>) -> Throughput {
        let delta = now - self.last_observed_at;
        let mut elapsed = match delta.num_microseconds() {
            Some(us) => us as f64 / 1_000_000.0,
            None => delta.num_milliseconds() as f64 / 1000.0,
        };
        if elapsed <= 0.0 {
            elapsed = 1.0;
        }

        let down_reset = recv_bytes < self.last_recv_bytes;
        let up_reset = sent_bytes < self.last_sent_bytes;
        let down = recv_bytes.saturating_sub(self.last_recv_bytes) as f64;
        let up = sent_bytes.saturating_sub(self.last_sent_bytes) as f64;

        // Counters always move to the latest reading; the instant never moves backwards.
        self.last_recv_bytes = recv_bytes;
        self.last_sent_bytes = sent_bytes;
        self.last_observed_at = self.last_observed_at.max(now);

        let counter_reset = down_reset || up_reset;
        if counter_reset {
            tracing::debug!(
                operation = "rate_observe",
                down_reset,
                up_reset,
                "network counter decreased; rate floored at 0"
            );
        }

        Throughput {
            up_kbps: up / elapsed / BYTES_PER_KIB,
            down_kbps: down / elapsed / BYTES_PER_KIB,
            counter_reset,
            observed_at: now,
        }
    }
}
