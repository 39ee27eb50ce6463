// SnapshotBuilder tests: composition, throughput, failure propagation

mod common;

use chrono::{TimeDelta, Utc};
use common::FakeReader;
use homestats::error::StatsError;
use homestats::models::NetworkCounters;
use homestats::rate_tracker::RateTracker;
use homestats::snapshot_builder::{SnapshotBuilder, build};
use homestats::sysinfo_repo::HostMetricsReader;
use std::sync::Arc;

#[test]
fn build_composes_every_metric_family() {
    let reader = FakeReader::new();
    let t0 = Utc::now();
    let tracker = RateTracker::new(
        NetworkCounters {
            recv_bytes: 1000,
            sent_bytes: 0,
        },
        t0,
    );
    reader.set_counters(2024, 2048);
    let now = t0 + TimeDelta::seconds(1);

    let s = build(&reader, &tracker, now).unwrap();
    assert_eq!(s.timestamp, now.timestamp_millis());
    assert_eq!(s.cpu_percent, 25.0);
    assert_eq!(s.memory_percent, 25.0);
    assert_eq!(s.memory_used_gb, 2.0);
    assert_eq!(s.memory_total_gb, 8.0);
    assert_eq!(s.memory_cached_gb, 1.0);
    assert_eq!(s.disk_percent, 60.0);
    assert_eq!(s.load_avg.one, 0.5);
    assert_eq!(s.load_avg.fifteen, 0.125);
    assert!((s.net_down_kbps - 1.0).abs() < 1e-9);
    assert!((s.net_up_kbps - 2.0).abs() < 1e-9);
    assert_eq!(s.os_info, "TestOS 1.0");
    let expected_uptime = (now - reader.boot_time).num_seconds() as u64;
    assert_eq!(s.uptime.as_secs(), expected_uptime);
    assert_eq!(s.boot_time.len(), "2024-01-01 00:00:00".len());
}

#[test]
fn reader_failure_yields_no_snapshot() {
    let reader = FakeReader::new();
    reader.set_failing(true);
    let tracker = RateTracker::new(NetworkCounters::default(), Utc::now());

    let err = build(&reader, &tracker, Utc::now()).unwrap_err();
    assert!(matches!(
        err,
        StatsError::MetricsUnavailable { metric: "cpu", .. }
    ));
}

#[tokio::test]
async fn seeded_builder_starts_without_a_spike() {
    let reader = Arc::new(FakeReader::new());
    reader.set_counters(50 * 1024 * 1024 * 1024, 10 * 1024 * 1024 * 1024);
    let builder = SnapshotBuilder::seeded(reader.clone()).unwrap();

    let s = builder.snapshot().await.unwrap();
    assert_eq!(s.net_down_kbps, 0.0);
    assert_eq!(s.net_up_kbps, 0.0);
}

#[tokio::test]
async fn shared_tracker_is_advanced_by_every_caller() {
    let reader = Arc::new(FakeReader::new());
    let builder = Arc::new(SnapshotBuilder::seeded(reader.clone()).unwrap());

    reader.set_counters(1024 * 1024, 0);
    let first = builder.snapshot().await.unwrap();
    assert!(first.net_down_kbps > 0.0);

    // No new traffic: the next caller sees a zero delta against the first caller's baseline.
    let second = builder.snapshot().await.unwrap();
    assert_eq!(second.net_down_kbps, 0.0);
}

#[tokio::test]
async fn counter_reset_surfaces_zero_rate() {
    let reader = Arc::new(FakeReader::new());
    reader.set_counters(10_000_000, 10_000_000);
    let builder = SnapshotBuilder::seeded(reader.clone()).unwrap();

    reader.set_counters(5, 5);
    let s = builder.snapshot().await.unwrap();
    assert_eq!(s.net_down_kbps, 0.0);
    assert_eq!(s.net_up_kbps, 0.0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_snapshots_never_see_a_stale_counter() {
    let reader = Arc::new(FakeReader::new());
    let builder = Arc::new(SnapshotBuilder::seeded(reader.clone()).unwrap());
    reader.set_counter_step(1024);

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let builder = builder.clone();
        tasks.push(tokio::spawn(async move {
            let mut out = Vec::new();
            for _ in 0..10 {
                out.push(builder.snapshot().await.unwrap());
            }
            out
        }));
    }

    for task in tasks {
        for s in task.await.unwrap() {
            // Every read grew the counters, so a zero rate means an older reading
            // was applied after a newer one.
            assert!(s.net_down_kbps > 0.0);
            assert!(s.net_up_kbps > 0.0);
        }
    }
}

#[test]
fn concurrent_observers_account_for_every_byte() {
    let reader = Arc::new(FakeReader::new());
    let tracker = Arc::new(RateTracker::new(NetworkCounters::default(), Utc::now()));
    reader.set_counter_step(512);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let reader = reader.clone();
            let tracker = tracker.clone();
            std::thread::spawn(move || {
                for _ in 0..100 {
                    let r = tracker.observe_with(|| reader.network_counters()).unwrap();
                    assert!(!r.counter_reset);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    // 800 reads of 512 bytes each, and the baseline holds the last one.
    let total = 8 * 100 * 512;
    let r = tracker.observe(total, total, Utc::now());
    assert_eq!(r.down_kbps, 0.0);
    assert!(!r.counter_reset);
}
