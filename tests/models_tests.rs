// Model serialization tests (dashboard wire keys)

use homestats::models::*;
use std::time::Duration;

fn snapshot() -> StatsSnapshot {
    StatsSnapshot {
        timestamp: 1_700_000_000_000,
        cpu_percent: 12.5,
        memory_percent: 40.0,
        memory_used_gb: 3.2,
        memory_total_gb: 8.0,
        memory_cached_gb: 1.1,
        disk_percent: 70.0,
        load_avg: LoadAverage {
            one: 1.0,
            five: 0.5,
            fifteen: 0.25,
        },
        net_up_kbps: 3.5,
        net_down_kbps: 7.25,
        uptime: Duration::from_secs(93_784),
        boot_time: "2023-11-13 22:13:20".into(),
        os_info: "Debian GNU/Linux 12 (bookworm)".into(),
    }
}

#[test]
fn test_snapshot_uses_dashboard_keys() {
    let json = serde_json::to_value(snapshot()).unwrap();
    assert_eq!(json["cpu"], 12.5);
    assert_eq!(json["memory_used"], 3.2);
    assert_eq!(json["memory_total"], 8.0);
    assert_eq!(json["memory_cached"], 1.1);
    assert_eq!(json["net_up"], 3.5);
    assert_eq!(json["net_down"], 7.25);
    assert_eq!(json["uptime_secs"], 93_784);
    assert_eq!(json["load_avg"], serde_json::json!([1.0, 0.5, 0.25]));
    assert!(json.get("cpu_percent").is_none());
    assert!(json.get("uptime").is_none());
}

#[test]
fn test_snapshot_json_roundtrip() {
    let s = snapshot();
    let json = serde_json::to_string(&s).unwrap();
    let back: StatsSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, s);
}

#[test]
fn test_unsupported_load_average_is_zero_filled() {
    let json = serde_json::to_value(LoadAverage::default()).unwrap();
    assert_eq!(json, serde_json::json!([0.0, 0.0, 0.0]));
}

#[test]
fn test_memory_usage_percent() {
    let m = MemoryReading {
        total_bytes: 4096,
        used_bytes: 1024,
        cached_bytes: 0,
    };
    assert_eq!(m.usage_percent(), 25.0);

    let empty = MemoryReading {
        total_bytes: 0,
        used_bytes: 0,
        cached_bytes: 0,
    };
    assert_eq!(empty.usage_percent(), 0.0);
}

#[test]
fn test_bytes_to_gib_rounds_to_two_decimals() {
    assert_eq!(bytes_to_gib(1024 * 1024 * 1024), 1.0);
    assert_eq!(bytes_to_gib(1_500_000_000), 1.4);
    assert_eq!(bytes_to_gib(0), 0.0);
}
