// Linux-specific helpers: /etc/os-release, /proc/meminfo.

/// Distro name from /etc/os-release (PRETTY_NAME, else NAME).
pub(super) fn read_os_pretty_name_linux() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/etc/os-release").ok()?;
        return parse_os_release(&content);
    }
    #[cfg(not(target_os = "linux"))]
    None
}

/// Page cache size ("Cached:" in /proc/meminfo), in bytes.
pub(super) fn read_cached_bytes_linux() -> Option<u64> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/proc/meminfo").ok()?;
        return parse_meminfo_kib(&content, "Cached:").map(|kib| kib * 1024);
    }
    #[cfg(not(target_os = "linux"))]
    None
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_os_release(content: &str) -> Option<String> {
    for key in ["PRETTY_NAME=", "NAME="] {
        if let Some(v) = content
            .lines()
            .find_map(|line| line.strip_prefix(key))
            .map(|v| v.trim().trim_matches('"'))
            .filter(|v| !v.is_empty())
        {
            return Some(v.to_string());
        }
    }
    None
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_meminfo_kib(content: &str, key: &str) -> Option<u64> {
    content
        .lines()
        .find_map(|line| line.strip_prefix(key))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|n| n.parse().ok())
}
