//! Rendering of voting windows and other second counts for logs.

const UNITS: [(u64, &str); 4] = [(86_400, "d"), (3_600, "h"), (60, "m"), (1, "s")];

/// Render `secs` as its non-zero day/hour/minute/second parts, largest first.
///
/// `300` renders as `5m`, `3_660` as `1h 1m`. Zero renders as `0s`.
pub fn format_window(secs: u64) -> String {
    let mut rest = secs;
    let mut parts = Vec::new();
    for (unit, suffix) in UNITS {
        let count = rest / unit;
        rest %= unit;
        if count > 0 {
            parts.push(format!("{count}{suffix}"));
        }
    }
    if parts.is_empty() {
        "0s".to_string()
    } else {
        parts.join(" ")
    }
}
