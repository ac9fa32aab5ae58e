//! Bandwidth unit normalization.

/// Convert a bandwidth magnitude to Mbps.
///
/// Units are matched case-insensitively. An unknown unit passes the value
/// through unchanged.
pub fn to_mbps(value: f64, unit: &str) -> f64 {
    match unit.to_ascii_lowercase().as_str() {
        "kbps" => value / 1000.0,
        "mbps" => value,
        "gbps" => value * 1000.0,
        "bps" => value / 1_000_000.0,
        _ => value,
    }
}
