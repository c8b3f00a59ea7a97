use std::time::Duration;

use anyhow::{bail, Result};

/// Suffix to nanoseconds multiplier (order matters: longer suffixes first)
const UNITS: &[(&str, f64)] = &[
    ("ns", 1.0),
    ("µs", 1_000.0),
    ("us", 1_000.0),
    ("ms", 1_000_000.0),
    ("m", 60_000_000_000.0),
    ("s", 1_000_000_000.0),
];

/// Parse duration strings like "15s", "1000ms", "1.5s", "2m"
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();

    for (suffix, multiplier) in UNITS {
        if let Some(val_str) = s.strip_suffix(suffix) {
            let val: f64 = val_str.trim().parse()?;
            if !val.is_finite() || val < 0.0 {
                bail!("Duration must be a non-negative number: {}", s);
            }
            return Ok(Duration::from_nanos((val * multiplier) as u64));
        }
    }

    bail!("Unknown duration format: {}", s)
}

/// Parse a polling interval. Intervals must be at least one millisecond.
pub fn parse_interval(s: &str) -> Result<Duration> {
    let d = parse_duration(s)?;
    if d < Duration::from_millis(1) {
        bail!("Polling interval too short: {}", s);
    }
    Ok(d)
}

/// Format a duration for display
pub fn format_duration(d: Duration) -> String {
    let millis = d.as_millis();
    if millis < 1_000 {
        format!("{}ms", millis)
    } else if millis < 60_000 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m{:02}s", d.as_secs() / 60, d.as_secs() % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seconds() {
        let d = parse_duration("15s").unwrap();
        assert_eq!(d, Duration::from_secs(15));
    }

    #[test]
    fn test_parse_milliseconds() {
        let d = parse_duration("1000ms").unwrap();
        assert_eq!(d, Duration::from_secs(1));
    }

    #[test]
    fn test_parse_fractional_seconds() {
        let d = parse_duration("1.5s").unwrap();
        assert_eq!(d, Duration::from_millis(1500));
    }

    #[test]
    fn test_parse_minutes() {
        let d = parse_duration("2m").unwrap();
        assert_eq!(d, Duration::from_secs(120));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_duration("soon").is_err());
        assert!(parse_duration("15").is_err());
        assert!(parse_duration("-1s").is_err());
    }

    #[test]
    fn test_parse_interval_rejects_zero() {
        assert!(parse_interval("0s").is_err());
        assert!(parse_interval("500us").is_err());
        assert_eq!(parse_interval("1ms").unwrap(), Duration::from_millis(1));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(75)), "1m15s");
    }
}
