//! Timecode parsing and formatting.
//!
//! Accepted inputs, in priority order:
//!
//! - `H:MM:SS[.f]` (any number of digits per component)
//! - `MM:SS[.f]`
//! - a bare number of seconds
//!
//! Anything else, including the empty string, parses to `0`. Components are
//! not range-checked, so `"99:99:99"` is simply `99*3600 + 99*60 + 99`.

use once_cell::sync::Lazy;
use regex_lite::Regex;

static HMS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+):(\d+):(\d+(?:\.\d+)?)$").expect("valid regex"));

static MS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+):(\d+(?:\.\d+)?)$").expect("valid regex"));

/// Parses a user-supplied timecode into seconds.
pub fn parse_time(text: &str) -> f64 {
    let text = text.trim();
    if text.is_empty() {
        return 0.0;
    }

    if let Some(caps) = HMS_RE.captures(text) {
        return component(&caps, 1) * 3600.0 + component(&caps, 2) * 60.0 + component(&caps, 3);
    }

    if let Some(caps) = MS_RE.captures(text) {
        return component(&caps, 1) * 60.0 + component(&caps, 2);
    }

    match text.parse::<f64>() {
        Ok(secs) if secs.is_finite() => secs,
        _ => 0.0,
    }
}

/// Same as [`parse_time`] for an optional form field.
pub fn parse_time_opt(text: Option<&str>) -> f64 {
    text.map(parse_time).unwrap_or(0.0)
}

fn component(caps: &regex_lite::Captures<'_>, index: usize) -> f64 {
    caps.get(index)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Formats seconds as `HH:MM:SS`, adding `.mmm` when there is a fractional part.
///
/// Negative and non-finite inputs render as `00:00:00`.
pub fn format_time(secs: f64) -> String {
    if !secs.is_finite() || secs <= 0.0 {
        return "00:00:00".to_string();
    }

    let total_ms = (secs * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if ms == 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_empty_and_absent_are_zero() {
        assert_eq!(parse_time(""), 0.0);
        assert_eq!(parse_time("   "), 0.0);
        assert_eq!(parse_time_opt(None), 0.0);
    }

    #[test]
    fn test_hours_minutes_seconds() {
        assert_close(parse_time("1:02:03"), 3723.0);
        assert_close(parse_time("00:00:02"), 2.0);
        assert_close(parse_time("0:01:30.25"), 90.25);
    }

    #[test]
    fn test_minutes_seconds() {
        assert_close(parse_time("02:05"), 125.0);
        assert_close(parse_time("0:07.5"), 7.5);
    }

    #[test]
    fn test_bare_seconds() {
        assert_close(parse_time("42"), 42.0);
        assert_close(parse_time("3.75"), 3.75);
        assert_close(parse_time(" 12 "), 12.0);
    }

    #[test]
    fn test_components_are_not_range_checked() {
        assert_close(parse_time("99:99:99"), 99.0 * 3600.0 + 99.0 * 60.0 + 99.0);
        assert_close(parse_time("75:00"), 4500.0);
    }

    #[test]
    fn test_garbage_is_zero() {
        assert_eq!(parse_time("soon"), 0.0);
        assert_eq!(parse_time("1:2:3:4"), 0.0);
        assert_eq!(parse_time("inf"), 0.0);
        assert_eq!(parse_time("NaN"), 0.0);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "00:00:00");
        assert_eq!(format_time(5.0), "00:00:05");
        assert_eq!(format_time(3723.0), "01:02:03");
        assert_eq!(format_time(90.25), "00:01:30.250");
        assert_eq!(format_time(360_000.0), "100:00:00");
        assert_eq!(format_time(-3.0), "00:00:00");
    }

    #[test]
    fn test_format_then_parse_returns_integer_seconds() {
        for s in (0..200_000u64).step_by(997).chain([0, 1, 59, 60, 3599, 3600, 86_399]) {
            assert_eq!(parse_time(&format_time(s as f64)), s as f64, "seconds {}", s);
        }
    }
}
