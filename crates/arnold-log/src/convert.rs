//! Numeric and time conversions applied to captured tokens.
//!
//! Every function here is total: a token that does not parse yields the
//! target type's default instead of an error.

use std::str::FromStr;

/// Numeric types a captured token can be parsed into.
pub trait Numeric: FromStr + Default {
    /// Whether a successfully parsed value is usable as a statistic.
    fn is_usable(&self) -> bool {
        true
    }
}

impl Numeric for u64 {}

impl Numeric for f64 {
    fn is_usable(&self) -> bool {
        self.is_finite()
    }
}

/// Parses `text` as `T`, falling back to `T::default()` on any failure.
///
/// Floats too long to represent parse to infinity and are rejected as well.
pub fn parse_or_default<T: Numeric>(text: &str) -> T {
    text.trim()
        .parse()
        .ok()
        .filter(T::is_usable)
        .unwrap_or_default()
}

/// Converts a colon-delimited duration to seconds.
///
/// `MM:SS.ss` and `HH:MM:SS.ss` are accepted. Any other shape, or a component
/// that is not a finite number, yields `0.0`.
///
/// ```
/// use arnold_log::convert::time_to_seconds;
///
/// assert_eq!(time_to_seconds("01:30.50"), 90.5);
/// assert_eq!(time_to_seconds("1:01:30.50"), 3690.5);
/// assert_eq!(time_to_seconds("garbage"), 0.0);
/// ```
pub fn time_to_seconds(text: &str) -> f64 {
    let components: Option<Vec<f64>> = text
        .trim()
        .split(':')
        .map(|part| part.parse::<f64>().ok().filter(|value| value.is_finite()))
        .collect();

    let seconds = match components.as_deref() {
        Some([minutes, seconds]) => minutes * 60.0 + seconds,
        Some([hours, minutes, seconds]) => hours * 3600.0 + minutes * 60.0 + seconds,
        _ => 0.0,
    };
    if seconds.is_finite() { seconds } else { 0.0 }
}

/// Formats a duration for display.
///
/// Below a minute: `"45.00 seconds"`. Below an hour: `"2m 5.50s"`.
/// Otherwise: `"1h 2m 5.00s"`. Negative and non-finite durations are shown as
/// zero.
pub fn format_time(seconds: f64) -> String {
    let seconds = if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    };
    if seconds < 60.0 {
        return format!("{seconds:.2} seconds");
    }

    let minutes = (seconds / 60.0).floor() as u64;
    let remaining = seconds % 60.0;
    if minutes < 60 {
        return format!("{minutes}m {remaining:.2}s");
    }
    format!("{}h {}m {remaining:.2}s", minutes / 60, minutes % 60)
}

/// Renders a byte count as decimal megabytes: `"12.35 MB"`.
pub fn bytes_to_megabytes(bytes: &str) -> String {
    let bytes: f64 = parse_or_default(bytes);
    format!("{:.2} MB", bytes * 0.000_001)
}

/// Converts a size with a `KB`/`MB`/`GB` unit to gigabytes (binary multiples,
/// as OpenImageIO reports them). Unknown units are taken as gigabytes.
pub fn to_gigabytes(value: &str, unit: &str) -> f64 {
    let value: f64 = parse_or_default(value);
    match unit.trim().to_ascii_uppercase().as_str() {
        "KB" => value / (1024.0 * 1024.0),
        "MB" => value / 1024.0,
        _ => value,
    }
}
