//! Time formatting for the timer and duration readouts.

/// Format `secs` as `m:SS`.
///
/// NaN, infinite and negative input all render as `0:00`; fractional
/// seconds are floored.
pub fn format_time(secs: f64) -> String {
    if !secs.is_finite() || secs <= 0.0 {
        return "0:00".to_string();
    }

    let total = secs.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
