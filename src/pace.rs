//! Pace and speed conversions.
//!
//! Pace is expressed in decimal minutes per kilometer (`5.5` is 5'30"/km).
//! A pace of `0.0` is the "stopped" sentinel, not a real pace.

use serde::{Deserialize, Serialize};

use crate::Sample;

/// Decimal minutes per kilometer for a speed in m/s.
///
/// Returns `0.0` for non-positive speeds.
///
/// ```rust
/// use workout_intervals::pace::pace_from_speed;
///
/// assert!((pace_from_speed(10.0 / 3.6) - 6.0).abs() < 1e-9);
/// assert_eq!(pace_from_speed(0.0), 0.0);
/// ```
#[inline]
pub fn pace_from_speed(speed_mps: f64) -> f64 {
    if speed_mps <= 0.0 {
        return 0.0;
    }
    60.0 / (speed_mps * 3.6)
}

/// Format decimal minutes as `M'SS"`.
///
/// Seconds are rounded to the nearest whole second; a rounded 60 carries into
/// the minutes. Zero formats as `0'00"`.
///
/// ```rust
/// use workout_intervals::pace::format_pace;
///
/// assert_eq!(format_pace(5.5), "5'30\"");
/// assert_eq!(format_pace(0.0), "0'00\"");
/// ```
pub fn format_pace(decimal_minutes: f64) -> String {
    if decimal_minutes == 0.0 || !decimal_minutes.is_finite() {
        return "0'00\"".to_string();
    }

    let mut minutes = decimal_minutes.floor() as i64;
    let mut seconds = ((decimal_minutes - minutes as f64) * 60.0).round() as i64;
    if seconds == 60 {
        minutes += 1;
        seconds = 0;
    }

    format!("{}'{:02}\"", minutes, seconds)
}

/// Pace at one sample, for charting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct SamplePace {
    pub timestamp_ms: i64,
    /// Speed in m/s, rounded to 2 decimals (0 when the sample has none)
    pub speed: f64,
    /// Decimal min/km, rounded to 2 decimals
    pub decimal_pace: f64,
    pub formatted_pace: String,
}

/// Per-sample pace series.
pub fn sample_paces(samples: &[Sample]) -> Vec<SamplePace> {
    samples
        .iter()
        .map(|s| {
            let speed = s.speed.unwrap_or(0.0);
            let decimal_pace = pace_from_speed(speed);
            SamplePace {
                timestamp_ms: s.timestamp_ms,
                speed: round2(speed),
                decimal_pace: round2(decimal_pace),
                formatted_pace: format_pace(decimal_pace),
            }
        })
        .collect()
}

#[inline]
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
