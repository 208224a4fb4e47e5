//! Aggregate statistics and per-distance splits.

use serde::{Deserialize, Serialize};

use crate::boundary::find_distance_boundary;
use crate::intervals::TrainingInterval;
use crate::pace::pace_from_speed;
use crate::Sample;

/// Totals over a built interval sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Statistics {
    /// Seconds
    pub total_time: f64,
    /// Meters
    pub total_distance: f64,
    /// m/s
    pub average_speed: f64,
    /// Decimal min/km
    pub average_pace: f64,
}

/// Reduce intervals into totals.
///
/// `average_speed` is `total_distance / total_time` with no special case for a
/// zero total time: an empty sequence gives NaN (and a positive distance over
/// zero time gives infinity). `average_pace` follows from `average_speed`.
pub fn summarize(intervals: &[TrainingInterval]) -> Statistics {
    let total_time: f64 = intervals.iter().map(|i| i.duration_seconds).sum();
    let total_distance: f64 = intervals.iter().map(|i| i.distance_meters).sum();
    let average_speed = total_distance / total_time;

    Statistics {
        total_time,
        total_distance,
        average_speed,
        average_pace: pace_from_speed(average_speed),
    }
}

/// Seconds from `activity_start_ms` at which every `each_meters` were completed.
///
/// Starts from the first sample and chains distance boundaries: each search
/// begins at the sample right after the previous boundary (by index, so
/// repeated timestamps never rewind the search). Stops when a split can no
/// longer be completed or the last sample was a boundary. With
/// `each_meters = 1000.0` this gives per-kilometer lap marks.
///
/// A non-positive or non-finite `each_meters` yields no splits.
///
/// ```rust
/// use workout_intervals::{GpsPoint, Sample, statistics::split_times};
///
/// // ~111m per sample, one sample every 30s
/// let samples: Vec<Sample> = (0..25)
///     .map(|i| Sample::at(i * 30_000, GpsPoint::new(0.001 * i as f64, 0.0)))
///     .collect();
///
/// let splits = split_times(&samples, 0, 1000.0);
/// assert_eq!(splits, vec![270.0, 570.0]);
/// ```
pub fn split_times(samples: &[Sample], activity_start_ms: i64, each_meters: f64) -> Vec<f64> {
    let mut splits = Vec::new();
    if !each_meters.is_finite() || each_meters <= 0.0 {
        return splits;
    }

    let mut next = 0;
    while let Some(start) = samples.get(next) {
        let window = &samples[next..];
        let Some(boundary) = find_distance_boundary(window, start.timestamp_ms, each_meters)
        else {
            break;
        };

        splits.push((boundary.sample.timestamp_ms - activity_start_ms) as f64 / 1000.0);
        next += boundary.index + 1;
    }

    splits
}
