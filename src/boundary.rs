//! Interval boundary resolution for distance-governed intervals.
//!
//! Given a start time and a target distance, walk the samples accumulating
//! great-circle distance (the same way as
//! [`accumulated_distance`](crate::geo_utils::accumulated_distance)) and stop
//! at the first sample where the running total reaches the target.

use crate::geo_utils::haversine_distance;
use crate::{GpsPoint, Sample};

/// The sample at which a distance target was reached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boundary {
    /// Index of the boundary sample in the input slice
    pub index: usize,
    /// The boundary sample itself
    pub sample: Sample,
}

/// Find the first sample at which `target_meters` has been covered since `start_ms`.
///
/// Accumulation begins at the first sample at or after `start_ms`. The boundary
/// is the sample where the cumulative distance first becomes `>= target_meters`;
/// there is no interpolation between the two samples bracketing the crossing, so
/// the end time is quantized to the sampling interval.
///
/// Returns `None` when fewer than two samples exist or the target is never reached.
/// A target of zero (or less) resolves to the first sample at or after `start_ms`.
///
/// # Example
///
/// ```rust
/// use workout_intervals::{GpsPoint, Sample, boundary::find_distance_boundary};
///
/// let samples: Vec<Sample> = (0..10)
///     .map(|i| Sample::at(i * 1_000, GpsPoint::new(0.0001 * i as f64, 0.0)))
///     .collect();
///
/// // ~11.1m per sample => 30m is crossed at the third segment
/// let boundary = find_distance_boundary(&samples, 0, 30.0).unwrap();
/// assert_eq!(boundary.index, 3);
/// assert!(find_distance_boundary(&samples, 0, 5_000.0).is_none());
/// ```
pub fn find_distance_boundary(
    samples: &[Sample],
    start_ms: i64,
    target_meters: f64,
) -> Option<Boundary> {
    if samples.len() < 2 {
        return None;
    }

    let mut total = 0.0;
    let mut previous: Option<GpsPoint> = None;

    for (index, sample) in samples.iter().enumerate() {
        if sample.timestamp_ms < start_ms {
            continue;
        }
        if let Some(point) = sample.position {
            if let Some(prev) = previous {
                total += haversine_distance(&prev, &point);
            }
            previous = Some(point);
        }
        if total >= target_meters {
            return Some(Boundary {
                index,
                sample: *sample,
            });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo_utils::EARTH_RADIUS_METERS;

    fn track(step_meters: f64) -> Vec<Sample> {
        let step = (step_meters / EARTH_RADIUS_METERS).to_degrees();
        (0..20)
            .map(|i| Sample::at(i * 1_000, GpsPoint::new(10.0 + step * i as f64, 20.0)))
            .collect()
    }

    #[test]
    fn test_too_few_samples() {
        let samples = track(10.0);
        assert!(find_distance_boundary(&samples[..1], 0, 5.0).is_none());
        assert!(find_distance_boundary(&[], 0, 0.0).is_none());
    }

    #[test]
    fn test_first_sample_reaching_target() {
        let samples = track(10.0);
        let b = find_distance_boundary(&samples, 0, 25.0).unwrap();
        assert_eq!(b.index, 3);
        assert_eq!(b.sample.timestamp_ms, 3_000);
    }

    #[test]
    fn test_overshoot_on_first_segment() {
        let samples = track(10.0);
        let b = find_distance_boundary(&samples, 0, 1.0).unwrap();
        assert_eq!(b.index, 1);
    }

    #[test]
    fn test_starts_at_start_time() {
        let samples = track(10.0);
        let b = find_distance_boundary(&samples, 5_000, 25.0).unwrap();
        assert_eq!(b.index, 8);
    }

    #[test]
    fn test_start_between_samples() {
        let samples = track(10.0);
        // First sample considered is 6s; no segment from 5s
        let b = find_distance_boundary(&samples, 5_500, 15.0).unwrap();
        assert_eq!(b.index, 8);
    }

    #[test]
    fn test_zero_target_is_first_sample_in_window() {
        let samples = track(10.0);
        let b = find_distance_boundary(&samples, 4_000, 0.0).unwrap();
        assert_eq!(b.index, 4);
    }

    #[test]
    fn test_ignores_early_samples_after_window_opens() {
        let step = (10.0 / EARTH_RADIUS_METERS).to_degrees();
        let samples = vec![
            Sample::at(1_000, GpsPoint::new(0.0, 0.0)),
            Sample::at(2_000, GpsPoint::new(step, 0.0)),
            Sample::at(500, GpsPoint::new(1.0, 0.0)),
            Sample::at(3_000, GpsPoint::new(2.0 * step, 0.0)),
            Sample::at(4_000, GpsPoint::new(3.0 * step, 0.0)),
        ];
        let b = find_distance_boundary(&samples, 1_000, 19.5).unwrap();
        assert_eq!(b.index, 3);
        assert_eq!(b.sample.timestamp_ms, 3_000);
    }

    #[test]
    fn test_not_reached() {
        let samples = track(10.0);
        assert!(find_distance_boundary(&samples, 0, 500.0).is_none());
        assert!(find_distance_boundary(&samples, 30_000, 0.0).is_none());
    }
}
