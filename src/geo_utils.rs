//! # Geographic Utilities
//!
//! Great-circle distance and distance accumulation over activity samples.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`distance_meters`] | Haversine distance between two coordinate pairs |
//! | [`haversine_distance`] | Same, for two [`GpsPoint`]s |
//! | [`accumulated_distance`] | Polyline length of the samples inside a time window |
//! | [`compute_bounds`] | Bounding box of the positioned samples |
//!
//! ## Example
//!
//! ```rust
//! use workout_intervals::{GpsPoint, Sample, geo_utils};
//!
//! let samples = vec![
//!     Sample::at(0, GpsPoint::new(51.5074, -0.1278)),
//!     Sample::at(1_000, GpsPoint::new(51.5075, -0.1278)),
//!     Sample::at(2_000, GpsPoint::new(51.5076, -0.1278)),
//! ];
//!
//! let meters = geo_utils::accumulated_distance(&samples, 0, 2_000);
//! assert!(meters > 20.0 && meters < 25.0);
//! ```
//!
//! ## Algorithm Notes
//!
//! Distances use the haversine formula on a sphere of radius 6,371,000 m.
//! Positions are only known at sample granularity, so the distance covered
//! inside a window is the length of the polyline through its GPS fixes. No
//! sub-sample interpolation is done; at ~1 Hz sampling the error is small.

use geo::{BoundingRect, MultiPoint, Point};

use crate::{Bounds, GpsPoint, Sample};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

// =============================================================================
// Distance Functions
// =============================================================================

/// Great-circle distance in meters between two coordinates given in degrees.
///
/// Pure numeric function: NaN inputs yield NaN.
///
/// # Example
///
/// ```rust
/// use workout_intervals::geo_utils;
///
/// let d = geo_utils::distance_meters(51.5074, -0.1278, 48.8566, 2.3522);
/// assert!((d - 343_500.0).abs() < 2_000.0); // London to Paris
/// ```
#[inline]
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Great-circle distance in meters between two GPS points.
#[inline]
pub fn haversine_distance(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    distance_meters(p1.latitude, p1.longitude, p2.latitude, p2.longitude)
}

/// Distance covered between `start_ms` and `end_ms` (both inclusive).
///
/// Sums the haversine distance between consecutive positioned samples whose
/// timestamps fall inside the window. Accumulation starts at the first sample
/// at or after `start_ms`, so that sample only opens the first segment; there is
/// no leading segment from an earlier sample. Iteration stops at the first sample
/// past `end_ms`.
///
/// Samples without a position are skipped and the next positioned sample is
/// joined to the last one seen. Samples earlier than `start_ms` that show up
/// after the window opened (unsorted input) are ignored.
///
/// Returns `0.0` for fewer than two samples or when `start_ms >= end_ms`.
/// The result is rounded to centimeters.
pub fn accumulated_distance(samples: &[Sample], start_ms: i64, end_ms: i64) -> f64 {
    if samples.len() < 2 || start_ms >= end_ms {
        return 0.0;
    }

    let mut total = 0.0;
    let mut previous: Option<GpsPoint> = None;

    for sample in samples {
        if sample.timestamp_ms > end_ms {
            break;
        }
        if sample.timestamp_ms < start_ms {
            continue;
        }
        if let Some(point) = sample.position {
            if let Some(prev) = previous {
                total += haversine_distance(&prev, &point);
            }
            previous = Some(point);
        }
    }

    round_to_centimeters(total)
}

/// Round a distance to two decimal places.
#[inline]
pub(crate) fn round_to_centimeters(meters: f64) -> f64 {
    (meters * 100.0).round() / 100.0
}

// =============================================================================
// Bounding Box Functions
// =============================================================================

/// Bounding box of every sample with a valid position.
///
/// Returns `None` when no sample carries a valid position (indoor activities,
/// treadmill captures).
pub fn compute_bounds(samples: &[Sample]) -> Option<Bounds> {
    let points: MultiPoint<f64> = samples
        .iter()
        .filter_map(|s| s.position)
        .filter(GpsPoint::is_valid)
        .map(|p| Point::new(p.longitude, p.latitude))
        .collect();

    let rect = points.bounding_rect()?;

    Some(Bounds {
        min_lat: rect.min().y,
        max_lat: rect.max().y,
        min_lng: rect.min().x,
        max_lng: rect.max().x,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    /// Degrees of latitude covering `meters` along a meridian.
    fn lat_step(meters: f64) -> f64 {
        (meters / EARTH_RADIUS_METERS).to_degrees()
    }

    fn northbound(count: usize, step_meters: f64, interval_ms: i64) -> Vec<Sample> {
        (0..count)
            .map(|i| {
                Sample::at(
                    i as i64 * interval_ms,
                    GpsPoint::new(-23.55 + lat_step(step_meters) * i as f64, -46.63),
                )
            })
            .collect()
    }

    #[test]
    fn test_distance_same_point() {
        assert_eq!(distance_meters(-23.55, -46.63, -23.55, -46.63), 0.0);
    }

    #[test]
    fn test_distance_symmetric() {
        let ab = distance_meters(51.5074, -0.1278, 48.8566, 2.3522);
        let ba = distance_meters(48.8566, 2.3522, 51.5074, -0.1278);
        assert!(approx_eq(ab, ba, 1e-6));
    }

    #[test]
    fn test_distance_known_value() {
        // London to Paris is approximately 344 km
        let london = GpsPoint::new(51.5074, -0.1278);
        let paris = GpsPoint::new(48.8566, 2.3522);
        assert!(approx_eq(haversine_distance(&london, &paris), 343_560.0, 5000.0));
    }

    #[test]
    fn test_distance_nan_propagates() {
        assert!(distance_meters(f64::NAN, 0.0, 0.0, 0.0).is_nan());
    }

    #[test]
    fn test_accumulated_distance_degenerate_windows() {
        let samples = northbound(5, 10.0, 1_000);
        assert_eq!(accumulated_distance(&samples, 2_000, 2_000), 0.0);
        assert_eq!(accumulated_distance(&samples, 3_000, 1_000), 0.0);
        assert_eq!(accumulated_distance(&samples[..1], 0, 10_000), 0.0);
        assert_eq!(accumulated_distance(&[], 0, 10_000), 0.0);
    }

    #[test]
    fn test_accumulated_distance_window_is_inclusive() {
        let samples = northbound(6, 10.0, 1_000);
        // Samples at 1s, 2s, 3s => two segments
        assert!(approx_eq(accumulated_distance(&samples, 1_000, 3_000), 20.0, 0.01));
        // Window end between samples excludes the later one
        assert!(approx_eq(accumulated_distance(&samples, 1_000, 3_500), 20.0, 0.01));
        // Window start between samples: no approach segment from 1s
        assert!(approx_eq(accumulated_distance(&samples, 1_500, 5_000), 30.0, 0.01));
    }

    #[test]
    fn test_accumulated_distance_bridges_missing_positions() {
        let mut samples = northbound(4, 10.0, 1_000);
        samples[1].position = None;
        assert!(approx_eq(accumulated_distance(&samples, 0, 3_000), 30.0, 0.01));
    }

    #[test]
    fn test_accumulated_distance_skips_out_of_order_samples() {
        let step = lat_step(10.0);
        let samples = vec![
            Sample::at(0, GpsPoint::new(-1.0, 0.0)),
            Sample::at(1_000, GpsPoint::new(0.0, 0.0)),
            Sample::at(2_000, GpsPoint::new(step, 0.0)),
            // Out of order and before the window: must not add a detour
            Sample::at(500, GpsPoint::new(1.0, 0.0)),
            Sample::at(3_000, GpsPoint::new(2.0 * step, 0.0)),
        ];
        assert!(approx_eq(accumulated_distance(&samples, 1_000, 3_000), 20.0, 0.01));
    }

    #[test]
    fn test_accumulated_distance_rounded() {
        let samples = northbound(3, 10.004, 1_000);
        let d = accumulated_distance(&samples, 0, 2_000);
        assert_eq!(d, round_to_centimeters(d));
    }

    #[test]
    fn test_compute_bounds() {
        let samples = vec![
            Sample::at(0, GpsPoint::new(51.50, -0.13)),
            Sample::at(1_000, GpsPoint::new(51.51, -0.12)),
            Sample::at(2_000, GpsPoint::new(51.505, -0.125)),
        ];
        let bounds = compute_bounds(&samples).unwrap();
        assert_eq!(bounds.min_lat, 51.50);
        assert_eq!(bounds.max_lat, 51.51);
        assert_eq!(bounds.min_lng, -0.13);
        assert_eq!(bounds.max_lng, -0.12);
    }

    #[test]
    fn test_compute_bounds_without_positions() {
        let samples = vec![Sample::new(0), Sample::new(1_000)];
        assert!(compute_bounds(&samples).is_none());
    }
}
