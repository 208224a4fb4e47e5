//! Interval-sequence building.
//!
//! Walks a flattened plan in order and resolves every [`IntervalSpec`] against
//! the activity samples. Each interval starts where the previous one ended, so
//! the output partitions the activity timeline without gaps or overlaps.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::boundary::find_distance_boundary;
use crate::error::{OptionExt, Result, TrainingError};
use crate::geo_utils::accumulated_distance;
use crate::plan::{IntervalSpec, IntervalType, IntervalUnit, SpeedBounds};
use crate::Sample;

/// Effort classification inferred from an interval's description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[serde(rename_all = "camelCase")]
pub enum Intensity {
    #[default]
    None,
    Walking,
    Jogging,
    Z1,
    Z2,
    Z3,
    Z4,
}

/// Description keywords and the intensity each one names.
pub const INTENSITY_BY_DESCRIPTION: [(&str, Intensity); 6] = [
    ("caminhada", Intensity::Walking),
    ("trote", Intensity::Jogging),
    ("z1", Intensity::Z1),
    ("z2", Intensity::Z2),
    ("z3", Intensity::Z3),
    ("z4", Intensity::Z4),
];

/// Look up the intensity for a description.
///
/// The description is trimmed and lower-cased, then matched exactly against
/// [`INTENSITY_BY_DESCRIPTION`]. Anything else is [`Intensity::None`].
///
/// ```rust
/// use workout_intervals::intervals::{intensity_from_description, Intensity};
///
/// assert_eq!(intensity_from_description("  Trote "), Intensity::Jogging);
/// assert_eq!(intensity_from_description("z2 easy"), Intensity::None);
/// ```
pub fn intensity_from_description(description: &str) -> Intensity {
    let key = description.trim().to_lowercase();
    INTENSITY_BY_DESCRIPTION
        .iter()
        .find(|(word, _)| *word == key)
        .map_or(Intensity::None, |(_, intensity)| *intensity)
}

/// A plan interval resolved against the recorded samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct TrainingInterval {
    pub start_time_ms: i64,
    pub end_time_ms: i64,
    pub duration_seconds: f64,
    /// Measured for time intervals, the target itself for distance intervals
    pub distance_meters: f64,
    pub speed_bounds: Option<SpeedBounds>,
    pub interval_type: IntervalType,
    pub intensity: Intensity,
    pub description: Option<String>,
}

/// Resolve every spec in order, starting at `activity_start_ms`.
///
/// - Time intervals end `magnitude` seconds after they start; their distance is
///   the distance covered in that window.
/// - Distance intervals end at the first sample where `magnitude` meters have
///   been covered; their distance is `magnitude`.
///
/// All or nothing: if any distance target is never reached the whole build fails
/// with [`TrainingError::BoundaryNotFound`]. A magnitude that is negative, not
/// finite, or too long to express as a timestamp fails with
/// [`TrainingError::InvalidMagnitude`].
///
/// # Example
///
/// ```rust
/// use workout_intervals::{GpsPoint, Sample, build_intervals};
/// use workout_intervals::plan::IntervalSpec;
///
/// let samples: Vec<Sample> = (0..120)
///     .map(|i| Sample::at(i * 1_000, GpsPoint::new(0.00003 * i as f64, 0.0)))
///     .collect();
/// let plan = vec![IntervalSpec::time(30.0, "trote"), IntervalSpec::distance(100.0, "z3")];
///
/// let intervals = build_intervals(&plan, &samples, 0).unwrap();
/// assert_eq!(intervals[0].end_time_ms, 30_000);
/// assert_eq!(intervals[1].start_time_ms, 30_000);
/// assert_eq!(intervals[1].distance_meters, 100.0);
/// ```
pub fn build_intervals(
    specs: &[IntervalSpec],
    samples: &[Sample],
    activity_start_ms: i64,
) -> Result<Vec<TrainingInterval>> {
    let mut cursor = activity_start_ms;
    let mut intervals = Vec::with_capacity(specs.len());

    for (index, spec) in specs.iter().enumerate() {
        let invalid = || TrainingError::InvalidMagnitude {
            value: spec.magnitude.to_string(),
        };
        if !spec.magnitude.is_finite() || spec.magnitude < 0.0 {
            return Err(invalid());
        }

        let (end_time_ms, duration_seconds, distance_meters) = match spec.unit {
            IntervalUnit::Time => {
                let end = seconds_to_ms(spec.magnitude)
                    .and_then(|ms| cursor.checked_add(ms))
                    .ok_or_else(invalid)?;
                (end, spec.magnitude, accumulated_distance(samples, cursor, end))
            }
            IntervalUnit::Distance => {
                let boundary = find_distance_boundary(samples, cursor, spec.magnitude)
                    .ok_or_boundary_not_found(index, cursor, spec.magnitude)?;
                let end = boundary.sample.timestamp_ms;
                (end, (end - cursor) as f64 / 1000.0, spec.magnitude)
            }
        };

        debug!(
            "[IntervalBuilder] #{} {:?} {} -> {} ({:.1}s, {:.1}m)",
            index, spec.unit, cursor, end_time_ms, duration_seconds, distance_meters
        );

        let description = Some(spec.description.trim())
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        intervals.push(TrainingInterval {
            start_time_ms: cursor,
            end_time_ms,
            duration_seconds,
            distance_meters,
            speed_bounds: spec.speed_bounds,
            interval_type: spec.interval_type,
            intensity: intensity_from_description(&spec.description),
            description,
        });

        cursor = end_time_ms;
    }

    Ok(intervals)
}

/// Whole milliseconds in `seconds`, if they fit a timestamp.
fn seconds_to_ms(seconds: f64) -> Option<i64> {
    let ms = (seconds * 1000.0).round();
    (ms < i64::MAX as f64).then_some(ms as i64)
}
