//! End-to-end training analysis.
//!
//! [`build_training_data`] runs the whole pipeline for one activity: build the
//! intervals, compute splits, reduce statistics, and attach the per-sample pace
//! series and map bounds used for visualization.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::capture::ActivityCapture;
use crate::error::Result;
use crate::geo_utils::compute_bounds;
use crate::intervals::{build_intervals, TrainingInterval};
use crate::pace::{sample_paces, SamplePace};
use crate::plan::TrainingTemplate;
use crate::statistics::{split_times, summarize, Statistics};
use crate::Bounds;

/// Configuration for [`build_training_data`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct TrainingConfig {
    /// Distance between split marks in meters.
    /// Default: 1000.0 (per-kilometer splits)
    pub split_distance_meters: f64,

    /// Compute split marks at all.
    /// Default: true
    pub compute_splits: bool,

    /// Attach the per-sample pace series. Large captures may want to skip it.
    /// Default: true
    pub compute_paces: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            split_distance_meters: 1000.0,
            compute_splits: true,
            compute_paces: true,
        }
    }
}

/// Everything computed for one activity against one template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct TrainingData {
    pub template: TrainingTemplate,
    pub intervals: Vec<TrainingInterval>,
    /// Seconds from activity start at each split mark
    pub split_times_seconds: Vec<f64>,
    pub statistics: Statistics,
    pub paces: Vec<SamplePace>,
    pub bounds: Option<Bounds>,
}

/// Analyze one activity against a template.
///
/// Fails only when the interval build fails; see
/// [`build_intervals`](crate::intervals::build_intervals).
pub fn build_training_data(
    capture: &ActivityCapture,
    template: &TrainingTemplate,
    config: &TrainingConfig,
) -> Result<TrainingData> {
    let samples = &capture.samples;

    let intervals = build_intervals(&template.intervals, samples, capture.start_time_ms)?;
    let statistics = summarize(&intervals);

    let split_times_seconds = if config.compute_splits {
        split_times(samples, capture.start_time_ms, config.split_distance_meters)
    } else {
        Vec::new()
    };

    let paces = if config.compute_paces {
        sample_paces(samples)
    } else {
        Vec::new()
    };

    debug!(
        "[TrainingData] '{}': {} intervals, {} splits, {:.0}m in {:.0}s",
        template.title,
        intervals.len(),
        split_times_seconds.len(),
        statistics.total_distance,
        statistics.total_time
    );

    Ok(TrainingData {
        template: template.clone(),
        intervals,
        split_times_seconds,
        statistics,
        paces,
        bounds: compute_bounds(samples),
    })
}

/// Analyze several activities against the same template, one after another.
///
/// Each activity gets its own result; a failure does not affect the others.
pub fn build_training_data_batch(
    captures: &[ActivityCapture],
    template: &TrainingTemplate,
    config: &TrainingConfig,
) -> Vec<Result<TrainingData>> {
    captures
        .iter()
        .map(|capture| build_training_data(capture, template, config))
        .collect()
}

/// Same as [`build_training_data_batch`], spread across the rayon pool.
///
/// Results keep the order of `captures`.
#[cfg(feature = "parallel")]
pub fn build_training_data_parallel(
    captures: &[ActivityCapture],
    template: &TrainingTemplate,
    config: &TrainingConfig,
) -> Vec<Result<TrainingData>> {
    use log::info;
    use rayon::prelude::*;

    let start = std::time::Instant::now();
    let results: Vec<Result<TrainingData>> = captures
        .par_iter()
        .map(|capture| build_training_data(capture, template, config))
        .collect();

    info!(
        "[TrainingData] parallel build of {} activities in {:?} ({} failed)",
        captures.len(),
        start.elapsed(),
        results.iter().filter(|r| r.is_err()).count()
    );

    results
}
