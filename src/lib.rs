//! # Workout Intervals
//!
//! Training-plan interval analysis over recorded GPS activities.
//!
//! This library provides:
//! - Plan decoding: tree-shaped templates (sequential and repeated groups) flattened
//!   into an ordered interval list
//! - Interval building: each planned interval resolved against the activity samples,
//!   by elapsed time or by covered distance
//! - Statistics: totals, average speed and pace, per-kilometer splits
//! - Remote template fetching and mobile bindings
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel batch builds with rayon
//! - **`http`** - Enable HTTP client for remote plan templates
//! - **`ffi`** - Enable FFI bindings for mobile platforms (iOS/Android)
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use workout_intervals::{build_intervals, summarize, GpsPoint, Sample};
//! use workout_intervals::plan::{flatten, PlanNode, RawInterval};
//!
//! // 10 minutes of running north at ~3.3 m/s, one sample per second
//! let samples: Vec<Sample> = (0..600)
//!     .map(|i| Sample::at(i * 1_000, GpsPoint::new(-23.55 + 0.00003 * i as f64, -46.63)))
//!     .collect();
//!
//! // 2 minutes jogging, then 3 x 200m
//! let plan = PlanNode::sequential(vec![
//!     PlanNode::leaf(RawInterval::new("0", "1", "120", "trote")),
//!     PlanNode::repeated(3, vec![PlanNode::leaf(RawInterval::new("1", "0", "200", "z4"))]),
//! ]);
//!
//! let specs = flatten(&plan).unwrap();
//! let intervals = build_intervals(&specs, &samples, 0).unwrap();
//! let stats = summarize(&intervals);
//!
//! assert_eq!(intervals.len(), 4);
//! println!("{:.0}m in {:.0}s", stats.total_distance, stats.total_time);
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{OptionExt, Result, TrainingError};

// Geographic utilities (haversine, distance accumulation, bounds)
pub mod geo_utils;

// Distance-governed interval boundaries
pub mod boundary;
pub use boundary::{find_distance_boundary, Boundary};

// Plan trees, leaf decoding and flattening
pub mod plan;
pub use plan::{
    embedded_template, flatten, IntervalSpec, IntervalType, IntervalUnit, PlanNode,
    SpeedBounds, TrainingTemplate, ZeppTemplate,
};

// Interval-sequence building
pub mod intervals;
pub use intervals::{build_intervals, intensity_from_description, Intensity, TrainingInterval};

// Pace/speed conversion
pub mod pace;
pub use pace::{format_pace, pace_from_speed, SamplePace};

// Aggregate statistics and splits
pub mod statistics;
pub use statistics::{split_times, summarize, Statistics};

// Capture decoding seam
pub mod capture;
pub use capture::{ActivityCapture, CaptureDecoder, JsonCaptureDecoder};

// End-to-end pipeline
pub mod training;
#[cfg(feature = "parallel")]
pub use training::build_training_data_parallel;
pub use training::{build_training_data, build_training_data_batch, TrainingConfig, TrainingData};

// HTTP module for plan fetching
#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{FetchConfig, PlanFetcher};

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("WorkoutIntervalsRust")
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use workout_intervals::GpsPoint;
/// let point = GpsPoint::new(-23.5505, -46.6333); // São Paulo
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Bounding box of an activity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

/// One sensor reading from an activity capture.
///
/// Samples are expected in non-decreasing timestamp order; spacing may be
/// uneven and timestamps may repeat. Every reading besides the timestamp is
/// optional: speed is often present without a GPS fix.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Sample {
    /// Unix epoch milliseconds
    pub timestamp_ms: i64,
    pub position: Option<GpsPoint>,
    /// m/s
    pub speed: Option<f64>,
    /// Meters
    pub altitude: Option<f64>,
    /// Beats per minute
    pub heart_rate: Option<f64>,
    pub cadence: Option<f64>,
    /// Watts
    pub power: Option<f64>,
}

impl Sample {
    /// A sample with only a timestamp.
    pub fn new(timestamp_ms: i64) -> Self {
        Self {
            timestamp_ms,
            ..Self::default()
        }
    }

    /// A sample with a timestamp and a position.
    pub fn at(timestamp_ms: i64, position: GpsPoint) -> Self {
        Self {
            timestamp_ms,
            position: Some(position),
            ..Self::default()
        }
    }
}

// ============================================================================
// FFI Exports (only when feature enabled)
// ============================================================================

#[cfg(feature = "ffi")]
mod ffi {
    use super::*;
    use log::info;

    /// Build training data for a decoded activity and a flat template.
    #[uniffi::export]
    pub fn ffi_build_training_data(
        capture: ActivityCapture,
        template: TrainingTemplate,
        config: TrainingConfig,
    ) -> std::result::Result<TrainingData, TrainingError> {
        init_logging();
        info!(
            "[WorkoutIntervalsRust] build_training_data: {} samples, {} intervals",
            capture.samples.len(),
            template.intervals.len()
        );

        let start = std::time::Instant::now();
        let result = build_training_data(&capture, &template, &config);
        match &result {
            Ok(data) => info!(
                "[WorkoutIntervalsRust] Built {} intervals in {:?}",
                data.intervals.len(),
                start.elapsed()
            ),
            Err(e) => info!("[WorkoutIntervalsRust] Build failed: {}", e),
        }
        result
    }

    /// Build training data from a JSON capture dump and a tree-format template.
    #[uniffi::export]
    pub fn ffi_build_training_data_from_json(
        capture_json: String,
        template_json: String,
        config: TrainingConfig,
    ) -> std::result::Result<TrainingData, TrainingError> {
        init_logging();
        let capture = JsonCaptureDecoder.decode(capture_json.as_bytes())?;
        let template = ZeppTemplate::from_json(&template_json)?.to_template()?;
        ffi_build_training_data(capture, template, config)
    }

    /// Flatten a tree-format template document.
    #[uniffi::export]
    pub fn ffi_flatten_template(
        template_json: String,
    ) -> std::result::Result<TrainingTemplate, TrainingError> {
        init_logging();
        let template = ZeppTemplate::from_json(&template_json)?.to_template()?;
        info!(
            "[WorkoutIntervalsRust] Flattened '{}' into {} intervals",
            template.title,
            template.intervals.len()
        );
        Ok(template)
    }

    /// The template compiled into the library.
    #[uniffi::export]
    pub fn ffi_embedded_template() -> std::result::Result<TrainingTemplate, TrainingError> {
        init_logging();
        embedded_template()
    }

    /// Get default configuration.
    #[uniffi::export]
    pub fn default_training_config() -> TrainingConfig {
        init_logging();
        TrainingConfig::default()
    }

    #[uniffi::export]
    pub fn ffi_pace_from_speed(speed_mps: f64) -> f64 {
        pace_from_speed(speed_mps)
    }

    #[uniffi::export]
    pub fn ffi_format_pace(decimal_minutes: f64) -> String {
        format_pace(decimal_minutes)
    }

    /// Fetch and flatten a remote template (blocking).
    #[cfg(feature = "http")]
    #[uniffi::export]
    pub fn ffi_fetch_template(url: String) -> std::result::Result<TrainingTemplate, TrainingError> {
        init_logging();
        info!("[WorkoutIntervalsRust] fetch_template {}", url);
        crate::http::fetch_template_sync(&url)?.to_template()
    }
}

// ============================================================================
// Tests
// ============================================================================
