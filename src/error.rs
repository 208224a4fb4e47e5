//! Error types for plan decoding, interval building and template fetching.
//!
//! Everything fallible in the crate returns [`Result`], whose error side is
//! [`TrainingError`]. Failures are never retried or partially recovered by
//! the computation core: a plan that cannot be decoded, or a distance interval
//! whose target is never reached, aborts the whole build.

use thiserror::Error;

/// Errors produced while decoding plans, building intervals or fetching templates.
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "ffi", derive(uniffi::Error), uniffi(flat_error))]
pub enum TrainingError {
    /// A leaf carried an interval-type code outside "0".."4".
    #[error("unrecognized interval type code '{code}'")]
    UnknownIntervalType { code: String },

    /// A leaf carried an interval-unit code other than "0" (distance) or "1" (time).
    #[error("unrecognized interval unit code '{code}'")]
    UnknownIntervalUnit { code: String },

    /// A magnitude that is not a finite, non-negative number, or a duration
    /// too long to land on a millisecond timestamp.
    #[error("invalid interval magnitude '{value}'")]
    InvalidMagnitude { value: String },

    /// A pace alert rule whose detail is not `"<pace>-<pace>"`.
    #[error("invalid pace rule '{detail}'")]
    InvalidPaceRule { detail: String },

    /// A distance interval never reached its target within the remaining samples.
    #[error(
        "interval {interval_index} boundary not found: {target_meters}m not reached from {start_time_ms}"
    )]
    BoundaryNotFound {
        interval_index: u32,
        start_time_ms: i64,
        target_meters: f64,
    },

    /// A plan or template document could not be parsed.
    #[error("invalid plan document: {0}")]
    InvalidDocument(String),

    /// The capture decoder could not produce a sample sequence.
    #[error("capture decode failed: {0}")]
    Decode(String),

    /// Template URL is malformed or not http(s).
    #[error("invalid template URL: {0}")]
    InvalidUrl(String),

    /// The template host answered with a non-2xx status.
    #[error("HTTP error! status: {0}")]
    HttpStatus(u16),

    /// The template host answered with something other than JSON.
    #[error("unexpected content type '{0}', expected application/json")]
    ContentType(String),

    /// Transport-level failure (connect, timeout, body download).
    #[error("request failed: {0}")]
    Request(String),

    /// The template document itself reported an error.
    #[error("template source reported an error: {0}")]
    Remote(String),
}

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, TrainingError>;

/// Conversions from `Option` into [`TrainingError`] variants.
pub trait OptionExt<T> {
    /// Map `None` to [`TrainingError::BoundaryNotFound`].
    fn ok_or_boundary_not_found(
        self,
        interval_index: usize,
        start_time_ms: i64,
        target_meters: f64,
    ) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_boundary_not_found(
        self,
        interval_index: usize,
        start_time_ms: i64,
        target_meters: f64,
    ) -> Result<T> {
        self.ok_or(TrainingError::BoundaryNotFound {
            interval_index: u32::try_from(interval_index).unwrap_or(u32::MAX),
            start_time_ms,
            target_meters,
        })
    }
}

impl From<serde_json::Error> for TrainingError {
    fn from(err: serde_json::Error) -> Self {
        TrainingError::InvalidDocument(err.to_string())
    }
}
