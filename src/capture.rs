//! Activity captures and the decoder seam.
//!
//! Decoding a device capture file (FIT and friends) into samples happens outside
//! this crate. A decoder only has to implement [`CaptureDecoder`]; the
//! [`JsonCaptureDecoder`] provided here reads the JSON dump such decoders
//! commonly produce:
//!
//! ```json
//! {
//!   "activity": { "timestamp": 1700000000000, "total_timer_time": 1830.5 },
//!   "records": [
//!     { "timestamp": 1700000000000, "position_lat": -23.55, "position_long": -46.63,
//!       "speed": 2.9, "altitude": 760.0, "heart_rate": 141, "cadence": 84 }
//!   ]
//! }
//! ```
//!
//! Timestamps are Unix epoch milliseconds. A record without both coordinates
//! becomes a sample without a position.

use log::debug;
use serde::Deserialize;

use crate::error::{Result, TrainingError};
use crate::{GpsPoint, Sample};

/// A decoded activity: its start, its timer total and its samples.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct ActivityCapture {
    /// Activity start, Unix epoch milliseconds
    pub start_time_ms: i64,
    /// Timer time reported by the device, seconds
    pub total_timer_time: f64,
    /// Samples in timestamp order
    pub samples: Vec<Sample>,
}

impl ActivityCapture {
    pub fn new(start_time_ms: i64, samples: Vec<Sample>) -> Self {
        let total_timer_time = match (samples.first(), samples.last()) {
            (Some(first), Some(last)) => (last.timestamp_ms - first.timestamp_ms) as f64 / 1000.0,
            _ => 0.0,
        };
        Self {
            start_time_ms,
            total_timer_time,
            samples,
        }
    }
}

/// Turns raw capture bytes into an [`ActivityCapture`].
///
/// Implementations must be pure with respect to the bytes they are given.
pub trait CaptureDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<ActivityCapture>;
}

/// Decoder for JSON capture dumps.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCaptureDecoder;

#[derive(Debug, Deserialize)]
struct CaptureDocument {
    activity: ActivityDocument,
    #[serde(default)]
    records: Vec<RecordDocument>,
}

#[derive(Debug, Deserialize)]
struct ActivityDocument {
    timestamp: i64,
    #[serde(default)]
    total_timer_time: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RecordDocument {
    timestamp: i64,
    position_lat: Option<f64>,
    position_long: Option<f64>,
    speed: Option<f64>,
    altitude: Option<f64>,
    heart_rate: Option<f64>,
    cadence: Option<f64>,
    power: Option<f64>,
}

impl From<RecordDocument> for Sample {
    fn from(r: RecordDocument) -> Self {
        let position = match (r.position_lat, r.position_long) {
            (Some(lat), Some(lng)) => Some(GpsPoint::new(lat, lng)),
            _ => None,
        };
        Sample {
            timestamp_ms: r.timestamp,
            position,
            speed: r.speed,
            altitude: r.altitude,
            heart_rate: r.heart_rate,
            cadence: r.cadence,
            power: r.power,
        }
    }
}

impl CaptureDecoder for JsonCaptureDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<ActivityCapture> {
        let doc: CaptureDocument = serde_json::from_slice(bytes)
            .map_err(|e| TrainingError::Decode(format!("JSON parse error: {}", e)))?;

        let samples: Vec<Sample> = doc.records.into_iter().map(Sample::from).collect();
        debug!(
            "[JsonCaptureDecoder] {} samples, start {}",
            samples.len(),
            doc.activity.timestamp
        );

        let mut capture = ActivityCapture::new(doc.activity.timestamp, samples);
        if let Some(timer) = doc.activity.total_timer_time {
            capture.total_timer_time = timer;
        }
        Ok(capture)
    }
}
