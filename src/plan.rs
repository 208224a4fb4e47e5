//! Training plans: the tree-shaped Zepp format and the flat template.
//!
//! A plan arrives as a tree of [`PlanNode`]s: sequential groups, repeated groups
//! and leaf intervals whose fields are still in the source's string encoding.
//! [`flatten`] turns that tree into the ordered list of [`IntervalSpec`]s the
//! interval builder consumes, decoding every leaf on the way.
//!
//! ## Wire format
//!
//! ```json
//! {
//!   "title": "Fartlek",
//!   "description": "",
//!   "trainingIntervals": {
//!     "type": "PARENT",
//!     "children": [
//!       { "type": "NODE", "trainingInterval": {
//!           "intervalType": "0", "intervalUnit": "1", "intervalUnitValue": "600",
//!           "alertRule": "0", "alertRuleDetail": "", "intervalDesc": "trote" } },
//!       { "type": "CIRCLE", "circleTimes": 4, "children": [ ... ] }
//!     ]
//!   }
//! }
//! ```
//!
//! Interval units are encoded as `"0"` = distance (meters) and `"1"` = time
//! (seconds). Interval types are `"0"`..`"4"` for warm-up, training, rest,
//! recovery and cool-down. Any node whose `type` is not one of `PARENT`,
//! `CIRCLE` or `NODE` decodes as [`PlanNode::Unknown`] and contributes nothing.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, TrainingError};

/// Plan compiled into the crate, in the tree format.
const EMBEDDED_TEMPLATE: &str = include_str!("../plans/default_template.json");

// ============================================================================
// Flattened plan
// ============================================================================

/// Role of an interval inside the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[serde(rename_all = "camelCase")]
pub enum IntervalType {
    WarmUp,
    Training,
    Rest,
    Recovery,
    Cooldown,
}

impl IntervalType {
    /// Decode a Zepp `intervalType` code.
    pub fn from_code(code: &str) -> Result<Self> {
        match code.trim() {
            "0" => Ok(IntervalType::WarmUp),
            "1" => Ok(IntervalType::Training),
            "2" => Ok(IntervalType::Rest),
            "3" => Ok(IntervalType::Recovery),
            "4" => Ok(IntervalType::Cooldown),
            other => Err(TrainingError::UnknownIntervalType {
                code: other.to_string(),
            }),
        }
    }
}

/// What governs the end of an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[serde(rename_all = "camelCase")]
pub enum IntervalUnit {
    /// Magnitude is seconds
    Time,
    /// Magnitude is meters
    Distance,
}

impl IntervalUnit {
    /// Decode a Zepp `intervalUnit` code.
    pub fn from_code(code: &str) -> Result<Self> {
        match code.trim() {
            "0" => Ok(IntervalUnit::Distance),
            "1" => Ok(IntervalUnit::Time),
            other => Err(TrainingError::UnknownIntervalUnit {
                code: other.to_string(),
            }),
        }
    }
}

/// Target speed range in m/s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct SpeedBounds {
    pub min: f64,
    pub max: f64,
}

/// One leaf of a flattened plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[serde(rename_all = "camelCase")]
pub struct IntervalSpec {
    #[serde(rename = "type")]
    pub interval_type: IntervalType,
    pub unit: IntervalUnit,
    /// Seconds for [`IntervalUnit::Time`], meters for [`IntervalUnit::Distance`]
    #[serde(rename = "unitValue")]
    pub magnitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_bounds: Option<SpeedBounds>,
    #[serde(default)]
    pub description: String,
}

impl IntervalSpec {
    /// A time-governed training interval.
    pub fn time(seconds: f64, description: &str) -> Self {
        Self {
            interval_type: IntervalType::Training,
            unit: IntervalUnit::Time,
            magnitude: seconds,
            speed_bounds: None,
            description: description.to_string(),
        }
    }

    /// A distance-governed training interval.
    pub fn distance(meters: f64, description: &str) -> Self {
        Self {
            interval_type: IntervalType::Training,
            unit: IntervalUnit::Distance,
            magnitude: meters,
            speed_bounds: None,
            description: description.to_string(),
        }
    }
}

/// A plan already flattened into an ordered interval list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct TrainingTemplate {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub intervals: Vec<IntervalSpec>,
}

impl TrainingTemplate {
    /// Parse a flat template document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// ============================================================================
// Tree format
// ============================================================================

/// A plan document in the tree format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZeppTemplate {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub training_intervals: PlanNode,
}

impl ZeppTemplate {
    /// Parse a tree-format document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a tree-format document from raw bytes (e.g. an HTTP body).
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Flatten into a [`TrainingTemplate`], keeping title and description.
    pub fn to_template(&self) -> Result<TrainingTemplate> {
        Ok(TrainingTemplate {
            title: self.title.clone(),
            description: self.description.clone(),
            intervals: flatten(&self.training_intervals)?,
        })
    }
}

/// One node of a plan tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlanNode {
    /// Children run once each, in order.
    #[serde(rename = "PARENT")]
    Sequential {
        #[serde(default)]
        children: Vec<PlanNode>,
    },
    /// The whole child sequence runs `repeat_count` times.
    #[serde(rename = "CIRCLE")]
    Repeated {
        #[serde(rename = "circleTimes", default)]
        repeat_count: u32,
        #[serde(default)]
        children: Vec<PlanNode>,
    },
    /// A single interval, still encoded.
    #[serde(rename = "NODE")]
    Leaf {
        #[serde(rename = "trainingInterval")]
        interval: RawInterval,
    },
    /// Any other node type.
    #[serde(other)]
    Unknown,
}

impl PlanNode {
    pub fn sequential(children: Vec<PlanNode>) -> Self {
        PlanNode::Sequential { children }
    }

    pub fn repeated(repeat_count: u32, children: Vec<PlanNode>) -> Self {
        PlanNode::Repeated {
            repeat_count,
            children,
        }
    }

    pub fn leaf(interval: RawInterval) -> Self {
        PlanNode::Leaf { interval }
    }
}

/// Leaf fields exactly as the tree format encodes them.
///
/// Codes and magnitudes are strings in the source documents; numbers are
/// accepted too and kept in their textual form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInterval {
    #[serde(default, deserialize_with = "lenient_string")]
    pub interval_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub interval_unit: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub interval_unit_value: String,
    /// `"1"` when `alert_rule_detail` holds a pace range
    #[serde(default, deserialize_with = "lenient_string")]
    pub alert_rule: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub alert_rule_detail: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub interval_desc: String,
}

impl RawInterval {
    pub fn new(type_code: &str, unit_code: &str, value: &str, description: &str) -> Self {
        Self {
            interval_type: type_code.to_string(),
            interval_unit: unit_code.to_string(),
            interval_unit_value: value.to_string(),
            interval_desc: description.to_string(),
            ..Self::default()
        }
    }

    /// Attach a pace alert rule, `"<fast pace>-<slow pace>"`.
    pub fn with_pace_rule(mut self, detail: &str) -> Self {
        self.alert_rule = "1".to_string();
        self.alert_rule_detail = detail.to_string();
        self
    }

    /// Translate the encoded fields into an [`IntervalSpec`].
    pub fn decode(&self) -> Result<IntervalSpec> {
        let interval_type = IntervalType::from_code(&self.interval_type)?;
        let unit = IntervalUnit::from_code(&self.interval_unit)?;
        let magnitude = parse_magnitude(&self.interval_unit_value)?;

        let speed_bounds = if is_pace_rule(&self.alert_rule) {
            Some(parse_pace_rule(&self.alert_rule_detail)?)
        } else {
            None
        };

        Ok(IntervalSpec {
            interval_type,
            unit,
            magnitude,
            speed_bounds,
            description: self.interval_desc.clone(),
        })
    }
}

fn is_pace_rule(alert_rule: &str) -> bool {
    alert_rule.trim().parse::<f64>().map_or(false, |v| v == 1.0)
}

fn parse_magnitude(value: &str) -> Result<f64> {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(TrainingError::InvalidMagnitude {
            value: value.to_string(),
        }),
    }
}

/// Speed bounds from a pace range `"a-b"`.
///
/// Each side converts as `speed = 1000 / pace`. Smaller pace numbers are faster,
/// so the first value gives the maximum speed and the second the minimum.
fn parse_pace_rule(detail: &str) -> Result<SpeedBounds> {
    let invalid = || TrainingError::InvalidPaceRule {
        detail: detail.to_string(),
    };

    let (fast, slow) = detail.trim().split_once('-').ok_or_else(invalid)?;
    let to_speed = |pace: &str| match pace.trim().parse::<f64>() {
        Ok(p) if p.is_finite() && p > 0.0 => Ok(1000.0 / p),
        _ => Err(invalid()),
    };

    Ok(SpeedBounds {
        max: to_speed(fast)?,
        min: to_speed(slow)?,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

// ============================================================================
// Flattening
// ============================================================================

enum Step<'a> {
    Visit(&'a PlanNode),
    /// Marks the end of a repeated group whose first lap starts at `lap_start`
    Repeat { times: u32, lap_start: usize },
}

/// Flatten a plan tree into its ordered leaf intervals.
///
/// Sequential groups concatenate their children; repeated groups unroll their
/// children `repeat_count` times (zero yields nothing); leaves are decoded;
/// unknown nodes are skipped. The walk uses an explicit stack, so deeply nested
/// plans cannot overflow the call stack.
///
/// Fails on the first leaf with an unrecognized type or unit code, a
/// non-numeric magnitude or a malformed pace rule.
///
/// # Example
///
/// ```rust
/// use workout_intervals::plan::{flatten, PlanNode, RawInterval};
///
/// let plan = PlanNode::sequential(vec![
///     PlanNode::leaf(RawInterval::new("0", "1", "60", "z2")),
///     PlanNode::repeated(2, vec![PlanNode::leaf(RawInterval::new("1", "0", "1000", "z1"))]),
/// ]);
///
/// let specs = flatten(&plan).unwrap();
/// assert_eq!(specs.len(), 3);
/// assert_eq!(specs[2].description, "z1");
/// ```
pub fn flatten(node: &PlanNode) -> Result<Vec<IntervalSpec>> {
    let mut out: Vec<IntervalSpec> = Vec::new();
    let mut stack = vec![Step::Visit(node)];

    while let Some(step) = stack.pop() {
        match step {
            Step::Visit(PlanNode::Sequential { children }) => {
                stack.extend(children.iter().rev().map(Step::Visit));
            }
            Step::Visit(PlanNode::Repeated {
                repeat_count,
                children,
            }) => {
                stack.push(Step::Repeat {
                    times: *repeat_count,
                    lap_start: out.len(),
                });
                stack.extend(children.iter().rev().map(Step::Visit));
            }
            Step::Visit(PlanNode::Leaf { interval }) => out.push(interval.decode()?),
            Step::Visit(PlanNode::Unknown) => {}
            Step::Repeat { times, lap_start } => {
                if times == 0 {
                    out.truncate(lap_start);
                } else {
                    let lap = out[lap_start..].to_vec();
                    for _ in 1..times {
                        out.extend_from_slice(&lap);
                    }
                }
            }
        }
    }

    Ok(out)
}

/// The plan compiled into the crate, flattened.
pub fn embedded_template() -> Result<TrainingTemplate> {
    ZeppTemplate::from_json(EMBEDDED_TEMPLATE)?.to_template()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time_leaf(seconds: &str, desc: &str) -> PlanNode {
        PlanNode::leaf(RawInterval::new("1", "1", seconds, desc))
    }

    fn distance_leaf(meters: &str, desc: &str) -> PlanNode {
        PlanNode::leaf(RawInterval::new("1", "0", meters, desc))
    }

    #[test]
    fn test_decode_codes() {
        let spec = RawInterval::new("4", "0", "400", "trote").decode().unwrap();
        assert_eq!(spec.interval_type, IntervalType::Cooldown);
        assert_eq!(spec.unit, IntervalUnit::Distance);
        assert_eq!(spec.magnitude, 400.0);
        assert_eq!(spec.speed_bounds, None);

        let spec = RawInterval::new("0", "1", "90", "").decode().unwrap();
        assert_eq!(spec.interval_type, IntervalType::WarmUp);
        assert_eq!(spec.unit, IntervalUnit::Time);
    }

    #[test]
    fn test_unknown_codes_are_fatal() {
        assert_eq!(
            RawInterval::new("7", "1", "60", "").decode(),
            Err(TrainingError::UnknownIntervalType { code: "7".to_string() })
        );
        assert_eq!(
            RawInterval::new("1", "2", "60", "").decode(),
            Err(TrainingError::UnknownIntervalUnit { code: "2".to_string() })
        );
        assert!(matches!(
            RawInterval::new("1", "1", "ten", "").decode(),
            Err(TrainingError::InvalidMagnitude { .. })
        ));
        assert!(matches!(
            RawInterval::new("1", "1", "-5", "").decode(),
            Err(TrainingError::InvalidMagnitude { .. })
        ));
    }

    #[test]
    fn test_pace_rule_inverts_to_speed() {
        let spec = RawInterval::new("1", "0", "1000", "z3")
            .with_pace_rule("250-300")
            .decode()
            .unwrap();
        let bounds = spec.speed_bounds.unwrap();
        assert_eq!(bounds.max, 4.0);
        assert!((bounds.min - 1000.0 / 300.0).abs() < 1e-12);
        assert!(bounds.max > bounds.min);
    }

    #[test]
    fn test_malformed_pace_rule() {
        for detail in ["", "250", "abc-300", "250-0"] {
            let result = RawInterval::new("1", "0", "1000", "").with_pace_rule(detail).decode();
            assert!(
                matches!(result, Err(TrainingError::InvalidPaceRule { .. })),
                "detail {:?} should be rejected",
                detail
            );
        }
    }

    #[test]
    fn test_pace_rule_ignored_when_alert_off() {
        let mut raw = RawInterval::new("1", "0", "1000", "");
        raw.alert_rule = "0".to_string();
        raw.alert_rule_detail = "garbage".to_string();
        assert_eq!(raw.decode().unwrap().speed_bounds, None);
    }

    #[test]
    fn test_flatten_sequential_then_repeat() {
        let plan = PlanNode::sequential(vec![
            time_leaf("60", "z2"),
            PlanNode::repeated(2, vec![distance_leaf("1000", "z1")]),
        ]);
        let specs = flatten(&plan).unwrap();

        assert_eq!(specs.len(), 3);
        assert_eq!((specs[0].unit, specs[0].magnitude), (IntervalUnit::Time, 60.0));
        assert_eq!(specs[0].description, "z2");
        for spec in &specs[1..] {
            assert_eq!((spec.unit, spec.magnitude), (IntervalUnit::Distance, 1000.0));
            assert_eq!(spec.description, "z1");
        }
    }

    #[test]
    fn test_repeat_unrolls_whole_lap() {
        let plan = PlanNode::repeated(
            3,
            vec![distance_leaf("400", "z4"), time_leaf("90", "trote")],
        );
        let descs: Vec<String> = flatten(&plan)
            .unwrap()
            .into_iter()
            .map(|s| s.description)
            .collect();
        assert_eq!(descs, ["z4", "trote", "z4", "trote", "z4", "trote"]);
    }

    #[test]
    fn test_zero_repeats_is_empty() {
        let plan = PlanNode::sequential(vec![
            time_leaf("60", "a"),
            PlanNode::repeated(0, vec![time_leaf("30", "b"), time_leaf("30", "c")]),
            time_leaf("60", "d"),
        ]);
        let descs: Vec<String> = flatten(&plan)
            .unwrap()
            .into_iter()
            .map(|s| s.description)
            .collect();
        assert_eq!(descs, ["a", "d"]);
    }

    #[test]
    fn test_nested_repeats() {
        let inner = PlanNode::repeated(2, vec![time_leaf("30", "x")]);
        let plan = PlanNode::repeated(3, vec![inner, time_leaf("60", "y")]);
        assert_eq!(flatten(&plan).unwrap().len(), 3 * (2 + 1));
    }

    #[test]
    fn test_unknown_nodes_skipped() {
        let plan = PlanNode::sequential(vec![PlanNode::Unknown, time_leaf("60", "z1")]);
        assert_eq!(flatten(&plan).unwrap().len(), 1);
    }

    #[test]
    fn test_deep_nesting_does_not_recurse() {
        let mut node = time_leaf("1", "z1");
        for _ in 0..100_000 {
            node = PlanNode::sequential(vec![node]);
        }
        assert_eq!(flatten(&node).unwrap().len(), 1);
        // Drop recurses once per level
        std::mem::forget(node);
    }

    #[test]
    fn test_decode_error_aborts_flatten() {
        let plan = PlanNode::sequential(vec![
            time_leaf("60", "ok"),
            PlanNode::leaf(RawInterval::new("9", "1", "60", "bad")),
        ]);
        assert!(matches!(
            flatten(&plan),
            Err(TrainingError::UnknownIntervalType { .. })
        ));
    }

    #[test]
    fn test_parse_zepp_json() {
        let json = r#"{
            "title": "Intervalado",
            "description": "4x400",
            "trainingIntervals": {
                "type": "PARENT",
                "children": [
                    { "type": "NODE", "trainingInterval": {
                        "intervalType": "0", "intervalUnit": "1", "intervalUnitValue": "600",
                        "alertRule": "0", "alertRuleDetail": "", "lengthUnit": 0,
                        "intervalDesc": "Trote" } },
                    { "type": "CIRCLE", "circleTimes": 4, "children": [
                        { "type": "NODE", "trainingInterval": {
                            "intervalType": 1, "intervalUnit": 0, "intervalUnitValue": 400,
                            "alertRule": "1", "alertRuleDetail": "240-270",
                            "intervalDesc": "Z4" } },
                        { "type": "NOTE", "text": "breathe" }
                    ] }
                ]
            }
        }"#;

        let template = ZeppTemplate::from_json(json).unwrap().to_template().unwrap();
        assert_eq!(template.title, "Intervalado");
        assert_eq!(template.intervals.len(), 5);
        assert_eq!(template.intervals[0].unit, IntervalUnit::Time);
        assert_eq!(template.intervals[0].magnitude, 600.0);
        assert_eq!(template.intervals[4].unit, IntervalUnit::Distance);
        assert_eq!(template.intervals[4].magnitude, 400.0);
        assert!(template.intervals[4].speed_bounds.is_some());
    }

    #[test]
    fn test_flat_template_json() {
        let json = r#"{
            "title": "Easy",
            "intervals": [
                { "type": "warmUp", "unit": "time", "unitValue": 300, "description": "caminhada" },
                { "type": "training", "unit": "distance", "unitValue": 5000,
                  "speedBounds": { "min": 2.5, "max": 3.0 }, "description": "z2" }
            ]
        }"#;
        let template = TrainingTemplate::from_json(json).unwrap();
        assert_eq!(template.intervals.len(), 2);
        assert_eq!(template.intervals[0].interval_type, IntervalType::WarmUp);
        assert_eq!(
            template.intervals[1].speed_bounds,
            Some(SpeedBounds { min: 2.5, max: 3.0 })
        );
    }

    #[test]
    fn test_embedded_template_loads() {
        let template = embedded_template().unwrap();
        assert!(!template.intervals.is_empty());
    }
}
