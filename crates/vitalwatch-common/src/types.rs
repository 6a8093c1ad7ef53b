use crate::id::{next_record_id, RecordId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Externally assigned patient identifier. Never reused within a run.
pub type PatientId = u32;

/// Category of a physiological measurement.
///
/// Labels that no evaluator knows about are kept as [`RecordType::Other`] so
/// the store stays generic over future signal types.
///
/// # Examples
///
/// ```
/// use vitalwatch_common::types::RecordType;
///
/// assert_eq!(RecordType::from_label("BloodPressure"), RecordType::BloodPressure);
/// assert_eq!(RecordType::from_label("Cholesterol"), RecordType::Other("Cholesterol".into()));
/// assert_eq!(RecordType::HeartRate.to_string(), "HeartRate");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordType {
    HeartRate,
    BloodPressure,
    BloodSaturation,
    Other(String),
}

impl RecordType {
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "HeartRate" => RecordType::HeartRate,
            "BloodPressure" => RecordType::BloodPressure,
            "BloodSaturation" => RecordType::BloodSaturation,
            other => RecordType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RecordType::HeartRate => "HeartRate",
            RecordType::BloodPressure => "BloodPressure",
            RecordType::BloodSaturation => "BloodSaturation",
            RecordType::Other(label) => label,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecordType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(RecordType::from_label(s))
    }
}

/// The observed value of a measurement: a single scalar, a blood-pressure
/// pair, or a free-form vector for record types without an evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MeasurementValue {
    Scalar(f64),
    Pair { systolic: f64, diastolic: f64 },
    Vector(Vec<f64>),
}

impl MeasurementValue {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            MeasurementValue::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns `(systolic, diastolic)` for a pair value.
    pub fn as_pair(&self) -> Option<(f64, f64)> {
        match self {
            MeasurementValue::Pair {
                systolic,
                diastolic,
            } => Some((*systolic, *diastolic)),
            _ => None,
        }
    }

    pub fn is_finite(&self) -> bool {
        match self {
            MeasurementValue::Scalar(v) => v.is_finite(),
            MeasurementValue::Pair {
                systolic,
                diastolic,
            } => systolic.is_finite() && diastolic.is_finite(),
            MeasurementValue::Vector(values) => values.iter().all(|v| v.is_finite()),
        }
    }

    /// Short shape name used in validation messages.
    pub fn shape(&self) -> &'static str {
        match self {
            MeasurementValue::Scalar(_) => "scalar",
            MeasurementValue::Pair { .. } => "pair",
            MeasurementValue::Vector(_) => "vector",
        }
    }
}

impl From<f64> for MeasurementValue {
    fn from(value: f64) -> Self {
        MeasurementValue::Scalar(value)
    }
}

impl From<(f64, f64)> for MeasurementValue {
    fn from((systolic, diastolic): (f64, f64)) -> Self {
        MeasurementValue::Pair {
            systolic,
            diastolic,
        }
    }
}

impl From<Vec<f64>> for MeasurementValue {
    fn from(values: Vec<f64>) -> Self {
        MeasurementValue::Vector(values)
    }
}

impl fmt::Display for MeasurementValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasurementValue::Scalar(v) => write!(f, "{v}"),
            MeasurementValue::Pair {
                systolic,
                diastolic,
            } => write!(f, "{systolic}/{diastolic}"),
            MeasurementValue::Vector(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", parts.join(";"))
            }
        }
    }
}

/// One observation for one patient at one instant.
///
/// Fields are private; a record never changes after construction. Every
/// constructed record gets its own [`RecordId`], which clones share.
/// Equality compares the observation only, not the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementRecord {
    #[serde(skip, default = "next_record_id")]
    id: RecordId,
    patient_id: PatientId,
    record_type: RecordType,
    value: MeasurementValue,
    /// Milliseconds since the Unix epoch.
    timestamp: i64,
}

impl MeasurementRecord {
    pub fn new(
        patient_id: PatientId,
        record_type: RecordType,
        value: MeasurementValue,
        timestamp: i64,
    ) -> Self {
        Self {
            id: next_record_id(),
            patient_id,
            record_type,
            value,
            timestamp,
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn patient_id(&self) -> PatientId {
        self.patient_id
    }

    pub fn record_type(&self) -> &RecordType {
        &self.record_type
    }

    pub fn value(&self) -> &MeasurementValue {
        &self.value
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

impl PartialEq for MeasurementRecord {
    fn eq(&self, other: &Self) -> bool {
        self.patient_id == other.patient_id
            && self.record_type == other.record_type
            && self.value == other.value
            && self.timestamp == other.timestamp
    }
}

/// Rule family an alert condition belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalFamily {
    BloodPressure,
    Saturation,
    HeartRate,
    CrossSignal,
}

/// Clinical condition that caused an alert.
///
/// # Examples
///
/// ```
/// use vitalwatch_common::types::{AlertCondition, SignalFamily};
///
/// let c: AlertCondition = "IrregularHeartBeat".parse().unwrap();
/// assert_eq!(c, AlertCondition::IrregularHeartBeat);
/// assert_eq!(c.family(), SignalFamily::HeartRate);
/// assert!("Bogus".parse::<AlertCondition>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertCondition {
    CriticalBloodPressureThreshold,
    IncreasingSystolicBloodPressureTrend,
    DecreasingSystolicBloodPressureTrend,
    IncreasingDiastolicBloodPressureTrend,
    DecreasingDiastolicBloodPressureTrend,
    LowBloodSaturation,
    RapidBloodSaturationDrop,
    HypotensiveHypoxemiaAlert,
    AbnormalHeartRate,
    IrregularHeartBeat,
}

impl AlertCondition {
    pub const ALL: [AlertCondition; 10] = [
        AlertCondition::CriticalBloodPressureThreshold,
        AlertCondition::IncreasingSystolicBloodPressureTrend,
        AlertCondition::DecreasingSystolicBloodPressureTrend,
        AlertCondition::IncreasingDiastolicBloodPressureTrend,
        AlertCondition::DecreasingDiastolicBloodPressureTrend,
        AlertCondition::LowBloodSaturation,
        AlertCondition::RapidBloodSaturationDrop,
        AlertCondition::HypotensiveHypoxemiaAlert,
        AlertCondition::AbnormalHeartRate,
        AlertCondition::IrregularHeartBeat,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CriticalBloodPressureThreshold => "CriticalBloodPressureThreshold",
            Self::IncreasingSystolicBloodPressureTrend => "IncreasingSystolicBloodPressureTrend",
            Self::DecreasingSystolicBloodPressureTrend => "DecreasingSystolicBloodPressureTrend",
            Self::IncreasingDiastolicBloodPressureTrend => "IncreasingDiastolicBloodPressureTrend",
            Self::DecreasingDiastolicBloodPressureTrend => "DecreasingDiastolicBloodPressureTrend",
            Self::LowBloodSaturation => "LowBloodSaturation",
            Self::RapidBloodSaturationDrop => "RapidBloodSaturationDrop",
            Self::HypotensiveHypoxemiaAlert => "HypotensiveHypoxemiaAlert",
            Self::AbnormalHeartRate => "AbnormalHeartRate",
            Self::IrregularHeartBeat => "IrregularHeartBeat",
        }
    }

    pub fn family(self) -> SignalFamily {
        match self {
            Self::CriticalBloodPressureThreshold
            | Self::IncreasingSystolicBloodPressureTrend
            | Self::DecreasingSystolicBloodPressureTrend
            | Self::IncreasingDiastolicBloodPressureTrend
            | Self::DecreasingDiastolicBloodPressureTrend => SignalFamily::BloodPressure,
            Self::LowBloodSaturation | Self::RapidBloodSaturationDrop => SignalFamily::Saturation,
            Self::AbnormalHeartRate | Self::IrregularHeartBeat => SignalFamily::HeartRate,
            Self::HypotensiveHypoxemiaAlert => SignalFamily::CrossSignal,
        }
    }
}

impl fmt::Display for AlertCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AlertCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlertCondition::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown alert condition: {s}"))
    }
}

/// A triggered alert.
///
/// `priority` and `repeat_count` are annotations attached at emission time;
/// they never change what triggered the alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub patient_id: PatientId,
    pub condition: AlertCondition,
    /// Timestamp of the triggering record, milliseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_count: Option<u32>,
}

impl Alert {
    pub fn new(patient_id: PatientId, condition: AlertCondition, timestamp: i64) -> Self {
        Self {
            patient_id,
            condition,
            timestamp,
            priority: None,
            repeat_count: None,
        }
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_repeat_count(mut self, repeat_count: u32) -> Self {
        self.repeat_count = Some(repeat_count);
        self
    }

    /// The alert timestamp as a UTC datetime, if it is in chrono's range.
    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}

/// Renders the alert and any annotations on one line.
///
/// # Examples
///
/// ```
/// use vitalwatch_common::types::{Alert, AlertCondition};
///
/// let alert = Alert::new(7, AlertCondition::IrregularHeartBeat, 1000)
///     .with_priority(1)
///     .with_repeat_count(3);
/// assert_eq!(
///     alert.to_string(),
///     "Alert{patientId=7, condition='IrregularHeartBeat', timestamp=1000}, Priority Level 1, Repeated 3 times"
/// );
/// ```
impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Alert{{patientId={}, condition='{}', timestamp={}}}",
            self.patient_id, self.condition, self.timestamp
        )?;
        if let Some(priority) = self.priority {
            write!(f, ", Priority Level {priority}")?;
        }
        if let Some(repeat_count) = self.repeat_count {
            write!(f, ", Repeated {repeat_count} times")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_type_round_trips_known_labels() {
        for label in ["HeartRate", "BloodPressure", "BloodSaturation"] {
            assert_eq!(RecordType::from_label(label).as_str(), label);
        }
        let other: RecordType = "Temperature".parse().unwrap();
        assert_eq!(other, RecordType::Other("Temperature".into()));
    }

    #[test]
    fn measurement_value_shape_accessors() {
        let bp = MeasurementValue::from((120.0, 80.0));
        assert_eq!(bp.as_pair(), Some((120.0, 80.0)));
        assert_eq!(bp.as_scalar(), None);
        assert_eq!(bp.to_string(), "120/80");

        let hr = MeasurementValue::from(72.5);
        assert_eq!(hr.as_scalar(), Some(72.5));
        assert!(hr.is_finite());
        assert!(!MeasurementValue::from(f64::NAN).is_finite());
    }

    #[test]
    fn alert_serializes_without_empty_annotations() {
        let alert = Alert::new(3, AlertCondition::LowBloodSaturation, 42);
        let json = serde_json::to_string(&alert).unwrap();
        assert!(!json.contains("priority"));
        assert!(!json.contains("repeat_count"));

        let annotated = alert.with_priority(2);
        let json = serde_json::to_string(&annotated).unwrap();
        let back: Alert = serde_json::from_str(&json).unwrap();
        assert_eq!(back.priority, Some(2));
    }

    #[test]
    fn records_get_distinct_ids_but_compare_by_content() {
        let a = MeasurementRecord::new(1, RecordType::HeartRate, MeasurementValue::from(70.0), 5);
        let b = MeasurementRecord::new(1, RecordType::HeartRate, MeasurementValue::from(70.0), 5);
        assert_ne!(a.id(), b.id());
        assert_eq!(a, b);
        assert_eq!(a.clone().id(), a.id());
    }

    #[test]
    fn every_condition_parses_from_its_name() {
        for condition in AlertCondition::ALL {
            assert_eq!(condition.as_str().parse::<AlertCondition>(), Ok(condition));
        }
    }
}
