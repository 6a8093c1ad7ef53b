use crate::error::{Result, StorageError};
use crate::timeline::PatientTimeline;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use vitalwatch_common::types::{MeasurementRecord, MeasurementValue, PatientId, RecordType};

type SharedTimeline = Arc<RwLock<PatientTimeline>>;

/// Registry of patient timelines and the concurrency boundary for all
/// ingestion and query traffic.
///
/// Construct one per process (or per test) and share it through an `Arc`.
///
/// # Examples
///
/// ```
/// use vitalwatch_common::types::{MeasurementValue, RecordType};
/// use vitalwatch_storage::DataStore;
///
/// let store = DataStore::new();
/// store
///     .add_record(1, RecordType::BloodPressure, MeasurementValue::from((120.0, 80.0)), 1_000)
///     .unwrap();
/// assert_eq!(store.records(1, 0, 2_000).len(), 1);
/// assert!(store.records(99, 0, 2_000).is_empty());
/// ```
#[derive(Default)]
pub struct DataStore {
    patients: RwLock<HashMap<PatientId, SharedTimeline>>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_patients(&self) -> RwLockReadGuard<'_, HashMap<PatientId, SharedTimeline>> {
        self.patients
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_patients(&self) -> RwLockWriteGuard<'_, HashMap<PatientId, SharedTimeline>> {
        self.patients
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn timeline(&self, patient_id: PatientId) -> Option<SharedTimeline> {
        self.read_patients().get(&patient_id).cloned()
    }

    fn timeline_or_create(&self, patient_id: PatientId) -> SharedTimeline {
        if let Some(timeline) = self.timeline(patient_id) {
            return timeline;
        }
        let mut patients = self.write_patients();
        patients
            .entry(patient_id)
            .or_insert_with(|| {
                tracing::debug!(patient_id, "Created patient timeline");
                Arc::new(RwLock::new(PatientTimeline::new(patient_id)))
            })
            .clone()
    }

    /// Validates and stores one measurement.
    ///
    /// A two-element vector supplied for `BloodPressure` is accepted as a
    /// systolic/diastolic pair.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidMeasurement`] when the value shape does
    /// not fit the record type or the value is not finite. Nothing is stored
    /// in that case.
    pub fn add_record(
        &self,
        patient_id: PatientId,
        record_type: RecordType,
        value: MeasurementValue,
        timestamp: i64,
    ) -> Result<()> {
        let value = validate(&record_type, value)?;
        self.add_measurement(MeasurementRecord::new(
            patient_id,
            record_type,
            value,
            timestamp,
        ))
    }

    /// Stores an already constructed record, applying the same validation as
    /// [`DataStore::add_record`].
    pub fn add_measurement(&self, record: MeasurementRecord) -> Result<()> {
        let value = validate(record.record_type(), record.value().clone())?;
        let record = if &value == record.value() {
            record
        } else {
            MeasurementRecord::new(
                record.patient_id(),
                record.record_type().clone(),
                value,
                record.timestamp(),
            )
        };

        let timeline = self.timeline_or_create(record.patient_id());
        let mut timeline = timeline
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        tracing::trace!(
            patient_id = record.patient_id(),
            record_type = %record.record_type(),
            timestamp = record.timestamp(),
            "Stored measurement"
        );
        timeline.insert(record);
        Ok(())
    }

    /// Records of `patient_id` with `start <= timestamp <= end`, ascending.
    ///
    /// Unknown patients and empty or inverted ranges yield an empty vector.
    pub fn records(&self, patient_id: PatientId, start: i64, end: i64) -> Vec<MeasurementRecord> {
        match self.timeline(patient_id) {
            Some(timeline) => timeline
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .records(start, end),
            None => Vec::new(),
        }
    }

    pub fn list_patients(&self) -> BTreeSet<PatientId> {
        self.read_patients().keys().copied().collect()
    }

    pub fn patient_count(&self) -> usize {
        self.read_patients().len()
    }

    pub fn record_count(&self, patient_id: PatientId) -> usize {
        self.timeline(patient_id)
            .map(|t| t.read().unwrap_or_else(|p| p.into_inner()).len())
            .unwrap_or(0)
    }

    /// Newest timestamp stored for the patient, used to anchor evaluation
    /// windows.
    pub fn latest_timestamp(&self, patient_id: PatientId) -> Option<i64> {
        self.timeline(patient_id)
            .and_then(|t| t.read().unwrap_or_else(|p| p.into_inner()).latest_timestamp())
    }
}

fn validate(record_type: &RecordType, value: MeasurementValue) -> Result<MeasurementValue> {
    let invalid = |reason: String| StorageError::InvalidMeasurement {
        record_type: record_type.clone(),
        reason,
    };

    if !value.is_finite() {
        return Err(invalid(format!("non-finite {} value", value.shape())));
    }

    match (record_type, value) {
        (RecordType::BloodPressure, value @ MeasurementValue::Pair { .. }) => Ok(value),
        (RecordType::BloodPressure, MeasurementValue::Vector(values)) if values.len() == 2 => {
            Ok(MeasurementValue::from((values[0], values[1])))
        }
        (RecordType::BloodPressure, value) => Err(invalid(format!(
            "expected a systolic/diastolic pair, got {}",
            value.shape()
        ))),
        (
            RecordType::HeartRate | RecordType::BloodSaturation,
            value @ MeasurementValue::Scalar(_),
        ) => Ok(value),
        (RecordType::HeartRate | RecordType::BloodSaturation, value) => Err(invalid(format!(
            "expected a scalar, got {}",
            value.shape()
        ))),
        (RecordType::Other(_), value) => Ok(value),
    }
}
