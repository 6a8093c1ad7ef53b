use crate::error::StorageError;
use crate::store::DataStore;
use crate::timeline::PatientTimeline;
use std::sync::Arc;
use vitalwatch_common::types::{MeasurementRecord, MeasurementValue, RecordType};

const T0: i64 = 1_622_470_420_000;

fn heart_rate(patient_id: u32, bpm: f64, ts: i64) -> MeasurementRecord {
    MeasurementRecord::new(patient_id, RecordType::HeartRate, MeasurementValue::from(bpm), ts)
}

#[test]
fn add_and_query_single_measurement() {
    let store = DataStore::new();
    store
        .add_record(1, RecordType::HeartRate, MeasurementValue::from(98.6), T0)
        .unwrap();

    let records = store.records(1, T0, T0);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].patient_id(), 1);
    assert_eq!(records[0].record_type(), &RecordType::HeartRate);
    assert_eq!(records[0].value().as_scalar(), Some(98.6));
    assert_eq!(records[0].timestamp(), T0);
}

#[test]
fn query_filters_by_inclusive_range() {
    let store = DataStore::new();
    store
        .add_record(1, RecordType::HeartRate, MeasurementValue::from(98.6), T0)
        .unwrap();
    store
        .add_record(
            1,
            RecordType::BloodPressure,
            MeasurementValue::from((120.0, 80.0)),
            T0 + 100_000,
        )
        .unwrap();

    assert_eq!(store.records(1, T0 - 20_000, T0 + 80_000).len(), 1);
    assert_eq!(store.records(1, T0, T0 + 100_000).len(), 2);
    assert!(store.records(1, T0 + 180_000, T0 + 280_000).is_empty());
}

#[test]
fn unknown_patient_and_inverted_range_are_empty() {
    let store = DataStore::new();
    assert!(store.records(99, 0, i64::MAX).is_empty());

    store
        .add_record(1, RecordType::HeartRate, MeasurementValue::from(70.0), T0)
        .unwrap();
    assert!(store.records(1, T0 + 1, T0 - 1).is_empty());
}

#[test]
fn out_of_order_arrivals_are_returned_sorted() {
    let store = DataStore::new();
    for ts in [T0 + 300, T0, T0 + 200, T0 + 100] {
        store.add_measurement(heart_rate(4, 70.0, ts)).unwrap();
    }

    let timestamps: Vec<i64> = store
        .records(4, T0, T0 + 300)
        .iter()
        .map(|r| r.timestamp())
        .collect();
    assert_eq!(timestamps, vec![T0, T0 + 100, T0 + 200, T0 + 300]);
}

#[test]
fn equal_timestamps_keep_insertion_order() {
    let mut timeline = PatientTimeline::new(2);
    timeline.insert(heart_rate(2, 60.0, T0 + 10));
    timeline.insert(heart_rate(2, 61.0, T0));
    timeline.insert(heart_rate(2, 62.0, T0));

    let values: Vec<f64> = timeline
        .records(T0, T0 + 10)
        .iter()
        .filter_map(|r| r.value().as_scalar())
        .collect();
    assert_eq!(values, vec![61.0, 62.0, 60.0]);
    assert_eq!(timeline.latest_timestamp(), Some(T0 + 10));
}

#[test]
fn blood_pressure_rejects_scalar() {
    let store = DataStore::new();
    let err = store
        .add_record(1, RecordType::BloodPressure, MeasurementValue::from(120.0), T0)
        .unwrap_err();
    assert!(matches!(
        err,
        StorageError::InvalidMeasurement {
            record_type: RecordType::BloodPressure,
            ..
        }
    ));
    assert_eq!(store.record_count(1), 0);
}

#[test]
fn scalar_signals_reject_pairs() {
    let store = DataStore::new();
    for record_type in [RecordType::HeartRate, RecordType::BloodSaturation] {
        let result = store.add_record(2, record_type, MeasurementValue::from((1.0, 2.0)), T0);
        assert!(result.is_err());
    }
    assert!(store.records(2, 0, i64::MAX).is_empty());
}

#[test]
fn non_finite_values_are_rejected() {
    let store = DataStore::new();
    let result = store.add_record(3, RecordType::BloodSaturation, MeasurementValue::from(f64::NAN), T0);
    assert!(result.is_err());
}

#[test]
fn blood_pressure_accepts_two_element_vector() {
    let store = DataStore::new();
    store
        .add_record(
            5,
            RecordType::BloodPressure,
            MeasurementValue::from(vec![85.0, 60.0]),
            T0,
        )
        .unwrap();
    let records = store.records(5, T0, T0);
    assert_eq!(records[0].value().as_pair(), Some((85.0, 60.0)));
}

#[test]
fn unknown_record_types_are_stored_as_is() {
    let store = DataStore::new();
    let values = vec![98.6, 99.0, 98.7];
    store
        .add_record(
            1,
            RecordType::from_label("Temperature"),
            MeasurementValue::from(values.clone()),
            T0,
        )
        .unwrap();

    let records = store.records(1, T0, T0);
    assert_eq!(records[0].value(), &MeasurementValue::Vector(values));
    assert_eq!(records[0].record_type().as_str(), "Temperature");
}

#[test]
fn list_patients_reports_each_patient_once() {
    let store = DataStore::new();
    store.add_measurement(heart_rate(2, 70.0, T0)).unwrap();
    store.add_measurement(heart_rate(1, 70.0, T0)).unwrap();
    store.add_measurement(heart_rate(1, 71.0, T0 + 1)).unwrap();

    let patients: Vec<u32> = store.list_patients().into_iter().collect();
    assert_eq!(patients, vec![1, 2]);
    assert_eq!(store.patient_count(), 2);
    assert_eq!(store.record_count(1), 2);
    assert_eq!(store.latest_timestamp(1), Some(T0 + 1));
    assert_eq!(store.latest_timestamp(3), None);
}

#[test]
fn concurrent_writers_lose_no_records() {
    let store = Arc::new(DataStore::new());
    let writers_per_patient = 4;
    let records_per_writer = 250;

    std::thread::scope(|scope| {
        for patient_id in 0..4u32 {
            for writer in 0..writers_per_patient {
                let store = Arc::clone(&store);
                scope.spawn(move || {
                    for i in 0..records_per_writer {
                        let ts = T0 + (i * writers_per_patient + writer) as i64;
                        store.add_measurement(heart_rate(patient_id, 70.0, ts)).unwrap();
                    }
                });
            }
        }
        // A reader running alongside must only ever see sorted snapshots.
        let store = Arc::clone(&store);
        scope.spawn(move || {
            for _ in 0..100 {
                let records = store.records(0, 0, i64::MAX);
                assert!(records
                    .windows(2)
                    .all(|w| w[0].timestamp() <= w[1].timestamp()));
            }
        });
    });

    for patient_id in 0..4u32 {
        assert_eq!(
            store.record_count(patient_id),
            writers_per_patient * records_per_writer
        );
    }
}
