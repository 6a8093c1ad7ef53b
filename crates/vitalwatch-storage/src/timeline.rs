use vitalwatch_common::types::{MeasurementRecord, PatientId};

/// All records of one patient, kept sorted by timestamp.
///
/// Records that share a timestamp keep their insertion order.
#[derive(Debug, Clone)]
pub struct PatientTimeline {
    patient_id: PatientId,
    records: Vec<MeasurementRecord>,
}

impl PatientTimeline {
    pub fn new(patient_id: PatientId) -> Self {
        Self {
            patient_id,
            records: Vec::new(),
        }
    }

    pub fn patient_id(&self) -> PatientId {
        self.patient_id
    }

    /// Inserts a record at its timestamp position. In-order arrivals append.
    pub fn insert(&mut self, record: MeasurementRecord) {
        let ts = record.timestamp();
        match self.records.last() {
            Some(last) if last.timestamp() > ts => {
                let pos = self.records.partition_point(|r| r.timestamp() <= ts);
                self.records.insert(pos, record);
            }
            _ => self.records.push(record),
        }
    }

    /// Records with `start <= timestamp <= end`, ascending. Empty when
    /// `start > end`.
    pub fn records(&self, start: i64, end: i64) -> Vec<MeasurementRecord> {
        if start > end {
            return Vec::new();
        }
        let lower = self.records.partition_point(|r| r.timestamp() < start);
        let upper = self.records.partition_point(|r| r.timestamp() <= end);
        if lower >= upper {
            return Vec::new();
        }
        self.records[lower..upper].to_vec()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn latest_timestamp(&self) -> Option<i64> {
        self.records.last().map(|r| r.timestamp())
    }
}
