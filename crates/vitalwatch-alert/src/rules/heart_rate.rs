use crate::thresholds::HeartRateThresholds;
use crate::window::Reading;
use crate::SignalEvaluator;
use vitalwatch_common::types::{Alert, AlertCondition, MeasurementRecord, RecordType};

/// Abnormal-rate threshold check and beat-interval rhythm check.
pub struct HeartRateEvaluator {
    patient_id: u32,
    thresholds: HeartRateThresholds,
    previous: Option<Reading>,
}

impl HeartRateEvaluator {
    pub fn new(patient_id: u32, thresholds: HeartRateThresholds) -> Self {
        Self {
            patient_id,
            thresholds,
            previous: None,
        }
    }

    /// Compares the gap to the previous reading with the interval implied by
    /// the current rate. Zero gaps and non-positive rates are skipped.
    fn is_irregular(&self, ts: i64, rate: f64) -> bool {
        let Some(previous) = self.previous else {
            return false;
        };
        let interval = ts.saturating_sub(previous.timestamp);
        if interval == 0 || rate <= 0.0 {
            return false;
        }
        let expected = 60_000.0 / rate;
        (interval as f64 - expected).abs() > self.thresholds.irregular_tolerance_ms
    }
}

impl SignalEvaluator for HeartRateEvaluator {
    fn name(&self) -> &'static str {
        "heart_rate"
    }

    fn record_type(&self) -> RecordType {
        RecordType::HeartRate
    }

    fn observe(&mut self, record: &MeasurementRecord) -> Vec<Alert> {
        let Some(rate) = record.value().as_scalar() else {
            return Vec::new();
        };
        let ts = record.timestamp();
        let mut alerts = Vec::new();

        if rate < self.thresholds.low || rate > self.thresholds.high {
            alerts.push(Alert::new(
                self.patient_id,
                AlertCondition::AbnormalHeartRate,
                ts,
            ));
        }

        if self.previous.is_some_and(|p| ts < p.timestamp) {
            return alerts;
        }

        if self.is_irregular(ts, rate) {
            alerts.push(Alert::new(
                self.patient_id,
                AlertCondition::IrregularHeartBeat,
                ts,
            ));
        }

        self.previous = Some(Reading {
            timestamp: ts,
            value: rate,
        });
        alerts
    }
}
