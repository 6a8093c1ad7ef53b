use crate::thresholds::BloodPressureThresholds;
use crate::SignalEvaluator;
use vitalwatch_common::types::{Alert, AlertCondition, MeasurementRecord, RecordType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Increasing,
    Decreasing,
}

/// Consecutive-step counters for one pressure component.
#[derive(Debug, Default, Clone)]
struct TrendCounter {
    increases: u32,
    decreases: u32,
}

impl TrendCounter {
    /// Records one step and returns the direction of a completed trend.
    /// The completed counter is reset so the next full run fires again.
    fn step(&mut self, previous: f64, current: f64, min_step: f64, length: u32) -> Option<Direction> {
        if current - previous > min_step {
            self.increases += 1;
            self.decreases = 0;
        } else if previous - current > min_step {
            self.decreases += 1;
            self.increases = 0;
        } else {
            self.increases = 0;
            self.decreases = 0;
            return None;
        }

        if self.increases >= length {
            self.increases = 0;
            Some(Direction::Increasing)
        } else if self.decreases >= length {
            self.decreases = 0;
            Some(Direction::Decreasing)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct LastReading {
    timestamp: i64,
    systolic: f64,
    diastolic: f64,
}

/// Critical thresholds plus independent systolic and diastolic trend
/// tracking.
pub struct BloodPressureEvaluator {
    patient_id: u32,
    thresholds: BloodPressureThresholds,
    last: Option<LastReading>,
    systolic: TrendCounter,
    diastolic: TrendCounter,
}

impl BloodPressureEvaluator {
    pub fn new(patient_id: u32, thresholds: BloodPressureThresholds) -> Self {
        Self {
            patient_id,
            thresholds,
            last: None,
            systolic: TrendCounter::default(),
            diastolic: TrendCounter::default(),
        }
    }

    fn is_critical(&self, systolic: f64, diastolic: f64) -> bool {
        let t = &self.thresholds;
        systolic > t.systolic_high
            || systolic < t.systolic_low
            || diastolic > t.diastolic_high
            || diastolic < t.diastolic_low
    }
}

impl SignalEvaluator for BloodPressureEvaluator {
    fn name(&self) -> &'static str {
        "blood_pressure"
    }

    fn record_type(&self) -> RecordType {
        RecordType::BloodPressure
    }

    fn observe(&mut self, record: &MeasurementRecord) -> Vec<Alert> {
        let Some((systolic, diastolic)) = record.value().as_pair() else {
            return Vec::new();
        };
        let ts = record.timestamp();
        let mut alerts = Vec::new();

        if self.is_critical(systolic, diastolic) {
            alerts.push(Alert::new(
                self.patient_id,
                AlertCondition::CriticalBloodPressureThreshold,
                ts,
            ));
        }

        if self.last.is_some_and(|last| ts < last.timestamp) {
            return alerts;
        }

        if let Some(last) = self.last {
            let step = self.thresholds.trend_step;
            let length = self.thresholds.trend_length;

            match self.systolic.step(last.systolic, systolic, step, length) {
                Some(Direction::Increasing) => alerts.push(Alert::new(
                    self.patient_id,
                    AlertCondition::IncreasingSystolicBloodPressureTrend,
                    ts,
                )),
                Some(Direction::Decreasing) => alerts.push(Alert::new(
                    self.patient_id,
                    AlertCondition::DecreasingSystolicBloodPressureTrend,
                    ts,
                )),
                None => {}
            }

            match self.diastolic.step(last.diastolic, diastolic, step, length) {
                Some(Direction::Increasing) => alerts.push(Alert::new(
                    self.patient_id,
                    AlertCondition::IncreasingDiastolicBloodPressureTrend,
                    ts,
                )),
                Some(Direction::Decreasing) => alerts.push(Alert::new(
                    self.patient_id,
                    AlertCondition::DecreasingDiastolicBloodPressureTrend,
                    ts,
                )),
                None => {}
            }
        }

        self.last = Some(LastReading {
            timestamp: ts,
            systolic,
            diastolic,
        });
        alerts
    }
}
