use crate::thresholds::{RapidDropBaseline, SaturationThresholds};
use crate::window::{Reading, SlidingWindow};
use crate::SignalEvaluator;
use vitalwatch_common::types::{Alert, AlertCondition, MeasurementRecord, RecordType};

const WINDOW_CAPACITY: usize = 64;

/// Low-saturation level check and rapid-drop detection.
///
/// Only readings inside the drop window are kept. With the default
/// [`RapidDropBaseline::PreviousReading`] the newest of them is the baseline.
pub struct SaturationEvaluator {
    patient_id: u32,
    thresholds: SaturationThresholds,
    window: SlidingWindow,
}

impl SaturationEvaluator {
    pub fn new(patient_id: u32, thresholds: SaturationThresholds) -> Self {
        let window = SlidingWindow::with_span(thresholds.rapid_drop_window_ms, WINDOW_CAPACITY);
        Self {
            patient_id,
            thresholds,
            window,
        }
    }

    fn baseline(&self, now: i64) -> Option<f64> {
        match self.thresholds.rapid_drop_baseline {
            RapidDropBaseline::PreviousReading => self
                .window
                .latest()
                .filter(|prev| {
                    now.saturating_sub(prev.timestamp) <= self.thresholds.rapid_drop_window_ms
                })
                .map(|prev| prev.value),
            RapidDropBaseline::WindowMaximum => self.window.max_value(),
        }
    }
}

impl SignalEvaluator for SaturationEvaluator {
    fn name(&self) -> &'static str {
        "saturation"
    }

    fn record_type(&self) -> RecordType {
        RecordType::BloodSaturation
    }

    fn observe(&mut self, record: &MeasurementRecord) -> Vec<Alert> {
        let Some(value) = record.value().as_scalar() else {
            return Vec::new();
        };
        let ts = record.timestamp();
        let mut alerts = Vec::new();

        if value < self.thresholds.low {
            alerts.push(Alert::new(
                self.patient_id,
                AlertCondition::LowBloodSaturation,
                ts,
            ));
        }

        if self.window.latest().is_some_and(|newest| ts < newest.timestamp) {
            return alerts;
        }

        self.window.evict(ts);
        if let Some(baseline) = self.baseline(ts) {
            if baseline - value >= self.thresholds.rapid_drop {
                alerts.push(Alert::new(
                    self.patient_id,
                    AlertCondition::RapidBloodSaturationDrop,
                    ts,
                ));
            }
        }

        self.window.push(Reading {
            timestamp: ts,
            value,
        });
        alerts
    }
}
