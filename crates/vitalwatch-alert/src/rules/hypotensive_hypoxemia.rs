use crate::thresholds::HypotensiveHypoxemiaThresholds;
use vitalwatch_common::types::{Alert, AlertCondition, MeasurementRecord};

/// One hypotensive reading matched with one hypoxemic reading.
#[derive(Debug, Clone, Copy)]
pub struct CorrelatedPair<'a> {
    pub pressure: &'a MeasurementRecord,
    pub saturation: &'a MeasurementRecord,
}

impl CorrelatedPair<'_> {
    pub fn newest_timestamp(&self) -> i64 {
        self.pressure.timestamp().max(self.saturation.timestamp())
    }

    /// The alert for this pair, stamped with the pressure reading's time.
    pub fn alert(&self) -> Alert {
        Alert::new(
            self.pressure.patient_id(),
            AlertCondition::HypotensiveHypoxemiaAlert,
            self.pressure.timestamp(),
        )
    }
}

/// Cross-signal rule: low systolic pressure together with low saturation in
/// the same window.
///
/// Stateless. Every (low-pressure, low-saturation) pair in the supplied
/// window matches, so two hypotensive readings and one hypoxemic reading
/// produce two alerts. Remembering which pairs were already reported is the
/// caller's job.
pub struct HypotensiveHypoxemiaCorrelator {
    thresholds: HypotensiveHypoxemiaThresholds,
}

impl HypotensiveHypoxemiaCorrelator {
    pub fn new(thresholds: HypotensiveHypoxemiaThresholds) -> Self {
        Self { thresholds }
    }

    /// Matching pairs, ordered by pressure reading, then saturation reading.
    pub fn pairs<'a>(
        &self,
        pressure: &[&'a MeasurementRecord],
        saturation: &[&'a MeasurementRecord],
    ) -> Vec<CorrelatedPair<'a>> {
        let hypoxemic: Vec<&'a MeasurementRecord> = saturation
            .iter()
            .copied()
            .filter(|r| {
                r.value()
                    .as_scalar()
                    .is_some_and(|v| v < self.thresholds.saturation_below)
            })
            .collect();
        if hypoxemic.is_empty() {
            return Vec::new();
        }

        pressure
            .iter()
            .copied()
            .filter(|r| {
                r.value()
                    .as_pair()
                    .is_some_and(|(systolic, _)| systolic < self.thresholds.systolic_below)
            })
            .flat_map(|p| {
                hypoxemic.iter().map(move |s| CorrelatedPair {
                    pressure: p,
                    saturation: *s,
                })
            })
            .collect()
    }

    pub fn correlate(
        &self,
        pressure: &[&MeasurementRecord],
        saturation: &[&MeasurementRecord],
    ) -> Vec<Alert> {
        self.pairs(pressure, saturation)
            .iter()
            .map(CorrelatedPair::alert)
            .collect()
    }
}
