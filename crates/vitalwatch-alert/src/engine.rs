use crate::annotate::{AnnotationPolicy, BurstTracker};
use crate::rules::blood_pressure::BloodPressureEvaluator;
use crate::rules::heart_rate::HeartRateEvaluator;
use crate::rules::hypotensive_hypoxemia::{CorrelatedPair, HypotensiveHypoxemiaCorrelator};
use crate::rules::saturation::SaturationEvaluator;
use crate::thresholds::AlertThresholds;
use crate::SignalEvaluator;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use vitalwatch_common::id::RecordId;
use vitalwatch_common::types::{Alert, MeasurementRecord, PatientId, RecordType};
use vitalwatch_storage::DataStore;

/// Everything the engine remembers about one patient between passes.
///
/// `horizon` is the latest window start seen. Memory of consumed records and
/// emitted correlations only covers records at or after it; anything older is
/// treated as already handled.
struct PatientState {
    evaluators: Vec<Box<dyn SignalEvaluator>>,
    bursts: BurstTracker,
    horizon: i64,
    consumed: HashMap<RecordId, i64>,
    correlated: HashMap<(RecordId, RecordId), i64>,
}

impl PatientState {
    fn new(patient_id: PatientId, thresholds: &AlertThresholds) -> Self {
        Self {
            evaluators: vec![
                Box::new(BloodPressureEvaluator::new(
                    patient_id,
                    thresholds.blood_pressure.clone(),
                )),
                Box::new(SaturationEvaluator::new(
                    patient_id,
                    thresholds.saturation.clone(),
                )),
                Box::new(HeartRateEvaluator::new(
                    patient_id,
                    thresholds.heart_rate.clone(),
                )),
            ],
            bursts: BurstTracker::default(),
            horizon: i64::MIN,
            consumed: HashMap::new(),
            correlated: HashMap::new(),
        }
    }

    /// Moves the horizon up to `window_start` (never down) and forgets
    /// everything that fell behind it.
    fn advance_horizon(&mut self, window_start: i64) {
        if window_start <= self.horizon {
            return;
        }
        self.horizon = window_start;
        let horizon = self.horizon;
        self.consumed.retain(|_, ts| *ts >= horizon);
        self.correlated.retain(|_, newest| *newest >= horizon);
    }

    /// Marks `record` consumed; false if it already was or lies behind the
    /// horizon.
    fn consume(&mut self, record: &MeasurementRecord) -> bool {
        record.timestamp() >= self.horizon
            && self
                .consumed
                .insert(record.id(), record.timestamp())
                .is_none()
    }

    /// Marks the pair emitted; false if it already was or lies entirely
    /// behind the horizon.
    fn correlate_once(&mut self, pair: &CorrelatedPair<'_>) -> bool {
        let newest = pair.newest_timestamp();
        newest >= self.horizon
            && self
                .correlated
                .insert((pair.pressure.id(), pair.saturation.id()), newest)
                .is_none()
    }
}

type SharedState = Arc<Mutex<PatientState>>;

/// Runs evaluation passes and owns all per-patient evaluator state.
///
/// Passes for different patients may run in parallel. Two passes for the
/// same patient are serialized on that patient's state lock.
pub struct AlertEngine {
    thresholds: AlertThresholds,
    policy: AnnotationPolicy,
    correlator: HypotensiveHypoxemiaCorrelator,
    patients: Mutex<HashMap<PatientId, SharedState>>,
}

impl Default for AlertEngine {
    fn default() -> Self {
        Self::new(AlertThresholds::default(), AnnotationPolicy::default())
    }
}

impl AlertEngine {
    pub fn new(thresholds: AlertThresholds, policy: AnnotationPolicy) -> Self {
        let correlator =
            HypotensiveHypoxemiaCorrelator::new(thresholds.hypotensive_hypoxemia.clone());
        Self {
            thresholds,
            policy,
            correlator,
            patients: Mutex::new(HashMap::new()),
        }
    }

    pub fn thresholds(&self) -> &AlertThresholds {
        &self.thresholds
    }

    fn lock_patients(&self) -> MutexGuard<'_, HashMap<PatientId, SharedState>> {
        self.patients
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn state(&self, patient_id: PatientId) -> SharedState {
        self.lock_patients()
            .entry(patient_id)
            .or_insert_with(|| Arc::new(Mutex::new(PatientState::new(patient_id, &self.thresholds))))
            .clone()
    }

    /// Drops all remembered state for a patient. The next pass starts fresh.
    pub fn reset_patient(&self, patient_id: PatientId) -> bool {
        self.lock_patients().remove(&patient_id).is_some()
    }

    pub fn tracked_patients(&self) -> usize {
        self.lock_patients().len()
    }

    /// Queries `[start, end]` for the patient and evaluates it.
    pub fn evaluate(
        &self,
        store: &DataStore,
        patient_id: PatientId,
        start: i64,
        end: i64,
    ) -> Vec<Alert> {
        let records = store.records(patient_id, start, end);
        self.evaluate_window(patient_id, start, records)
    }

    /// Evaluates a window of records belonging to `patient_id`. The window
    /// starts at the earliest supplied record.
    ///
    /// Records of other patients are ignored.
    pub fn evaluate_records(&self, patient_id: PatientId, records: &[MeasurementRecord]) -> Vec<Alert> {
        let window: Vec<MeasurementRecord> = records
            .iter()
            .filter(|r| r.patient_id() == patient_id)
            .cloned()
            .collect();
        let start = window.iter().map(|r| r.timestamp()).min().unwrap_or(i64::MIN);
        self.evaluate_window(patient_id, start, window)
    }

    /// Every record reaches the stateful evaluators exactly once, whenever
    /// it first shows up in a window, so overlapping windows never re-fire
    /// and late arrivals are still checked. Each (pressure, saturation) pair
    /// is correlated at most once.
    fn evaluate_window(
        &self,
        patient_id: PatientId,
        start: i64,
        mut window: Vec<MeasurementRecord>,
    ) -> Vec<Alert> {
        window.sort_by_key(|r| r.timestamp());

        let state = self.state(patient_id);
        let mut state = state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let state = &mut *state;

        if !window.is_empty() {
            state.advance_horizon(start);
        }
        let fresh: Vec<&MeasurementRecord> =
            window.iter().filter(|r| state.consume(r)).collect();

        let mut raw = Vec::new();
        for evaluator in state.evaluators.iter_mut() {
            let record_type = evaluator.record_type();
            let before = raw.len();
            for record in fresh.iter().filter(|r| r.record_type() == &record_type) {
                raw.extend(evaluator.observe(record));
            }
            if raw.len() > before {
                tracing::debug!(
                    patient_id,
                    evaluator = evaluator.name(),
                    alerts = raw.len() - before,
                    "Evaluator fired"
                );
            }
        }

        let pressure: Vec<&MeasurementRecord> = window
            .iter()
            .filter(|r| r.record_type() == &RecordType::BloodPressure)
            .collect();
        let saturation: Vec<&MeasurementRecord> = window
            .iter()
            .filter(|r| r.record_type() == &RecordType::BloodSaturation)
            .collect();
        for pair in self.correlator.pairs(&pressure, &saturation) {
            if state.correlate_once(&pair) {
                raw.push(pair.alert());
            }
        }

        let alerts: Vec<Alert> = raw
            .into_iter()
            .map(|alert| self.policy.annotate(alert, &mut state.bursts))
            .collect();

        tracing::debug!(
            patient_id,
            window = window.len(),
            fresh = fresh.len(),
            alerts = alerts.len(),
            "Evaluation pass complete"
        );
        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitalwatch_common::types::MeasurementValue;

    fn hr(ts: i64) -> MeasurementRecord {
        MeasurementRecord::new(1, RecordType::HeartRate, MeasurementValue::from(70.0), ts)
    }

    #[test]
    fn record_is_consumed_once() {
        let mut state = PatientState::new(1, &AlertThresholds::default());
        let record = hr(10);
        assert!(state.consume(&record));
        assert!(!state.consume(&record.clone()));
        assert!(state.consume(&hr(10)));
    }

    #[test]
    fn horizon_only_moves_forward_and_prunes() {
        let mut state = PatientState::new(1, &AlertThresholds::default());
        let old = hr(10);
        state.consume(&old);
        state.consume(&hr(50));

        state.advance_horizon(20);
        assert_eq!(state.consumed.len(), 1);
        assert!(!state.consume(&old));
        assert!(!state.consume(&hr(15)));

        state.advance_horizon(0);
        assert_eq!(state.horizon, 20);
        assert!(state.consume(&hr(20)));
    }
}
