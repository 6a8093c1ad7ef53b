//! Alert evaluation for patient measurements.
//!
//! The engine keeps one set of stateful evaluators per patient and feeds them
//! every record exactly once, in timestamp order. Built-in rule families
//! cover blood pressure thresholds and trends, oxygen saturation level and
//! rapid drops, heart rate and rhythm, and the cross-signal
//! hypotensive-hypoxemia correlation.

pub mod annotate;
pub mod engine;
pub mod rules;
pub mod thresholds;
pub mod window;


use vitalwatch_common::types::{Alert, MeasurementRecord, RecordType};

/// A rule family that consumes records of one type and keeps running state
/// between calls.
///
/// One instance belongs to exactly one patient; the [`engine::AlertEngine`]
/// owns and serializes access to it. Implementations must tolerate any
/// record sequence and never fail: an unusable record simply produces no
/// alert.
pub trait SignalEvaluator: Send {
    /// Short rule-family name used in logs (e.g., `"blood_pressure"`).
    fn name(&self) -> &'static str;

    /// The record type this evaluator consumes.
    fn record_type(&self) -> RecordType;

    /// Consumes the next record and returns any alerts it triggers.
    ///
    /// Records normally arrive in timestamp order. A record older than the
    /// newest one already seen is late: it still gets the per-record checks
    /// but never enters trend, drop or rhythm state.
    fn observe(&mut self, record: &MeasurementRecord) -> Vec<Alert>;
}
