use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use vitalwatch_common::types::{Alert, AlertCondition, SignalFamily};

/// Priority level per alert condition. Higher is more urgent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Priorities {
    #[serde(default = "priority_urgent")]
    pub critical_blood_pressure: u8,
    #[serde(default = "priority_elevated")]
    pub blood_pressure_trend: u8,
    #[serde(default = "priority_elevated")]
    pub low_saturation: u8,
    #[serde(default = "priority_elevated")]
    pub rapid_saturation_drop: u8,
    #[serde(default = "priority_urgent")]
    pub hypotensive_hypoxemia: u8,
    #[serde(default = "priority_elevated")]
    pub abnormal_heart_rate: u8,
    #[serde(default = "priority_routine")]
    pub irregular_heart_beat: u8,
}

impl Default for Priorities {
    fn default() -> Self {
        Self {
            critical_blood_pressure: priority_urgent(),
            blood_pressure_trend: priority_elevated(),
            low_saturation: priority_elevated(),
            rapid_saturation_drop: priority_elevated(),
            hypotensive_hypoxemia: priority_urgent(),
            abnormal_heart_rate: priority_elevated(),
            irregular_heart_beat: priority_routine(),
        }
    }
}

impl Priorities {
    pub fn for_condition(&self, condition: AlertCondition) -> u8 {
        match condition {
            AlertCondition::CriticalBloodPressureThreshold => self.critical_blood_pressure,
            AlertCondition::IncreasingSystolicBloodPressureTrend
            | AlertCondition::DecreasingSystolicBloodPressureTrend
            | AlertCondition::IncreasingDiastolicBloodPressureTrend
            | AlertCondition::DecreasingDiastolicBloodPressureTrend => self.blood_pressure_trend,
            AlertCondition::LowBloodSaturation => self.low_saturation,
            AlertCondition::RapidBloodSaturationDrop => self.rapid_saturation_drop,
            AlertCondition::HypotensiveHypoxemiaAlert => self.hypotensive_hypoxemia,
            AlertCondition::AbnormalHeartRate => self.abnormal_heart_rate,
            AlertCondition::IrregularHeartBeat => self.irregular_heart_beat,
        }
    }
}

fn priority_urgent() -> u8 {
    3
}

fn priority_elevated() -> u8 {
    2
}

fn priority_routine() -> u8 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationPolicy {
    #[serde(default)]
    pub priorities: Priorities,
    /// Heart-rate alerts of the same condition closer together than this are
    /// counted as one burst.
    #[serde(default = "default_repeat_window_ms")]
    pub repeat_window_ms: i64,
}

impl Default for AnnotationPolicy {
    fn default() -> Self {
        Self {
            priorities: Priorities::default(),
            repeat_window_ms: default_repeat_window_ms(),
        }
    }
}

fn default_repeat_window_ms() -> i64 {
    60_000
}

#[derive(Debug, Clone, Copy)]
struct Burst {
    last_timestamp: i64,
    count: u32,
}

/// Per-patient memory of recent heart-rate alert bursts.
#[derive(Debug, Default)]
pub struct BurstTracker {
    bursts: HashMap<AlertCondition, Burst>,
}

impl BurstTracker {
    /// Counts `alert` into its burst and returns the occurrence number when
    /// it repeats an earlier alert within `window_ms`.
    fn record(&mut self, alert: &Alert, window_ms: i64) -> Option<u32> {
        let burst = self
            .bursts
            .entry(alert.condition)
            .and_modify(|b| {
                if alert.timestamp.saturating_sub(b.last_timestamp) <= window_ms {
                    b.count += 1;
                } else {
                    b.count = 1;
                }
                b.last_timestamp = b.last_timestamp.max(alert.timestamp);
            })
            .or_insert(Burst {
                last_timestamp: alert.timestamp,
                count: 1,
            });
        (burst.count > 1).then_some(burst.count)
    }
}

impl AnnotationPolicy {
    /// Attaches priority to every alert and repeat counts to heart-rate
    /// alerts that recur within the burst window.
    pub fn annotate(&self, alert: Alert, bursts: &mut BurstTracker) -> Alert {
        let priority = self.priorities.for_condition(alert.condition);
        let repeat = if alert.condition.family() == SignalFamily::HeartRate {
            bursts.record(&alert, self.repeat_window_ms)
        } else {
            None
        };

        let alert = alert.with_priority(priority);
        match repeat {
            Some(count) => alert.with_repeat_count(count),
            None => alert,
        }
    }
}
