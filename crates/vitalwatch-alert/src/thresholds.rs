use serde::{Deserialize, Serialize};

/// Clinical limits used by every evaluator. Each section can be overridden
/// independently from configuration; missing fields keep their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertThresholds {
    #[serde(default)]
    pub blood_pressure: BloodPressureThresholds,
    #[serde(default)]
    pub saturation: SaturationThresholds,
    #[serde(default)]
    pub heart_rate: HeartRateThresholds,
    #[serde(default)]
    pub hypotensive_hypoxemia: HypotensiveHypoxemiaThresholds,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BloodPressureThresholds {
    #[serde(default = "default_systolic_high")]
    pub systolic_high: f64,
    #[serde(default = "default_systolic_low")]
    pub systolic_low: f64,
    #[serde(default = "default_diastolic_high")]
    pub diastolic_high: f64,
    #[serde(default = "default_diastolic_low")]
    pub diastolic_low: f64,
    /// A step counts towards a trend only when it exceeds this many mmHg.
    #[serde(default = "default_trend_step")]
    pub trend_step: f64,
    /// Consecutive qualifying steps needed to fire a trend alert.
    #[serde(default = "default_trend_length")]
    pub trend_length: u32,
}

impl Default for BloodPressureThresholds {
    fn default() -> Self {
        Self {
            systolic_high: default_systolic_high(),
            systolic_low: default_systolic_low(),
            diastolic_high: default_diastolic_high(),
            diastolic_low: default_diastolic_low(),
            trend_step: default_trend_step(),
            trend_length: default_trend_length(),
        }
    }
}

fn default_systolic_high() -> f64 {
    180.0
}

fn default_systolic_low() -> f64 {
    90.0
}

fn default_diastolic_high() -> f64 {
    120.0
}

fn default_diastolic_low() -> f64 {
    60.0
}

fn default_trend_step() -> f64 {
    10.0
}

fn default_trend_length() -> u32 {
    3
}

/// What a new saturation reading is compared against for the rapid-drop rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RapidDropBaseline {
    /// The immediately preceding reading, if it is inside the drop window.
    #[default]
    PreviousReading,
    /// The highest reading inside the drop window.
    WindowMaximum,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaturationThresholds {
    #[serde(default = "default_saturation_low")]
    pub low: f64,
    #[serde(default = "default_rapid_drop")]
    pub rapid_drop: f64,
    #[serde(default = "default_rapid_drop_window_ms")]
    pub rapid_drop_window_ms: i64,
    #[serde(default)]
    pub rapid_drop_baseline: RapidDropBaseline,
}

impl Default for SaturationThresholds {
    fn default() -> Self {
        Self {
            low: default_saturation_low(),
            rapid_drop: default_rapid_drop(),
            rapid_drop_window_ms: default_rapid_drop_window_ms(),
            rapid_drop_baseline: RapidDropBaseline::default(),
        }
    }
}

fn default_saturation_low() -> f64 {
    92.0
}

fn default_rapid_drop() -> f64 {
    5.0
}

fn default_rapid_drop_window_ms() -> i64 {
    10 * 60 * 1000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartRateThresholds {
    #[serde(default = "default_rate_low")]
    pub low: f64,
    #[serde(default = "default_rate_high")]
    pub high: f64,
    /// Allowed deviation between the observed and expected beat interval.
    #[serde(default = "default_irregular_tolerance_ms")]
    pub irregular_tolerance_ms: f64,
}

impl Default for HeartRateThresholds {
    fn default() -> Self {
        Self {
            low: default_rate_low(),
            high: default_rate_high(),
            irregular_tolerance_ms: default_irregular_tolerance_ms(),
        }
    }
}

fn default_rate_low() -> f64 {
    50.0
}

fn default_rate_high() -> f64 {
    100.0
}

fn default_irregular_tolerance_ms() -> f64 {
    200.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HypotensiveHypoxemiaThresholds {
    #[serde(default = "default_systolic_low")]
    pub systolic_below: f64,
    #[serde(default = "default_saturation_low")]
    pub saturation_below: f64,
}

impl Default for HypotensiveHypoxemiaThresholds {
    fn default() -> Self {
        Self {
            systolic_below: default_systolic_low(),
            saturation_below: default_saturation_low(),
        }
    }
}
