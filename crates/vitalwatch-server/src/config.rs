use serde::{Deserialize, Serialize};
use std::path::Path;
use vitalwatch_alert::annotate::AnnotationPolicy;
use vitalwatch_alert::thresholds::AlertThresholds;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// `"text"` or `"json"`.
    #[serde(default = "default_log_format")]
    pub log_format: String,
    #[serde(default)]
    pub evaluation: EvaluationConfig,
    #[serde(default)]
    pub thresholds: AlertThresholds,
    #[serde(default)]
    pub annotations: AnnotationPolicy,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Length of the window evaluated per patient, ending at the patient's
    /// newest record.
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            window_secs: default_window_secs(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

impl EvaluationConfig {
    pub fn window_ms(&self) -> i64 {
        i64::try_from(self.window_secs.saturating_mul(1000)).unwrap_or(i64::MAX)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default = "default_log_sink")]
    pub log_sink: bool,
    #[serde(default)]
    pub file_sink_path: Option<String>,
    /// Alerts below this priority are not delivered.
    #[serde(default)]
    pub min_priority: u8,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            log_sink: default_log_sink(),
            file_sink_path: None,
            min_priority: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestConfig {
    #[serde(default)]
    pub file_path: Option<String>,
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_interval_secs() -> u64 {
    10
}

fn default_window_secs() -> u64 {
    3600
}

fn default_max_concurrent() -> usize {
    8
}

fn default_log_sink() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_format: default_log_format(),
            evaluation: EvaluationConfig::default(),
            thresholds: AlertThresholds::default(),
            annotations: AnnotationPolicy::default(),
            notify: NotifyConfig::default(),
            ingest: IngestConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Like [`ServerConfig::load`], but a missing file yields the defaults.
    /// The flag reports whether the file was found.
    pub fn load_or_default(path: &str) -> anyhow::Result<(Self, bool)> {
        if Path::new(path).exists() {
            Ok((Self::load(path)?, true))
        } else {
            Ok((Self::default(), false))
        }
    }

    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}
