use crate::error::Result;
use crate::AlertSink;
use async_trait::async_trait;
use vitalwatch_common::types::Alert;

/// Writes every alert to the tracing log at `warn` level.
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl AlertSink for LogSink {
    async fn send(&self, alert: &Alert) -> Result<()> {
        let occurred_at = alert
            .occurred_at()
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| alert.timestamp.to_string());
        tracing::warn!(
            patient_id = alert.patient_id,
            condition = %alert.condition,
            occurred_at = %occurred_at,
            priority = alert.priority,
            repeat_count = alert.repeat_count,
            "Alert triggered: {alert}"
        );
        Ok(())
    }

    fn sink_name(&self) -> &str {
        "log"
    }
}
